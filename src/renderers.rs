//! Repeated markup blocks generated from arrays in the content
//! document: menu cards, gallery items, opening hours rows.

use anyhow::{Result, Context};
use serde_json::Value;

use crate::content::{Content, HoursEntry, MenuItem, js_string};
use crate::dom::Document;
use crate::escape::{escape_attr, escape_html};

pub const MENU_CONTAINER: &str = "menuGrid";
pub const MENU_ITEMS: &str = "menu.items";
pub const GALLERY_CONTAINER: &str = "galleryGrid";
pub const GALLERY_IMAGES: &str = "gallery.images";
pub const HOURS_CONTAINER: &str = "hoursList";
pub const HOURS_WEEKLY: &str = "hours.weekly";

pub const GALLERY_ALT: &str = "Foto";

/// Replace the contents of element `container_id` (if there is one)
/// with the fragments made from the array at `path`, in array order.
fn render_list(
    doc: &mut Document,
    content: &Content,
    container_id: &str,
    path: &str,
    fragment: impl Fn(usize, &Value) -> Result<String>,
) -> Result<bool> {
    let container = match doc.get_element_by_id(container_id) {
        Some(id) => id,
        None => return Ok(false)
    };
    let mut html = String::new();
    for (i, entry) in content.array_at(path)?.iter().enumerate() {
        html.push_str(&fragment(i, entry)?);
    }
    doc.set_inner_html(container, &html).with_context(
        || format!("setting contents of #{container_id}"))?;
    Ok(true)
}

pub fn menu_card(item: &MenuItem) -> String {
    format!("
<article class=\"menu-card\">
  <div class=\"menu-name\">{}</div>
  <div class=\"menu-desc\">{}</div>
  <div class=\"menu-meta\">
    <span>{}</span>
    <span class=\"price\">{}</span>
  </div>
</article>
",
            escape_html(&item.name),
            escape_html(&item.desc),
            escape_html(&item.tag),
            escape_html(&item.price))
}

pub fn gallery_item(src: &Value) -> String {
    format!("
<div class=\"gallery-item\">
  <img src=\"{}\" alt=\"{GALLERY_ALT}\" loading=\"lazy\" />
</div>
",
            escape_attr(js_string(src)))
}

pub fn hours_row(entry: &HoursEntry) -> String {
    format!("
<div class=\"hours-row\">
  <span>{}</span>
  <span>{}</span>
</div>
",
            escape_html(&entry.day),
            escape_html(&entry.time))
}

/// Returns whether the page has a menu section.
pub fn render_menu(doc: &mut Document, content: &Content) -> Result<bool> {
    render_list(doc, content, MENU_CONTAINER, MENU_ITEMS, |i, entry| {
        Ok(menu_card(&MenuItem::from_entry(entry, i)?))
    })
}

pub fn render_gallery(doc: &mut Document, content: &Content) -> Result<bool> {
    render_list(doc, content, GALLERY_CONTAINER, GALLERY_IMAGES, |_, src| {
        Ok(gallery_item(src))
    })
}

pub fn render_hours(doc: &mut Document, content: &Content) -> Result<bool> {
    render_list(doc, content, HOURS_CONTAINER, HOURS_WEEKLY, |i, entry| {
        Ok(hours_row(&HoursEntry::from_entry(entry, i)?))
    })
}
