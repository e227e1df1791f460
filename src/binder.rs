//! Binding of content fields into elements that declare a
//! `data-fill`, `data-href`, `data-src` or `data-iframe-src` path.

use serde_json::Value;

use crate::content::{Content, is_truthy, js_string};
use crate::dom::{Document, DomError, NodeId};
use crate::time_util::YearSource;

pub const YEAR_PLACEHOLDER: &str = "{year}";

/// (element, path) for every element carrying attribute `directive`.
fn bound_elements(doc: &Document, directive: &str) -> Vec<(NodeId, String)> {
    doc.elements_with_attribute(directive).into_iter()
        .filter_map(|id| Some((id, doc.get_attribute(id, directive)?.to_string())))
        .collect()
}

fn set_text(doc: &mut Document, id: NodeId, value: Option<&Value>) -> Result<(), DomError> {
    match value {
        None | Some(Value::Null) => Ok(()),
        Some(v) => doc.set_text_content(id, &js_string(v)),
    }
}

fn set_url_attribute(
    doc: &mut Document,
    id: NodeId,
    attribute: &str,
    value: Option<&Value>,
) -> Result<(), DomError> {
    match value {
        Some(v) if is_truthy(v) => doc.set_attribute(id, attribute, &js_string(v)),
        _ => Ok(())
    }
}

/// Replace the first `{year}` in `s`.
pub fn substitute_year(s: &str, year: i32) -> String {
    s.replacen(YEAR_PLACEHOLDER, &year.to_string(), 1)
}

pub fn fill_simple_fields(
    doc: &mut Document,
    content: &Content,
    year: &dyn YearSource,
) -> Result<(), DomError> {
    for (id, path) in bound_elements(doc, "data-fill") {
        match content.get(&path) {
            Some(Value::String(s)) if s.contains(YEAR_PLACEHOLDER) => {
                let s = substitute_year(s, year.current_year());
                doc.set_text_content(id, &s)?;
            }
            value => set_text(doc, id, value)?,
        }
    }

    for (id, path) in bound_elements(doc, "data-href") {
        set_url_attribute(doc, id, "href", content.get(&path))?;
    }

    for (id, path) in bound_elements(doc, "data-src") {
        set_url_attribute(doc, id, "src", content.get(&path))?;
    }

    // Frames get their own pass, same effect.
    for (id, path) in bound_elements(doc, "data-iframe-src") {
        if let Some(src) = content.get(&path).filter(|v| is_truthy(v)) {
            doc.set_attribute(id, "src", &js_string(src))?;
        }
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::time_util::{FixedYear, SystemYear};

    const TEMPLATE: &str = "<footer><p data-fill=\"footer.copy\" id=\"copy\">(c)</p>\
        <h1 data-fill=\"brand.name\" id=\"name\">Placeholder</h1>\
        <span data-fill=\"brand.missing\" id=\"missing\">keep me</span>\
        <span data-fill=\"brand.nothing\" id=\"null\">keep me too</span>\
        <span data-fill=\"brand.founded\" id=\"num\"></span>\
        <a data-href=\"contact.mail\" href=\"#\" id=\"mail\">mail</a>\
        <a data-href=\"contact.empty\" id=\"nohref\">x</a>\
        <img data-src=\"hero.img\" id=\"hero\">\
        <img data-src=\"hero.none\" id=\"nosrc\">\
        <iframe data-iframe-src=\"map.embed\" id=\"map\"></iframe>\
        <iframe data-iframe-src=\"map.zero\" id=\"nomap\"></iframe></footer>";

    fn data() -> Content {
        Content::new(json!({
            "footer": {"copy": "© {year} Cafe {year}"},
            "brand": {"name": "Café <Blau>", "founded": 1999, "nothing": null},
            "contact": {"mail": "mailto:a@b.ch?x=1&y=2", "empty": ""},
            "hero": {"img": "img/hero.jpg"},
            "map": {"embed": "https://maps.example/?q=cafe", "zero": 0}
        }))
    }

    fn text(doc: &Document, id: &str) -> String {
        doc.text_content(doc.get_element_by_id(id).unwrap())
    }

    fn att(doc: &Document, id: &str, name: &str) -> Option<String> {
        doc.get_attribute(doc.get_element_by_id(id).unwrap(), name).map(String::from)
    }

    #[test]
    fn t_fill() {
        let mut doc = Document::parse(TEMPLATE).unwrap();
        fill_simple_fields(&mut doc, &data(), &FixedYear(2031)).unwrap();
        assert_eq!(text(&doc, "copy"), "© 2031 Cafe {year}");
        assert_eq!(text(&doc, "name"), "Café <Blau>");
        assert_eq!(text(&doc, "missing"), "keep me");
        assert_eq!(text(&doc, "null"), "keep me too");
        assert_eq!(text(&doc, "num"), "1999");
        assert_eq!(att(&doc, "mail", "href").as_deref(), Some("mailto:a@b.ch?x=1&y=2"));
        assert_eq!(att(&doc, "nohref", "href"), None);
        assert_eq!(att(&doc, "hero", "src").as_deref(), Some("img/hero.jpg"));
        assert_eq!(att(&doc, "nosrc", "src"), None);
        assert_eq!(att(&doc, "map", "src").as_deref(), Some("https://maps.example/?q=cafe"));
        assert_eq!(att(&doc, "nomap", "src"), None);
        let html = doc.to_html_string();
        assert!(html.contains("Café &lt;Blau&gt;"));
        assert!(html.contains("href=\"mailto:a@b.ch?x=1&amp;y=2\""));
    }

    #[test]
    fn t_year_uses_clock() {
        let mut doc = Document::parse(
            "<p data-fill=\"footer.copy\" id=\"copy\"></p>").unwrap();
        let content = Content::new(json!({"footer": {"copy": "© {year} Cafe"}}));
        fill_simple_fields(&mut doc, &content, &SystemYear).unwrap();
        let year = SystemYear.current_year().to_string();
        assert_eq!(year.len(), 4);
        assert_eq!(text(&doc, "copy"), format!("© {year} Cafe"));
    }

    #[test]
    fn t_absent_content() {
        let mut doc = Document::parse(TEMPLATE).unwrap();
        let before = doc.to_html_string();
        fill_simple_fields(&mut doc, &Content::new(json!({})), &FixedYear(2000)).unwrap();
        assert_eq!(doc.to_html_string(), before);
    }

    #[test]
    fn t_substitute_year() {
        assert_eq!(substitute_year("{year}-{year}", 1999), "1999-{year}");
        assert_eq!(substitute_year("none", 1999), "none");
    }
}
