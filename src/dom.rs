//! A small mutable HTML document tree. Parsing is done with html5gum's
//! tokenizer and a simple open-element stack (no implied end tags,
//! no foster parenting); good enough for hand-written page templates.
//! Script and style contents are kept as raw text.

use std::{collections::HashSet, fmt, sync::Arc};

use html5gum::{Token, HtmlString};
use kstring::KString;
use lazy_static::lazy_static;
use thiserror::Error;

use crate::escape::escape_html;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("no such node: {0:?}")]
    NoSuchNode(NodeId),
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0:?} is not a form")]
    NotAForm(NodeId),
    #[error("markup is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

lazy_static!{
    static ref VOID_ELEMENTS: HashSet<&'static str> = [
        "area", "base", "br", "col", "embed", "hr", "img", "input",
        "link", "meta", "source", "track", "wbr",
    ].into_iter().collect();
}

// Text inside these is written out as is.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

const FORM_CONTROLS: &[&str] = &["input", "textarea", "select"];

fn kstring(s: HtmlString) -> Result<KString, DomError> {
    Ok(KString::from_string(String::from_utf8(s.0)?))
}

fn is_tag_name_end(b: Option<&u8>) -> bool {
    matches!(b, None | Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c'))
}

fn starts_with_ignore_case(s: &[u8], prefix: &str) -> bool {
    s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Offset just past the `>` of the tag starting at `start` (the
/// `<`), or the end of `s`. A `>` inside a quoted attribute value
/// doesn't end the tag.
fn tag_end(s: &[u8], start: usize) -> usize {
    let mut quote = None;
    let mut after_equals = false;
    for (i, &b) in s.iter().enumerate().skip(start + 1) {
        match quote {
            Some(q) => if b == q {
                quote = None;
            },
            None => match b {
                b'>' => return i + 1,
                b'=' => after_equals = true,
                b'"' | b'\'' if after_equals => quote = Some(b),
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => (),
                _ => after_equals = false,
            }
        }
    }
    s.len()
}

/// Offset just past the first script or style start tag in `html`
/// (outside comments), and the element's name.
fn raw_text_start(html: &str) -> Option<(usize, &'static str)> {
    let s = html.as_bytes();
    let mut i = 0;
    while let Some(off) = html[i..].find('<') {
        let start = i + off;
        let after = &s[start + 1..];
        if after.starts_with(b"!--") {
            i = start + 4 + html[start + 4..].find("-->")? + 3;
            continue
        }
        for name in RAW_TEXT_ELEMENTS {
            if starts_with_ignore_case(after, name) && is_tag_name_end(after.get(name.len())) {
                return Some((tag_end(s, start), *name))
            }
        }
        i = match after.first() {
            Some(b) if b.is_ascii_alphabetic() || *b == b'/' => tag_end(s, start),
            _ => start + 1,
        };
    }
    None
}

/// Offset of the end tag closing raw text `body` of element `name`,
/// or the end of `body` if there is none.
fn raw_text_end(body: &str, name: &str) -> usize {
    let s = body.as_bytes();
    let mut i = 0;
    while let Some(off) = body[i..].find("</") {
        let start = i + off;
        let after = &s[start + 2..];
        if starts_with_ignore_case(after, name) && is_tag_name_end(after.get(name.len())) {
            return start
        }
        i = start + 2;
    }
    body.len()
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Doctype(KString),
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Element {
    tag_name: KString,
    attributes: Vec<(KString, KString)>,
    // Form control state once it differs from the markup default.
    value: Option<String>,
    checked: Option<bool>,
}

impl Element {
    fn new(tag_name: KString, attributes: Vec<(KString, KString)>) -> Element {
        Element { tag_name, attributes, value: None, checked: None }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(KString, KString)] {
        &self.attributes
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        if let Some((_, v)) = self.attributes.iter_mut().find(|(k, _)| k.as_str() == name) {
            *v = KString::from_ref(value);
        } else {
            self.attributes.push((KString::from_ref(name), KString::from_ref(value)));
        }
    }

    fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(self.tag_name.as_str())
    }

    fn is_raw_text(&self) -> bool {
        RAW_TEXT_ELEMENTS.contains(&self.tag_name.as_str())
    }

    pub fn is_checkable(&self) -> bool {
        &*self.tag_name == "input"
            && matches!(self.attribute("type"), Some("checkbox") | Some("radio"))
    }
}


// ------------------------------------------------------------------
// Events

pub type SubmitListener = Arc<dyn Fn(&mut Document, &mut SubmitEvent) + Send + Sync>;

#[derive(Debug)]
pub struct SubmitEvent {
    target: NodeId,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// What happens after a submit event has been dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A listener cancelled the submission; nothing is sent.
    Prevented,
    /// The request a browser would now send.
    Navigate {
        action: String,
        method: String,
        fields: Vec<(String, String)>,
    },
}


// ------------------------------------------------------------------

#[derive(Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    submit_listeners: Vec<(NodeId, SubmitListener)>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("submit_listeners", &self.submit_listeners.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    pub fn new() -> Document {
        Document {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            submit_listeners: Vec::new(),
        }
    }

    pub fn parse(html: &str) -> Result<Document, DomError> {
        let mut doc = Document::new();
        doc.append_parsed(doc.root, html)?;
        Ok(doc)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::NoSuchNode(id))
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, DomError> {
        Ok(&self.node(id)?.kind)
    }

    pub fn element(&self, id: NodeId) -> Result<&Element, DomError> {
        match &self.node(id)?.kind {
            NodeKind::Element(e) => Ok(e),
            _ => Err(DomError::NotAnElement(id))
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match self.nodes.get_mut(id.0) {
            Some(Node { kind: NodeKind::Element(e), .. }) => Ok(e),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::NoSuchNode(id)),
        }
    }

    fn create(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { parent, children: Vec::new(), kind });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn append_text(&mut self, parent: NodeId, text: String) {
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let NodeKind::Text(s) = &mut self.nodes[last.0].kind {
                s.push_str(&text);
                return
            }
        }
        self.create(Some(parent), NodeKind::Text(text));
    }

    fn detach_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    fn is_element_named(&self, id: NodeId, name: &str) -> bool {
        matches!(&self.nodes[id.0].kind,
                 NodeKind::Element(e) if e.tag_name.as_str() == name)
    }

    /// Parse `html` and append the resulting nodes to `parent`.
    fn append_parsed(&mut self, parent: NodeId, html: &str) -> Result<(), DomError> {
        // stack[0] is `parent` and never popped.
        let mut stack = vec![parent];
        let mut rest = html;
        // html5gum's default emitter doesn't switch to raw text for
        // script and style, so their contents are cut out here and
        // never reach the tokenizer.
        while let Some((tag_end, name)) = raw_text_start(rest) {
            self.append_tokens(&mut stack, &rest[..tag_end])?;
            let body = &rest[tag_end..];
            let body_end = raw_text_end(body, name);
            if !body[..body_end].is_empty() {
                let current = stack[stack.len() - 1];
                self.append_text(current, body[..body_end].to_string());
            }
            rest = &body[body_end..];
        }
        self.append_tokens(&mut stack, rest)
    }

    fn append_tokens(&mut self, stack: &mut Vec<NodeId>, html: &str) -> Result<(), DomError> {
        for token in html5gum::Tokenizer::new(html).infallible() {
            let current = stack[stack.len() - 1];
            match token {
                Token::StartTag(tag) => {
                    let name = KString::from_string(
                        String::from_utf8(tag.name.0)?.to_ascii_lowercase());
                    let mut attributes = Vec::with_capacity(tag.attributes.len());
                    for (k, v) in tag.attributes {
                        attributes.push((kstring(k)?, kstring(v)?));
                    }
                    let element = Element::new(name, attributes);
                    // `<script/>` still opens a script.
                    let closed = element.is_void()
                        || (tag.self_closing && !element.is_raw_text());
                    let id = self.create(Some(current), NodeKind::Element(element));
                    if !closed {
                        stack.push(id);
                    }
                }
                Token::EndTag(tag) => {
                    let name = String::from_utf8(tag.name.0)?.to_ascii_lowercase();
                    // Closes everything opened within, too. Stray end
                    // tags are dropped.
                    if let Some(pos) = stack[1..].iter().rposition(
                        |id| self.is_element_named(*id, &name))
                    {
                        stack.truncate(pos + 1);
                    }
                }
                Token::String(s) => {
                    self.append_text(current, String::from_utf8(s.0)?);
                }
                Token::Comment(s) => {
                    self.create(Some(current), NodeKind::Comment(String::from_utf8(s.0)?));
                }
                Token::Doctype(doctype) => {
                    self.create(Some(current), NodeKind::Doctype(kstring(doctype.name)?));
                }
                Token::Error(e) => {
                    // Browsers recover from these, so do we.
                    tracing::debug!("HTML5 parsing error: {e}");
                }
            }
        }
        Ok(())
    }


    // --------------------------------------------------------------
    // Queries

    /// `id` and all its (attached) descendants, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut todo = vec![id];
        while let Some(id) = todo.pop() {
            out.push(id);
            todo.extend(self.nodes[id.0].children.iter().rev());
        }
        out
    }

    fn find_elements(&self, from: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(from).into_iter().filter(|id| {
            matches!(&self.nodes[id.0].kind, NodeKind::Element(e) if pred(e))
        }).collect()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_elements(self.root, |e| e.attribute("id") == Some(id)).first().copied()
    }

    /// All elements carrying attribute `name`, in document order.
    pub fn elements_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.find_elements(self.root, |e| e.attribute(name).is_some())
    }

    pub fn elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId> {
        self.find_elements(self.root, |e| e.tag_name() == tag_name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[][..], |n| n.children.as_slice())
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|e| e.tag_name())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).ok()?.attribute(name)
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for id in self.descendants(id) {
            if let NodeKind::Text(s) = &self.nodes[id.0].kind {
                out.push_str(s);
            }
        }
        out
    }


    // --------------------------------------------------------------
    // Mutation

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?.set_attribute(name, value);
        Ok(())
    }

    /// Replace all children of `id` with one text node (none if
    /// `text` is empty).
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.element(id)?;
        self.detach_children(id);
        if !text.is_empty() {
            self.create(Some(id), NodeKind::Text(text.into()));
        }
        Ok(())
    }

    pub fn inner_html(&self, id: NodeId) -> Result<String, DomError> {
        self.element(id)?;
        let mut out = String::new();
        for child in &self.nodes[id.0].children {
            self.write_node(&mut out, *child, self.is_raw_text_parent(id));
        }
        Ok(out)
    }

    /// Replace all children of `id` with the nodes parsed from `html`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<(), DomError> {
        self.element(id)?;
        self.detach_children(id);
        self.append_parsed(id, html)
    }

    /// Append the nodes parsed from `html` to the children of `id`.
    pub fn append_html(&mut self, id: NodeId, html: &str) -> Result<(), DomError> {
        self.node(id)?;
        self.append_parsed(id, html)
    }


    // --------------------------------------------------------------
    // Forms

    fn form(&self, id: NodeId) -> Result<&Element, DomError> {
        let e = self.element(id)?;
        if e.tag_name() == "form" {
            Ok(e)
        } else {
            Err(DomError::NotAForm(id))
        }
    }

    /// The input, textarea and select elements inside `form`.
    pub fn form_controls(&self, form: NodeId) -> Result<Vec<NodeId>, DomError> {
        self.form(form)?;
        Ok(self.find_elements(form, |e| FORM_CONTROLS.contains(&e.tag_name())))
    }

    /// The current value of a form control.
    pub fn value(&self, id: NodeId) -> Result<String, DomError> {
        let e = self.element(id)?;
        if let Some(v) = &e.value {
            return Ok(v.clone())
        }
        Ok(match e.tag_name() {
            "textarea" => self.text_content(id),
            "select" => {
                let options = self.find_elements(id, |e| e.tag_name() == "option");
                let selected = options.iter()
                    .find(|o| self.get_attribute(**o, "selected").is_some())
                    .or(options.first());
                match selected {
                    Some(o) => match self.get_attribute(*o, "value") {
                        Some(v) => v.to_string(),
                        None => self.text_content(*o),
                    },
                    None => String::new(),
                }
            }
            _ => e.attribute("value").unwrap_or("").to_string(),
        })
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?.value = Some(value.into());
        Ok(())
    }

    pub fn checked(&self, id: NodeId) -> Result<bool, DomError> {
        let e = self.element(id)?;
        Ok(e.checked.unwrap_or_else(|| e.attribute("checked").is_some()))
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<(), DomError> {
        self.element_mut(id)?.checked = Some(checked);
        Ok(())
    }

    /// Put every control of `form` back to its markup default.
    pub fn reset_form(&mut self, form: NodeId) -> Result<(), DomError> {
        for id in self.form_controls(form)? {
            let e = self.element_mut(id)?;
            e.value = None;
            e.checked = None;
        }
        Ok(())
    }

    /// The name/value pairs a submission of `form` would send.
    pub fn form_data(&self, form: NodeId) -> Result<Vec<(String, String)>, DomError> {
        let mut fields = Vec::new();
        for id in self.form_controls(form)? {
            let e = self.element(id)?;
            let name = match e.attribute("name") {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => continue,
            };
            if e.attribute("disabled").is_some() {
                continue
            }
            if e.is_checkable() {
                if self.checked(id)? {
                    fields.push((name, e.attribute("value").unwrap_or("on").to_string()));
                }
                continue
            }
            fields.push((name, self.value(id)?));
        }
        Ok(fields)
    }

    pub fn add_submit_listener(
        &mut self,
        form: NodeId,
        listener: SubmitListener,
    ) -> Result<(), DomError> {
        self.form(form)?;
        self.submit_listeners.push((form, listener));
        Ok(())
    }

    /// Dispatch a submit event at `form`. Nothing is sent anywhere;
    /// an uncancelled submission is reported as `Navigate`.
    pub fn submit(&mut self, form: NodeId) -> Result<SubmitOutcome, DomError> {
        self.form(form)?;
        let listeners: Vec<SubmitListener> = self.submit_listeners.iter()
            .filter(|(target, _)| *target == form)
            .map(|(_, l)| l.clone())
            .collect();
        let mut event = SubmitEvent { target: form, default_prevented: false };
        for listener in listeners {
            listener(self, &mut event);
        }
        if event.default_prevented {
            return Ok(SubmitOutcome::Prevented)
        }
        let e = self.form(form)?;
        Ok(SubmitOutcome::Navigate {
            action: e.attribute("action").unwrap_or("").to_string(),
            method: e.attribute("method").unwrap_or("get").to_ascii_lowercase(),
            fields: self.form_data(form)?,
        })
    }


    // --------------------------------------------------------------
    // Serialization

    fn is_raw_text_parent(&self, id: NodeId) -> bool {
        matches!(&self.nodes[id.0].kind,
                 NodeKind::Element(e) if RAW_TEXT_ELEMENTS.contains(&e.tag_name()))
    }

    fn write_node(&self, out: &mut String, id: NodeId, raw: bool) {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Document =>
                for child in &node.children {
                    self.write_node(out, *child, false);
                },
            NodeKind::Doctype(name) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push_str(">");
            }
            NodeKind::Text(s) =>
                if raw {
                    out.push_str(s)
                } else {
                    out.push_str(&escape_html(s))
                },
            NodeKind::Comment(s) => {
                out.push_str("<!--");
                out.push_str(s);
                out.push_str("-->");
            }
            NodeKind::Element(e) => self.write_element(out, id, e),
        }
    }

    fn write_element(&self, out: &mut String, id: NodeId, e: &Element) {
        let is_input = e.tag_name() == "input";
        let write_att = |out: &mut String, k: &str, v: &str| {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            out.push_str(&escape_html(v));
            out.push('"');
        };
        out.push('<');
        out.push_str(e.tag_name());
        for (k, v) in &e.attributes {
            match k.as_str() {
                "value" if is_input && e.value.is_some() => (),
                "checked" if e.checked.is_some() => (),
                _ => write_att(out, k, v),
            }
        }
        if is_input {
            if let Some(v) = &e.value {
                write_att(out, "value", v);
            }
        }
        if e.checked == Some(true) {
            write_att(out, "checked", "");
        }
        out.push('>');
        if e.is_void() {
            return
        }
        match (&e.value, e.tag_name()) {
            (Some(v), "textarea") => out.push_str(&escape_html(v)),
            _ => {
                let raw = self.is_raw_text_parent(id);
                for child in &self.nodes[id.0].children {
                    self.write_node(out, *child, raw);
                }
            }
        }
        out.push_str("</");
        out.push_str(e.tag_name());
        out.push('>');
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if id.0 < self.nodes.len() {
            self.write_node(&mut out, id, false);
        }
        out
    }

    pub fn to_html_string(&self) -> String {
        self.outer_html(self.root)
    }
}
