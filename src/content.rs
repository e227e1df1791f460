//! The content document: JSON data driving all bindings and list
//! renderers, plus the value conventions (truthiness, string form)
//! the page expects.

use anyhow::{Result, bail};
use itertools::Itertools;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Content(Value);

impl Content {
    pub fn new(value: Value) -> Content {
        Content(value)
    }

    pub fn from_json_str(s: &str) -> serde_json::Result<Content> {
        Ok(Content(serde_json::from_str(s)?))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Resolve a dotted path like `contact.phone`. Gives `None` as
    /// soon as a segment is missing or the value reached so far is
    /// falsy or not a mapping; no array indexing, no escaping of
    /// dots. A `null` stored at the last segment is returned as such.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut acc = &self.0;
        for key in path.split('.') {
            if !is_truthy(acc) {
                return None
            }
            acc = acc.as_object()?.get(key)?;
        }
        Some(acc)
    }

    /// The array at `path`; an absent or falsy value counts as empty,
    /// anything else that's not an array is an error.
    pub fn array_at(&self, path: &str) -> Result<&[Value]> {
        match self.get(path) {
            None => Ok(&[][..]),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(v) if !is_truthy(v) => Ok(&[][..]),
            Some(v) => bail!("{path:?} is not an array: {}", type_name(v)),
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `false`, `null`, `0` and `""` are falsy, everything else
/// (including empty arrays and objects) is truthy.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The string a script would get from `String(v)`.
pub fn js_string(v: &Value) -> String {
    match v {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => number_string(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) =>
            items.iter().map(|item| match item {
                Value::Null => String::new(),
                _ => js_string(item),
            }).join(","),
        Value::Object(_) => "[object Object]".into(),
    }
}

// Plain decimal from 1e-6 up to 1e21, exponent form outside.
fn number_string(f: f64) -> String {
    if f == 0.0 {
        return "0".into()
    }
    let abs = f.abs();
    if (1e-6..1e21).contains(&abs) {
        if f.fract() == 0.0 {
            format!("{f:.0}")
        } else {
            f.to_string()
        }
    } else {
        let s = format!("{f:e}");
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => s,
        }
    }
}

/// `v || ""`, as a string.
pub fn text_or_empty(v: Option<&Value>) -> String {
    match v {
        Some(v) if is_truthy(v) => js_string(v),
        _ => String::new()
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de>
{
    let v = Value::deserialize(deserializer)?;
    Ok(text_or_empty(Some(&v)))
}


// ------------------------------------------------------------------
// List entries

/// Read a list entry: mappings give their fields, `null` can't be
/// read from at all, any other value has no fields.
fn read_entry<'v, T>(entry: &'v Value, what: &str, index: usize) -> Result<T>
where T: Deserialize<'v> + Default
{
    match entry {
        Value::Object(_) => Ok(T::deserialize(entry)?),
        Value::Null => bail!("cannot read fields of null {what} entry at index {index}"),
        _ => Ok(T::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MenuItem {
    #[serde(deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub desc: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub price: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub tag: String,
}

impl MenuItem {
    pub fn from_entry(entry: &Value, index: usize) -> Result<MenuItem> {
        read_entry(entry, "menu", index)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HoursEntry {
    #[serde(deserialize_with = "deserialize_text")]
    pub day: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub time: String,
}

impl HoursEntry {
    pub fn from_entry(entry: &Value, index: usize) -> Result<HoursEntry> {
        read_entry(entry, "hours", index)
    }
}
