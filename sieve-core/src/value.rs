//! Value trees
//!
//! Parameters arrive as a tree of [`Value`]s. Only two shapes can be
//! descended into by key: plain mappings and parsed markup elements. Both
//! are exposed through [`ArrayLike`], everything else is a leaf.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write as _;

/// Insertion-ordered mapping from field name to value.
pub type Map = IndexMap<String, Value>;

/// A parameter value.
///
/// `Null` is a real value (for example a JSON `null`). A value that is not
/// there at all is represented as `None` wherever a path is resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
    Element(Element),
}

impl Value {
    /// Returns the descent capability for mappings and markup elements.
    pub fn as_array_like(&self) -> Option<ArrayLike<'_>> {
        match self {
            Value::Map(map) => Some(ArrayLike::Map(map)),
            Value::Element(element) => Some(ArrayLike::Element(element)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short human-readable rendering used inside rule messages.
    ///
    /// Strings are quoted, numbers and booleans are bare, containers are
    /// summarised rather than dumped.
    pub fn render(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => format!("\"{}\"", s),
            Value::List(items) => {
                let mut out = String::from("`{ ");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&item.render());
                }
                out.push_str(" }`");
                out
            }
            Value::Map(map) => {
                let mut out = String::from("`{ ");
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "\"{}\": {}", key, value.render());
                }
                out.push_str(" }`");
                out
            }
            Value::Element(element) => format!("`[element] ({})`", element.name),
        }
    }
}

/// Parsed markup element.
///
/// Children are stored the way a markup document reads when treated as a
/// mapping: a tag that appears once and holds only text becomes a string, a
/// tag with nested elements becomes an element, and a repeated tag becomes
/// a list of those values in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub text: String,
    pub children: Map,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append a child element, folding it into the mapping view.
    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    /// Append a child element.
    ///
    /// Text-only children collapse to their text; a second child with the
    /// same tag turns the entry into a list.
    pub fn push_child(&mut self, child: Element) {
        let name = child.name.clone();
        let value = if child.children.is_empty() && child.attributes.is_empty() {
            Value::String(child.text)
        } else {
            Value::Element(child)
        };

        match self.children.get_mut(&name) {
            Some(Value::List(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, Value::Null);
                *existing = Value::List(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }

    /// Child value by tag name.
    pub fn child(&self, name: &str) -> Option<&Value> {
        self.children.get(name)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Something that can be descended into by field name.
#[derive(Debug, Clone, Copy)]
pub enum ArrayLike<'a> {
    Map(&'a Map),
    Element(&'a Element),
}

impl<'a> ArrayLike<'a> {
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        match *self {
            ArrayLike::Map(map) => map.get(key),
            ArrayLike::Element(element) => element.child(key),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::Map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Element> for Value {
    fn from(element: Element) -> Self {
        Value::Element(element)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Build a [`Map`] from `key => value` pairs.
///
/// ```
/// use sieve_core::params;
///
/// let map = params! {
///     "username" => "davidepastore",
///     "age" => 89,
/// };
/// assert_eq!(map.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => { $crate::Map::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Map::new();
        $( map.insert(::std::string::String::from($key), $crate::Value::from($value)); )+
        map
    }};
}
