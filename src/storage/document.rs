//! Document representation
//!
//! A Document is a single markdown file with YAML frontmatter.
//! The frontmatter contains structured data (fields), and the body
//! contains the long-form markdown description.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::Result;

/// A document in the store
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique identifier (the filename, without .md extension)
    pub id: String,

    /// YAML frontmatter fields
    pub fields: Fields,

    /// Markdown body content
    pub body: String,
}

/// Field values that can be stored in frontmatter: scalars and lists of them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; YAML writes `70.0` back as `70`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Equality match, where an array matches if any element does
    pub fn matches(&self, needle: &Value) -> bool {
        match self {
            Value::Array(items) => items.iter().any(|item| item == needle),
            other => other == needle,
        }
    }

    /// Ordering used for sorted listings. Mixed types compare equal.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
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

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::Array(items.into_iter().map(Value::String).collect())
    }
}

/// A map of field names to values, kept sorted so files diff cleanly
pub type Fields = BTreeMap<String, Value>;

impl Document {
    /// Create a new document with the given ID
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
            body: String::new(),
        }
    }

    /// Set a field value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Set a field only when a value is present
    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<impl Into<Value>>) -> &mut Self {
        if let Some(value) = value {
            self.fields.insert(key.into(), value.into());
        }
        self
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a string field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get a list of strings; a missing field reads as empty
    pub fn get_strings(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set the body content
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Keep only the named fields (and the id); the body is dropped
    pub fn project(&self, keep: &[&str]) -> Document {
        let fields = self
            .fields
            .iter()
            .filter(|(k, _)| keep.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Document {
            id: self.id.clone(),
            fields,
            body: String::new(),
        }
    }

    /// Parse a document from markdown content
    pub fn parse(id: impl Into<String>, content: &str) -> Result<Self> {
        let (fields, body) = super::frontmatter::parse(content)?;

        Ok(Self {
            id: id.into(),
            fields,
            body,
        })
    }

    /// Render document back to markdown
    pub fn render(&self) -> Result<String> {
        super::frontmatter::render(&self.fields, &self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let mut doc = Document::new("elden-ring");
        doc.set("title", "Elden Ring")
            .set("stock", 3i64)
            .set_opt("developer", None::<String>)
            .set("genre", vec!["rpg".to_string(), "action".to_string()]);

        assert_eq!(doc.id, "elden-ring");
        assert_eq!(doc.get_str("title"), Some("Elden Ring"));
        assert!(doc.get("developer").is_none());
        assert_eq!(doc.get_strings("genre"), vec!["rpg", "action"]);
        assert!(doc.get_strings("platform").is_empty());
    }

    #[test]
    fn test_array_matches_member() {
        let refs = Value::from(vec!["a".to_string(), "b".to_string()]);
        assert!(refs.matches(&Value::from("b")));
        assert!(!refs.matches(&Value::from("c")));
        assert!(Value::from("RPG").matches(&Value::from("RPG")));
    }

    #[test]
    fn test_compare_mixed_numbers() {
        assert_eq!(Value::Int(70).compare(&Value::Float(69.99)), Ordering::Greater);
        assert_eq!(Value::from("Action").compare(&Value::from("Sports")), Ordering::Less);
        assert_eq!(Value::from("x").compare(&Value::Int(1)), Ordering::Equal);
    }

    #[test]
    fn test_project_keeps_requested_fields() {
        let mut doc = Document::new("g1").with_body("long text");
        doc.set("title", "Fifa 23").set("price", 29.99).set("stock", 2i64);

        let slim = doc.project(&["title"]);
        assert_eq!(slim.id, "g1");
        assert_eq!(slim.fields.len(), 1);
        assert!(slim.body.is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let mut doc = Document::new("test");
        doc.set("name", "Role-Playing Game");
        doc.body = "Control a character or party of characters.".into();

        let rendered = doc.render().unwrap();
        let parsed = Document::parse("test", &rendered).unwrap();

        assert_eq!(parsed, doc);
    }
}
