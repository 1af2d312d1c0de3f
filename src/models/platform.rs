use serde::Serialize;

use super::{required_str, Entity};
use crate::error::Result;
use crate::storage::document::Document;
use crate::validation::{Rule, Validated};

/// A platform games run on. The name is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Platform {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
}

impl Platform {
    pub const RULES: &'static [Rule] = &[
        Rule::min_length("name", 3, "Platform name must contain at least 3 characters"),
        Rule::escape("company"),
    ];

    pub fn from_form(form: &Validated) -> Self {
        Self {
            id: String::new(),
            name: form.get("name").to_string(),
            company: form.get_opt("company"),
        }
    }
}

impl Entity for Platform {
    const KIND: &'static str = "Platform";
    const COLLECTION: &'static str = "platforms";
    const SLUG: &'static str = "platform";
    const SORT_FIELD: &'static str = "name";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn sort_key(&self) -> &str {
        &self.name
    }

    fn to_document(&self) -> Document {
        let mut doc = Document::new(&self.id);
        doc.set("name", self.name.as_str())
            .set_opt("company", self.company.clone());
        doc
    }

    fn from_document(doc: Document) -> Result<Self> {
        Ok(Self {
            name: required_str(&doc, Self::COLLECTION, "name")?,
            company: doc.get_str("company").map(str::to_string),
            id: doc.id,
        })
    }
}
