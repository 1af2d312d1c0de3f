use serde::Serialize;

use super::{required_str, Entity};
use crate::error::Result;
use crate::storage::document::Document;
use crate::validation::{Rule, Validated};

/// A game genre. The name is the natural key; the description is the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Genre {
    pub const RULES: &'static [Rule] = &[
        Rule::min_length("name", 3, "Genre name must contain at least 3 characters"),
        Rule::min_length("description", 1, "Description must not be empty."),
    ];

    pub fn from_form(form: &Validated) -> Self {
        Self {
            id: String::new(),
            name: form.get("name").to_string(),
            description: form.get("description").to_string(),
        }
    }
}

impl Entity for Genre {
    const KIND: &'static str = "Genre";
    const COLLECTION: &'static str = "genres";
    const SLUG: &'static str = "genre";
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
        let mut doc = Document::new(&self.id).with_body(&self.description);
        doc.set("name", self.name.as_str());
        doc
    }

    fn from_document(doc: Document) -> Result<Self> {
        Ok(Self {
            name: required_str(&doc, Self::COLLECTION, "name")?,
            description: doc.body,
            id: doc.id,
        })
    }
}
