//! Inventory entities and their document mapping
//!
//! Each entity knows which collection it lives in, how it maps to a
//! [`Document`], and which form rules build it.

mod game;
mod genre;
mod platform;

pub use game::{Game, GameRelations, GameSummary};
pub use genre::Genre;
pub use platform::Platform;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::storage::document::Document;

/// A record stored in its own collection
pub trait Entity: Serialize + Sized + Send + Sync {
    /// Human-readable kind, used in not-found messages
    const KIND: &'static str;
    /// Collection directory name
    const COLLECTION: &'static str;
    /// URL segment: `/inventory/{SLUG}/{id}`
    const SLUG: &'static str;
    /// Field listings are sorted by
    const SORT_FIELD: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    /// Value of the sort field, for in-memory sorting
    fn sort_key(&self) -> &str;

    fn to_document(&self) -> Document;
    fn from_document(doc: Document) -> Result<Self>;

    fn url(&self) -> String {
        format!("/inventory/{}/{}", Self::SLUG, self.id())
    }

    /// Serialized form handed to templates, with `url` added
    fn to_view(&self) -> serde_json::Value {
        let mut view = serde_json::to_value(self).unwrap_or_default();
        if let Some(map) = view.as_object_mut() {
            map.insert("url".into(), self.url().into());
        }
        view
    }
}

/// A reduced read of some entity's document
pub trait Projection: Serialize + Sized {
    /// Fields kept by the projection
    const FIELDS: &'static [&'static str];

    fn from_document(doc: Document) -> Result<Self>;
    fn sort_key(&self) -> &str;
}

/// Read a required string field
pub(crate) fn required_str(doc: &Document, collection: &str, field: &str) -> Result<String> {
    doc.get_str(field)
        .map(str::to_string)
        .ok_or_else(|| malformed(doc, collection, format!("missing string field '{}'", field)))
}

pub(crate) fn malformed(doc: &Document, collection: &str, message: String) -> Error {
    Error::MalformedDocument {
        collection: collection.to_string(),
        id: doc.id.clone(),
        message,
    }
}
