//! Collection - a group of documents stored in a directory
//!
//! Collections are the store's equivalent of tables. Each collection is a
//! directory containing one markdown file per document.
//!
//! Directory structure:
//! ```text
//! /collections/
//!   /games/
//!     0f8fad5bd9cb469fa16570867728950e.md
//!   /genres/
//!     7c9e6679742540de944be07fc1f90ae7.md
//!   /platforms/
//!     9b2f1c0a5e7d4c3b8a6f5e4d3c2b1a09.md
//! ```

use super::document::{Document, Value};
use crate::error::{Error, Result};
use crate::validation::validate_document_id;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// A collection of documents
#[derive(Debug, Clone)]
pub struct Collection {
    /// Name of the collection (directory name)
    pub name: String,
    /// Path to the collection directory
    pub path: PathBuf,
}

impl Collection {
    /// Open a collection under the given store root
    pub fn open(name: impl Into<String>, root: &Path) -> Self {
        let name = name.into();
        let path = root.join("collections").join(&name);
        Self { name, path }
    }

    /// Create the collection directory if it doesn't exist
    pub async fn ensure_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.path)
            .await
            .map_err(|source| Error::FileWriteError {
                path: self.path.clone(),
                source,
            })
    }

    /// List all documents in the collection
    ///
    /// Files that fail to parse are logged and skipped so one bad document
    /// does not take down every listing.
    pub async fn list(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::new();

        if !self.path.exists() {
            return Ok(documents);
        }

        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.extension().map(|e| e == "md").unwrap_or(false) {
                match self.read_document(path).await {
                    Ok(doc) => documents.push(doc),
                    Err(e) => tracing::warn!(collection = %self.name, path = ?path, "skipping document: {}", e),
                }
            }
        }

        Ok(documents)
    }

    /// Read a single document by ID
    ///
    /// An ID that could never name a document reads as absent.
    pub async fn get(&self, id: &str) -> Result<Option<Document>> {
        if validate_document_id(id).is_err() {
            return Ok(None);
        }
        let path = self.document_path(id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_document(&path).await.map(Some)
    }

    /// Documents whose `field` equals `value`, or contains it when the field is a list
    pub async fn find_by_field(&self, field: &str, value: &Value) -> Result<Vec<Document>> {
        let mut docs = self.list().await?;
        docs.retain(|doc| doc.get(field).map(|v| v.matches(value)).unwrap_or(false));
        Ok(docs)
    }

    /// Insert a new document
    pub async fn insert(&self, doc: &Document) -> Result<()> {
        validate_document_id(&doc.id)?;
        self.ensure_exists().await?;
        let path = self.document_path(&doc.id);

        if path.exists() {
            return Err(Error::DocumentAlreadyExists {
                collection: self.name.clone(),
                id: doc.id.clone(),
            });
        }

        self.write_document(&path, doc).await
    }

    /// Replace an existing document
    pub async fn update(&self, doc: &Document) -> Result<()> {
        validate_document_id(&doc.id)?;
        let path = self.document_path(&doc.id);

        if !path.exists() {
            return Err(Error::NotFound {
                kind: "Document",
                id: doc.id.clone(),
            });
        }

        self.write_document(&path, doc).await
    }

    /// Delete a document by ID
    pub async fn delete(&self, id: &str) -> Result<bool> {
        if validate_document_id(id).is_err() {
            return Ok(false);
        }
        let path = self.document_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .await
                .map_err(|source| Error::FileWriteError {
                    path: path.clone(),
                    source,
                })?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count documents in the collection
    pub async fn count(&self) -> Result<usize> {
        let docs = self.list().await?;
        Ok(docs.len())
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.path.join(format!("{}.md", id))
    }

    async fn write_document(&self, path: &Path, doc: &Document) -> Result<()> {
        let content = doc.render()?;
        fs::write(path, content)
            .await
            .map_err(|source| Error::FileWriteError {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn read_document(&self, path: &Path) -> Result<Document> {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Other(format!("invalid document path {:?}", path)))?;

        let content = fs::read_to_string(path)
            .await
            .map_err(|source| Error::FileReadError {
                path: path.to_path_buf(),
                source,
            })?;

        Document::parse(id, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_collection_crud() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::open("platforms", tmp.path());

        // Create
        let mut doc = Document::new("switch");
        doc.set("name", "Switch");
        doc.set("company", "Nintendo");
        collection.insert(&doc).await.unwrap();

        // Read
        let fetched = collection.get("switch").await.unwrap().unwrap();
        assert_eq!(fetched.get_str("name"), Some("Switch"));

        // Update
        let mut updated = fetched;
        updated.set("name", "Switch 2");
        collection.update(&updated).await.unwrap();

        let refetched = collection.get("switch").await.unwrap().unwrap();
        assert_eq!(refetched.get_str("name"), Some("Switch 2"));

        // List
        assert_eq!(collection.count().await.unwrap(), 1);

        // Delete
        assert!(collection.delete("switch").await.unwrap());
        assert!(collection.get("switch").await.unwrap().is_none());
        assert!(!collection.delete("switch").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_duplicate_id_fails() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::open("genres", tmp.path());

        collection.insert(&Document::new("rpg")).await.unwrap();
        let err = collection.insert(&Document::new("rpg")).await.unwrap_err();
        assert!(matches!(err, Error::DocumentAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_fails() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::open("genres", tmp.path());

        let err = collection.update(&Document::new("ghost")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_traversal_ids_are_absent() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::open("games", tmp.path());

        assert!(collection.get("../../secret").await.unwrap().is_none());
        assert!(!collection.delete("..").await.unwrap());
        assert!(collection.insert(&Document::new("../escape")).await.is_err());
    }

    #[tokio::test]
    async fn test_find_by_field_matches_list_members() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::open("games", tmp.path());

        let mut a = Document::new("a");
        a.set("genre", vec!["rpg".to_string(), "action".to_string()]);
        let mut b = Document::new("b");
        b.set("genre", vec!["sports".to_string()]);
        let c = Document::new("c");
        for doc in [&a, &b, &c] {
            collection.insert(doc).await.unwrap();
        }

        let hits = collection.find_by_field("genre", &Value::from("rpg")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }

    #[tokio::test]
    async fn test_list_skips_malformed_files() {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::open("genres", tmp.path());
        let mut ok = Document::new("ok");
        ok.set("name", "Action");
        collection.insert(&ok).await.unwrap();
        std::fs::write(collection.path.join("broken.md"), "---\nname: [unclosed\n---\n").unwrap();
        std::fs::write(collection.path.join("flagged.md"), "---\nname: Retro\nhidden: true\n---\n").unwrap();

        let docs = collection.list().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "ok");
    }
}
