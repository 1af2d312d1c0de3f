//! The document store: collections on disk plus a single write lock
//!
//! All writes, and the history commits that follow them, are serialized
//! through [`Store::lock`]. Reads go straight to the collection files.

use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};

use super::collection::Collection;
use crate::error::Result;
use crate::git::{History, HistoryStatus};

/// Handle to the on-disk store
pub struct Store {
    root: PathBuf,
    writer: Mutex<Option<History>>,
}

impl Store {
    /// Open the store rooted at `root`, creating the directory if needed
    pub async fn open(root: impl Into<PathBuf>, history: bool) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join("collections")).await?;

        let history = if history {
            Some(History::open_or_init(&root)?)
        } else {
            None
        };

        Ok(Self {
            root,
            writer: Mutex::new(history),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection(&self, name: &str) -> Collection {
        Collection::open(name, &self.root)
    }

    /// Take the write lock. Hold it across check-then-write sequences.
    pub async fn lock(&self) -> WriteGuard<'_> {
        WriteGuard {
            history: self.writer.lock().await,
        }
    }

    /// Recent history entries, or `None` when history is disabled
    pub async fn history_log(&self, limit: usize) -> Result<Option<Vec<String>>> {
        let guard = self.writer.lock().await;
        guard.as_ref().map(|h| h.log(limit)).transpose()
    }

    /// Head and working-tree state, or `None` when history is disabled
    pub async fn history_status(&self) -> Result<Option<HistoryStatus>> {
        let guard = self.writer.lock().await;
        guard.as_ref().map(History::status).transpose()
    }
}

/// Exclusive write access to the store
pub struct WriteGuard<'a> {
    history: MutexGuard<'a, Option<History>>,
}

impl WriteGuard<'_> {
    /// Record a completed write in history, if enabled
    pub fn commit(&mut self, message: &str) -> Result<()> {
        if let Some(history) = self.history.as_ref() {
            history.commit(message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_history_status_tracks_hand_edits() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path(), true).await.unwrap();

        let clean = store.history_status().await.unwrap().unwrap();
        assert!(!clean.uncommitted);

        std::fs::write(tmp.path().join("collections/stray.md"), "---\nname: Stray\n---\n").unwrap();
        let dirty = store.history_status().await.unwrap().unwrap();
        assert!(dirty.uncommitted);
        assert_eq!(dirty.head, clean.head);

        store.lock().await.commit("Record stray document").unwrap();
        let committed = store.history_status().await.unwrap().unwrap();
        assert!(!committed.uncommitted);
        assert_ne!(committed.head, clean.head);
        assert_eq!(store.history_log(1).await.unwrap().unwrap(), ["Record stray document"]);
    }

    #[tokio::test]
    async fn test_history_disabled() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path(), false).await.unwrap();

        assert!(store.history_status().await.unwrap().is_none());
        assert!(store.history_log(5).await.unwrap().is_none());
        assert!(!tmp.path().join(".git").exists());
    }
}
