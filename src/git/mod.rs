//! Git-backed write history
//!
//! When history is enabled the data root is a git repository and every
//! store write becomes one commit. Reads never touch git.
//!
//! ```text
//! * Delete platform 9b2f1c0a...
//! * Update game 0f8fad5b...
//! * Create genre 7c9e6679...
//! * Initialize gamestore
//! ```

use git2::{Repository as Git2Repo, Signature};
use std::path::Path;

use crate::error::Result;

const AUTHOR_NAME: &str = "gamestore";
const AUTHOR_EMAIL: &str = "gamestore@local";

/// Where history stands right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStatus {
    /// Hash of the HEAD commit
    pub head: String,
    /// Files under the root differ from HEAD, e.g. documents edited by hand
    pub uncommitted: bool,
}

/// Git repository wrapper recording inventory writes
pub struct History {
    inner: Git2Repo,
}

impl History {
    /// Open an existing repository or initialize a new one
    pub fn open_or_init(path: &Path) -> Result<Self> {
        let inner = match Git2Repo::open(path) {
            Ok(repo) => repo,
            Err(_) => {
                let repo = Git2Repo::init(path)?;
                Self::create_initial_commit(&repo)?;
                tracing::info!("Initialized history at {:?}", path);
                repo
            }
        };

        Ok(Self { inner })
    }

    fn create_initial_commit(repo: &Git2Repo) -> Result<()> {
        let sig = Signature::now(AUTHOR_NAME, AUTHOR_EMAIL)?;
        let tree_id = repo.index()?.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        repo.commit(Some("HEAD"), &sig, &sig, "Initialize gamestore", &tree, &[])?;

        Ok(())
    }

    /// Stage everything under the root and commit it
    pub fn commit(&self, message: &str) -> Result<git2::Oid> {
        let sig = self.signature()?;
        let mut index = self.inner.index()?;

        // Deleted documents must leave the index too
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.inner.find_tree(tree_id)?;
        let parent = self.inner.head()?.peel_to_commit()?;

        let oid = self
            .inner
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;

        tracing::debug!(%oid, "committed: {}", message);
        Ok(oid)
    }

    pub fn status(&self) -> Result<HistoryStatus> {
        Ok(HistoryStatus {
            head: self.head_hash()?,
            uncommitted: self.has_changes()?,
        })
    }

    /// The current HEAD commit hash
    pub fn head_hash(&self) -> Result<String> {
        let commit = self.inner.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    /// Commit summaries, newest first
    pub fn log(&self, limit: usize) -> Result<Vec<String>> {
        let mut walk = self.inner.revwalk()?;
        walk.push_head()?;

        let mut summaries = Vec::new();
        for oid in walk.take(limit) {
            let commit = self.inner.find_commit(oid?)?;
            summaries.push(commit.summary().unwrap_or_default().to_string());
        }
        Ok(summaries)
    }

    /// Check if there are uncommitted changes
    pub fn has_changes(&self) -> Result<bool> {
        let statuses = self.inner.statuses(None)?;
        Ok(!statuses.is_empty())
    }

    fn signature(&self) -> Result<Signature<'_>> {
        // Prefer the user's git identity
        self.inner
            .signature()
            .or_else(|_| Signature::now(AUTHOR_NAME, AUTHOR_EMAIL))
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_history() {
        let tmp = TempDir::new().unwrap();
        let history = History::open_or_init(tmp.path()).unwrap();

        assert!(!history.head_hash().unwrap().is_empty());
        assert_eq!(history.log(10).unwrap(), vec!["Initialize gamestore"]);
    }

    #[test]
    fn test_commit_and_delete() {
        let tmp = TempDir::new().unwrap();
        let history = History::open_or_init(tmp.path()).unwrap();

        let file = tmp.path().join("doc.md");
        std::fs::write(&file, "---\nname: PC\n---\n\n").unwrap();
        assert!(history.has_changes().unwrap());
        history.commit("Create platform doc").unwrap();
        assert!(!history.has_changes().unwrap());

        std::fs::remove_file(&file).unwrap();
        history.commit("Delete platform doc").unwrap();
        assert!(!history.has_changes().unwrap());

        let log = history.log(10).unwrap();
        assert_eq!(log[0], "Delete platform doc");
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_reopen_keeps_history() {
        let tmp = TempDir::new().unwrap();
        let first = History::open_or_init(tmp.path()).unwrap();
        let head = first.head_hash().unwrap();
        drop(first);

        let second = History::open_or_init(tmp.path()).unwrap();
        assert_eq!(second.head_hash().unwrap(), head);
    }
}
