//! Storage layer for gamestore
//!
//! Handles reading/writing markdown documents with YAML frontmatter, and the
//! typed repositories built on top of them.

pub mod collection;
pub mod document;
pub mod frontmatter;
pub mod repository;
pub mod store;

pub use repository::{Repository, Saved};
pub use store::Store;
