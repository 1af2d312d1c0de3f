//! gamestore - a video game inventory served as HTML
//!
//! Games, genres and platforms are markdown documents on disk. A small axum
//! application lists, shows, creates, updates and deletes them through
//! server-rendered forms.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            gamestore                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  Router (axum): /inventory/{game,genre,platform}/...        ││
//! │  └──────────────────────────┬──────────────────────────────────┘│
//! │                             ▼                                   │
//! │  ┌──────────────┐  ┌─────────────────────┐  ┌─────────────────┐ │
//! │  │  Validation  │◀─│     Controllers     │─▶│  Views (Tera)   │ │
//! │  │  (FormData,  │  │  list / detail /    │  │  Page → HTML    │ │
//! │  │   Rules)     │  │  create / update /  │  └─────────────────┘ │
//! │  └──────────────┘  │  delete             │                      │
//! │                    └──────────┬──────────┘                      │
//! │                               ▼                                 │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  Repositories: find / save / update / delete / expand       ││
//! │  └──────────────────────────┬──────────────────────────────────┘│
//! │                             ▼                                   │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  Store: collections of markdown documents + write lock      ││
//! │  └──────────────────────────┬──────────────────────────────────┘│
//! │                             ▼                                   │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  File system: /collections/{games,genres,platforms}/*.md    ││
//! │  │  Git history: one commit per write (optional)               ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod controllers;
pub mod error;
pub mod git;
pub mod models;
pub mod routes;
pub mod seed;
pub mod storage;
pub mod validation;
pub mod views;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{Entity, Game, Genre, Platform};
pub use storage::document::Document;
pub use storage::{Repository, Store};
pub use views::{Outcome, Page};

use std::path::Path;

/// The main inventory handle
pub struct Inventory {
    store: Store,
}

impl Inventory {
    /// Open (or create) the inventory described by `config`
    pub async fn open(config: &Config) -> Result<Self> {
        let store = Store::open(&config.root, config.history).await?;
        Ok(Self { store })
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn games(&self) -> Repository<'_, Game> {
        Repository::new(&self.store)
    }

    pub fn genres(&self) -> Repository<'_, Genre> {
        Repository::new(&self.store)
    }

    pub fn platforms(&self) -> Repository<'_, Platform> {
        Repository::new(&self.store)
    }

    /// Document counts per collection
    pub async fn counts(&self) -> Result<Counts> {
        let games = self.games();
        let genres = self.genres();
        let platforms = self.platforms();
        let (games, genres, platforms) =
            tokio::try_join!(games.count(), genres.count(), platforms.count())?;
        Ok(Counts {
            games,
            genres,
            platforms,
        })
    }
}

/// Number of documents in each collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub games: usize,
    pub genres: usize,
    pub platforms: usize,
}
