//! Request handlers, one module per entity
//!
//! Handlers take the [`Inventory`] plus whatever the request carried (path
//! id, form body) and return an [`Outcome`]. They never see HTTP types, so
//! the same functions back the axum routes and the tests.
//!
//! Missing targets are handled the same way for every entity:
//!
//! | Handler                  | Target missing            |
//! |--------------------------|---------------------------|
//! | detail, update GET/POST  | `Error::NotFound` (404)   |
//! | delete GET/POST          | redirect to the list page |

pub mod game;
pub mod genre;
pub mod platform;

use serde_json::Value;
use std::collections::BTreeSet;

use crate::error::Result;
use crate::models::Entity;
use crate::validation::{FormData, Validated};
use crate::views::{Outcome, Page};
use crate::Inventory;

/// Title of the home page
pub const SITE_TITLE: &str = "Big Ol' Video Game Store";

/// Home page: how many of each entity exist
pub async fn index(inventory: &Inventory) -> Result<Outcome> {
    let counts = inventory.counts().await?;

    Ok(Page::new("index.html", SITE_TITLE)
        .with("game_count", counts.games)
        .with("genre_count", counts.genres)
        .with("platform_count", counts.platforms)
        .into())
}

/// Template views for a list of entities
pub(crate) fn views<T: Entity>(items: &[T]) -> Vec<Value> {
    items.iter().map(T::to_view).collect()
}

/// Template views for checkbox choices, marking the selected ones
pub(crate) fn choice_views<T: Entity>(items: &[T], selected: &BTreeSet<String>) -> Vec<Value> {
    items
        .iter()
        .map(|item| {
            let mut view = item.to_view();
            if let Some(map) = view.as_object_mut() {
                map.insert("checked".into(), selected.contains(item.id()).into());
            }
            view
        })
        .collect()
}

/// Reject the field if any selected id is not among the known entities
pub(crate) fn check_references<T: Entity>(
    validated: &mut Validated,
    field: &str,
    selected: &BTreeSet<String>,
    known: &[T],
    message: &str,
) {
    let unknown = selected
        .iter()
        .any(|id| !known.iter().any(|entity| entity.id() == id));
    if unknown {
        validated.reject(field, message);
    }
}

/// The id a delete form targets: the hidden body field, else the path id
pub(crate) fn delete_target(form: &FormData, field: &str, path_id: &str) -> String {
    match form.one(field).trim() {
        "" => path_id.to_string(),
        id => id.to_string(),
    }
}
