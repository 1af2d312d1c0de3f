//! Genre handlers

use serde_json::json;

use super::{delete_target, views};
use crate::error::Result;
use crate::models::{Entity, GameSummary, Genre};
use crate::storage::Saved;
use crate::validation::{validate, FieldError, FormData, Validated};
use crate::views::{Outcome, Page};
use crate::Inventory;

const LIST_URL: &str = "/inventory/genres";

fn form_page(title: &str, name: &str, description: &str, errors: &[FieldError]) -> Outcome {
    Page::new("genre_form.html", title)
        .with("genre", json!({ "name": name, "description": description }))
        .with("errors", errors)
        .into()
}

fn resubmit(title: &str, validated: &Validated) -> Outcome {
    form_page(
        title,
        validated.get("name"),
        validated.get("description"),
        &validated.errors,
    )
}

fn delete_page(genre: &Genre, games: &[GameSummary], conflict: Option<String>) -> Outcome {
    Page::new("genre_delete.html", "Delete Genre")
        .with("genre", genre.to_view())
        .with("genre_games", games)
        .with("conflict", conflict)
        .into()
}

pub async fn list(inventory: &Inventory) -> Result<Outcome> {
    let genres = inventory.genres().find_all().await?;

    Ok(Page::new("genre_list.html", "Genre List")
        .with("genre_list", views(&genres))
        .into())
}

/// A genre and the games filed under it
pub async fn detail(inventory: &Inventory, id: &str) -> Result<Outcome> {
    let genres = inventory.genres();
    let games = inventory.games();
    let (genre, genre_games) =
        tokio::try_join!(genres.get(id), games.find_projected::<GameSummary>("genre", id))?;

    Ok(Page::new("genre_detail.html", "Genre Detail")
        .with("genre", genre.to_view())
        .with("genre_games", genre_games)
        .into())
}

pub async fn create_get(_inventory: &Inventory) -> Result<Outcome> {
    Ok(form_page("Create Genre", "", "", &[]))
}

/// Creating a name that already exists lands on the existing genre
pub async fn create_post(inventory: &Inventory, form: FormData) -> Result<Outcome> {
    let validated = validate(&form, Genre::RULES);
    if !validated.is_valid() {
        return Ok(resubmit("Create Genre", &validated));
    }

    let genre = match inventory
        .genres()
        .save_unique(Genre::from_form(&validated), "name")
        .await?
    {
        Saved::Written(genre) | Saved::Existing(genre) => genre,
    };
    Ok(Outcome::redirect(genre.url()))
}

pub async fn update_get(inventory: &Inventory, id: &str) -> Result<Outcome> {
    let genre = inventory.genres().get(id).await?;
    Ok(form_page("Update Genre", &genre.name, &genre.description, &[]))
}

pub async fn update_post(inventory: &Inventory, id: &str, form: FormData) -> Result<Outcome> {
    let genres = inventory.genres();
    genres.get(id).await?;

    let mut validated = validate(&form, Genre::RULES);
    if !validated.is_valid() {
        return Ok(resubmit("Update Genre", &validated));
    }

    match genres
        .update_unique(id, Genre::from_form(&validated), "name")
        .await?
    {
        Saved::Written(genre) => Ok(Outcome::redirect(genre.url())),
        Saved::Existing(other) => {
            validated.reject("name", format!("A genre named {} already exists.", other.name));
            Ok(resubmit("Update Genre", &validated))
        }
    }
}

pub async fn delete_get(inventory: &Inventory, id: &str) -> Result<Outcome> {
    let genres = inventory.genres();
    let games = inventory.games();
    let (genre, genre_games) = tokio::try_join!(
        genres.find_by_id(id),
        games.find_projected::<GameSummary>("genre", id)
    )?;

    match genre {
        Some(genre) => Ok(delete_page(&genre, &genre_games, None)),
        None => Ok(Outcome::redirect(LIST_URL)),
    }
}

/// Refuses while any game still references the genre
pub async fn delete_post(inventory: &Inventory, id: &str, form: FormData) -> Result<Outcome> {
    let target = delete_target(&form, "genreid", id);
    let genres = inventory.genres();
    let games = inventory.games();
    let (genre, genre_games) = tokio::try_join!(
        genres.find_by_id(&target),
        games.find_projected::<GameSummary>("genre", target.as_str())
    )?;

    let Some(genre) = genre else {
        return Ok(Outcome::redirect(LIST_URL));
    };

    if !genre_games.is_empty() {
        let conflict = format!(
            "{} is still used by {} game(s) and was not deleted.",
            genre.name,
            genre_games.len()
        );
        return Ok(delete_page(&genre, &genre_games, Some(conflict)));
    }

    genres.delete_by_id(&target).await?;
    Ok(Outcome::redirect(LIST_URL))
}
