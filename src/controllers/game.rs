//! Game handlers

use serde::Serialize;
use std::collections::BTreeSet;

use super::{check_references, choice_views, delete_target, views};
use crate::error::Result;
use crate::models::{Entity, Game, Genre, Platform};
use crate::validation::{validate, FieldError, FormData, Validated};
use crate::views::{Outcome, Page};
use crate::Inventory;

const LIST_URL: &str = "/inventory/games";

/// Form field values as shown back to the user
#[derive(Debug, Default, Serialize)]
struct FormValues {
    title: String,
    description: String,
    price: String,
    stock: String,
    developer: String,
    publisher: String,
}

impl FormValues {
    fn submitted(validated: &Validated) -> Self {
        Self {
            title: validated.get("title").to_string(),
            description: validated.get("description").to_string(),
            price: validated.get("price").to_string(),
            stock: validated.get("stock").to_string(),
            developer: validated.get("developer").to_string(),
            publisher: validated.get("publisher").to_string(),
        }
    }

    fn stored(game: &Game) -> Self {
        Self {
            title: game.title.clone(),
            description: game.description.clone(),
            price: game.price.to_string(),
            stock: game.stock.to_string(),
            developer: game.developer.clone().unwrap_or_default(),
            publisher: game.publisher.clone().unwrap_or_default(),
        }
    }
}

/// Everything the game form needs besides the values themselves
struct Choices {
    genres: Vec<Genre>,
    platforms: Vec<Platform>,
}

impl Choices {
    async fn load(inventory: &Inventory) -> Result<Self> {
        let genres = inventory.genres();
        let platforms = inventory.platforms();
        let (genres, platforms) = tokio::try_join!(genres.find_all(), platforms.find_all())?;
        Ok(Self { genres, platforms })
    }

    fn page(
        &self,
        title: &str,
        values: &FormValues,
        genre: &BTreeSet<String>,
        platform: &BTreeSet<String>,
        errors: &[FieldError],
    ) -> Outcome {
        Page::new("game_form.html", title)
            .with("game", values)
            .with("genres", choice_views(&self.genres, genre))
            .with("platforms", choice_views(&self.platforms, platform))
            .with("errors", errors)
            .into()
    }
}

/// Validate a submitted game form, including that its references exist
fn check(form: &FormData, choices: &Choices) -> (Validated, BTreeSet<String>, BTreeSet<String>) {
    let genre = form.many("genre");
    let platform = form.many("platform");

    let mut validated = validate(form, Game::RULES);
    check_references(&mut validated, "genre", &genre, &choices.genres, "Selected genre does not exist.");
    check_references(&mut validated, "platform", &platform, &choices.platforms, "Selected platform does not exist.");

    (validated, genre, platform)
}

pub async fn list(inventory: &Inventory) -> Result<Outcome> {
    let games = inventory.games().find_all().await?;

    Ok(Page::new("game_list.html", "Game List")
        .with("game_list", views(&games))
        .into())
}

pub async fn detail(inventory: &Inventory, id: &str) -> Result<Outcome> {
    let game = inventory.games().get(id).await?;
    let relations = game.expand(inventory.store()).await?;

    Ok(Page::new("game_detail.html", game.title.as_str())
        .with("game", game.to_view())
        .with("genres", views(&relations.genres))
        .with("platforms", views(&relations.platforms))
        .into())
}

pub async fn create_get(inventory: &Inventory) -> Result<Outcome> {
    let choices = Choices::load(inventory).await?;
    let none = BTreeSet::new();

    Ok(choices.page("Create Game", &FormValues::default(), &none, &none, &[]))
}

pub async fn create_post(inventory: &Inventory, form: FormData) -> Result<Outcome> {
    let choices = Choices::load(inventory).await?;
    let (validated, genre, platform) = check(&form, &choices);

    if !validated.is_valid() {
        let values = FormValues::submitted(&validated);
        return Ok(choices.page("Create Game", &values, &genre, &platform, &validated.errors));
    }

    let game = inventory
        .games()
        .save(Game::from_form(&validated, genre, platform))
        .await?;
    Ok(Outcome::redirect(game.url()))
}

pub async fn update_get(inventory: &Inventory, id: &str) -> Result<Outcome> {
    let games = inventory.games();
    let (game, choices) = tokio::try_join!(games.get(id), Choices::load(inventory))?;

    let genre: BTreeSet<String> = game.genre.iter().cloned().collect();
    let platform: BTreeSet<String> = game.platform.iter().cloned().collect();
    Ok(choices.page("Update Game", &FormValues::stored(&game), &genre, &platform, &[]))
}

pub async fn update_post(inventory: &Inventory, id: &str, form: FormData) -> Result<Outcome> {
    let games = inventory.games();
    let (_existing, choices) = tokio::try_join!(games.get(id), Choices::load(inventory))?;
    let (validated, genre, platform) = check(&form, &choices);

    if !validated.is_valid() {
        let values = FormValues::submitted(&validated);
        return Ok(choices.page("Update Game", &values, &genre, &platform, &validated.errors));
    }

    let game = games
        .update_by_id(id, Game::from_form(&validated, genre, platform))
        .await?;
    Ok(Outcome::redirect(game.url()))
}

fn delete_page(game: &Game, conflict: Option<String>) -> Outcome {
    Page::new("game_delete.html", "Delete Game")
        .with("game", game.to_view())
        .with("conflict", conflict)
        .into()
}

pub async fn delete_get(inventory: &Inventory, id: &str) -> Result<Outcome> {
    match inventory.games().find_by_id(id).await? {
        Some(game) => Ok(delete_page(&game, None)),
        None => Ok(Outcome::redirect(LIST_URL)),
    }
}

/// Games with stock on hand are not deleted
pub async fn delete_post(inventory: &Inventory, id: &str, form: FormData) -> Result<Outcome> {
    let target = delete_target(&form, "gameid", id);
    let games = inventory.games();

    let Some(game) = games.find_by_id(&target).await? else {
        return Ok(Outcome::redirect(LIST_URL));
    };

    if game.stock > 0 {
        let conflict = format!(
            "{} still has {} in stock and was not deleted.",
            game.title, game.stock
        );
        return Ok(delete_page(&game, Some(conflict)));
    }

    games.delete_by_id(&target).await?;
    Ok(Outcome::redirect(LIST_URL))
}
