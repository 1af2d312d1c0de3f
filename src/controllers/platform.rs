//! Platform handlers

use serde_json::json;

use super::{delete_target, views};
use crate::error::Result;
use crate::models::{Entity, GameSummary, Platform};
use crate::storage::Saved;
use crate::validation::{validate, FieldError, FormData, Validated};
use crate::views::{Outcome, Page};
use crate::Inventory;

const LIST_URL: &str = "/inventory/platforms";

fn form_page(title: &str, name: &str, company: &str, errors: &[FieldError]) -> Outcome {
    Page::new("platform_form.html", title)
        .with("platform", json!({ "name": name, "company": company }))
        .with("errors", errors)
        .into()
}

fn resubmit(title: &str, validated: &Validated) -> Outcome {
    form_page(title, validated.get("name"), validated.get("company"), &validated.errors)
}

fn delete_page(platform: &Platform, games: &[GameSummary], conflict: Option<String>) -> Outcome {
    Page::new("platform_delete.html", "Delete Platform")
        .with("platform", platform.to_view())
        .with("platform_games", games)
        .with("conflict", conflict)
        .into()
}

pub async fn list(inventory: &Inventory) -> Result<Outcome> {
    let platforms = inventory.platforms().find_all().await?;

    Ok(Page::new("platform_list.html", "Platform List")
        .with("platform_list", views(&platforms))
        .into())
}

pub async fn detail(inventory: &Inventory, id: &str) -> Result<Outcome> {
    let platforms = inventory.platforms();
    let games = inventory.games();
    let (platform, platform_games) = tokio::try_join!(
        platforms.get(id),
        games.find_projected::<GameSummary>("platform", id)
    )?;

    Ok(Page::new("platform_detail.html", "Platform Detail")
        .with("platform", platform.to_view())
        .with("platform_games", platform_games)
        .into())
}

pub async fn create_get(_inventory: &Inventory) -> Result<Outcome> {
    Ok(form_page("Create Platform", "", "", &[]))
}

pub async fn create_post(inventory: &Inventory, form: FormData) -> Result<Outcome> {
    let validated = validate(&form, Platform::RULES);
    if !validated.is_valid() {
        return Ok(resubmit("Create Platform", &validated));
    }

    let platform = match inventory
        .platforms()
        .save_unique(Platform::from_form(&validated), "name")
        .await?
    {
        Saved::Written(platform) | Saved::Existing(platform) => platform,
    };
    Ok(Outcome::redirect(platform.url()))
}

pub async fn update_get(inventory: &Inventory, id: &str) -> Result<Outcome> {
    let platform = inventory.platforms().get(id).await?;
    let company = platform.company.as_deref().unwrap_or_default();
    Ok(form_page("Update Platform", &platform.name, company, &[]))
}

pub async fn update_post(inventory: &Inventory, id: &str, form: FormData) -> Result<Outcome> {
    let platforms = inventory.platforms();
    platforms.get(id).await?;

    let mut validated = validate(&form, Platform::RULES);
    if !validated.is_valid() {
        return Ok(resubmit("Update Platform", &validated));
    }

    match platforms
        .update_unique(id, Platform::from_form(&validated), "name")
        .await?
    {
        Saved::Written(platform) => Ok(Outcome::redirect(platform.url())),
        Saved::Existing(other) => {
            validated.reject("name", format!("A platform named {} already exists.", other.name));
            Ok(resubmit("Update Platform", &validated))
        }
    }
}

pub async fn delete_get(inventory: &Inventory, id: &str) -> Result<Outcome> {
    let platforms = inventory.platforms();
    let games = inventory.games();
    let (platform, platform_games) = tokio::try_join!(
        platforms.find_by_id(id),
        games.find_projected::<GameSummary>("platform", id)
    )?;

    match platform {
        Some(platform) => Ok(delete_page(&platform, &platform_games, None)),
        None => Ok(Outcome::redirect(LIST_URL)),
    }
}

pub async fn delete_post(inventory: &Inventory, id: &str, form: FormData) -> Result<Outcome> {
    let target = delete_target(&form, "platformid", id);
    let platforms = inventory.platforms();
    let games = inventory.games();
    let (platform, platform_games) = tokio::try_join!(
        platforms.find_by_id(&target),
        games.find_projected::<GameSummary>("platform", target.as_str())
    )?;

    let Some(platform) = platform else {
        return Ok(Outcome::redirect(LIST_URL));
    };

    if !platform_games.is_empty() {
        let conflict = format!(
            "{} is still used by {} game(s) and was not deleted.",
            platform.name,
            platform_games.len()
        );
        return Ok(delete_page(&platform, &platform_games, Some(conflict)));
    }

    platforms.delete_by_id(&target).await?;
    Ok(Outcome::redirect(LIST_URL))
}
