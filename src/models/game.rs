use serde::Serialize;
use std::collections::BTreeSet;

use super::{malformed, required_str, Entity, Genre, Platform, Projection};
use crate::error::Result;
use crate::storage::document::Document;
use crate::storage::{Repository, Store};
use crate::validation::{Rule, Validated};

/// A game in the inventory
///
/// `genre` and `platform` hold identifiers of documents in the `genres` and
/// `platforms` collections. The description is the document body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub genre: Vec<String>,
    pub platform: Vec<String>,
}

impl Game {
    pub const RULES: &'static [Rule] = &[
        Rule::min_length("title", 1, "Title must not be empty."),
        Rule::min_length("description", 1, "Description must not be empty."),
        Rule::min_length("price", 1, "Price must not be empty."),
        Rule::number("price", "Price must be a non-negative number."),
        Rule::min_length("stock", 1, "Stock must not be empty."),
        Rule::whole_number("stock", "Stock must be a whole number."),
        Rule::escape("developer"),
        Rule::escape("publisher"),
    ];

    /// Build from validated form values and normalized reference sets
    pub fn from_form(form: &Validated, genre: BTreeSet<String>, platform: BTreeSet<String>) -> Self {
        Self {
            id: String::new(),
            title: form.get("title").to_string(),
            description: form.get("description").to_string(),
            price: form.get("price").parse().unwrap_or_default(),
            stock: form.get("stock").parse().unwrap_or_default(),
            developer: form.get_opt("developer"),
            publisher: form.get_opt("publisher"),
            genre: genre.into_iter().collect(),
            platform: platform.into_iter().collect(),
        }
    }

    /// Resolve the genre and platform references into records
    pub async fn expand(&self, store: &Store) -> Result<GameRelations> {
        let genres = Repository::<Genre>::new(store);
        let platforms = Repository::<Platform>::new(store);
        let (genres, platforms) =
            tokio::try_join!(genres.find_many(&self.genre), platforms.find_many(&self.platform))?;
        Ok(GameRelations { genres, platforms })
    }
}

impl Entity for Game {
    const KIND: &'static str = "Game";
    const COLLECTION: &'static str = "games";
    const SLUG: &'static str = "game";
    const SORT_FIELD: &'static str = "title";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn sort_key(&self) -> &str {
        &self.title
    }

    fn to_document(&self) -> Document {
        let mut doc = Document::new(&self.id).with_body(&self.description);
        doc.set("title", self.title.as_str())
            .set("price", self.price)
            .set("stock", i64::from(self.stock))
            .set_opt("developer", self.developer.clone())
            .set_opt("publisher", self.publisher.clone())
            .set("genre", self.genre.clone())
            .set("platform", self.platform.clone());
        doc
    }

    fn from_document(doc: Document) -> Result<Self> {
        let title = required_str(&doc, Self::COLLECTION, "title")?;
        let price = doc
            .get("price")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| malformed(&doc, Self::COLLECTION, "missing numeric field 'price'".into()))?;
        let stock = doc
            .get("stock")
            .and_then(|v| v.as_i64())
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| malformed(&doc, Self::COLLECTION, "missing whole-number field 'stock'".into()))?;

        Ok(Self {
            title,
            price,
            stock,
            developer: doc.get_str("developer").map(str::to_string),
            publisher: doc.get_str("publisher").map(str::to_string),
            genre: doc.get_strings("genre"),
            platform: doc.get_strings("platform"),
            description: doc.body,
            id: doc.id,
        })
    }
}

/// A game's references, resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRelations {
    pub genres: Vec<Genre>,
    pub platforms: Vec<Platform>,
}

/// Minimal read of a game, for pages listing a genre's or platform's games
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub id: String,
    pub title: String,
    pub url: String,
}

impl Projection for GameSummary {
    const FIELDS: &'static [&'static str] = &["title"];

    fn from_document(doc: Document) -> Result<Self> {
        let title = required_str(&doc, Game::COLLECTION, "title")?;
        Ok(Self {
            url: format!("/inventory/{}/{}", Game::SLUG, doc.id),
            id: doc.id,
            title,
        })
    }

    fn sort_key(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate, FormData};

    fn sample() -> Game {
        Game {
            id: "g1".into(),
            title: "Madden NFL 23".into(),
            description: "Play football!".into(),
            price: 14.99,
            stock: 7,
            developer: Some("EA Tiburon".into()),
            publisher: None,
            genre: vec!["sports".into()],
            platform: vec!["ps5".into(), "xbox".into()],
        }
    }

    #[test]
    fn test_document_roundtrip() {
        let game = sample();
        let doc = game.to_document();

        assert_eq!(doc.body, "Play football!");
        assert!(doc.get("publisher").is_none());

        let rendered = doc.render().unwrap();
        let parsed = Game::from_document(Document::parse("g1", &rendered).unwrap()).unwrap();
        assert_eq!(parsed, game);
    }

    #[test]
    fn test_whole_price_reads_back() {
        let mut game = sample();
        game.price = 70.0;
        let rendered = game.to_document().render().unwrap();
        let parsed = Game::from_document(Document::parse("g1", &rendered).unwrap()).unwrap();
        assert_eq!(parsed.price, 70.0);
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let mut doc = sample().to_document();
        doc.fields.remove("title");
        assert!(Game::from_document(doc).is_err());
    }

    #[test]
    fn test_from_form() {
        let form = FormData::new()
            .with("title", " Fifa 23 ")
            .with("description", "Play football!")
            .with("price", "29.99")
            .with("stock", "4")
            .with("developer", "EA Vancouver, EA Romania");
        let validated = validate(&form, Game::RULES);
        assert!(validated.is_valid());

        let game = Game::from_form(&validated, BTreeSet::from(["sports".to_string()]), BTreeSet::new());
        assert_eq!(game.title, "Fifa 23");
        assert_eq!(game.price, 29.99);
        assert_eq!(game.stock, 4);
        assert_eq!(game.publisher, None);
        assert_eq!(game.genre, vec!["sports"]);
    }

    #[test]
    fn test_view_has_url() {
        let view = sample().to_view();
        assert_eq!(view["url"], "/inventory/game/g1");
        assert_eq!(view["title"], "Madden NFL 23");
    }
}
