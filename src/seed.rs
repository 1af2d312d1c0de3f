//! Fixture inventory for a fresh store
//!
//! Seeding is idempotent: genres and platforms are matched by name and games
//! by title, so running it twice leaves one copy of each.
//!
//! Titles are a natural key only here. The game forms never deduplicate by
//! title, so two games may share one and the seed counts either as present.

use crate::error::Result;
use crate::models::{Entity, Game, Genre, Platform};
use crate::storage::Saved;
use crate::validation::escape;
use crate::Inventory;

/// (name, description)
const GENRES: &[(&str, &str)] = &[
    ("First-Person Shooter", "Shooty-bang games where you bang bang zing rat-a-tat pow!"),
    ("Role-Playing Game", "Control a character or party of characters as they do heroic stuff."),
    ("Action", "Pow! Bad guys doing bad guy things? Bam! Pop em right in the kisser! Kazooie!"),
    ("Sports", "Pretend to play real sports while the computer totally cheats."),
    ("Adventure", "Go exploring and find cool stuff."),
];

/// (name, company)
const PLATFORMS: &[(&str, &str)] = &[
    ("Switch", "Nintendo"),
    ("PlayStation 5", "Sony"),
    ("Xbox", "Microsoft"),
    ("PC", "Microsoft"),
];

struct GameFixture {
    title: &'static str,
    description: &'static str,
    price: f64,
    stock: u32,
    developer: &'static str,
    publisher: &'static str,
    /// Indexes into `GENRES`
    genres: &'static [usize],
    /// Indexes into `PLATFORMS`
    platforms: &'static [usize],
}

const GAMES: &[GameFixture] = &[
    GameFixture {
        title: "Call of Duty: Modern Warfare II",
        description: "Good guys gripping guns gallantly and griping grossly greet grave generals as they gallivant globally.",
        price: 69.99,
        stock: 4,
        developer: "Infinity Ward",
        publisher: "Activision",
        genres: &[0],
        platforms: &[1, 2, 3],
    },
    GameFixture {
        title: "Elden Ring",
        description: "Explore a massive, mysterious world in which everything wants to kill you.",
        price: 49.99,
        stock: 7,
        developer: "FromSoftware",
        publisher: "Bandai Namco Entertainment",
        genres: &[1, 2],
        platforms: &[1, 2, 3],
    },
    GameFixture {
        title: "Madden NFL 23",
        description: "Play football!",
        price: 14.99,
        stock: 0,
        developer: "EA Tiburon",
        publisher: "EA Sports",
        genres: &[3],
        platforms: &[1, 2, 3],
    },
    GameFixture {
        title: "God of War Ragnarok",
        description: "Go on a rip-roaring adventure as a father bonding with his son.",
        price: 69.99,
        stock: 9,
        developer: "Santa Monica Studio",
        publisher: "Sony Interactive Entertainment",
        genres: &[2, 4],
        platforms: &[1],
    },
    GameFixture {
        title: "Lego Star Wars: The Skywalker Saga",
        description: "Play through all 9 mainline Star Wars movies as a variety of tiny Lego dudes.",
        price: 29.99,
        stock: 3,
        developer: "Traveller's Tales",
        publisher: "Warner Bros. Games",
        genres: &[2, 4],
        platforms: &[0, 1, 2, 3],
    },
    GameFixture {
        title: "Pokemon Scarlet/Violet",
        description: "It's Pokemon, you know what to expect.",
        price: 59.99,
        stock: 8,
        developer: "Game Freak",
        publisher: "Nintendo",
        genres: &[1],
        platforms: &[0],
    },
    GameFixture {
        title: "Fifa 23",
        description: "Play football!",
        price: 29.99,
        stock: 1,
        developer: "EA Vancouver, EA Romania",
        publisher: "EA Sports",
        genres: &[3],
        platforms: &[0, 1, 2, 3],
    },
    GameFixture {
        title: "Pokemon Legends: Arceus",
        description: "Explore an open world while engaging in series-first action gameplay! Whoa.",
        price: 59.99,
        stock: 5,
        developer: "Game Freak",
        publisher: "Nintendo",
        genres: &[1, 2],
        platforms: &[0],
    },
    GameFixture {
        title: "Horizon Forbidden West",
        description: "Hunt dinosaur-looking robots with a bow.",
        price: 49.99,
        stock: 2,
        developer: "Guerilla Games",
        publisher: "Sony Interactive Entertainment",
        genres: &[1, 2],
        platforms: &[1],
    },
    GameFixture {
        title: "MLB The Show 22",
        description: "Play baseball!",
        price: 59.99,
        stock: 6,
        developer: "San Diego Studio",
        publisher: "Sony Interactive Entertainment",
        genres: &[3],
        platforms: &[0, 1, 2],
    },
];

/// How many fixtures were written versus already present
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub existing: usize,
}

impl SeedReport {
    fn record<T: Entity>(&mut self, saved: Saved<T>) -> T {
        match saved {
            Saved::Written(entity) => {
                tracing::info!("added {} {}", T::SLUG, entity.sort_key());
                self.created += 1;
                entity
            }
            Saved::Existing(entity) => {
                self.existing += 1;
                entity
            }
        }
    }
}

/// Write the fixture genres, platforms and games
///
/// Games are looked up by `title` only to skip fixtures already written.
pub async fn seed(inventory: &Inventory) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let mut genre_ids = Vec::with_capacity(GENRES.len());
    for (name, description) in GENRES {
        let genre = Genre {
            id: String::new(),
            name: escape(name),
            description: escape(description),
        };
        let saved = inventory.genres().save_unique(genre, "name").await?;
        genre_ids.push(report.record(saved).id);
    }

    let mut platform_ids = Vec::with_capacity(PLATFORMS.len());
    for (name, company) in PLATFORMS {
        let platform = Platform {
            id: String::new(),
            name: escape(name),
            company: Some(escape(company)),
        };
        let saved = inventory.platforms().save_unique(platform, "name").await?;
        platform_ids.push(report.record(saved).id);
    }

    for fixture in GAMES {
        let game = Game {
            id: String::new(),
            title: escape(fixture.title),
            description: escape(fixture.description),
            price: fixture.price,
            stock: fixture.stock,
            developer: Some(escape(fixture.developer)),
            publisher: Some(escape(fixture.publisher)),
            genre: fixture.genres.iter().map(|&i| genre_ids[i].clone()).collect(),
            platform: fixture.platforms.iter().map(|&i| platform_ids[i].clone()).collect(),
        };
        let saved = inventory.games().save_unique(game, "title").await?;
        report.record(saved);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use tempfile::TempDir;

    async fn inventory(dir: &TempDir) -> Inventory {
        let mut config = Config::new(dir.path());
        config.history = false;
        Inventory::open(&config).await.unwrap()
    }

    #[test]
    fn test_fixture_references_in_range() {
        for game in GAMES {
            assert!(game.genres.iter().all(|&i| i < GENRES.len()), "{}", game.title);
            assert!(game.platforms.iter().all(|&i| i < PLATFORMS.len()), "{}", game.title);
        }
    }

    #[tokio::test]
    async fn test_seed_populates_inventory() {
        let dir = TempDir::new().unwrap();
        let inventory = inventory(&dir).await;

        let report = seed(&inventory).await.unwrap();
        assert_eq!(report.created, GENRES.len() + PLATFORMS.len() + GAMES.len());
        assert_eq!(report.existing, 0);

        let counts = inventory.counts().await.unwrap();
        assert_eq!(counts.genres, 5);
        assert_eq!(counts.platforms, 4);
        assert_eq!(counts.games, 10);

        let lego = inventory
            .games()
            .find_one_by_field("title", "Lego Star Wars: The Skywalker Saga")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lego.developer.as_deref(), Some("Traveller&#x27;s Tales"));
        assert_eq!(lego.platform.len(), 4);

        let relations = lego.expand(inventory.store()).await.unwrap();
        let names: Vec<_> = relations.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Action", "Adventure"]);
    }

    #[tokio::test]
    async fn test_seed_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let inventory = inventory(&dir).await;

        seed(&inventory).await.unwrap();
        let again = seed(&inventory).await.unwrap();
        assert_eq!(again.created, 0);
        assert_eq!(again.existing, 19);

        let counts = inventory.counts().await.unwrap();
        assert_eq!(counts.games, 10);
    }
}
