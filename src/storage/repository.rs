//! Typed accessors over a collection
//!
//! A [`Repository`] turns documents into entities and back. Reads return
//! entities sorted by their natural field; writes take the store lock, touch
//! exactly one document, and record one history commit.

use std::marker::PhantomData;
use uuid::Uuid;

use super::collection::Collection;
use super::document::{Document, Value};
use super::store::Store;
use crate::error::{Error, Result};
use crate::models::{Entity, Projection};

/// Outcome of a write guarded by a natural key
#[derive(Debug, Clone, PartialEq)]
pub enum Saved<T> {
    /// The entity was written
    Written(T),
    /// Another entity already holds the key; nothing was written
    Existing(T),
}

/// Typed access to the collection backing `T`
pub struct Repository<'a, T> {
    store: &'a Store,
    collection: Collection,
    _entity: PhantomData<T>,
}

impl<'a, T: Entity> Repository<'a, T> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            collection: store.collection(T::COLLECTION),
            _entity: PhantomData,
        }
    }

    /// All entities, ascending by the entity's sort field
    pub async fn find_all(&self) -> Result<Vec<T>> {
        let mut docs = self.collection.list().await?;
        docs.sort_by(|a, b| match (a.get(T::SORT_FIELD), b.get(T::SORT_FIELD)) {
            (Some(a), Some(b)) => a.compare(b),
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(self.convert_all(docs))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        tracing::debug!(collection = T::COLLECTION, id, "find by id");
        self.collection
            .get(id)
            .await?
            .map(T::from_document)
            .transpose()
    }

    /// Like [`find_by_id`](Self::find_by_id), but absence is an error
    pub async fn get(&self, id: &str) -> Result<T> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(T::KIND, id))
    }

    /// Resolve a list of identifiers; dangling references are skipped
    pub async fn find_many(&self, ids: &[String]) -> Result<Vec<T>> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            match self.find_by_id(id).await? {
                Some(entity) => found.push(entity),
                None => tracing::debug!(collection = T::COLLECTION, id = %id, "dangling reference"),
            }
        }
        found.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Ok(found)
    }

    /// Entities whose field equals (or, for lists, contains) the value
    pub async fn find_by_field(&self, field: &str, value: impl Into<Value>) -> Result<Vec<T>> {
        let docs = self.collection.find_by_field(field, &value.into()).await?;
        Ok(self.convert_all(docs))
    }

    pub async fn find_one_by_field(&self, field: &str, value: impl Into<Value>) -> Result<Option<T>> {
        Ok(self.find_by_field(field, value).await?.into_iter().next())
    }

    /// Same match as [`find_by_field`](Self::find_by_field), projected to `P`
    pub async fn find_projected<P: Projection>(&self, field: &str, value: impl Into<Value>) -> Result<Vec<P>> {
        let docs = self.collection.find_by_field(field, &value.into()).await?;
        let mut projected = docs
            .iter()
            .map(|doc| P::from_document(doc.project(P::FIELDS)))
            .collect::<Result<Vec<P>>>()?;
        projected.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
        Ok(projected)
    }

    pub async fn count(&self) -> Result<usize> {
        self.collection.count().await
    }

    /// Insert under a freshly generated identifier
    pub async fn save(&self, entity: T) -> Result<T> {
        let mut guard = self.store.lock().await;
        let saved = self.insert_new(entity).await?;
        guard.commit(&format!("Create {} {}", T::SLUG, saved.id()))?;
        Ok(saved)
    }

    /// Insert unless another entity has the same value for `key`
    pub async fn save_unique(&self, entity: T, key: &str) -> Result<Saved<T>> {
        let mut guard = self.store.lock().await;

        if let Some(existing) = self.holder_of(&entity, key, None).await? {
            tracing::info!(collection = T::COLLECTION, id = existing.id(), key, "natural key taken, not inserting");
            return Ok(Saved::Existing(existing));
        }

        let saved = self.insert_new(entity).await?;
        guard.commit(&format!("Create {} {}", T::SLUG, saved.id()))?;
        Ok(Saved::Written(saved))
    }

    /// Replace every field of the entity stored at `id`
    pub async fn update_by_id(&self, id: &str, entity: T) -> Result<T> {
        let mut guard = self.store.lock().await;
        let updated = self.replace(id, entity).await?;
        guard.commit(&format!("Update {} {}", T::SLUG, id))?;
        Ok(updated)
    }

    /// Replace unless a different entity has the same value for `key`
    pub async fn update_unique(&self, id: &str, entity: T, key: &str) -> Result<Saved<T>> {
        let mut guard = self.store.lock().await;

        if let Some(existing) = self.holder_of(&entity, key, Some(id)).await? {
            return Ok(Saved::Existing(existing));
        }

        let updated = self.replace(id, entity).await?;
        guard.commit(&format!("Update {} {}", T::SLUG, id))?;
        Ok(Saved::Written(updated))
    }

    /// Remove by identifier; `false` when nothing was there
    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut guard = self.store.lock().await;
        let deleted = self.collection.delete(id).await?;
        if deleted {
            guard.commit(&format!("Delete {} {}", T::SLUG, id))?;
            tracing::info!(collection = T::COLLECTION, id, "deleted");
        }
        Ok(deleted)
    }

    async fn insert_new(&self, mut entity: T) -> Result<T> {
        entity.set_id(Uuid::new_v4().simple().to_string());
        self.collection.insert(&entity.to_document()).await?;
        tracing::info!(collection = T::COLLECTION, id = entity.id(), "created");
        Ok(entity)
    }

    async fn replace(&self, id: &str, mut entity: T) -> Result<T> {
        if self.collection.get(id).await?.is_none() {
            return Err(Error::not_found(T::KIND, id));
        }
        entity.set_id(id.to_string());
        self.collection.update(&entity.to_document()).await?;
        tracing::info!(collection = T::COLLECTION, id, "updated");
        Ok(entity)
    }

    /// The entity other than `except` whose `key` field equals the candidate's
    async fn holder_of(&self, candidate: &T, key: &str, except: Option<&str>) -> Result<Option<T>> {
        let Some(value) = candidate.to_document().get(key).cloned() else {
            return Ok(None);
        };
        Ok(self
            .find_by_field(key, value)
            .await?
            .into_iter()
            .find(|other| Some(other.id()) != except))
    }

    fn convert_all(&self, docs: Vec<Document>) -> Vec<T> {
        docs.into_iter()
            .filter_map(|doc| match T::from_document(doc) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    tracing::warn!(collection = T::COLLECTION, "skipping document: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Game, GameSummary, Genre, Platform};
    use tempfile::TempDir;

    async fn store(history: bool) -> (TempDir, Store) {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path(), history).await.unwrap();
        (tmp, store)
    }

    fn genre(name: &str) -> Genre {
        Genre {
            id: String::new(),
            name: name.into(),
            description: format!("{name} games"),
        }
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_sorts_by_name() {
        let (_tmp, store) = store(false).await;
        let genres = Repository::<Genre>::new(&store);

        let sports = genres.save(genre("Sports")).await.unwrap();
        genres.save(genre("Action")).await.unwrap();

        assert_eq!(sports.id.len(), 32);
        let names: Vec<String> = genres.find_all().await.unwrap().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["Action", "Sports"]);
        assert_eq!(genres.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_save_unique_returns_existing() {
        let (_tmp, store) = store(false).await;
        let genres = Repository::<Genre>::new(&store);

        let Saved::Written(first) = genres.save_unique(genre("RPG"), "name").await.unwrap() else {
            panic!("expected a write");
        };
        let again = genres.save_unique(genre("RPG"), "name").await.unwrap();

        assert_eq!(again, Saved::Existing(first));
        assert_eq!(genres.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_rejects_taken_key() {
        let (_tmp, store) = store(false).await;
        let platforms = Repository::<Platform>::new(&store);

        let pc = platforms
            .save(Platform { id: String::new(), name: "PC".into(), company: None })
            .await
            .unwrap();
        platforms
            .save(Platform { id: String::new(), name: "Xbox".into(), company: Some("Microsoft".into()) })
            .await
            .unwrap();

        let renamed = Platform { id: "ignored".into(), name: "Windows PC".into(), company: Some("Microsoft".into()) };
        let updated = platforms.update_by_id(&pc.id, renamed).await.unwrap();
        assert_eq!(updated.id, pc.id);

        let clash = Platform { id: String::new(), name: "Xbox".into(), company: None };
        let outcome = platforms.update_unique(&pc.id, clash, "name").await.unwrap();
        assert!(matches!(outcome, Saved::Existing(p) if p.name == "Xbox"));
        assert_eq!(platforms.get(&pc.id).await.unwrap().name, "Windows PC");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (_tmp, store) = store(false).await;
        let genres = Repository::<Genre>::new(&store);

        let err = genres.update_by_id("nope", genre("Puzzle")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "Genre", .. }));
        assert!(genres.get("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_projection_and_reference_lookup() {
        let (_tmp, store) = store(false).await;
        let genres = Repository::<Genre>::new(&store);
        let games = Repository::<Game>::new(&store);

        let rpg = genres.save(genre("Role-Playing Game")).await.unwrap();
        let game = Game {
            id: String::new(),
            title: "Elden Ring".into(),
            description: "Everything wants to kill you.".into(),
            price: 49.99,
            stock: 2,
            developer: Some("FromSoftware".into()),
            publisher: None,
            genre: vec![rpg.id.clone(), "dangling".into()],
            platform: vec![],
        };
        let game = games.save(game).await.unwrap();

        let summaries: Vec<GameSummary> = games.find_projected("genre", rpg.id.as_str()).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title, "Elden Ring");
        assert_eq!(summaries[0].url, format!("/inventory/game/{}", game.id));

        let resolved = genres.find_many(&game.genre).await.unwrap();
        assert_eq!(resolved, vec![rpg]);
    }

    #[tokio::test]
    async fn test_writes_are_committed_to_history() {
        let (_tmp, store) = store(true).await;
        let genres = Repository::<Genre>::new(&store);

        let saved = genres.save(genre("Adventure")).await.unwrap();
        assert!(genres.delete_by_id(&saved.id).await.unwrap());
        assert!(!genres.delete_by_id(&saved.id).await.unwrap());

        let log = store.history_log(10).await.unwrap().unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0], format!("Delete genre {}", saved.id));
        assert_eq!(log[1], format!("Create genre {}", saved.id));
    }
}
