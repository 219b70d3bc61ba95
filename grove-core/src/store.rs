//! Storage seam for growth state and fruits.
//!
//! The engine reads and writes through [`GrowthStore`] and does not
//! prescribe the storage technology. Two implementations ship here:
//! an in-memory store for tests and embedding into prototypes, and a
//! versioned one-JSON-document-per-user file store.

use crate::fruit::Fruit;
use crate::growth::{GrowthState, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Inclusive calendar range for fruit queries.
pub type DateRange = (NaiveDate, NaiveDate);

/// Persistence collaborator for growth state and fruits.
#[async_trait]
pub trait GrowthStore: Send + Sync {
    /// Load a user's growth state, if one has been recorded.
    async fn load_growth(&self, user_id: UserId) -> Result<Option<GrowthState>, StoreError>;

    /// Save (insert or replace) a user's growth state.
    async fn save_growth(&self, state: &GrowthState) -> Result<(), StoreError>;

    /// Load a user's fruits, optionally restricted to a date range,
    /// in mint order.
    async fn load_fruits(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<Vec<Fruit>, StoreError>;

    /// Append a newly minted fruit.
    async fn save_fruit(&self, fruit: &Fruit) -> Result<(), StoreError>;
}

fn in_range(fruit: &Fruit, range: Option<DateRange>) -> bool {
    match range {
        Some((from, to)) => fruit.created_on >= from && fruit.created_on <= to,
        None => true,
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory [`GrowthStore`] backed by maps under an async lock.
#[derive(Default)]
pub struct MemoryStore {
    growth: RwLock<HashMap<UserId, GrowthState>>,
    fruits: RwLock<HashMap<UserId, Vec<Fruit>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GrowthStore for MemoryStore {
    async fn load_growth(&self, user_id: UserId) -> Result<Option<GrowthState>, StoreError> {
        Ok(self.growth.read().await.get(&user_id).cloned())
    }

    async fn save_growth(&self, state: &GrowthState) -> Result<(), StoreError> {
        self.growth.write().await.insert(state.user_id, state.clone());
        Ok(())
    }

    async fn load_fruits(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<Vec<Fruit>, StoreError> {
        let fruits = self.fruits.read().await;
        Ok(fruits
            .get(&user_id)
            .map(|list| {
                list.iter()
                    .filter(|f| in_range(f, range))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn save_fruit(&self, fruit: &Fruit) -> Result<(), StoreError> {
        self.fruits
            .write()
            .await
            .entry(fruit.user_id)
            .or_default()
            .push(fruit.clone());
        Ok(())
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// Current user document version.
const DOCUMENT_VERSION: u32 = 1;

/// The on-disk document for one user: growth state plus fruit list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    /// Document format version for compatibility checking.
    version: u32,
    growth: Option<GrowthState>,
    fruits: Vec<Fruit>,
}

impl UserDocument {
    fn empty() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            growth: None,
            fruits: Vec::new(),
        }
    }
}

/// [`GrowthStore`] writing one versioned JSON document per user.
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `base_dir`. The directory is created
    /// lazily on first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn user_path(&self, user_id: UserId) -> PathBuf {
        self.base_dir.join(format!("{user_id}.json"))
    }

    async fn read_document(&self, user_id: UserId) -> Result<UserDocument, StoreError> {
        let path = self.user_path(user_id);
        if !path.exists() {
            return Ok(UserDocument::empty());
        }

        let content = fs::read_to_string(&path).await?;
        let doc: UserDocument = serde_json::from_str(&content)?;

        if doc.version != DOCUMENT_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: DOCUMENT_VERSION,
                found: doc.version,
            });
        }

        Ok(doc)
    }

    async fn write_document(&self, user_id: UserId, doc: &UserDocument) -> Result<(), StoreError> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir).await?;
        }
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(self.user_path(user_id), content).await?;
        Ok(())
    }

    /// Base directory this store writes under.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[async_trait]
impl GrowthStore for JsonFileStore {
    async fn load_growth(&self, user_id: UserId) -> Result<Option<GrowthState>, StoreError> {
        Ok(self.read_document(user_id).await?.growth)
    }

    async fn save_growth(&self, state: &GrowthState) -> Result<(), StoreError> {
        let mut doc = self.read_document(state.user_id).await?;
        doc.growth = Some(state.clone());
        self.write_document(state.user_id, &doc).await
    }

    async fn load_fruits(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<Vec<Fruit>, StoreError> {
        let doc = self.read_document(user_id).await?;
        Ok(doc
            .fruits
            .into_iter()
            .filter(|f| in_range(f, range))
            .collect())
    }

    async fn save_fruit(&self, fruit: &Fruit) -> Result<(), StoreError> {
        let mut doc = self.read_document(fruit.user_id).await?;
        doc.fruits.push(fruit.clone());
        self.write_document(fruit.user_id, &doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::Emotion;
    use crate::fruit::{ActorRole, FruitId};
    use crate::layout::Position;

    fn sample_fruit(user_id: UserId, day: u32) -> Fruit {
        Fruit {
            id: FruitId::new(),
            user_id,
            source_text: "wrote in the journal".to_string(),
            response_text: "Noted.".to_string(),
            emotion: Emotion::Joy,
            actor: ActorRole::User,
            created_on: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            position: Position::new(0.0, 0.0),
        }
    }

    #[tokio::test]
    async fn test_memory_store_growth_roundtrip() {
        let store = MemoryStore::new();
        let user = UserId::new();

        assert!(store.load_growth(user).await.unwrap().is_none());

        let mut state = GrowthState::new(user);
        state.accumulated_chars = 77;
        state.stage = 3;
        store.save_growth(&state).await.unwrap();

        let loaded = store.load_growth(user).await.unwrap().unwrap();
        assert_eq!(loaded.accumulated_chars, 77);
        assert_eq!(loaded.stage, 3);
    }

    #[tokio::test]
    async fn test_memory_store_fruit_date_range() {
        let store = MemoryStore::new();
        let user = UserId::new();

        for day in [1, 5, 9] {
            store.save_fruit(&sample_fruit(user, day)).await.unwrap();
        }

        let all = store.load_fruits(user, None).await.unwrap();
        assert_eq!(all.len(), 3);

        let from = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let ranged = store.load_fruits(user, Some((from, to))).await.unwrap();
        assert_eq!(ranged.len(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_isolates_users() {
        let store = MemoryStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        store.save_fruit(&sample_fruit(alice, 1)).await.unwrap();

        assert_eq!(store.load_fruits(alice, None).await.unwrap().len(), 1);
        assert!(store.load_fruits(bob, None).await.unwrap().is_empty());
    }
}
