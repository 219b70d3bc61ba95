//! ProgressionEngine - the primary public API.
//!
//! One call per journaling interaction: the engine classifies the
//! entry's emotion, grows the user's tree, decides whether a fruit
//! mints, places it on the canvas, and persists everything through
//! the configured store. All of that runs under a per-user lock so
//! two rapid entries can never both mint on the same day.

use crate::config::EngineConfig;
use crate::eligibility;
use crate::emotion;
use crate::fruit::{Fruit, JournalEvent};
use crate::growth::{GrowthError, GrowthState, UserId};
use crate::layout::Position;
use crate::store::{DateRange, GrowthStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from processing a journal event.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Growth error: {0}")]
    Growth(#[from] GrowthError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// What one event did: the updated growth state and, when the gate
/// passed, the freshly minted fruit.
#[derive(Debug, Clone)]
pub struct EventOutcome {
    pub growth: GrowthState,
    pub minted: Option<Fruit>,
}

/// The progression engine.
///
/// Generic over its storage collaborator; see [`GrowthStore`]. Clone
/// is cheap if you wrap the engine in an `Arc` at the embedding layer;
/// the engine itself only needs `&self`.
pub struct ProgressionEngine<S: GrowthStore> {
    config: EngineConfig,
    store: S,
    /// Per-user critical sections. An entry's check-mint-record
    /// sequence must not interleave with another entry for the same
    /// user; different users proceed in parallel. Entries are evicted
    /// once the last holder releases, so the map tracks in-flight
    /// users, not every user ever seen.
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl<S: GrowthStore> ProgressionEngine<S> {
    /// Create an engine with the given configuration and store.
    pub fn new(config: EngineConfig, store: S) -> Self {
        Self {
            config,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn user_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(user_id).or_default().clone()
    }

    /// Drop a user's lock entry once the map holds the only reference.
    ///
    /// The strong count is checked under the map lock, the same lock
    /// `user_lock` clones under, so a concurrent clone cannot race
    /// the eviction.
    async fn release_user_lock(&self, user_id: UserId) {
        let mut locks = self.locks.lock().await;
        if let Some(lock) = locks.get(&user_id) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(&user_id);
            }
        }
    }

    /// Process one journaling interaction.
    ///
    /// Classify, accumulate, gate, mint, persist. A rejected
    /// contribution aborts the whole event before anything is written;
    /// growth and fruits are left exactly as they were.
    pub async fn handle_event(&self, event: JournalEvent) -> Result<EventOutcome, EngineError> {
        let lock = self.user_lock(event.user_id).await;
        let guard = lock.lock().await;

        let result = self.process_event(&event).await;

        drop(guard);
        drop(lock);
        self.release_user_lock(event.user_id).await;

        result
    }

    /// The per-user critical section: everything between reading the
    /// growth state and persisting the outcome.
    async fn process_event(&self, event: &JournalEvent) -> Result<EventOutcome, EngineError> {
        let mut state = self
            .store
            .load_growth(event.user_id)
            .await?
            .unwrap_or_else(|| GrowthState::new(event.user_id));

        let emotion = emotion::classify(&event.source_text);
        let text_chars = event.contributed_chars();

        state.apply_contribution(&self.config.stage_thresholds, text_chars as i64)?;

        let eligible = eligibility::can_mint(
            emotion,
            text_chars,
            state.last_mint,
            event.occurred_on,
            &self.config,
        );

        let minted = match emotion {
            Some(emotion) if eligible => {
                // Snapshot of the user's existing positions, taken
                // under the same lock the mint is recorded under.
                let existing: Vec<Position> = self
                    .store
                    .load_fruits(event.user_id, None)
                    .await?
                    .iter()
                    .map(|f| f.position)
                    .collect();

                let fruit = Fruit::mint(
                    event,
                    emotion,
                    &self.config.placement,
                    &existing,
                    self.config.max_placement_attempts,
                    &mut rand::thread_rng(),
                );

                // The mint date is persisted before the fruit: if the
                // store fails between the two writes, the day's mint
                // is blocked rather than repeatable, which keeps the
                // one-fruit-per-day invariant on the error path.
                state.last_mint = Some(event.occurred_on);
                self.store.save_growth(&state).await?;
                self.store.save_fruit(&fruit).await?;

                tracing::debug!(
                    user = %event.user_id,
                    fruit = %fruit.id,
                    emotion = %fruit.emotion,
                    "minted fruit"
                );
                Some(fruit)
            }
            _ => {
                tracing::debug!(
                    user = %event.user_id,
                    emotion = ?emotion,
                    text_chars,
                    "entry did not mint"
                );
                self.store.save_growth(&state).await?;
                None
            }
        };

        Ok(EventOutcome {
            growth: state,
            minted,
        })
    }

    /// Load a user's growth state, creating a fresh one if absent.
    pub async fn growth(&self, user_id: UserId) -> Result<GrowthState, EngineError> {
        Ok(self
            .store
            .load_growth(user_id)
            .await?
            .unwrap_or_else(|| GrowthState::new(user_id)))
    }

    /// Load a user's fruits, optionally restricted to a date range.
    pub async fn fruits(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> Result<Vec<Fruit>, EngineError> {
        Ok(self.store.load_fruits(user_id, range).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fruit::ActorRole;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// A store that can be told to fail its next growth or fruit
    /// write, for exercising partial-failure behavior.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_next_growth_save: AtomicBool,
        fail_next_fruit_save: AtomicBool,
    }

    impl FlakyStore {
        fn failure() -> StoreError {
            StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }
    }

    #[async_trait]
    impl GrowthStore for FlakyStore {
        async fn load_growth(&self, user_id: UserId) -> Result<Option<GrowthState>, StoreError> {
            self.inner.load_growth(user_id).await
        }

        async fn save_growth(&self, state: &GrowthState) -> Result<(), StoreError> {
            if self.fail_next_growth_save.swap(false, Ordering::SeqCst) {
                return Err(Self::failure());
            }
            self.inner.save_growth(state).await
        }

        async fn load_fruits(
            &self,
            user_id: UserId,
            range: Option<DateRange>,
        ) -> Result<Vec<Fruit>, StoreError> {
            self.inner.load_fruits(user_id, range).await
        }

        async fn save_fruit(&self, fruit: &Fruit) -> Result<(), StoreError> {
            if self.fail_next_fruit_save.swap(false, Ordering::SeqCst) {
                return Err(Self::failure());
            }
            self.inner.save_fruit(fruit).await
        }
    }

    fn event(user_id: UserId, text: &str, day: u32) -> JournalEvent {
        JournalEvent {
            user_id,
            source_text: text.to_string(),
            response_text: "Thanks for sharing.".to_string(),
            actor: ActorRole::User,
            occurred_on: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_first_entry_grows_and_mints() {
        let engine = ProgressionEngine::new(EngineConfig::default(), MemoryStore::new());
        let user = UserId::new();

        // 25 characters, contains a joy keyword.
        let text = "happy day in the garden.."; // 25 chars
        assert_eq!(text.chars().count(), 25);

        let outcome = engine.handle_event(event(user, text, 1)).await.unwrap();
        assert_eq!(outcome.growth.accumulated_chars, 25);
        assert_eq!(outcome.growth.stage, 2);
        let fruit = outcome.minted.expect("should mint");
        assert_eq!(fruit.emotion, crate::emotion::Emotion::Joy);
    }

    #[tokio::test]
    async fn test_second_entry_same_day_grows_but_does_not_mint() {
        let engine = ProgressionEngine::new(EngineConfig::default(), MemoryStore::new());
        let user = UserId::new();

        let morning = "happy day in the garden.."; // 25 chars
        let evening = "still glad this evening!"; // qualifying again
        engine.handle_event(event(user, morning, 1)).await.unwrap();

        let outcome = engine.handle_event(event(user, evening, 1)).await.unwrap();
        assert!(outcome.minted.is_none());
        assert_eq!(
            outcome.growth.accumulated_chars,
            25 + evening.chars().count() as u64
        );
        assert_eq!(engine.fruits(user, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_next_day_mints_again() {
        let engine = ProgressionEngine::new(EngineConfig::default(), MemoryStore::new());
        let user = UserId::new();
        let text = "so glad about everything today";

        engine.handle_event(event(user, text, 1)).await.unwrap();
        let outcome = engine.handle_event(event(user, text, 2)).await.unwrap();
        assert!(outcome.minted.is_some());
        assert_eq!(engine.fruits(user, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_neutral_entry_grows_without_minting() {
        let engine = ProgressionEngine::new(EngineConfig::default(), MemoryStore::new());
        let user = UserId::new();

        let outcome = engine
            .handle_event(event(user, "went to the store and bought groceries", 1))
            .await
            .unwrap();
        assert!(outcome.minted.is_none());
        assert!(outcome.growth.accumulated_chars > 0);
    }

    #[tokio::test]
    async fn test_growth_save_failure_cannot_double_mint() {
        let store = FlakyStore::default();
        store.fail_next_growth_save.store(true, Ordering::SeqCst);
        let engine = ProgressionEngine::new(EngineConfig::default(), store);
        let user = UserId::new();
        let text = "so glad about everything today";

        // The mint-path growth write fails before the fruit write, so
        // nothing durable comes out of the first event.
        let err = engine.handle_event(event(user, text, 1)).await;
        assert!(err.is_err());
        assert!(engine.fruits(user, None).await.unwrap().is_empty());

        // Retrying the same day mints exactly once, never twice.
        let outcome = engine.handle_event(event(user, text, 1)).await.unwrap();
        assert!(outcome.minted.is_some());
        assert_eq!(engine.fruits(user, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fruit_save_failure_blocks_the_day_instead_of_doubling() {
        let store = FlakyStore::default();
        store.fail_next_fruit_save.store(true, Ordering::SeqCst);
        let engine = ProgressionEngine::new(EngineConfig::default(), store);
        let user = UserId::new();
        let text = "so glad about everything today";

        // The mint date was recorded before the failing fruit write,
        // so the partial failure closes the day.
        let err = engine.handle_event(event(user, text, 1)).await;
        assert!(err.is_err());
        assert!(engine.fruits(user, None).await.unwrap().is_empty());

        let same_day = engine.handle_event(event(user, text, 1)).await.unwrap();
        assert!(same_day.minted.is_none());
        assert!(engine.fruits(user, None).await.unwrap().is_empty());

        // A later day is unaffected.
        let next_day = engine.handle_event(event(user, text, 2)).await.unwrap();
        assert!(next_day.minted.is_some());
        assert_eq!(engine.fruits(user, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lock_map_does_not_accumulate_users() {
        let engine = ProgressionEngine::new(EngineConfig::default(), MemoryStore::new());

        for _ in 0..5 {
            let user = UserId::new();
            engine
                .handle_event(event(user, "so glad about everything today", 1))
                .await
                .unwrap();
        }

        assert!(engine.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_growth_accessor_defaults_fresh_state() {
        let engine = ProgressionEngine::new(EngineConfig::default(), MemoryStore::new());
        let user = UserId::new();

        let growth = engine.growth(user).await.unwrap();
        assert_eq!(growth.accumulated_chars, 0);
        assert_eq!(growth.stage, 1);
        assert!(growth.last_mint.is_none());
    }
}
