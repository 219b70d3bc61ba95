//! Progression engine for a journaling companion app.
//!
//! This crate provides:
//! - Emotion classification of journal entries (ordered keyword table)
//! - A six-stage tree that grows with accumulated journaling
//! - Daily-limited minting of collectible fruits
//! - Overlap-avoiding canvas layout with a deterministic fallback
//! - Pluggable persistence (in-memory and JSON file stores included)
//!
//! # Quick Start
//!
//! ```ignore
//! use grove_core::{EngineConfig, JournalEvent, MemoryStore, ProgressionEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = ProgressionEngine::new(EngineConfig::default(), MemoryStore::new());
//!
//!     let outcome = engine.handle_event(event).await?;
//!     println!("tree stage: {}", outcome.growth.stage);
//!     if let Some(fruit) = outcome.minted {
//!         println!("minted a {} fruit at {:?}", fruit.emotion, fruit.position);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod eligibility;
pub mod emotion;
pub mod engine;
pub mod fruit;
pub mod growth;
pub mod layout;
pub mod store;
pub mod testing;

// Primary public API
pub use config::EngineConfig;
pub use emotion::{classify, Emotion};
pub use engine::{EngineError, EventOutcome, ProgressionEngine};
pub use fruit::{ActorRole, Fruit, FruitId, JournalEvent};
pub use growth::{GrowthError, GrowthState, StageThresholds, UserId};
pub use layout::{PlacementSpace, Position};
pub use store::{GrowthStore, JsonFileStore, MemoryStore, StoreError};
