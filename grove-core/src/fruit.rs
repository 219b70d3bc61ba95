//! Fruits: the collectible record minted from a qualifying entry.
//!
//! A fruit is immutable once minted. It carries the entry text, the
//! companion's reply, the classified emotion, and a canvas position
//! assigned at mint time that never changes afterwards.

use crate::emotion::Emotion;
use crate::growth::UserId;
use crate::layout::{self, PlacementSpace, Position};
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for fruits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FruitId(pub Uuid);

impl FruitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FruitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FruitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored the source text of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorRole {
    /// The journaling user.
    User,
    /// The conversational companion replying to the user.
    Companion,
}

/// One journaling interaction, as delivered by the chat collaborator.
///
/// `occurred_on` is already resolved to a calendar date in the user's
/// locale by the producer; the engine never consults a clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEvent {
    pub user_id: UserId,
    pub source_text: String,
    pub response_text: String,
    pub actor: ActorRole,
    pub occurred_on: NaiveDate,
}

impl JournalEvent {
    /// Character count of the source text (unicode scalar values, not
    /// bytes, so non-ASCII journals are measured fairly).
    pub fn contributed_chars(&self) -> usize {
        self.source_text.chars().count()
    }
}

/// An immutable collectible minted from a qualifying entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fruit {
    pub id: FruitId,
    pub user_id: UserId,
    pub source_text: String,
    pub response_text: String,
    pub emotion: Emotion,
    pub actor: ActorRole,
    pub created_on: NaiveDate,
    pub position: Position,
}

impl Fruit {
    /// Mint a fruit from an event that already passed the gate.
    ///
    /// Text fields are copied verbatim; the position comes from the
    /// layout allocator given the user's existing fruit positions.
    /// Eligibility is the caller's responsibility and is not
    /// re-checked here.
    pub fn mint<R: Rng>(
        event: &JournalEvent,
        emotion: Emotion,
        space: &PlacementSpace,
        existing: &[Position],
        max_attempts: u32,
        rng: &mut R,
    ) -> Self {
        let position = layout::allocate_with_rng(space, existing, max_attempts, rng);
        Self {
            id: FruitId::new(),
            user_id: event.user_id,
            source_text: event.source_text.clone(),
            response_text: event.response_text.clone(),
            emotion,
            actor: event.actor,
            created_on: event.occurred_on,
            position,
        }
    }
}
