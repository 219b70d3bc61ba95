//! Tree growth: accumulated journaling characters mapped to stages.
//!
//! Every journal entry contributes its character count to a per-user
//! running total; the total determines which of six visual stages the
//! user's tree is in. Staging is a pure banding function over the
//! total, so editing the thresholds only changes how the running total
//! is classified going forward, never recorded history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors from growth accumulation.
#[derive(Debug, Error)]
pub enum GrowthError {
    #[error("Negative character contribution: {0}")]
    NegativeContribution(i64),
}

/// Unique identifier for a journaling user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of discrete tree stages.
pub const STAGE_COUNT: u8 = 6;

/// Upper bounds (exclusive) for stages 1 through 5; stage 6 is
/// unbounded above. Must be strictly ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageThresholds(pub [u64; 5]);

impl Default for StageThresholds {
    fn default() -> Self {
        Self([20, 50, 100, 180, 300])
    }
}

impl StageThresholds {
    /// The stage whose half-open band contains `accumulated_chars`.
    ///
    /// Stateless and non-decreasing in its argument; always in
    /// `1..=STAGE_COUNT`.
    pub fn stage_for(&self, accumulated_chars: u64) -> u8 {
        for (i, bound) in self.0.iter().enumerate() {
            if accumulated_chars < *bound {
                return i as u8 + 1;
            }
        }
        STAGE_COUNT
    }
}

/// Per-user growth aggregate.
///
/// Mutated only through [`GrowthState::apply_contribution`] and the
/// engine's mint bookkeeping; `accumulated_chars` never decreases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthState {
    pub user_id: UserId,

    /// Running total of journaled characters.
    pub accumulated_chars: u64,

    /// Current tree stage, in `1..=STAGE_COUNT`.
    pub stage: u8,

    /// Calendar date of the most recent fruit mint, if any.
    pub last_mint: Option<NaiveDate>,
}

impl GrowthState {
    /// A fresh state for a user who has never journaled.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            accumulated_chars: 0,
            stage: 1,
            last_mint: None,
        }
    }

    /// Add a journal entry's character count and restage.
    ///
    /// Rejects negative contributions without touching the state; a
    /// rejected contribution leaves both the total and the stage
    /// exactly as they were. The stage never decreases: raising the
    /// thresholds after a tree has grown leaves its recorded stage
    /// where it was, and only future growth is banded by the new
    /// values.
    pub fn apply_contribution(
        &mut self,
        thresholds: &StageThresholds,
        new_chars: i64,
    ) -> Result<(), GrowthError> {
        if new_chars < 0 {
            return Err(GrowthError::NegativeContribution(new_chars));
        }

        self.accumulated_chars += new_chars as u64;
        self.stage = self.stage.max(thresholds.stage_for(self.accumulated_chars));
        Ok(())
    }
}
