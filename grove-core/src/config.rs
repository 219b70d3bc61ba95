//! Engine configuration.
//!
//! Everything the progression rules treat as tunable lives here:
//! stage thresholds, the mint gate's length and daily limits, and the
//! canvas geometry. The engine never reads the environment or a clock;
//! callers construct a config and hand it in.

use crate::growth::StageThresholds;
use crate::layout::PlacementSpace;
use serde::{Deserialize, Serialize};

/// Configuration for a [`ProgressionEngine`](crate::engine::ProgressionEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bounds for tree stages 1-5.
    pub stage_thresholds: StageThresholds,

    /// Minimum entry length (in characters) for a fruit to mint.
    pub min_fruit_text_chars: usize,

    /// Fruits a user may mint per calendar day. 0 disables minting;
    /// the engine's date marker supports at most 1.
    pub max_mints_per_day: u32,

    /// Canvas region fruits are placed in.
    pub placement: PlacementSpace,

    /// Random placement attempts before the spiral fallback.
    pub max_placement_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stage_thresholds: StageThresholds::default(),
            min_fruit_text_chars: 20,
            max_mints_per_day: 1,
            placement: PlacementSpace::default(),
            max_placement_attempts: 50,
        }
    }
}

impl EngineConfig {
    /// Set the stage thresholds.
    pub fn with_stage_thresholds(mut self, thresholds: StageThresholds) -> Self {
        self.stage_thresholds = thresholds;
        self
    }

    /// Set the minimum entry length for minting.
    pub fn with_min_fruit_text_chars(mut self, chars: usize) -> Self {
        self.min_fruit_text_chars = chars;
        self
    }

    /// Set the daily mint limit.
    pub fn with_max_mints_per_day(mut self, limit: u32) -> Self {
        self.max_mints_per_day = limit;
        self
    }

    /// Set the placement space.
    pub fn with_placement(mut self, placement: PlacementSpace) -> Self {
        self.placement = placement;
        self
    }

    /// Set the random placement attempt budget.
    pub fn with_max_placement_attempts(mut self, attempts: u32) -> Self {
        self.max_placement_attempts = attempts;
        self
    }
}
