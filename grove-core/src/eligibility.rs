//! The mint gate: may this entry produce a fruit right now?
//!
//! Three independent conditions, all of which must hold: the entry
//! carries a recognizable emotion, it is long enough to be worth
//! keeping, and the user has not already minted a fruit today. The
//! gate only decides; recording the mint date is the engine's job,
//! inside the same per-user critical section as the mint itself.

use crate::config::EngineConfig;
use crate::emotion::Emotion;
use chrono::NaiveDate;

/// Whether a new fruit may be minted for this entry.
///
/// Pure decision function: no state is read or written here.
pub fn can_mint(
    emotion: Option<Emotion>,
    text_chars: usize,
    last_mint: Option<NaiveDate>,
    today: NaiveDate,
    config: &EngineConfig,
) -> bool {
    if emotion.is_none() {
        return false;
    }
    if text_chars < config.min_fruit_text_chars {
        return false;
    }
    if config.max_mints_per_day == 0 {
        return false;
    }
    if last_mint == Some(today) {
        return false;
    }
    true
}
