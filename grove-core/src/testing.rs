//! Testing utilities for the progression engine.
//!
//! Builders for scripting journal scenarios without boilerplate. The
//! in-memory store used by tests lives in [`crate::store::MemoryStore`].

use crate::fruit::{ActorRole, JournalEvent};
use crate::growth::UserId;
use chrono::NaiveDate;

/// Build a journal event for `text` on the given 2025-06 day.
pub fn entry_on(user_id: UserId, text: &str, day: u32) -> JournalEvent {
    JournalEvent {
        user_id,
        source_text: text.to_string(),
        response_text: "Thanks for telling me about your day.".to_string(),
        actor: ActorRole::User,
        occurred_on: NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
    }
}

/// Build a journal event dated 2025-06-01.
pub fn entry(user_id: UserId, text: &str) -> JournalEvent {
    entry_on(user_id, text, 1)
}

/// A qualifying joyful entry: over 20 characters, joy keyword.
pub fn joyful_entry(user_id: UserId) -> JournalEvent {
    entry(user_id, "feeling really happy about today's walk")
}

/// An entry with no recognizable emotion.
pub fn neutral_entry(user_id: UserId) -> JournalEvent {
    entry(user_id, "watered the plants and read for an hour")
}
