//! Emotion classification for journal text.
//!
//! Classification is deliberately simple: an ordered table of trigger
//! substrings, scanned in a fixed priority order, first match wins.
//! The priority order is part of the observable contract (a text that
//! mentions both exhaustion and happiness reads as fatigue), so it is
//! pinned by tests rather than left to map iteration order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The emotions a journal entry can be tagged with.
///
/// "No recognizable emotion" is `None` at the `Option<Emotion>` level,
/// not a variant here; only real emotions are ever stored on a fruit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Fatigue,
    Sadness,
    Worry,
    Accomplishment,
    Joy,
}

impl Emotion {
    pub fn name(&self) -> &'static str {
        match self {
            Emotion::Fatigue => "fatigue",
            Emotion::Sadness => "sadness",
            Emotion::Worry => "worry",
            Emotion::Accomplishment => "accomplishment",
            Emotion::Joy => "joy",
        }
    }

    /// All emotions in classification priority order.
    pub fn all() -> [Emotion; 5] {
        [
            Emotion::Fatigue,
            Emotion::Sadness,
            Emotion::Worry,
            Emotion::Accomplishment,
            Emotion::Joy,
        ]
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

lazy_static::lazy_static! {
    /// Trigger keywords per emotion, in classification priority order.
    ///
    /// Matching is plain substring containment, case-sensitive.
    /// Fatigue outranks everything else: an entry that is both tired
    /// and happy is recorded as tired.
    pub static ref KEYWORDS: Vec<(Emotion, Vec<&'static str>)> = vec![
        (
            Emotion::Fatigue,
            vec!["tired", "exhausted", "worn out", "drained", "no energy"],
        ),
        (
            Emotion::Sadness,
            vec!["sad", "lonely", "cried", "crying", "heartbroken", "miserable"],
        ),
        (
            Emotion::Worry,
            vec!["worried", "anxious", "nervous", "uneasy", "afraid", "stressed"],
        ),
        (
            Emotion::Accomplishment,
            vec!["accomplished", "finished", "completed", "proud", "achieved", "nailed it"],
        ),
        (
            Emotion::Joy,
            vec!["happy", "glad", "joy", "excited", "delighted", "fun", "wonderful"],
        ),
    ];
}

/// Classify a journal entry's emotional content.
///
/// Scans the keyword table in priority order and returns the first
/// emotion with a matching trigger substring, or `None` when nothing
/// matches (including for empty input). Pure function, no state.
pub fn classify(text: &str) -> Option<Emotion> {
    if text.is_empty() {
        return None;
    }

    for (emotion, keywords) in KEYWORDS.iter() {
        if keywords.iter().any(|kw| text.contains(kw)) {
            return Some(*emotion);
        }
    }

    None
}
