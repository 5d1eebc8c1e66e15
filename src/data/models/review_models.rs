use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::card_models::{Card, CardId};

/// Self-reported recall difficulty for one review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewOutcome {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewOutcome {
    pub const ALL: &'static [Self] = &[Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// Convert the [`ReviewOutcome`] to its database id
    pub fn to_id(self) -> i32 {
        match self {
            ReviewOutcome::Again => 1,
            ReviewOutcome::Hard => 2,
            ReviewOutcome::Good => 3,
            ReviewOutcome::Easy => 4,
        }
    }

    /// Convert a database id back into a [`ReviewOutcome`]
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewOutcome::Again => write!(f, "again"),
            ReviewOutcome::Hard => write!(f, "hard"),
            ReviewOutcome::Good => write!(f, "good"),
            ReviewOutcome::Easy => write!(f, "easy"),
        }
    }
}

/// Immutable record of one review. Appended once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub card_id: CardId,
    pub outcome: ReviewOutcome,
    pub reviewed_at: NaiveDateTime,
    pub interval_before: i32,
    pub interval_after: i32,
}

/// Output of one scheduler invocation: the replacement card state and
/// the event the caller must append to the review log.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDecision {
    pub card: Card,
    pub event: ReviewEvent,
}
