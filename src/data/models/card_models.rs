use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identity of a learning record: one user's relationship to one phrase.
/// Ordered (user first, phrase second) so session tie-breaking is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId {
    pub user_id: i32,
    pub phrase_id: i32,
}

impl CardId {
    pub fn new(user_id: i32, phrase_id: i32) -> Self {
        Self { user_id, phrase_id }
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user {} phrase {}", self.user_id, self.phrase_id)
    }
}

/// The lifecycle states of a [`Card`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardStatus {
    #[default]
    Active,
    Skipped,
    Learned,
}

impl CardStatus {
    /// Convert the [`CardStatus`] to its database id
    pub fn to_id(self) -> i32 {
        match self {
            CardStatus::Active => 1,
            CardStatus::Skipped => 2,
            CardStatus::Learned => 3,
        }
    }

    /// Convert a database id back into a [`CardStatus`]
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Active),
            2 => Some(Self::Skipped),
            3 => Some(Self::Learned),
            _ => None,
        }
    }
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardStatus::Active => write!(f, "active"),
            CardStatus::Skipped => write!(f, "skipped"),
            CardStatus::Learned => write!(f, "learned"),
        }
    }
}

/// One user's learning record for one phrase in one language.
///
/// `version` is the optimistic-concurrency token: 0 means the card has
/// never been persisted, any other value is the version the card was
/// read at. The store bumps it on every successful save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub language: String,
    pub status: CardStatus,
    pub interval_days: i32,
    pub ease_factor: f32,
    pub consecutive_correct: i32,
    pub due_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub last_reviewed_at: Option<NaiveDateTime>,
    pub version: i32,
}

impl Card {
    /// A card is due when it is active and its scheduled timestamp has passed.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.status == CardStatus::Active && self.due_at.is_some_and(|due| due <= now)
    }
}

/// Read-only grouping of one user's cards for one language.
/// Decks have no table of their own; they are derived from the cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckSummary {
    pub user_id: i32,
    pub language: String,
    pub card_count: i64,
    pub created_at: Option<NaiveDateTime>,
}
