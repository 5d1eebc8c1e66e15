pub mod sqlite_store;

pub use sqlite_store::SqliteStore;

use crate::data::models::{Card, CardId, DeckSummary, ReviewEvent, StoreError};

/// Persistence contract for learning records.
///
/// Implementations must serialize per-card updates: `save_card` is a
/// versioned upsert, and a stale version is a [`StoreError::Conflict`]
/// the caller resolves by re-fetching and retrying.
pub trait CardStore {
    fn get_card(&mut self, id: CardId) -> Result<Option<Card>, StoreError>;

    /// All cards in one deck, i.e. one user's cards for one language.
    fn cards_for_deck(&mut self, user_id: i32, language: &str) -> Result<Vec<Card>, StoreError>;

    /// Versioned upsert. A card with version 0 is inserted, anything
    /// else is a compare-and-swap against the stored version. Returns
    /// the card as persisted, with its new version.
    fn save_card(&mut self, card: &Card) -> Result<Card, StoreError>;

    /// Thin read-only aggregation of a user's cards into decks.
    fn decks_for_user(&mut self, user_id: i32) -> Result<Vec<DeckSummary>, StoreError>;
}

/// Persistence contract for the append-only review history.
pub trait ReviewEventLog {
    /// Appends one event. Never rejects a valid event; it fails only on
    /// storage-layer errors.
    fn append_event(&mut self, event: &ReviewEvent) -> Result<(), StoreError>;

    /// A card's review history in chronological order, possibly empty.
    fn events_for_card(&mut self, id: CardId) -> Result<Vec<ReviewEvent>, StoreError>;
}
