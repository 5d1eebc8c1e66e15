pub mod card_models;
pub mod error_models;
pub mod review_models;

pub use card_models::{Card, CardId, CardStatus, DeckSummary};
pub use error_models::{ReviewError, StoreError};
pub use review_models::{ReviewDecision, ReviewEvent, ReviewOutcome};
