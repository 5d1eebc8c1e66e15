//! Review scheduling core for a phrase-deck language learning app.
//!
//! Users collect phrases into per-language decks and review them over
//! time. This crate owns the spaced-repetition state machine
//! ([`scheduler`]), due-card selection ([`session`]), the persistence
//! contracts they rely on ([`data::repositories`]) and a diesel/SQLite
//! implementation of those contracts. The surrounding application
//! handles phrase CRUD, auth and display.

pub mod data;
pub mod db;
pub mod engine;
pub mod scheduler;
pub mod schema;
pub mod session;

pub use data::models::{
    Card, CardId, CardStatus, DeckSummary, ReviewDecision, ReviewError, ReviewEvent,
    ReviewOutcome, StoreError,
};
pub use data::repositories::{CardStore, ReviewEventLog, SqliteStore};
pub use engine::ReviewEngine;
pub use scheduler::{Scheduler, SchedulerConfig};
pub use session::build_session;
