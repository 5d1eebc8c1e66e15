use diesel::result::Error as DieselError;
use thiserror::Error;

use super::card_models::{CardId, CardStatus};

// Storage-layer errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("concurrent update conflict")]
    Conflict,
    #[error("database error")]
    Database(#[from] DieselError),
    #[error("connection pool error")]
    Pool(#[from] r2d2::Error),
    #[error("migration error: {0}")]
    Migration(String),
}

// Review submission errors
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("card not found ({0})")]
    CardNotFound(CardId),
    #[error("cannot review a {0} card")]
    InvalidTransition(CardStatus),
    #[error("concurrent update conflict, retries exhausted")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StoreError),
}
