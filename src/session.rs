use chrono::NaiveDateTime;

use crate::data::models::{Card, CardId};

/// Selects and orders the cards due for review in one deck.
///
/// Only active cards whose due timestamp has passed are included,
/// oldest-overdue first, ties broken by card id so the queue is
/// reproducible. Shuffling, if the caller wants any, is a presentation
/// concern and happens on the returned queue.
pub fn build_session(cards: &[Card], now: NaiveDateTime, limit: Option<usize>) -> Vec<CardId> {
    let mut due: Vec<&Card> = cards.iter().filter(|card| card.is_due(now)).collect();

    due.sort_by(|a, b| a.due_at.cmp(&b.due_at).then(a.id.cmp(&b.id)));

    let mut queue: Vec<CardId> = due.into_iter().map(|card| card.id).collect();
    if let Some(limit) = limit {
        queue.truncate(limit);
    }
    queue
}
