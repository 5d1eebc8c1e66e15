use chrono::NaiveDateTime;

use crate::data::models::{
    Card, CardId, CardStatus, ReviewError, ReviewOutcome, StoreError,
};
use crate::data::repositories::{CardStore, ReviewEventLog};
use crate::scheduler::Scheduler;
use crate::session::build_session;

/// How many times a conflicting save is retried before the error
/// surfaces to the caller.
const DEFAULT_CONFLICT_RETRIES: u32 = 3;

/// Ties the scheduler to the persistence contracts: one review
/// submission is one scheduler invocation, one card save and one event
/// append. Conflicting saves are re-fetched and retried a few times,
/// everything else propagates unchanged.
pub struct ReviewEngine {
    scheduler: Scheduler,
    conflict_retries: u32,
}

impl Default for ReviewEngine {
    fn default() -> Self {
        Self::new(Scheduler::default())
    }
}

impl ReviewEngine {
    pub fn new(scheduler: Scheduler) -> Self {
        ReviewEngine {
            scheduler,
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }

    pub fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.conflict_retries = retries;
        self
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Creates the learning record for a phrase the user just added to
    /// their deck. The card starts active and due immediately.
    pub fn add_card<S: CardStore>(
        &self,
        store: &mut S,
        id: CardId,
        language: &str,
        now: NaiveDateTime,
    ) -> Result<Card, ReviewError> {
        let card = self.scheduler.new_card(id, language, now);
        let saved = store.save_card(&card)?;
        log::debug!("created card {} in deck {}", saved.id, language);
        Ok(saved)
    }

    /// Records one review outcome: computes the next card state, saves
    /// it, and appends the review event.
    pub fn submit_review<R>(
        &self,
        repo: &mut R,
        id: CardId,
        outcome: ReviewOutcome,
        now: NaiveDateTime,
    ) -> Result<Card, ReviewError>
    where
        R: CardStore + ReviewEventLog,
    {
        let mut attempts = 0;
        loop {
            let card = repo.get_card(id)?.ok_or(ReviewError::CardNotFound(id))?;
            let decision = self.scheduler.next_state(&card, outcome, now)?;

            match repo.save_card(&decision.card) {
                Ok(saved) => {
                    repo.append_event(&decision.event)?;
                    log::debug!(
                        "card {} reviewed {}: interval {} -> {} days",
                        id,
                        outcome,
                        decision.event.interval_before,
                        decision.event.interval_after
                    );
                    return Ok(saved);
                }
                Err(StoreError::Conflict) if attempts < self.conflict_retries => {
                    attempts += 1;
                    log::warn!("conflicting save for card {}, retry {}", id, attempts);
                }
                Err(StoreError::Conflict) => return Err(ReviewError::Conflict),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Explicit user action: take the card out of rotation.
    pub fn mark_skipped<S: CardStore>(
        &self,
        store: &mut S,
        id: CardId,
    ) -> Result<Card, ReviewError> {
        self.transition(store, id, |card| {
            card.status = CardStatus::Skipped;
            card.due_at = None;
        })
    }

    /// Explicit user action: mark the card as mastered without waiting
    /// for the scheduler to get there.
    pub fn mark_learned<S: CardStore>(
        &self,
        store: &mut S,
        id: CardId,
        now: NaiveDateTime,
    ) -> Result<Card, ReviewError> {
        self.transition(store, id, |card| {
            card.status = CardStatus::Learned;
            if card.due_at.is_none() {
                card.due_at = Some(now);
            }
        })
    }

    /// Explicit user action: bring a skipped or learned card back into
    /// rotation, due immediately.
    pub fn reactivate<S: CardStore>(
        &self,
        store: &mut S,
        id: CardId,
        now: NaiveDateTime,
    ) -> Result<Card, ReviewError> {
        self.transition(store, id, |card| {
            card.status = CardStatus::Active;
            card.due_at = Some(now);
        })
    }

    /// The ordered queue of due cards for one deck.
    pub fn start_session<S: CardStore>(
        &self,
        store: &mut S,
        user_id: i32,
        language: &str,
        now: NaiveDateTime,
        limit: Option<usize>,
    ) -> Result<Vec<CardId>, ReviewError> {
        let cards = store.cards_for_deck(user_id, language)?;
        Ok(build_session(&cards, now, limit))
    }

    fn transition<S, F>(&self, store: &mut S, id: CardId, apply: F) -> Result<Card, ReviewError>
    where
        S: CardStore,
        F: Fn(&mut Card),
    {
        let mut attempts = 0;
        loop {
            let mut card = store.get_card(id)?.ok_or(ReviewError::CardNotFound(id))?;
            apply(&mut card);

            match store.save_card(&card) {
                Ok(saved) => return Ok(saved),
                Err(StoreError::Conflict) if attempts < self.conflict_retries => {
                    attempts += 1;
                }
                Err(StoreError::Conflict) => return Err(ReviewError::Conflict),
                Err(e) => return Err(e.into()),
            }
        }
    }
}
