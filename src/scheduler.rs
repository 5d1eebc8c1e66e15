use chrono::{Duration, NaiveDateTime};

use crate::data::models::{
    Card, CardId, CardStatus, ReviewDecision, ReviewError, ReviewEvent, ReviewOutcome,
};

/// Policy constants for the SM-2 style scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Interval assigned to new cards and to cards that fail a review
    pub initial_interval_days: i32,
    /// Ease factor assigned to new cards
    pub initial_ease: f32,
    /// Floor that keeps the ease factor from driving intervals to zero
    pub min_ease: f32,
    /// Ceiling on the ease factor
    pub max_ease: f32,
    /// Subtracted from the ease factor on an `Again` outcome
    pub again_ease_penalty: f32,
    /// Subtracted from the ease factor on a `Hard` outcome
    pub hard_ease_penalty: f32,
    /// Added to the ease factor on an `Easy` outcome
    pub easy_ease_bonus: f32,
    /// Interval multiplier for `Hard` (below 1.0, shrinks the interval)
    pub hard_interval_multiplier: f32,
    /// Extra interval multiplier for `Easy`, on top of the ease factor
    pub easy_interval_bonus: f32,
    /// Interval at which a successfully reviewed card counts as learned
    pub learned_threshold_days: i32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_interval_days: 1,
            initial_ease: 2.5,
            min_ease: 1.3,
            max_ease: 2.5,
            again_ease_penalty: 0.2,
            hard_ease_penalty: 0.15,
            easy_ease_bonus: 0.1,
            hard_interval_multiplier: 0.8,
            easy_interval_bonus: 1.3,
            learned_threshold_days: 60,
        }
    }
}

/// The core SRS engine implementing an SM-2 family algorithm.
///
/// Pure state machine: it never touches the clock or the database.
/// Callers inject `now` and persist the returned [`ReviewDecision`].
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Scheduler { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Builds the learning record created when a user adds a phrase to
    /// their deck: active, initial interval, due immediately.
    pub fn new_card(&self, id: CardId, language: &str, now: NaiveDateTime) -> Card {
        Card {
            id,
            language: language.to_string(),
            status: CardStatus::Active,
            interval_days: self.config.initial_interval_days,
            ease_factor: self.config.initial_ease,
            consecutive_correct: 0,
            due_at: Some(now),
            created_at: now,
            last_reviewed_at: None,
            version: 0,
        }
    }

    /// Computes the card state that follows one review outcome.
    ///
    /// Returns a replacement [`Card`] and the [`ReviewEvent`] to append;
    /// the input card is never mutated. Only active cards can be
    /// reviewed, anything else is an invalid transition.
    pub fn next_state(
        &self,
        card: &Card,
        outcome: ReviewOutcome,
        now: NaiveDateTime,
    ) -> Result<ReviewDecision, ReviewError> {
        if card.status != CardStatus::Active {
            return Err(ReviewError::InvalidTransition(card.status));
        }

        let cfg = &self.config;
        let interval_before = card.interval_days;

        let mut ease = card.ease_factor;
        let mut streak = card.consecutive_correct;

        let interval = match outcome {
            ReviewOutcome::Again => {
                streak = 0;
                ease = (ease - cfg.again_ease_penalty).max(cfg.min_ease);
                cfg.initial_interval_days
            }
            ReviewOutcome::Hard => {
                ease = (ease - cfg.hard_ease_penalty).max(cfg.min_ease);
                (card.interval_days as f32 * cfg.hard_interval_multiplier).round() as i32
            }
            ReviewOutcome::Good => {
                streak += 1;
                (card.interval_days as f32 * ease).round() as i32
            }
            ReviewOutcome::Easy => {
                streak += 1;
                ease = (ease + cfg.easy_ease_bonus).min(cfg.max_ease);
                (card.interval_days as f32 * ease * cfg.easy_interval_bonus).round() as i32
            }
        };

        // Minimum one day between reviews, prevents same-day loops
        let interval = interval.max(1);

        let mastered = matches!(outcome, ReviewOutcome::Good | ReviewOutcome::Easy)
            && interval >= cfg.learned_threshold_days;
        let status = if mastered {
            CardStatus::Learned
        } else {
            CardStatus::Active
        };

        let updated = Card {
            status,
            interval_days: interval,
            ease_factor: ease,
            consecutive_correct: streak,
            due_at: Some(now + Duration::days(interval as i64)),
            last_reviewed_at: Some(now),
            ..card.clone()
        };

        let event = ReviewEvent {
            card_id: card.id,
            outcome,
            reviewed_at: now,
            interval_before,
            interval_after: interval,
        };

        Ok(ReviewDecision {
            card: updated,
            event,
        })
    }
}
