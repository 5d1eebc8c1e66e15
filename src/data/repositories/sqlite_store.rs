use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use super::{CardStore, ReviewEventLog};
use crate::data::models::{
    Card, CardId, CardStatus, DeckSummary, ReviewEvent, ReviewOutcome, StoreError,
};
use crate::schema::{cards, review_events};

/// Diesel-backed implementation of [`CardStore`] and [`ReviewEventLog`]
/// over SQLite.
pub struct SqliteStore<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        SqliteStore { conn }
    }
}

#[derive(Queryable)]
struct CardRow {
    user_id: i32,
    phrase_id: i32,
    language: String,
    status: i32,
    interval_days: i32,
    ease_factor: f32,
    consecutive_correct: i32,
    due_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    last_reviewed_at: Option<NaiveDateTime>,
    version: i32,
}

impl TryFrom<CardRow> for Card {
    type Error = StoreError;

    fn try_from(row: CardRow) -> Result<Self, Self::Error> {
        let status = CardStatus::from_id(row.status).ok_or_else(|| {
            StoreError::Database(DieselError::DeserializationError(
                format!("unknown card status id {}", row.status).into(),
            ))
        })?;

        Ok(Card {
            id: CardId::new(row.user_id, row.phrase_id),
            language: row.language,
            status,
            interval_days: row.interval_days,
            ease_factor: row.ease_factor,
            consecutive_correct: row.consecutive_correct,
            due_at: row.due_at,
            created_at: row.created_at,
            last_reviewed_at: row.last_reviewed_at,
            version: row.version,
        })
    }
}

#[derive(Queryable)]
struct EventRow {
    #[allow(dead_code)]
    event_id: i32,
    user_id: i32,
    phrase_id: i32,
    outcome: i32,
    reviewed_at: NaiveDateTime,
    interval_before: i32,
    interval_after: i32,
}

impl TryFrom<EventRow> for ReviewEvent {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let outcome = ReviewOutcome::from_id(row.outcome).ok_or_else(|| {
            StoreError::Database(DieselError::DeserializationError(
                format!("unknown review outcome id {}", row.outcome).into(),
            ))
        })?;

        Ok(ReviewEvent {
            card_id: CardId::new(row.user_id, row.phrase_id),
            outcome,
            reviewed_at: row.reviewed_at,
            interval_before: row.interval_before,
            interval_after: row.interval_after,
        })
    }
}

impl CardStore for SqliteStore<'_> {
    fn get_card(&mut self, id: CardId) -> Result<Option<Card>, StoreError> {
        let row = cards::table
            .filter(cards::user_id.eq(id.user_id))
            .filter(cards::phrase_id.eq(id.phrase_id))
            .first::<CardRow>(self.conn)
            .optional()?;

        row.map(Card::try_from).transpose()
    }

    fn cards_for_deck(&mut self, user_id: i32, language: &str) -> Result<Vec<Card>, StoreError> {
        let rows = cards::table
            .filter(cards::user_id.eq(user_id))
            .filter(cards::language.eq(language))
            .order_by(cards::phrase_id.asc())
            .load::<CardRow>(self.conn)?;

        rows.into_iter().map(Card::try_from).collect()
    }

    fn save_card(&mut self, card: &Card) -> Result<Card, StoreError> {
        if card.version == 0 {
            let inserted = diesel::insert_into(cards::table)
                .values((
                    cards::user_id.eq(card.id.user_id),
                    cards::phrase_id.eq(card.id.phrase_id),
                    cards::language.eq(&card.language),
                    cards::status.eq(card.status.to_id()),
                    cards::interval_days.eq(card.interval_days),
                    cards::ease_factor.eq(card.ease_factor),
                    cards::consecutive_correct.eq(card.consecutive_correct),
                    cards::due_at.eq(card.due_at),
                    cards::created_at.eq(card.created_at),
                    cards::last_reviewed_at.eq(card.last_reviewed_at),
                    cards::version.eq(1),
                ))
                .execute(self.conn);

            return match inserted {
                Ok(_) => Ok(Card {
                    version: 1,
                    ..card.clone()
                }),
                // The record already exists: someone else created it first
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    Err(StoreError::Conflict)
                }
                Err(e) => Err(e.into()),
            };
        }

        let updated = diesel::update(
            cards::table
                .filter(cards::user_id.eq(card.id.user_id))
                .filter(cards::phrase_id.eq(card.id.phrase_id))
                .filter(cards::version.eq(card.version)),
        )
        .set((
            cards::status.eq(card.status.to_id()),
            cards::interval_days.eq(card.interval_days),
            cards::ease_factor.eq(card.ease_factor),
            cards::consecutive_correct.eq(card.consecutive_correct),
            cards::due_at.eq(card.due_at),
            cards::last_reviewed_at.eq(card.last_reviewed_at),
            cards::version.eq(card.version + 1),
        ))
        .execute(self.conn)?;

        if updated == 0 {
            return Err(StoreError::Conflict);
        }

        Ok(Card {
            version: card.version + 1,
            ..card.clone()
        })
    }

    fn decks_for_user(&mut self, user_id: i32) -> Result<Vec<DeckSummary>, StoreError> {
        use diesel::dsl::{count_star, min};

        let rows = cards::table
            .filter(cards::user_id.eq(user_id))
            .group_by(cards::language)
            .select((cards::language, count_star(), min(cards::created_at)))
            .order_by(cards::language.asc())
            .load::<(String, i64, Option<NaiveDateTime>)>(self.conn)?;

        Ok(rows
            .into_iter()
            .map(|(language, card_count, created_at)| DeckSummary {
                user_id,
                language,
                card_count,
                created_at,
            })
            .collect())
    }
}

impl ReviewEventLog for SqliteStore<'_> {
    fn append_event(&mut self, event: &ReviewEvent) -> Result<(), StoreError> {
        diesel::insert_into(review_events::table)
            .values((
                review_events::user_id.eq(event.card_id.user_id),
                review_events::phrase_id.eq(event.card_id.phrase_id),
                review_events::outcome.eq(event.outcome.to_id()),
                review_events::reviewed_at.eq(event.reviewed_at),
                review_events::interval_before.eq(event.interval_before),
                review_events::interval_after.eq(event.interval_after),
            ))
            .execute(self.conn)?;

        Ok(())
    }

    fn events_for_card(&mut self, id: CardId) -> Result<Vec<ReviewEvent>, StoreError> {
        let rows = review_events::table
            .filter(review_events::user_id.eq(id.user_id))
            .filter(review_events::phrase_id.eq(id.phrase_id))
            .order_by((review_events::reviewed_at.asc(), review_events::event_id.asc()))
            .load::<EventRow>(self.conn)?;

        rows.into_iter().map(ReviewEvent::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn test_conn() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").expect("in-memory sqlite");
        db::run_migrations(&mut conn).expect("migrations");
        conn
    }

    fn sample_card(user_id: i32, phrase_id: i32, language: &str) -> Card {
        Card {
            id: CardId::new(user_id, phrase_id),
            language: language.into(),
            status: CardStatus::Active,
            interval_days: 1,
            ease_factor: 2.5,
            consecutive_correct: 0,
            due_at: Some(at(2024, 1, 1)),
            created_at: at(2024, 1, 1),
            last_reviewed_at: None,
            version: 0,
        }
    }

    #[test]
    fn insert_and_fetch_roundtrip() {
        let mut conn = test_conn();
        let mut store = SqliteStore::new(&mut conn);

        let card = sample_card(1, 42, "zh");
        let saved = store.save_card(&card).unwrap();
        assert_eq!(saved.version, 1);

        let fetched = store.get_card(CardId::new(1, 42)).unwrap().unwrap();
        assert_eq!(fetched, saved);
    }

    #[test]
    fn missing_card_is_none() {
        let mut conn = test_conn();
        let mut store = SqliteStore::new(&mut conn);
        assert!(store.get_card(CardId::new(9, 9)).unwrap().is_none());
    }

    #[test]
    fn versioned_update_bumps_version() {
        let mut conn = test_conn();
        let mut store = SqliteStore::new(&mut conn);

        let saved = store.save_card(&sample_card(1, 42, "zh")).unwrap();

        let mut updated = saved.clone();
        updated.interval_days = 3;
        updated.last_reviewed_at = Some(at(2024, 1, 2));
        let persisted = store.save_card(&updated).unwrap();

        assert_eq!(persisted.version, 2);
        let fetched = store.get_card(saved.id).unwrap().unwrap();
        assert_eq!(fetched.interval_days, 3);
        assert_eq!(fetched.version, 2);
    }

    #[test]
    fn stale_version_is_a_conflict() {
        let mut conn = test_conn();
        let mut store = SqliteStore::new(&mut conn);

        let saved = store.save_card(&sample_card(1, 42, "zh")).unwrap();

        // First writer wins
        let mut first = saved.clone();
        first.interval_days = 3;
        store.save_card(&first).unwrap();

        // Second writer still holds version 1
        let mut second = saved.clone();
        second.interval_days = 9;
        let err = store.save_card(&second).unwrap_err();
        assert!(matches!(err, StoreError::Conflict));

        let fetched = store.get_card(saved.id).unwrap().unwrap();
        assert_eq!(fetched.interval_days, 3);
    }

    #[test]
    fn duplicate_insert_is_a_conflict() {
        let mut conn = test_conn();
        let mut store = SqliteStore::new(&mut conn);

        store.save_card(&sample_card(1, 42, "zh")).unwrap();
        let err = store.save_card(&sample_card(1, 42, "zh")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[test]
    fn cards_for_deck_scopes_by_user_and_language() {
        let mut conn = test_conn();
        let mut store = SqliteStore::new(&mut conn);

        store.save_card(&sample_card(1, 1, "zh")).unwrap();
        store.save_card(&sample_card(1, 2, "zh")).unwrap();
        store.save_card(&sample_card(1, 3, "fr")).unwrap();
        store.save_card(&sample_card(2, 4, "zh")).unwrap();

        let deck = store.cards_for_deck(1, "zh").unwrap();
        let ids: Vec<CardId> = deck.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![CardId::new(1, 1), CardId::new(1, 2)]);
    }

    #[test]
    fn decks_for_user_aggregates_by_language() {
        let mut conn = test_conn();
        let mut store = SqliteStore::new(&mut conn);

        let mut early = sample_card(1, 1, "zh");
        early.created_at = at(2023, 12, 1);
        store.save_card(&early).unwrap();
        store.save_card(&sample_card(1, 2, "zh")).unwrap();
        store.save_card(&sample_card(1, 3, "fr")).unwrap();

        let decks = store.decks_for_user(1).unwrap();
        assert_eq!(decks.len(), 2);
        assert_eq!(decks[0].language, "fr");
        assert_eq!(decks[0].card_count, 1);
        assert_eq!(decks[1].language, "zh");
        assert_eq!(decks[1].card_count, 2);
        assert_eq!(decks[1].created_at, Some(at(2023, 12, 1)));
    }

    #[test]
    fn events_append_and_read_back_in_order() {
        let mut conn = test_conn();
        let mut store = SqliteStore::new(&mut conn);

        let id = CardId::new(1, 42);
        let first = ReviewEvent {
            card_id: id,
            outcome: ReviewOutcome::Good,
            reviewed_at: at(2024, 1, 1),
            interval_before: 1,
            interval_after: 3,
        };
        let second = ReviewEvent {
            card_id: id,
            outcome: ReviewOutcome::Again,
            reviewed_at: at(2024, 1, 4),
            interval_before: 3,
            interval_after: 1,
        };

        // Append out of chronological order, read back sorted
        store.append_event(&second).unwrap();
        store.append_event(&first).unwrap();

        let history = store.events_for_card(id).unwrap();
        assert_eq!(history, vec![first, second]);
    }

    #[test]
    fn history_of_unknown_card_is_empty() {
        let mut conn = test_conn();
        let mut store = SqliteStore::new(&mut conn);
        assert!(store.events_for_card(CardId::new(5, 5)).unwrap().is_empty());
    }
}
