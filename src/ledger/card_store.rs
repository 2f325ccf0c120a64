//! Card row operations
//!
//! Every function is a single SQL statement generic over the executor, so
//! the engine can run locking and mutation against its open transaction and
//! plain reads against the pool. Lock acquisition for a pair of cards is
//! always ascending by id, independent of the source/destination roles; this
//! is the sole deadlock-avoidance mechanism for concurrent transfers over
//! the same pair.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

use super::error::LedgerError;
use super::models::Card;

/// Card repository
pub struct CardStore;

impl CardStore {
    /// Get a card by its opaque id
    pub async fn get_by_id<'e, E>(executor: E, card_id: i64) -> Result<Option<Card>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row = sqlx::query(
            r#"SELECT id, card_number, user_id, balance, is_active, created_at
               FROM cards WHERE id = $1"#,
        )
        .bind(card_id)
        .fetch_optional(executor)
        .await?;

        row.as_ref().map(row_to_card).transpose()
    }

    /// Get a card by its external card number
    pub async fn get_by_number<'e, E>(
        executor: E,
        card_number: &str,
    ) -> Result<Option<Card>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row = sqlx::query(
            r#"SELECT id, card_number, user_id, balance, is_active, created_at
               FROM cards WHERE card_number = $1"#,
        )
        .bind(card_number)
        .fetch_optional(executor)
        .await?;

        row.as_ref().map(row_to_card).transpose()
    }

    /// List all cards owned by a user
    pub async fn list_by_user<'e, E>(executor: E, user_id: i64) -> Result<Vec<Card>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rows = sqlx::query(
            r#"SELECT id, card_number, user_id, balance, is_active, created_at
               FROM cards WHERE user_id = $1 ORDER BY id"#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        rows.iter().map(row_to_card).collect()
    }

    /// Create a new card with zero balance
    ///
    /// Card creation belongs to the registration flow, not the movement
    /// pipelines; it lives here because the store owns all card row access.
    pub async fn create<'e, E>(
        executor: E,
        user_id: i64,
        card_number: &str,
    ) -> Result<Card, LedgerError>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"INSERT INTO cards (user_id, card_number, balance, is_active)
               VALUES ($1, $2, 0, TRUE)
               RETURNING id, card_number, user_id, balance, is_active, created_at"#,
        )
        .bind(user_id)
        .bind(card_number)
        .fetch_one(executor)
        .await;

        match result {
            Ok(row) => Ok(row_to_card(&row)?),
            Err(sqlx::Error::Database(db))
                if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                Err(LedgerError::BusinessRule(
                    "Card number already exists".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a card by number holding an exclusive row lock for the duration
    /// of the enclosing transaction. Blocks if a concurrent transaction
    /// already holds the lock.
    pub async fn lock_by_number<'e, E>(
        executor: E,
        card_number: &str,
    ) -> Result<Option<Card>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row = sqlx::query(
            r#"SELECT id, card_number, user_id, balance, is_active, created_at
               FROM cards WHERE card_number = $1 FOR UPDATE"#,
        )
        .bind(card_number)
        .fetch_optional(executor)
        .await?;

        row.as_ref().map(row_to_card).transpose()
    }

    /// Lock two cards in ascending-id order and return them re-mapped to
    /// (id1's card, id2's card).
    ///
    /// Any two concurrent transfers touching the same pair request locks in
    /// the same order, so no lock cycle can form. Returns `None` if either
    /// id does not resolve.
    pub async fn lock_pair_by_id<'e, E>(
        executor: E,
        id1: i64,
        id2: i64,
    ) -> Result<Option<(Card, Card)>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rows = sqlx::query(
            r#"SELECT id, card_number, user_id, balance, is_active, created_at
               FROM cards WHERE id = ANY($1) ORDER BY id FOR UPDATE"#,
        )
        .bind(vec![id1.min(id2), id1.max(id2)])
        .fetch_all(executor)
        .await?;

        if rows.len() != 2 {
            return Ok(None);
        }

        let mut first = row_to_card(&rows[0])?;
        let mut second = row_to_card(&rows[1])?;
        if first.id != id1 {
            std::mem::swap(&mut first, &mut second);
        }
        Ok(Some((first, second)))
    }

    /// Atomically apply `balance += delta` to a locked row, returning the
    /// new balance. `delta` may be negative.
    pub async fn adjust_balance<'e, E>(
        executor: E,
        card_id: i64,
        delta: Decimal,
    ) -> Result<Decimal, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row =
            sqlx::query("UPDATE cards SET balance = balance + $1 WHERE id = $2 RETURNING balance")
                .bind(delta)
                .bind(card_id)
                .fetch_one(executor)
                .await?;

        row.try_get("balance")
    }

    /// Sum of successful outgoing amounts for a source card within
    /// `[window_start, window_end)`. Zero if none.
    pub async fn daily_outgoing_total<'e, E>(
        executor: E,
        card_id: i64,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Decimal, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            r#"SELECT COALESCE(SUM(amount), 0)
               FROM transactions
               WHERE source_card_id = $1
                 AND status = 'SUCCESS'
                 AND created_at >= $2
                 AND created_at < $3"#,
        )
        .bind(card_id)
        .bind(window_start)
        .bind(window_end)
        .fetch_one(executor)
        .await
    }
}

pub(crate) fn row_to_card(row: &PgRow) -> Result<Card, sqlx::Error> {
    Ok(Card {
        id: row.try_get("id")?,
        card_number: row.try_get("card_number")?,
        user_id: row.try_get("user_id")?,
        balance: row.try_get("balance")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}
