//! Transaction record operations
//!
//! Records are append-only: the engine inserts exactly one row per
//! successful movement and nothing in this crate ever updates or deletes
//! one. Aggregates run over committed rows only, without locking.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

use super::models::{TransactionActivity, TransactionRecord, TxStatus};

/// Transaction record repository
pub struct TxStore;

impl TxStore {
    /// Durably append a movement record and return it with its assigned id
    /// and timestamp.
    pub async fn insert<'e, E>(
        executor: E,
        source_card_id: i64,
        dest_card_id: Option<i64>,
        amount: Decimal,
        fee: Decimal,
        status: TxStatus,
        description: Option<&str>,
    ) -> Result<TransactionRecord, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row = sqlx::query(
            r#"INSERT INTO transactions (source_card_id, dest_card_id, amount, fee, status, description)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, source_card_id, dest_card_id, amount, fee, status, description, created_at"#,
        )
        .bind(source_card_id)
        .bind(dest_card_id)
        .bind(amount)
        .bind(fee)
        .bind(status.as_str())
        .bind(description)
        .fetch_one(executor)
        .await?;

        row_to_record(&row)
    }

    /// Sum of fees over successful transactions matching the optional
    /// filters; zero if none match.
    ///
    /// Both date bounds are inclusive. This differs from the daily-cap
    /// window's exclusive upper bound on purpose.
    pub async fn fee_income<'e, E>(
        executor: E,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
        tx_id: Option<i64>,
    ) -> Result<Decimal, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            r#"SELECT COALESCE(SUM(fee), 0)
               FROM transactions
               WHERE status = 'SUCCESS'
                 AND ($1::bigint IS NULL OR id = $1)
                 AND ($2::timestamptz IS NULL OR created_at >= $2)
                 AND ($3::timestamptz IS NULL OR created_at <= $3)"#,
        )
        .bind(tx_id)
        .bind(date_from)
        .bind(date_to)
        .fetch_one(executor)
        .await
    }

    /// Latest transactions touching any card owned by the user, newest
    /// first, joined with the card numbers involved. The destination join is
    /// LEFT because withdrawals have no destination card.
    pub async fn recent_for_user<'e, E>(
        executor: E,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<TransactionActivity>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rows = sqlx::query(
            r#"SELECT t.id, t.amount, t.fee, t.status, t.description, t.created_at,
                      sc.card_number AS source_card_number,
                      dc.card_number AS dest_card_number
               FROM transactions t
               JOIN cards sc ON t.source_card_id = sc.id
               LEFT JOIN cards dc ON t.dest_card_id = dc.id
               WHERE sc.user_id = $1 OR dc.user_id = $1
               ORDER BY t.created_at DESC
               LIMIT $2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        let mut activity = Vec::with_capacity(rows.len());
        for row in &rows {
            activity.push(TransactionActivity {
                id: row.try_get("id")?,
                source_card_number: row.try_get("source_card_number")?,
                dest_card_number: row.try_get("dest_card_number")?,
                amount: row.try_get("amount")?,
                fee: row.try_get("fee")?,
                status: status_from_row(row)?,
                description: row.try_get("description")?,
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(activity)
    }
}

fn status_from_row(row: &PgRow) -> Result<TxStatus, sqlx::Error> {
    let raw: String = row.try_get("status")?;
    TxStatus::from_str(&raw).ok_or_else(|| {
        sqlx::Error::Decode(format!("unknown transaction status: {raw}").into())
    })
}

pub(crate) fn row_to_record(row: &PgRow) -> Result<TransactionRecord, sqlx::Error> {
    Ok(TransactionRecord {
        id: row.try_get("id")?,
        source_card_id: row.try_get("source_card_id")?,
        dest_card_id: row.try_get("dest_card_id")?,
        amount: row.try_get("amount")?,
        fee: row.try_get("fee")?,
        status: status_from_row(row)?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}
