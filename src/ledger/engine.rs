//! Funds-movement engine
//!
//! Orchestrates validation, locking, fee calculation, balance mutation, and
//! record creation for withdrawals and transfers as atomic units. Each
//! operation is a single linear pipeline:
//!
//! ```text
//! parse amount -> begin tx -> lock rows -> authorize -> active check
//!   -> daily cap -> fee -> funds check -> insert record -> apply deltas
//!   -> commit
//! ```
//!
//! The engine owns the atomic scope entirely. Any failure after `begin`
//! drops the open transaction, which rolls back every staged write; the
//! caller only ever sees a committed record or a typed error. The engine
//! never retries internally.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::db::Database;

use super::card_store::CardStore;
use super::error::LedgerError;
use super::fee::{self, CARD_DAILY_CAP, MAX_TX, MIN_TX};
use super::models::{TransactionActivity, TransactionRecord, TxStatus};
use super::tx_store::TxStore;

/// Funds-movement engine over a shared ledger store
pub struct FundsEngine {
    db: Arc<Database>,
}

impl FundsEngine {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Withdraw `amount` from a card to an external payout.
    ///
    /// The raw amount string is parsed and bound-checked before any store
    /// access. The created record has no destination card.
    pub async fn withdraw(
        &self,
        card_number: &str,
        amount: &str,
        description: Option<&str>,
        user_id: i64,
    ) -> Result<TransactionRecord, LedgerError> {
        let amount = parse_amount(amount)?;

        let mut tx = self.db.pool().begin().await?;

        let card = CardStore::lock_by_number(&mut *tx, card_number)
            .await?
            .ok_or_else(|| LedgerError::BusinessRule("Card not found".to_string()))?;

        if card.user_id != user_id {
            return Err(LedgerError::Forbidden(
                "Card does not belong to the current user".to_string(),
            ));
        }
        if !card.is_active {
            return Err(LedgerError::BusinessRule("Card not active".to_string()));
        }

        check_daily_cap(&mut tx, card.id, amount).await?;

        let fee = fee::calc_fee(amount);
        let total_debit = amount + fee;
        if card.balance < total_debit {
            return Err(LedgerError::InsufficientFunds);
        }

        let record = TxStore::insert(
            &mut *tx,
            card.id,
            None,
            amount,
            fee,
            TxStatus::Success,
            description,
        )
        .await?;
        CardStore::adjust_balance(&mut *tx, card.id, -total_debit).await?;

        tx.commit().await?;

        tracing::info!(
            tx_id = record.id,
            card_id = card.id,
            %amount,
            %fee,
            "withdrawal committed"
        );
        Ok(record)
    }

    /// Transfer `amount` between two cards.
    ///
    /// The destination receives the full amount; the fee is retained by the
    /// operator on top of the source debit. Any active destination card is a
    /// valid target, ownership is only enforced on the source.
    pub async fn transfer(
        &self,
        source_card_number: &str,
        dest_card_number: &str,
        amount: &str,
        description: Option<&str>,
        user_id: i64,
    ) -> Result<TransactionRecord, LedgerError> {
        let amount = parse_amount(amount)?;

        if source_card_number == dest_card_number {
            return Err(LedgerError::BusinessRule(
                "Cannot transfer money to the same card".to_string(),
            ));
        }

        let mut tx = self.db.pool().begin().await?;

        // Unlocked resolve of numbers to ids; the ordered pair lock below
        // re-fetches both rows under lock.
        let src = CardStore::get_by_number(&mut *tx, source_card_number).await?;
        let dst = CardStore::get_by_number(&mut *tx, dest_card_number).await?;
        let (src, dst) = match (src, dst) {
            (Some(s), Some(d)) => (s, d),
            _ => {
                return Err(LedgerError::BusinessRule(
                    "Source or destination card not found".to_string(),
                ));
            }
        };

        let (src, dst) = CardStore::lock_pair_by_id(&mut *tx, src.id, dst.id)
            .await?
            .ok_or_else(|| {
                LedgerError::BusinessRule("Source or destination card not found".to_string())
            })?;

        if src.user_id != user_id {
            return Err(LedgerError::Forbidden(
                "Source card does not belong to the current user".to_string(),
            ));
        }
        if !src.is_active || !dst.is_active {
            return Err(LedgerError::BusinessRule(
                "One of cards is not active".to_string(),
            ));
        }

        check_daily_cap(&mut tx, src.id, amount).await?;

        let fee = fee::calc_fee(amount);
        let total_debit = amount + fee;
        if src.balance < total_debit {
            return Err(LedgerError::InsufficientFunds);
        }

        let record = TxStore::insert(
            &mut *tx,
            src.id,
            Some(dst.id),
            amount,
            fee,
            TxStatus::Success,
            description,
        )
        .await?;
        CardStore::adjust_balance(&mut *tx, src.id, -total_debit).await?;
        CardStore::adjust_balance(&mut *tx, dst.id, amount).await?;

        tx.commit().await?;

        tracing::info!(
            tx_id = record.id,
            source_card_id = src.id,
            dest_card_id = dst.id,
            %amount,
            %fee,
            "transfer committed"
        );
        Ok(record)
    }

    /// Total fee revenue over successful transactions, optionally filtered
    /// by inclusive date range and/or a single transaction id.
    ///
    /// Pure read; safe to run concurrently with movement operations.
    pub async fn fee_income(
        &self,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
        tx_id: Option<i64>,
    ) -> Result<Decimal, LedgerError> {
        Ok(TxStore::fee_income(self.db.pool(), date_from, date_to, tx_id).await?)
    }

    /// Recent transactions touching any of the user's cards, newest first.
    pub async fn recent_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<TransactionActivity>, LedgerError> {
        Ok(TxStore::recent_for_user(self.db.pool(), user_id, limit).await?)
    }
}

/// Parse a raw amount string into an exact decimal and bound-check it.
/// Runs before the atomic scope opens; failures never touch the store.
fn parse_amount(raw: &str) -> Result<Decimal, LedgerError> {
    let amount: Decimal = raw
        .trim()
        .parse()
        .map_err(|_| LedgerError::BusinessRule("Invalid amount format".to_string()))?;

    if amount < Decimal::from(MIN_TX) || amount > Decimal::from(MAX_TX) {
        return Err(LedgerError::BusinessRule(format!(
            "Amount must be between {} and {} Tomans",
            MIN_TX, MAX_TX
        )));
    }
    Ok(amount)
}

/// The UTC calendar day containing `now`, as `[midnight, next midnight)`.
/// Calendar-aligned, not a rolling 24h window.
fn utc_day_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Fail if the card's successful outgoing total for today, including the
/// amount being created, would exceed the daily cap.
async fn check_daily_cap(
    conn: &mut PgConnection,
    card_id: i64,
    amount: Decimal,
) -> Result<(), LedgerError> {
    let (start, end) = utc_day_window(Utc::now());
    let spent = CardStore::daily_outgoing_total(&mut *conn, card_id, start, end).await?;

    if spent + amount > Decimal::from(CARD_DAILY_CAP) {
        tracing::debug!(card_id, %spent, %amount, "daily cap exceeded");
        return Err(LedgerError::BusinessRule(
            "Card daily limit exceeded".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_amount_bounds() {
        assert!(parse_amount("1000").is_ok());
        assert!(parse_amount("50000000").is_ok());
        assert!(parse_amount(" 2500 ").is_ok());

        assert!(matches!(
            parse_amount("999"),
            Err(LedgerError::BusinessRule(_))
        ));
        assert!(matches!(
            parse_amount("50000001"),
            Err(LedgerError::BusinessRule(_))
        ));
    }

    #[test]
    fn test_parse_amount_format() {
        assert!(matches!(
            parse_amount("abc"),
            Err(LedgerError::BusinessRule(_))
        ));
        assert!(matches!(
            parse_amount("12.5x"),
            Err(LedgerError::BusinessRule(_))
        ));
        assert!(matches!(parse_amount(""), Err(LedgerError::BusinessRule(_))));
    }

    #[test]
    fn test_parse_amount_exact_decimal() {
        // Fractional Tomans are in bounds as long as the value is; the fee
        // policy truncates, the parser does not.
        assert_eq!(
            parse_amount("1000.50").unwrap(),
            Decimal::new(100_050, 2)
        );
    }

    #[test]
    fn test_utc_day_window_alignment() {
        let now = Utc.with_ymd_and_hms(2026, 8, 24, 13, 45, 12).unwrap();
        let (start, end) = utc_day_window(now);

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 24, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 8, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_utc_day_window_at_midnight() {
        let midnight = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let (start, end) = utc_day_window(midnight);

        assert_eq!(start, midnight);
        assert_eq!(end - start, Duration::days(1));
    }
}
