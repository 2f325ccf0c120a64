//! Typed rows for the card ledger

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Transaction status
///
/// The funds-movement engine only ever writes `Success`: every pipeline that
/// reaches record creation has already passed all validations. `Failed` and
/// `Pending` stay in the domain for reporting over externally-settled rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxStatus {
    Success,
    Failed,
    Pending,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Success => "SUCCESS",
            TxStatus::Failed => "FAILED",
            TxStatus::Pending => "PENDING",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SUCCESS" => Some(TxStatus::Success),
            "FAILED" => Some(TxStatus::Failed),
            "PENDING" => Some(TxStatus::Pending),
            _ => None,
        }
    }
}

/// A balance-holding card, owned by exactly one user
///
/// Mutated only through `CardStore::adjust_balance` while the row is held
/// under an exclusive lock.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: i64,
    pub card_number: String,
    pub user_id: i64,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// An immutable movement record
///
/// `dest_card_id` is `None` for withdrawals (external payout). The fee is
/// computed by the engine, never caller-supplied.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub source_card_id: i64,
    pub dest_card_id: Option<i64>,
    pub amount: Decimal,
    pub fee: Decimal,
    pub status: TxStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A movement record joined with the card numbers involved, for the
/// recent-activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionActivity {
    pub id: i64,
    pub source_card_number: String,
    pub dest_card_number: Option<String>,
    pub amount: Decimal,
    pub fee: Decimal,
    pub status: TxStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [TxStatus::Success, TxStatus::Failed, TxStatus::Pending] {
            assert_eq!(TxStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_unknown() {
        assert_eq!(TxStatus::from_str("success"), None);
        assert_eq!(TxStatus::from_str(""), None);
        assert_eq!(TxStatus::from_str("CANCELLED"), None);
    }
}
