//! Ledger error types
//!
//! The taxonomy is deliberately small so callers can pattern-match
//! exhaustively: business rule violations, ownership failures, and balance
//! shortfalls are distinct, and everything store-level collapses into
//! `Database` which is never exposed to callers in detail.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Amount out of bounds or unparsable, card not found, same-card
    /// transfer, inactive card, daily cap exceeded.
    #[error("{0}")]
    BusinessRule(String),

    /// Caller does not own the source card.
    #[error("{0}")]
    Forbidden(String),

    /// Balance cannot cover amount plus fee.
    #[error("Not enough balance to cover amount and fee")]
    InsufficientFunds,

    /// Store-level failure (connection loss, lock timeout, constraint
    /// violation). The atomic scope has been rolled back.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LedgerError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            LedgerError::Forbidden(_) => "FORBIDDEN",
            LedgerError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            LedgerError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Whether the failure is attributable to the caller's request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, LedgerError::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::BusinessRule("x".into()).code(),
            "BUSINESS_RULE_VIOLATION"
        );
        assert_eq!(LedgerError::Forbidden("x".into()).code(), "FORBIDDEN");
        assert_eq!(LedgerError::InsufficientFunds.code(), "INSUFFICIENT_FUNDS");
        assert_eq!(
            LedgerError::Database(sqlx::Error::RowNotFound).code(),
            "DATABASE_ERROR"
        );
    }

    #[test]
    fn test_client_error_split() {
        assert!(LedgerError::InsufficientFunds.is_client_error());
        assert!(LedgerError::BusinessRule("x".into()).is_client_error());
        assert!(!LedgerError::Database(sqlx::Error::RowNotFound).is_client_error());
    }
}
