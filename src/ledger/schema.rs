//! Ledger schema bootstrap
//!
//! DDL for the two tables the core owns. Production deployments run
//! migrations instead; this is for tests and fresh local databases.

use anyhow::Result;
use sqlx::PgPool;

pub const CREATE_CARDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS cards (
    id          BIGSERIAL PRIMARY KEY,
    card_number VARCHAR(16) NOT NULL UNIQUE,
    user_id     BIGINT NOT NULL,
    balance     NUMERIC(18, 2) NOT NULL DEFAULT 0,
    is_active   BOOLEAN NOT NULL DEFAULT TRUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

pub const CREATE_TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id             BIGSERIAL PRIMARY KEY,
    source_card_id BIGINT NOT NULL REFERENCES cards(id),
    dest_card_id   BIGINT REFERENCES cards(id),
    amount         NUMERIC(18, 2) NOT NULL CHECK (amount > 0),
    fee            NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (fee >= 0),
    status         VARCHAR(10) NOT NULL,
    description    TEXT,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

// Serves both the daily-cap window scan and the fee-income range scan
pub const CREATE_TRANSACTIONS_SOURCE_IDX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_transactions_source_created
    ON transactions (source_card_id, created_at)
"#;

/// Create the ledger tables if they do not exist
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing ledger schema");

    sqlx::query(CREATE_CARDS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create cards table: {}", e))?;

    sqlx::query(CREATE_TRANSACTIONS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create transactions table: {}", e))?;

    sqlx::query(CREATE_TRANSACTIONS_SOURCE_IDX)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create transactions index: {}", e))?;

    Ok(())
}
