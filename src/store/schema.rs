//! Schema bootstrap for the wallet ledger tables.
//!
//! Applied at startup with `CREATE TABLE IF NOT EXISTS`; existing data is
//! never touched. The `users`, `bookings` and `properties` tables are owned
//! by the marketplace CRUD service — they are created here only so a fresh
//! development database is usable end to end.

use sqlx::PgPool;

const CREATE_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS wallet_accounts (
    account_no  VARCHAR(10) PRIMARY KEY,
    user_id     BIGINT      NOT NULL UNIQUE,
    balance     NUMERIC     NOT NULL DEFAULT 0 CHECK (balance >= 0),
    deposit     NUMERIC     NOT NULL DEFAULT 0 CHECK (deposit >= 0),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

const CREATE_FROZEN_DEPOSITS: &str = r#"
CREATE TABLE IF NOT EXISTS frozen_deposits (
    id            VARCHAR(64) PRIMARY KEY,
    account_no    VARCHAR(10) NOT NULL REFERENCES wallet_accounts(account_no),
    booking_id    VARCHAR(64) NOT NULL,
    frozen_amount NUMERIC     NOT NULL DEFAULT 0 CHECK (frozen_amount >= 0),
    status        VARCHAR(16) NOT NULL DEFAULT 'frozen',
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (account_no, booking_id)
)"#;

const CREATE_TRANSACTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS wallet_transactions (
    tx_id            VARCHAR(64) PRIMARY KEY,
    user_id          BIGINT      NOT NULL,
    kind             VARCHAR(32) NOT NULL,
    amount           NUMERIC     NOT NULL,
    tx_ref           VARCHAR(64) NOT NULL UNIQUE,
    status           VARCHAR(16) NOT NULL DEFAULT 'pending',
    payment_url      TEXT,
    payment_provider VARCHAR(32),
    from_account_no  VARCHAR(10),
    to_account_no    VARCHAR(10),
    seen             BOOLEAN     NOT NULL DEFAULT FALSE,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

const CREATE_TRANSACTIONS_USER_IDX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_wallet_transactions_user
    ON wallet_transactions (user_id, created_at DESC)"#;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id      BIGSERIAL    PRIMARY KEY,
    email        VARCHAR(255) NOT NULL UNIQUE,
    display_name VARCHAR(255) NOT NULL,
    created_at   TIMESTAMPTZ  NOT NULL DEFAULT now()
)"#;

const CREATE_BOOKINGS: &str = r#"
CREATE TABLE IF NOT EXISTS bookings (
    booking_id  VARCHAR(64) PRIMARY KEY,
    property_id VARCHAR(64) NOT NULL,
    tenant_id   BIGINT      NOT NULL,
    owner_id    BIGINT      NOT NULL,
    start_date  DATE        NOT NULL,
    end_date    DATE        NOT NULL,
    approval    VARCHAR(16) NOT NULL DEFAULT 'pending',
    status      VARCHAR(16) NOT NULL DEFAULT 'pending',
    total_price NUMERIC     NOT NULL
)"#;

const CREATE_PROPERTIES: &str = r#"
CREATE TABLE IF NOT EXISTS properties (
    property_id VARCHAR(64) PRIMARY KEY,
    owner_id    BIGINT      NOT NULL,
    quantity    INTEGER     NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    verified    BOOLEAN     NOT NULL DEFAULT FALSE
)"#;

/// Create all ledger tables that do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Ensuring wallet ledger schema...");

    for (name, ddl) in [
        ("wallet_accounts", CREATE_ACCOUNTS),
        ("frozen_deposits", CREATE_FROZEN_DEPOSITS),
        ("wallet_transactions", CREATE_TRANSACTIONS),
        ("idx_wallet_transactions_user", CREATE_TRANSACTIONS_USER_IDX),
        ("users", CREATE_USERS),
        ("bookings", CREATE_BOOKINGS),
        ("properties", CREATE_PROPERTIES),
    ] {
        sqlx::query(ddl).execute(pool).await.map_err(|e| {
            tracing::error!("Failed to create {}: {}", name, e);
            e
        })?;
    }

    tracing::info!("Wallet ledger schema ready");
    Ok(())
}
