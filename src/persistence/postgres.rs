//! PostgreSQL implementation of the user store backing.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::AccountRow;
use crate::domain::Account;
use crate::error::GatewayError;

/// Row tuple as selected from `accounts`.
type AccountTuple = (
    String,
    String,
    String,
    serde_json::Value,
    serde_json::Value,
    DateTime<Utc>,
);

/// PostgreSQL-backed account persistence using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Creates a persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` with at most `max_connections`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the database is
    /// unreachable.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(database_url)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Creates the `accounts` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), GatewayError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS accounts ( \
                email TEXT PRIMARY KEY, \
                password TEXT NOT NULL, \
                session_token TEXT NOT NULL, \
                subscribed_tickers JSONB NOT NULL DEFAULT '[]'::jsonb, \
                history JSONB NOT NULL DEFAULT '[]'::jsonb, \
                created_at TIMESTAMPTZ NOT NULL, \
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now() \
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Loads every stored account.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure or
    /// if a row cannot be decoded.
    pub async fn load_accounts(&self) -> Result<Vec<Account>, GatewayError> {
        let rows = sqlx::query_as::<_, AccountTuple>(
            "SELECT email, password, session_token, subscribed_tickers, history, created_at \
             FROM accounts ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        rows.into_iter()
            .map(
                |(email, password, session_token, subscribed_tickers, history, created_at)| {
                    AccountRow {
                        email,
                        password,
                        session_token,
                        subscribed_tickers,
                        history,
                        created_at,
                    }
                    .into_account()
                },
            )
            .collect()
    }

    /// Inserts or replaces one account.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn upsert_account(&self, account: &Account) -> Result<(), GatewayError> {
        let row = AccountRow::from_account(account)?;
        sqlx::query(
            "INSERT INTO accounts \
                (email, password, session_token, subscribed_tickers, history, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (email) DO UPDATE SET \
                password = EXCLUDED.password, \
                session_token = EXCLUDED.session_token, \
                subscribed_tickers = EXCLUDED.subscribed_tickers, \
                history = EXCLUDED.history, \
                updated_at = now()",
        )
        .bind(&row.email)
        .bind(&row.password)
        .bind(&row.session_token)
        .bind(&row.subscribed_tickers)
        .bind(&row.history)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }
}
