//! Trade Storage Service
//!
//! SQLite-based storage for confirmed trade records. This is the upstream
//! data source the aggregation layer reads from: queries return records
//! newest-first with a caller-supplied limit, and the aggregator re-derives
//! chronological order itself.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::debug;

use plp_core::{TradeRecord, VoteType};

/// Trade record storage using SQLite
pub struct TradeStorage {
    conn: Mutex<Connection>,
}

impl TradeStorage {
    /// Create a new TradeStorage instance
    ///
    /// Creates the database file and tables if they don't exist.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, TradeStorageError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TradeStorageError::Io(format!("Failed to create database directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path).map_err(TradeStorageError::Database)?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;

        Ok(storage)
    }

    /// Create an in-memory TradeStorage (useful for testing)
    pub fn new_in_memory() -> Result<Self, TradeStorageError> {
        let conn = Connection::open_in_memory().map_err(TradeStorageError::Database)?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;

        Ok(storage)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<(), TradeStorageError> {
        let conn = self.conn.lock().map_err(|_| TradeStorageError::LockError)?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS trades (
                signature TEXT PRIMARY KEY,
                market_id TEXT NOT NULL,
                trader_wallet TEXT NOT NULL,
                vote_type TEXT NOT NULL,
                amount INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_trades_market_created
            ON trades(market_id, created_at);
            "#,
        )
        .map_err(TradeStorageError::Database)?;

        Ok(())
    }

    /// Store a single trade record
    ///
    /// Idempotent on signature: re-storing the same confirmed transaction
    /// replaces the existing row.
    pub fn store_trade(&self, record: &TradeRecord) -> Result<(), TradeStorageError> {
        let conn = self.conn.lock().map_err(|_| TradeStorageError::LockError)?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO trades (signature, market_id, trader_wallet, vote_type, amount, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.signature,
                record.market_id,
                record.trader_wallet,
                record.vote_type.as_str(),
                record.amount,
                record.created_at.timestamp_millis(),
            ],
        )
        .map_err(TradeStorageError::Database)?;

        Ok(())
    }

    /// Store multiple trade records, skipping signatures already present
    ///
    /// Returns the number of rows written.
    pub fn store_trades(&self, records: &[TradeRecord]) -> Result<usize, TradeStorageError> {
        let conn = self.conn.lock().map_err(|_| TradeStorageError::LockError)?;

        let mut stored = 0;
        for record in records {
            let inserted = conn
                .execute(
                    r#"
                    INSERT OR IGNORE INTO trades (signature, market_id, trader_wallet, vote_type, amount, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        record.signature,
                        record.market_id,
                        record.trader_wallet,
                        record.vote_type.as_str(),
                        record.amount,
                        record.created_at.timestamp_millis(),
                    ],
                )
                .map_err(TradeStorageError::Database)?;

            stored += inserted;
        }

        debug!("Stored {} of {} trade records", stored, records.len());

        Ok(stored)
    }

    /// Get the most recent trades for a market, newest first
    pub fn recent_trades(
        &self,
        market_id: &str,
        limit: u32,
    ) -> Result<Vec<TradeRecord>, TradeStorageError> {
        let conn = self.conn.lock().map_err(|_| TradeStorageError::LockError)?;

        let mut stmt = conn
            .prepare(
                r#"
            SELECT signature, market_id, trader_wallet, vote_type, amount, created_at
            FROM trades
            WHERE market_id = ?1
            ORDER BY created_at DESC, signature DESC
            LIMIT ?2
            "#,
            )
            .map_err(TradeStorageError::Database)?;

        let rows = stmt
            .query_map(params![market_id, limit], |row| {
                let signature: String = row.get(0)?;
                let market_id: String = row.get(1)?;
                let trader_wallet: String = row.get(2)?;
                let vote_type: String = row.get(3)?;
                let amount: i64 = row.get(4)?;
                let created_at: i64 = row.get(5)?;

                Ok((signature, market_id, trader_wallet, vote_type, amount, created_at))
            })
            .map_err(TradeStorageError::Database)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(TradeStorageError::Database)?;

        let mut records = Vec::with_capacity(rows.len());
        for (signature, market_id, trader_wallet, vote_type, amount, created_at) in rows {
            let vote_type = VoteType::from_str(&vote_type).map_err(|_| {
                TradeStorageError::Corrupt(format!(
                    "trade {} has unknown vote type {:?}",
                    signature, vote_type
                ))
            })?;
            let created_at = DateTime::<Utc>::from_timestamp_millis(created_at).ok_or_else(|| {
                TradeStorageError::Corrupt(format!(
                    "trade {} has out-of-range timestamp {}",
                    signature, created_at
                ))
            })?;

            records.push(TradeRecord {
                signature,
                market_id,
                trader_wallet,
                vote_type,
                amount,
                created_at,
            });
        }

        Ok(records)
    }

    /// Get the total number of trades recorded for a market
    pub fn trade_count(&self, market_id: &str) -> Result<usize, TradeStorageError> {
        let conn = self.conn.lock().map_err(|_| TradeStorageError::LockError)?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM trades WHERE market_id = ?1",
                params![market_id],
                |row| row.get(0),
            )
            .map_err(TradeStorageError::Database)?;

        Ok(count as usize)
    }

    /// Check if a trade signature has already been recorded
    pub fn trade_exists(&self, signature: &str) -> Result<bool, TradeStorageError> {
        let conn = self.conn.lock().map_err(|_| TradeStorageError::LockError)?;

        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM trades WHERE signature = ?1)",
                params![signature],
                |row| row.get(0),
            )
            .map_err(TradeStorageError::Database)?;

        Ok(exists)
    }
}

/// Errors that can occur during trade storage operations
#[derive(Debug, thiserror::Error)]
pub enum TradeStorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Failed to acquire lock")]
    LockError,
}
