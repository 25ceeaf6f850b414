//! Database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_quotes", CREATE_QUOTES_TABLE)?;
    run_migration(conn, "002_instrument_index", CREATE_INDEX_TABLE)?;
    run_migration(conn, "003_popularity", CREATE_POPULARITY_TABLE)?;

    tracing::info!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_QUOTES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS quotes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    instrument_id TEXT NOT NULL,
    symbol TEXT,
    ask_price TEXT,
    ask_size INTEGER,
    bid_price TEXT,
    bid_size INTEGER,
    last_trade_price TEXT,
    last_extended_hours_trade_price TEXT,
    previous_close TEXT,
    updated_at TEXT,
    UNIQUE(instrument_id, updated_at)
);
CREATE INDEX IF NOT EXISTS idx_quotes_instrument ON quotes(instrument_id);
"#;

const CREATE_INDEX_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS instrument_index (
    instrument_id TEXT PRIMARY KEY,
    timestamp TEXT NOT NULL,
    has_traded INTEGER,
    updated_at TEXT,
    trading_halted INTEGER
);
"#;

const CREATE_POPULARITY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS popularity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    instrument_id TEXT NOT NULL,
    popularity INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_popularity_instrument ON popularity(instrument_id);
"#;
