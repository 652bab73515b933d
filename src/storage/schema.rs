//! Database schema definitions
//!
//! This module contains the SQL schema for the Wheel-Harvest run ledger.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Terminal state of every site a run touched
CREATE TABLE IF NOT EXISTS site_outcomes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    site TEXT NOT NULL,
    state TEXT NOT NULL,
    products INTEGER NOT NULL DEFAULT 0,
    failed_urls INTEGER NOT NULL DEFAULT 0,
    reason TEXT,
    resumed INTEGER NOT NULL DEFAULT 0,
    recorded_at TEXT NOT NULL,
    UNIQUE(run_id, site)
);

CREATE INDEX IF NOT EXISTS idx_site_outcomes_run ON site_outcomes(run_id);
CREATE INDEX IF NOT EXISTS idx_site_outcomes_state ON site_outcomes(state);
"#;

/// Initializes the database schema
///
/// Safe to call on an existing database.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
