//! SQLite ledger implementation
//!
//! This module provides a SQLite-based implementation of the Ledger trait.

use crate::state::SiteState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Ledger, LedgerError, LedgerResult};
use crate::storage::{RunRecord, RunStatus, SiteOutcome, SiteOutcomeRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite ledger backend
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Creates a new SqliteLedger instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteLedger)` - Successfully opened/created database
    /// * `Err(LedgerError)` - Failed to open database
    pub fn new(path: &Path) -> LedgerResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
    })
}

fn outcome_from_row(row: &Row<'_>) -> rusqlite::Result<SiteOutcomeRecord> {
    Ok(SiteOutcomeRecord {
        run_id: row.get(0)?,
        outcome: SiteOutcome {
            site: row.get(1)?,
            state: SiteState::from_db_string(&row.get::<_, String>(2)?)
                .unwrap_or(SiteState::Failed),
            products: row.get::<_, i64>(3)?.max(0) as u64,
            failed_urls: row.get::<_, i64>(4)?.max(0) as u32,
            reason: row.get(5)?,
            resumed: row.get::<_, i64>(6)? != 0,
        },
        recorded_at: row.get(7)?,
    })
}

const OUTCOME_COLUMNS: &str =
    "run_id, site, state, products, failed_urls, reason, resumed, recorded_at";

impl Ledger for SqliteLedger {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> LedgerResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> LedgerResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(LedgerError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> LedgerResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(LedgerError::RunNotFound(run_id))
    }

    fn recent_runs(&self, limit: u32) -> LedgerResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT ?1",
        )?;
        let runs = stmt
            .query_map(params![limit], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    // ===== Site Outcomes =====

    fn record_site_outcome(&mut self, run_id: i64, outcome: &SiteOutcome) -> LedgerResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO site_outcomes (run_id, site, state, products, failed_urls, reason, resumed, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(run_id, site) DO UPDATE SET
                state = excluded.state,
                products = excluded.products,
                failed_urls = excluded.failed_urls,
                reason = excluded.reason,
                resumed = excluded.resumed,
                recorded_at = excluded.recorded_at",
            params![
                run_id,
                outcome.site,
                outcome.state.to_db_string(),
                outcome.products as i64,
                outcome.failed_urls as i64,
                outcome.reason,
                outcome.resumed as i64,
                now
            ],
        )?;
        Ok(())
    }

    fn outcomes_for_run(&self, run_id: i64) -> LedgerResult<Vec<SiteOutcomeRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM site_outcomes WHERE run_id = ?1 ORDER BY id",
            OUTCOME_COLUMNS
        ))?;
        let outcomes = stmt
            .query_map(params![run_id], outcome_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(outcomes)
    }

    fn latest_failures(&self) -> LedgerResult<Vec<SiteOutcomeRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM site_outcomes
             WHERE state = ?1
               AND run_id = (SELECT MAX(run_id) FROM site_outcomes)
             ORDER BY id",
            OUTCOME_COLUMNS
        ))?;
        let outcomes = stmt
            .query_map(params![SiteState::Failed.to_db_string()], outcome_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(site: &str, state: SiteState, reason: Option<&str>) -> SiteOutcome {
        SiteOutcome {
            site: site.to_string(),
            state,
            products: 3,
            failed_urls: 1,
            reason: reason.map(String::from),
            resumed: false,
        }
    }

    #[test]
    fn test_create_and_finish_run() {
        let mut ledger = SqliteLedger::open_in_memory().unwrap();
        let run_id = ledger.create_run("abc123").unwrap();

        let run = ledger.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.config_hash, "abc123");
        assert!(run.finished_at.is_none());

        ledger.finish_run(run_id, RunStatus::Interrupted).unwrap();
        let run = ledger.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Interrupted);
        assert!(run.finished_at.is_some());
    }

    #[test]
    fn test_missing_run() {
        let mut ledger = SqliteLedger::open_in_memory().unwrap();
        assert!(matches!(ledger.get_run(42), Err(LedgerError::RunNotFound(42))));
        assert!(matches!(
            ledger.finish_run(42, RunStatus::Completed),
            Err(LedgerError::RunNotFound(42))
        ));
    }

    #[test]
    fn test_recent_runs_newest_first() {
        let mut ledger = SqliteLedger::open_in_memory().unwrap();
        let first = ledger.create_run("a").unwrap();
        let second = ledger.create_run("b").unwrap();

        let runs = ledger.recent_runs(10).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, second);
        assert_eq!(runs[1].id, first);
        assert_eq!(ledger.recent_runs(1).unwrap().len(), 1);
    }

    #[test]
    fn test_site_outcomes_recorded_and_replaced() {
        let mut ledger = SqliteLedger::open_in_memory().unwrap();
        let run_id = ledger.create_run("h").unwrap();

        ledger
            .record_site_outcome(run_id, &outcome("alpha", SiteState::InProgress, None))
            .unwrap();
        ledger
            .record_site_outcome(run_id, &outcome("beta", SiteState::Completed, None))
            .unwrap();
        ledger
            .record_site_outcome(
                run_id,
                &outcome("alpha", SiteState::Failed, Some("budget exhausted")),
            )
            .unwrap();

        let outcomes = ledger.outcomes_for_run(run_id).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].outcome.site, "alpha");
        assert_eq!(outcomes[0].outcome.state, SiteState::Failed);
        assert_eq!(
            outcomes[0].outcome.reason.as_deref(),
            Some("budget exhausted")
        );
        assert_eq!(outcomes[1].outcome.products, 3);
    }

    #[test]
    fn test_latest_failures_only_from_latest_run() {
        let mut ledger = SqliteLedger::open_in_memory().unwrap();
        let old = ledger.create_run("h").unwrap();
        ledger
            .record_site_outcome(old, &outcome("alpha", SiteState::Failed, Some("old")))
            .unwrap();

        let new = ledger.create_run("h").unwrap();
        ledger
            .record_site_outcome(new, &outcome("beta", SiteState::Failed, Some("new")))
            .unwrap();
        ledger
            .record_site_outcome(new, &outcome("gamma", SiteState::Completed, None))
            .unwrap();

        let failures = ledger.latest_failures().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].outcome.site, "beta");
        assert_eq!(failures[0].run_id, new);
    }
}
