//! Ledger trait and error types

use crate::storage::{RunRecord, RunStatus, SiteOutcome, SiteOutcomeRecord};
use thiserror::Error;

/// Errors that can occur during ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// History of harvest runs and how each site ended
///
/// The ledger is informational: checkpoints, not the ledger, decide what a
/// run skips.
pub trait Ledger: Send {
    // ===== Run Management =====

    /// Starts a new run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> LedgerResult<i64>;

    /// Sets the final status and finish timestamp of a run
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> LedgerResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> LedgerResult<RunRecord>;

    /// Most recent runs, newest first
    fn recent_runs(&self, limit: u32) -> LedgerResult<Vec<RunRecord>>;

    // ===== Site Outcomes =====

    /// Records (or replaces) the outcome of one site within a run
    fn record_site_outcome(&mut self, run_id: i64, outcome: &SiteOutcome) -> LedgerResult<()>;

    /// Outcomes of one run in the order they were recorded
    fn outcomes_for_run(&self, run_id: i64) -> LedgerResult<Vec<SiteOutcomeRecord>>;

    /// Failed sites of the most recent run that recorded any outcome
    fn latest_failures(&self) -> LedgerResult<Vec<SiteOutcomeRecord>>;
}
