//! Storage module for the run ledger
//!
//! This module records every harvest run and the terminal state of each site
//! it touched, including:
//! - SQLite database initialization and schema management
//! - Run start/finish bookkeeping
//! - Per-site outcomes with failure reasons, for re-running just the failed sites

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteLedger;
pub use traits::{Ledger, LedgerError, LedgerResult};

use crate::state::SiteState;
use std::path::Path;

/// Opens (creating if needed) a ledger database
///
/// Parent directories are created as needed.
pub fn open_ledger(path: &Path) -> LedgerResult<SqliteLedger> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    SqliteLedger::new(path)
}

/// Represents a harvest run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// The outcome of one site, as reported by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct SiteOutcome {
    pub site: String,
    pub state: SiteState,
    pub products: u64,
    pub failed_urls: u32,
    pub reason: Option<String>,
    /// True if the site was satisfied from an existing checkpoint
    pub resumed: bool,
}

/// A stored site outcome
#[derive(Debug, Clone)]
pub struct SiteOutcomeRecord {
    pub run_id: i64,
    pub outcome: SiteOutcome,
    pub recorded_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[
            RunStatus::Running,
            RunStatus::Completed,
            RunStatus::Interrupted,
            RunStatus::Failed,
        ] {
            let db_str = status.to_db_string();
            let parsed = RunStatus::from_db_string(db_str);
            assert_eq!(Some(*status), parsed);
        }
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("invalid"), None);
    }

    #[test]
    fn test_open_ledger_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("ledger.db");
        let mut ledger = open_ledger(&path).unwrap();
        assert!(path.exists());
        assert_eq!(ledger.create_run("hash").unwrap(), 1);
    }
}
