//! Run orchestration
//!
//! This module drives a harvest run, including:
//! - The per-site state machine (Pending -> InProgress -> Completed | Failed)
//! - Resuming from checkpoints so completed sites are never fetched again
//! - The per-site worker pool and retry budget
//! - Cooperative cancellation and the run ledger

mod coordinator;
mod workers;

pub use coordinator::Orchestrator;
pub use workers::{extract_site, SiteExtraction};

use crate::config::HarvestConfig;
use crate::extract::SiteExtractor;
use crate::model::SiteDescriptor;
use crate::state::SiteState;
use crate::storage::SiteOutcome;

/// Builds the extractor used for a site
pub type ExtractorFactory =
    Box<dyn Fn(&SiteDescriptor, &HarvestConfig) -> Box<dyn SiteExtractor> + Send + Sync>;

/// How one site ended in this run
#[derive(Debug, Clone, PartialEq)]
pub struct SiteReport {
    pub name: String,
    pub state: SiteState,
    pub products: usize,
    pub failed_urls: u32,
    pub reason: Option<String>,

    /// True if the site was satisfied from an existing checkpoint
    pub resumed: bool,
}

impl SiteReport {
    pub fn to_outcome(&self) -> SiteOutcome {
        SiteOutcome {
            site: self.name.clone(),
            state: self.state,
            products: self.products as u64,
            failed_urls: self.failed_urls,
            reason: self.reason.clone(),
            resumed: self.resumed,
        }
    }
}

/// Result of `Orchestrator::run`
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// Ledger id of the run, if the ledger accepted it
    pub run_id: Option<i64>,

    /// Sites that reached a terminal state, in run order
    pub reports: Vec<SiteReport>,

    /// Sites left for the next run
    pub pending: Vec<String>,

    pub interrupted: bool,
}

impl RunOutcome {
    pub fn completed(&self) -> impl Iterator<Item = &SiteReport> {
        self.reports
            .iter()
            .filter(|report| report.state == SiteState::Completed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &SiteReport> {
        self.reports
            .iter()
            .filter(|report| report.state == SiteState::Failed)
    }

    /// Returns true if every selected site completed
    pub fn is_success(&self) -> bool {
        !self.interrupted && self.pending.is_empty() && self.failed().next().is_none()
    }
}
