//! Checkpoint store
//!
//! A checkpoint is the durable record that a site finished: its products,
//! when it finished, and a fingerprint of the descriptor it ran with. The
//! orchestrator writes one per completed site and skips any site that already
//! has one.

mod json;

pub use json::JsonCheckpointStore;

use crate::model::{Product, SiteDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checkpoint already exists for site {0}")]
    AlreadyExists(String),

    #[error("Invalid site name for checkpoint: {0}")]
    InvalidSiteName(String),
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Completed output of one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteCheckpoint {
    pub site: String,
    pub completed_at: DateTime<Utc>,

    /// `SiteDescriptor::fingerprint()` at completion time
    pub fingerprint: String,

    /// Accepted products in extraction order
    pub products: Vec<Product>,
}

impl SiteCheckpoint {
    pub fn new(site: &SiteDescriptor, products: Vec<Product>) -> Self {
        Self {
            site: site.name.clone(),
            completed_at: Utc::now(),
            fingerprint: site.fingerprint(),
            products,
        }
    }

    /// Returns true if the checkpoint was produced with this exact descriptor
    pub fn matches(&self, site: &SiteDescriptor) -> bool {
        self.fingerprint == site.fingerprint()
    }
}

/// Durable per-site progress record
///
/// Implementations must make `save` atomic: a reader sees either no
/// checkpoint or the complete one.
pub trait CheckpointStore: Send + Sync {
    /// Loads the checkpoint for `site`, if one exists
    fn load(&self, site: &str) -> CheckpointResult<Option<SiteCheckpoint>>;

    /// Writes a checkpoint; fails if the site already has one
    fn save(&self, checkpoint: &SiteCheckpoint) -> CheckpointResult<()>;

    /// Returns true if `site` has a checkpoint
    fn contains(&self, site: &str) -> CheckpointResult<bool>;

    /// Deletes the checkpoint for `site`; returns whether one existed
    fn remove(&self, site: &str) -> CheckpointResult<bool>;

    /// Names of all checkpointed sites, sorted
    fn list(&self) -> CheckpointResult<Vec<String>>;
}
