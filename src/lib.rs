//! Wheel-Harvest: a resumable wheel-part harvester
//!
//! This crate collects wheel products and their vehicle fitments from a fixed
//! list of vendor catalog sites, checkpoints every site as it completes, and
//! exports a deduplicated, fitment-expanded table with a summary report.

pub mod checkpoint;
pub mod classifier;
pub mod config;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod model;
pub mod orchestrator;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Wheel-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] checkpoint::CheckpointError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] storage::LedgerError),

    #[error("Export error: {0}")]
    Export(#[from] export::ExportError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Invalid state transition for site {site}: {from:?} -> {to:?}")]
    InvalidTransition {
        site: String,
        from: state::SiteState,
        to: state::SiteState,
    },

    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Duplicate site name: {0}")]
    DuplicateSite(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Wheel-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classifier::{classify, Classification};
pub use config::Config;
pub use model::{normalize_part_number, Fitment, Product, SiteDescriptor};
pub use state::SiteState;
