//! Fetch client
//!
//! All page retrieval goes through [`FetchClient`]: it spaces requests with a
//! politeness window, rotates the user agent, retries transient failures, and
//! routes pages that need JavaScript to an injected [`PageRenderer`].

mod client;
mod renderer;
mod user_agent;

pub use client::FetchClient;
pub use renderer::{PageRenderer, RenderedPage};
pub use user_agent::{random_user_agent, UserAgentPool, BROWSER_USER_AGENTS};

use thiserror::Error;

/// Bodies shorter than this (after trimming) are treated as empty pages
pub const MIN_CONTENT_BYTES: usize = 100;

/// Why a page could not be retrieved, reported after retries are exhausted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("empty or truncated content")]
    EmptyContent,
}

impl FetchFailure {
    /// Returns true if another attempt could plausibly succeed
    ///
    /// A 404 is permanent; everything else is worth retrying.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Status(404))
    }

    /// Short label used in logs and the run ledger
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout => "timeout",
            Self::Status(_) => "status",
            Self::EmptyContent => "empty",
        }
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if let Some(status) = e.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Network(e.to_string())
        }
    }
}
