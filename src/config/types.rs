use crate::model::SiteDescriptor;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Wheel-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(rename = "site", default)]
    pub sites: Vec<SiteDescriptor>,
}

impl Config {
    /// Looks up a site descriptor by name
    pub fn site(&self, name: &str) -> Option<&SiteDescriptor> {
        self.sites.iter().find(|s| s.name == name)
    }
}

/// Fetching and paging behavior
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Minimum time between two requests of one fetch client (milliseconds)
    #[serde(rename = "request-delay", default = "default_request_delay")]
    pub request_delay: u64,

    /// Attempts per URL before a fetch failure is reported
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Failed product URLs a site may accumulate before it is marked failed
    #[serde(rename = "site-retry-budget", default = "default_site_retry_budget")]
    pub site_retry_budget: u32,

    /// Hard ceiling on listing pages fetched per site
    #[serde(rename = "max-listing-pages", default = "default_max_listing_pages")]
    pub max_listing_pages: u32,

    /// Consecutive listing pages without new product URLs before paging stops
    #[serde(rename = "max-empty-pages", default = "default_max_empty_pages")]
    pub max_empty_pages: u32,

    /// Concurrent extraction workers within one site
    #[serde(rename = "workers-per-site", default = "default_workers_per_site")]
    pub workers_per_site: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl HarvestConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            request_delay: default_request_delay(),
            max_attempts: default_max_attempts(),
            site_retry_budget: default_site_retry_budget(),
            max_listing_pages: default_max_listing_pages(),
            max_empty_pages: default_max_empty_pages(),
            workers_per_site: default_workers_per_site(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_request_delay() -> u64 {
    2000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_site_retry_budget() -> u32 {
    25
}

fn default_max_listing_pages() -> u32 {
    200
}

fn default_max_empty_pages() -> u32 {
    4
}

fn default_workers_per_site() -> u32 {
    1
}

fn default_request_timeout() -> u64 {
    30
}

/// How the `User-Agent` header is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserAgentMode {
    /// Pick from the built-in browser pool on every request
    #[default]
    Rotate,

    /// Always send `value`
    Fixed,
}

/// User agent identification configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default)]
    pub mode: UserAgentMode,

    /// Header value used in `fixed` mode
    #[serde(default)]
    pub value: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding one `<site>.json` checkpoint per completed site
    #[serde(rename = "checkpoint-dir")]
    pub checkpoint_dir: String,

    /// Path to the SQLite run ledger
    #[serde(rename = "ledger-path")]
    pub ledger_path: String,

    /// Path to the CSV export
    #[serde(rename = "export-path")]
    pub export_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// Directory for per-site CSV files
    #[serde(rename = "split-dir", default)]
    pub split_dir: Option<String>,
}
