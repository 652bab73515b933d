//! User agent handling for HTTP requests.

use crate::config::{UserAgentConfig, UserAgentMode};

/// Real browser user agents used in rotate mode.
pub const BROWSER_USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    // Chrome on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Firefox
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Safari on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    // Edge on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// Get a random browser user agent.
pub fn random_user_agent() -> &'static str {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as usize)
        .unwrap_or(0);
    BROWSER_USER_AGENTS[nanos % BROWSER_USER_AGENTS.len()]
}

/// Source of the `User-Agent` header for each request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgentPool {
    Rotate,
    Fixed(String),
}

impl UserAgentPool {
    pub fn from_config(config: &UserAgentConfig) -> Self {
        match (config.mode, config.value.as_deref()) {
            (UserAgentMode::Fixed, Some(value)) => Self::Fixed(value.trim().to_string()),
            _ => Self::Rotate,
        }
    }

    /// The user agent for the next request
    pub fn pick(&self) -> &str {
        match self {
            Self::Rotate => random_user_agent(),
            Self::Fixed(value) => value,
        }
    }
}
