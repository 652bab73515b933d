use std::time::{Duration, Instant};

/// Enforces a minimum spacing between requests issued by one fetch client
///
/// Each fetch client (and each worker's forked client) owns its own window.
#[derive(Debug, Clone)]
pub struct PolitenessWindow {
    /// Minimum time between two requests
    pub delay: Duration,

    /// When the last request was sent
    pub last_request: Option<Instant>,

    /// Number of requests sent through this window
    pub request_count: u64,
}

impl PolitenessWindow {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: None,
            request_count: 0,
        }
    }

    /// Checks if a request can be sent at `now`
    pub fn can_request(&self, now: Instant) -> bool {
        self.time_until_next_request(now).is_none()
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        if let Some(last) = self.last_request {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.delay {
                return Some(self.delay - elapsed);
            }
        }
        None
    }

    /// Records that a request was sent at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request = Some(now);
    }
}
