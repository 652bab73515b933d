use chrono::{DateTime, Utc};

/// A fetched page, handed from the fetch client to an extractor
///
/// Never persisted.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// URL that was requested
    pub url: String,

    /// URL after redirects
    pub final_url: String,

    /// Page text
    pub body: String,

    /// When the response was received
    pub fetched_at: DateTime<Utc>,

    /// HTTP status of the final response (200 for rendered pages)
    pub status: u16,
}
