/// Site state definitions for tracking run progress
///
/// A site starts `Pending`, moves to `InProgress` while its extractor runs, and
/// ends `Completed` or `Failed`. A site whose checkpoint already exists goes
/// straight from `Pending` to `Completed`.
use std::fmt;

/// Represents the current state of a site in a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteState {
    /// Not yet started in this run
    Pending,

    /// Listing or extraction is underway
    InProgress,

    /// Finished; products are checkpointed
    Completed,

    /// Gave up; the run ledger holds the reason
    Failed,
}

impl SiteState {
    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: SiteState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::Pending, Self::Completed)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Failed)
        )
    }

    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Converts the site state to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses a site state from a database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible site states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::InProgress,
            Self::Completed,
            Self::Failed,
        ]
    }
}

impl fmt::Display for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
