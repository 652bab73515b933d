//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `SiteState`: lifecycle of one site within a run (pending, in progress, completed, failed)
//! - `PolitenessWindow`: per-client request spacing and request counting

mod politeness;
mod site_state;

// Re-export main types
pub use politeness::PolitenessWindow;
pub use site_state::SiteState;
