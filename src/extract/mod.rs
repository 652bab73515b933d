//! Site extraction
//!
//! A [`SiteExtractor`] knows how to list a site's candidate product URLs and
//! how to turn one product page into a [`Product`]. The orchestrator only sees
//! the trait; [`build_extractor`] picks the implementation named by the site
//! descriptor.

mod catalog;
mod listing;
mod parse;
mod profile;

pub use catalog::CatalogExtractor;
pub use listing::{ListingCollector, ListingLimits};
pub use parse::{clean_price, collapse_whitespace, fitments_from_json, FitmentLayout};
pub use profile::PageProfile;

use crate::config::HarvestConfig;
use crate::fetch::{FetchClient, FetchFailure};
use crate::model::{Product, SiteDescriptor};
use async_trait::async_trait;
use thiserror::Error;

/// Why a listing or product page could not be used
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionFailure {
    /// The page could not be fetched
    #[error("fetch of {url} failed: {failure}")]
    Fetch { url: String, failure: FetchFailure },

    /// The page or URL did not have the expected structure
    #[error("malformed page {url}: {message}")]
    Malformed { url: String, message: String },
}

impl ExtractionFailure {
    /// Returns true if this failure counts against the site retry budget
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Fetch { url, .. } | Self::Malformed { url, .. } => url,
        }
    }

    /// Short label used in logs and the run ledger
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { failure, .. } => failure.kind(),
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// Per-site extraction capability
#[async_trait]
pub trait SiteExtractor: Send + Sync {
    /// Candidate product URLs, deduplicated, in discovery order
    async fn list_product_urls(
        &self,
        client: &FetchClient,
    ) -> Result<Vec<String>, ExtractionFailure>;

    /// Parses one product page
    ///
    /// Returns `Ok(None)` when the page is not a wheel or lacks a title or SKU.
    async fn extract_product(
        &self,
        client: &FetchClient,
        url: &str,
    ) -> Result<Option<Product>, ExtractionFailure>;
}

/// Builds the extractor selected by `site.extractor`
pub fn build_extractor(site: &SiteDescriptor, harvest: &HarvestConfig) -> Box<dyn SiteExtractor> {
    let limits = ListingLimits {
        max_pages: harvest.max_listing_pages,
        max_empty_pages: harvest.max_empty_pages,
    };
    Box::new(CatalogExtractor::new(
        site.clone(),
        PageProfile::for_kind(site.extractor),
        limits,
    ))
}
