use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How a site exposes its catalog of product links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// A paged category listing at `category-url`
    CategoryPage,

    /// The platform search endpoint queried with `search-term`
    KeywordSearch,

    /// Category page, then make pages, then model pages
    MakeModelBrowse,
}

/// Which extraction profile parses a site's product pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    #[default]
    Generic,
    RevolutionParts,
}

fn default_search_term() -> String {
    "wheel".to_string()
}

/// Immutable configuration of one vendor site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    /// Unique key; also names the checkpoint file
    pub name: String,

    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Makes accepted during make/model browsing; empty accepts all
    #[serde(default)]
    pub brands: Vec<String>,

    #[serde(rename = "search-strategy")]
    pub search_strategy: SearchStrategy,

    #[serde(rename = "category-url", default)]
    pub category_url: Option<String>,

    #[serde(rename = "search-term", default = "default_search_term")]
    pub search_term: String,

    #[serde(rename = "dynamic-rendering", default)]
    pub dynamic_rendering: bool,

    #[serde(default)]
    pub extractor: ExtractorKind,
}

impl SiteDescriptor {
    /// SHA-256 hex digest of the descriptor's JSON form
    ///
    /// Stored with each checkpoint to notice descriptors edited after a site
    /// completed.
    pub fn fingerprint(&self) -> String {
        // Serializing a plain struct of strings and enums cannot fail
        let json = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns true if `make` passes the brand filter (case-insensitive)
    pub fn accepts_brand(&self, make: &str) -> bool {
        self.brands.is_empty()
            || self
                .brands
                .iter()
                .any(|b| b.trim().eq_ignore_ascii_case(make.trim()))
    }
}
