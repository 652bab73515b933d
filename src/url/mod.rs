//! URL handling module for Wheel-Harvest
//!
//! This module provides base-URL validation, link resolution, product URL
//! canonicalization, and listing-page URL construction.

mod normalize;
mod paging;

// Re-export main functions
pub use normalize::{canonical_product_url, parse_base_url, resolve_link};
pub use paging::{category_page_url, join_site_path, search_page_url};
