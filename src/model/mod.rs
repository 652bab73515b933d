//! Data contracts shared by every stage of the harvest
//!
//! # Components
//!
//! - `Fitment`: one vehicle a part fits (year, make, model, trim, engine)
//! - `Product`: a harvested catalog item with its ordered, non-empty fitments
//! - `RawPage`: a fetched page before parsing
//! - `SiteDescriptor`: immutable per-site configuration

mod fitment;
mod page;
mod product;
mod site;

pub use fitment::Fitment;
pub use page::RawPage;
pub use product::{normalize_part_number, Product, ProductDraft};
pub use site::{ExtractorKind, SearchStrategy, SiteDescriptor};
