//! Normalizer/exporter
//!
//! Turns the checkpointed products of every completed site into:
//! - one fitment-expanded CSV table with the fixed column layout
//! - an optional table per site
//! - a markdown summary with per-site counts and the failed sites

mod columns;
mod csv;
mod rows;
mod summary;

pub use columns::{header_record, to_record, Column, COLUMN_COUNT, HEADERS, LAYOUT};
pub use csv::{write_row, write_table, write_table_file};
pub use rows::{build_rows, expand_product, ExportRow, RowSet};
pub use summary::{
    format_markdown_summary, print_summary, write_markdown_summary, ExportSummary, FailedSite,
    PriceRange, SiteSummary,
};

use crate::checkpoint::CheckpointStore;
use crate::model::{Product, SiteDescriptor};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while exporting
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Products of one completed site
#[derive(Debug, Clone)]
pub struct SiteProducts {
    pub site: String,
    pub products: Vec<Product>,
}

/// Where the export artifacts go
#[derive(Debug, Clone)]
pub struct ExportTargets {
    pub table: PathBuf,
    pub summary: PathBuf,

    /// Directory for `wheels_<site>.csv` files; `None` disables the split
    pub split_dir: Option<PathBuf>,
}

/// Checkpointed products, plus the checkpoints that could not be read
#[derive(Debug, Clone, Default)]
pub struct LoadedSites {
    pub sites: Vec<SiteProducts>,
    pub unreadable: Vec<FailedSite>,
}

/// Loads the products of every checkpointed site, in descriptor order
///
/// Sites without a checkpoint are skipped. A checkpoint that cannot be read
/// is left out of the export and reported in `unreadable`.
pub fn load_site_products(store: &dyn CheckpointStore, sites: &[SiteDescriptor]) -> LoadedSites {
    let mut loaded = LoadedSites::default();
    for site in sites {
        match store.load(&site.name) {
            Ok(Some(checkpoint)) => loaded.sites.push(SiteProducts {
                site: site.name.clone(),
                products: checkpoint.products,
            }),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("[{}] Checkpoint not exported: {}", site.name, e);
                loaded.unreadable.push(FailedSite {
                    site: site.name.clone(),
                    reason: format!("unreadable checkpoint: {}", e),
                });
            }
        }
    }
    loaded
}

/// Path of the split table for one site
pub fn split_path(dir: &Path, site: &str) -> PathBuf {
    dir.join(format!("wheels_{}.csv", site))
}

/// Builds and writes every export artifact
///
/// # Arguments
///
/// * `sites` - Products of the completed sites, in descriptor order
/// * `failed` - Sites that did not complete, listed in the summary
/// * `targets` - Output locations
///
/// # Returns
///
/// * `Ok(ExportSummary)` - The statistics written to the summary file
/// * `Err(ExportError)` - An artifact could not be written
pub fn run_export(
    sites: &[SiteProducts],
    failed: Vec<FailedSite>,
    targets: &ExportTargets,
) -> ExportResult<ExportSummary> {
    let set = build_rows(sites);
    let header = header_record();

    let records: Vec<Vec<String>> = set.rows.iter().map(to_record).collect();
    write_table_file(&targets.table, &header, &records)?;
    tracing::info!(
        "Wrote {} rows to {}",
        records.len(),
        targets.table.display()
    );

    if let Some(dir) = &targets.split_dir {
        for site in sites {
            let site_records: Vec<Vec<String>> = set
                .rows
                .iter()
                .filter(|row| row.site == site.site)
                .map(to_record)
                .collect();
            let path = split_path(dir, &site.site);
            write_table_file(&path, &header, &site_records)?;
            tracing::info!("Wrote {} rows to {}", site_records.len(), path.display());
        }
    }

    let summary = ExportSummary::build(sites, &set, failed);
    write_markdown_summary(&summary, &targets.summary)?;
    tracing::info!("Summary written to {}", targets.summary.display());

    Ok(summary)
}
