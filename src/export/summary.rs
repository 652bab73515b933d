//! Export summary statistics and markdown report
//!
//! The summary is built from the same row set that was written to the
//! table, so its counts always agree with the exported file.

use super::rows::RowSet;
use super::{ExportResult, SiteProducts};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Statistics for one completed site
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteSummary {
    pub site: String,
    pub products: u64,
    pub rows: u64,
    pub unique_part_numbers: u64,
    pub invalid_rows: u64,
    pub duplicate_rows: u64,
}

/// A site that did not complete, with the recorded reason
#[derive(Debug, Clone, PartialEq)]
pub struct FailedSite {
    pub site: String,
    pub reason: String,
}

/// Low, high and mean of the prices that parsed as numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Everything the summary report shows
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub generated_at: String,
    pub sites: Vec<SiteSummary>,
    pub failed: Vec<FailedSite>,
    pub total_rows: u64,
    pub unique_part_numbers: u64,
    pub invalid_rows: u64,
    pub duplicate_rows: u64,

    pub missing_price: u64,
    pub missing_msrp: u64,

    /// Rows whose fitment has neither a year nor a make
    pub rows_without_fitment: u64,

    /// Part numbers exported on more than one row
    pub multi_fitment_part_numbers: u64,

    /// Valid rows per fitment make; blank makes are not counted
    pub rows_by_make: BTreeMap<String, u64>,

    pub price_range: Option<PriceRange>,
}

impl ExportSummary {
    /// Builds the summary for a finished row set
    ///
    /// # Arguments
    ///
    /// * `sites` - Products of the completed sites, in descriptor order
    /// * `set` - The rows that were exported
    /// * `failed` - Sites that did not complete
    pub fn build(sites: &[SiteProducts], set: &RowSet, failed: Vec<FailedSite>) -> Self {
        let mut summary = Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            failed,
            ..Default::default()
        };

        for site in sites {
            let rows: Vec<_> = set.rows.iter().filter(|r| r.site == site.site).collect();
            let part_numbers: HashSet<&str> =
                rows.iter().map(|r| r.part_number.as_str()).collect();

            summary.sites.push(SiteSummary {
                site: site.site.clone(),
                products: site.products.len() as u64,
                rows: rows.len() as u64,
                unique_part_numbers: part_numbers.len() as u64,
                invalid_rows: set.invalid.get(&site.site).copied().unwrap_or(0),
                duplicate_rows: set.duplicates.get(&site.site).copied().unwrap_or(0),
            });
        }

        summary.total_rows = set.rows.len() as u64;
        summary.unique_part_numbers = set
            .rows
            .iter()
            .map(|r| r.part_number.as_str())
            .collect::<HashSet<_>>()
            .len() as u64;
        summary.invalid_rows = set.invalid.values().sum();
        summary.duplicate_rows = set.duplicates.values().sum();

        let mut rows_per_part: HashMap<&str, u64> = HashMap::new();
        for row in &set.rows {
            *rows_per_part.entry(row.part_number.as_str()).or_insert(0) += 1;
            if row.price.is_none() {
                summary.missing_price += 1;
            }
            if row.msrp.is_none() {
                summary.missing_msrp += 1;
            }
            if row.fitment.year.is_empty() && row.fitment.make.is_empty() {
                summary.rows_without_fitment += 1;
            }
            if !row.fitment.make.is_empty() {
                *summary
                    .rows_by_make
                    .entry(row.fitment.make.clone())
                    .or_insert(0) += 1;
            }
        }

        summary.multi_fitment_part_numbers =
            rows_per_part.values().filter(|&&count| count > 1).count() as u64;

        let prices: Vec<f64> = set
            .rows
            .iter()
            .filter_map(|r| r.price.as_deref())
            .filter_map(|p| p.parse::<f64>().ok())
            .collect();
        if !prices.is_empty() {
            let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
            let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = prices.iter().sum::<f64>() / prices.len() as f64;
            summary.price_range = Some(PriceRange { min, max, mean });
        }

        summary
    }
}

/// Writes the markdown summary to `output_path`
pub fn write_markdown_summary(summary: &ExportSummary, output_path: &Path) -> ExportResult<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let markdown = format_markdown_summary(summary);
    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats an export summary as markdown
pub fn format_markdown_summary(summary: &ExportSummary) -> String {
    let mut md = String::new();

    md.push_str("# Wheel Harvest Summary\n\n");
    md.push_str(&format!("- **Generated**: {}\n", summary.generated_at));
    md.push_str(&format!("- **Sites Completed**: {}\n", summary.sites.len()));
    md.push_str(&format!("- **Sites Failed**: {}\n\n", summary.failed.len()));

    md.push_str("## Totals\n\n");
    md.push_str(&format!("- **Rows**: {}\n", summary.total_rows));
    md.push_str(&format!(
        "- **Unique Part Numbers**: {}\n",
        summary.unique_part_numbers
    ));
    md.push_str(&format!("- **Invalid Rows**: {}\n", summary.invalid_rows));
    md.push_str(&format!(
        "- **Duplicate Rows Dropped**: {}\n",
        summary.duplicate_rows
    ));
    md.push_str(&format!(
        "- **Rows Missing Price**: {}\n",
        summary.missing_price
    ));
    md.push_str(&format!("- **Rows Missing MSRP**: {}\n", summary.missing_msrp));
    md.push_str(&format!(
        "- **Rows Without Fitment**: {}\n",
        summary.rows_without_fitment
    ));
    md.push_str(&format!(
        "- **Part Numbers With Several Fitments**: {}\n",
        summary.multi_fitment_part_numbers
    ));
    if let Some(range) = &summary.price_range {
        md.push_str(&format!(
            "- **Price Range**: ${:.2} - ${:.2} (mean ${:.2})\n",
            range.min, range.max, range.mean
        ));
    }
    md.push('\n');

    if !summary.sites.is_empty() {
        md.push_str("## Sites\n\n");
        md.push_str("| Site | Products | Rows | Unique PNs | Invalid | Duplicates |\n");
        md.push_str("|------|----------|------|------------|---------|------------|\n");
        for site in &summary.sites {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                site.site,
                site.products,
                site.rows,
                site.unique_part_numbers,
                site.invalid_rows,
                site.duplicate_rows
            ));
        }
        md.push('\n');
    }

    if !summary.failed.is_empty() {
        md.push_str("## Failed Sites\n\n");
        md.push_str("| Site | Reason |\n");
        md.push_str("|------|--------|\n");
        for failed in &summary.failed {
            md.push_str(&format!(
                "| {} | {} |\n",
                failed.site,
                failed.reason.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    if !summary.rows_by_make.is_empty() {
        md.push_str("## Rows by Make\n\n");
        md.push_str("| Make | Rows |\n");
        md.push_str("|------|------|\n");
        let mut makes: Vec<_> = summary.rows_by_make.iter().collect();
        makes.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (make, count) in makes.iter().take(20) {
            md.push_str(&format!("| {} | {} |\n", make, count));
        }
        md.push('\n');
    }

    md
}

/// Prints the summary to stdout
pub fn print_summary(summary: &ExportSummary) {
    println!("=== Export Summary ===\n");

    for site in &summary.sites {
        println!(
            "  {}: {} rows, {} unique PNs, {} invalid",
            site.site, site.rows, site.unique_part_numbers, site.invalid_rows
        );
    }
    println!();

    if !summary.failed.is_empty() {
        println!("Failed Sites ({}):", summary.failed.len());
        for failed in &summary.failed {
            println!("  - {}: {}", failed.site, failed.reason);
        }
        println!();
    }

    println!(
        "Total: {} rows, {} unique part numbers ({} invalid rows excluded)",
        summary.total_rows, summary.unique_part_numbers, summary.invalid_rows
    );
    println!(
        "Missing price: {}, missing MSRP: {}, without fitment: {}",
        summary.missing_price, summary.missing_msrp, summary.rows_without_fitment
    );
}
