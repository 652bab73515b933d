//! Fitment expansion, cleanup, deduplication and validation

use super::SiteProducts;
use crate::extract::collapse_whitespace;
use crate::model::{Fitment, Product};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// One product paired with one of its fitments
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub site: String,
    pub url: String,
    pub image_url: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub sku: String,
    pub part_number: String,
    pub price: Option<String>,
    pub msrp: Option<String>,
    pub title: String,
    pub also_known_as: Option<String>,
    pub positions: Option<String>,
    pub description: Option<String>,
    pub applications: Option<String>,
    pub replaces: Option<String>,
    pub fitment: Fitment,
}

impl ExportRow {
    fn new(site: &str, product: &Product, fitment: &Fitment) -> Self {
        Self {
            site: site.to_string(),
            url: product.url.clone(),
            image_url: product.image_url.clone(),
            scraped_at: product.scraped_at,
            sku: product.sku.clone(),
            part_number: product.part_number().to_string(),
            price: product.price.clone(),
            msrp: product.msrp.clone(),
            title: product.title.clone(),
            also_known_as: product.also_known_as.clone(),
            positions: product.positions.clone(),
            description: product.description.clone(),
            applications: product.applications.clone(),
            replaces: product.replaces.clone(),
            fitment: fitment.clone(),
        }
    }

    /// Collapses whitespace runs and trims every free-text field
    ///
    /// Optional fields that end up empty become `None`.
    pub fn clean(&mut self) {
        self.title = collapse_whitespace(&self.title);
        for field in [
            &mut self.also_known_as,
            &mut self.positions,
            &mut self.description,
            &mut self.applications,
            &mut self.replaces,
        ] {
            *field = field
                .as_deref()
                .map(collapse_whitespace)
                .filter(|value| !value.is_empty());
        }
        for value in [
            &mut self.fitment.year,
            &mut self.fitment.make,
            &mut self.fitment.model,
            &mut self.fitment.trim,
            &mut self.fitment.engine,
        ] {
            *value = collapse_whitespace(value);
        }
    }

    /// Returns true if the row has a part number and a title
    pub fn is_valid(&self) -> bool {
        !self.part_number.is_empty() && !self.title.is_empty()
    }

    fn dedup_key(&self) -> (String, Fitment, String) {
        (
            self.part_number.clone(),
            self.fitment.clone(),
            self.site.clone(),
        )
    }
}

/// Rows that survived the pipeline plus what was dropped along the way
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    pub rows: Vec<ExportRow>,

    /// Duplicate rows dropped, per site
    pub duplicates: HashMap<String, u64>,

    /// Rows without a part number or title, per site
    pub invalid: HashMap<String, u64>,
}

/// Expands one product per fitment, in fitment order
pub fn expand_product(site: &str, product: &Product) -> Vec<ExportRow> {
    product
        .fitments()
        .iter()
        .map(|fitment| ExportRow::new(site, product, fitment))
        .collect()
}

/// Expands, cleans, deduplicates and validates the products of every site
///
/// Row order is site order, then product order, then fitment order. The
/// first occurrence of a (part number, fitment, site) combination wins.
pub fn build_rows(sites: &[SiteProducts]) -> RowSet {
    let mut set = RowSet::default();
    let mut seen = HashSet::new();

    for site in sites {
        for product in &site.products {
            for mut row in expand_product(&site.site, product) {
                row.clean();

                if !seen.insert(row.dedup_key()) {
                    *set.duplicates.entry(row.site.clone()).or_insert(0) += 1;
                    continue;
                }

                if !row.is_valid() {
                    *set.invalid.entry(row.site.clone()).or_insert(0) += 1;
                    continue;
                }

                set.rows.push(row);
            }
        }
    }

    let dropped: u64 = set.duplicates.values().sum();
    if dropped > 0 {
        tracing::info!("Dropped {} duplicate rows", dropped);
    }
    let invalid: u64 = set.invalid.values().sum();
    if invalid > 0 {
        tracing::warn!("Excluded {} rows missing a part number or title", invalid);
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductDraft;

    fn product(sku: &str, title: &str, fitments: Vec<Fitment>) -> Product {
        Product::new(ProductDraft {
            url: format!("https://parts.example.com/oem-parts/{}", sku),
            scraped_at: Utc::now(),
            sku: sku.to_string(),
            title: title.to_string(),
            fitments,
            ..Default::default()
        })
    }

    fn escalade(trim: &str) -> Fitment {
        Fitment::new("2025", "Cadillac", "ESCALADE IQ", trim, "ELECTRIC")
    }

    fn site(name: &str, products: Vec<Product>) -> SiteProducts {
        SiteProducts {
            site: name.to_string(),
            products,
        }
    }

    #[test]
    fn test_expansion_yields_one_row_per_fitment() {
        let p = product(
            "86 527-277",
            "Wheel",
            vec![escalade("Luxury 1"), escalade("Luxury 2"), escalade("Sport 1")],
        );
        let rows = expand_product("gmparts", &p);

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.part_number == "86527277"));
        assert_eq!(rows[1].fitment.trim, "Luxury 2");
    }

    #[test]
    fn test_product_without_fitments_yields_blank_row() {
        let rows = expand_product("gmparts", &product("A1", "Wheel", vec![]));
        assert_eq!(rows.len(), 1);
        assert!(rows[0].fitment.is_blank());
    }

    #[test]
    fn test_dedup_first_wins() {
        let mut first = product("A1", "Wheel", vec![escalade("Sport 1")]);
        first.price = Some("100.00".to_string());
        let mut second = product("A-1", "Wheel", vec![escalade("Sport 1")]);
        second.price = Some("200.00".to_string());

        let set = build_rows(&[site("gmparts", vec![first, second])]);

        assert_eq!(set.rows.len(), 1);
        assert_eq!(set.rows[0].price.as_deref(), Some("100.00"));
        assert_eq!(set.duplicates.get("gmparts"), Some(&1));
    }

    #[test]
    fn test_same_part_on_two_sites_is_kept_twice() {
        let set = build_rows(&[
            site("gmparts", vec![product("A1", "Wheel", vec![])]),
            site("tascaparts", vec![product("A1", "Wheel", vec![])]),
        ]);

        assert_eq!(set.rows.len(), 2);
        assert_eq!(set.rows[0].site, "gmparts");
        assert_eq!(set.rows[1].site, "tascaparts");
    }

    #[test]
    fn test_invalid_rows_are_counted() {
        let set = build_rows(&[site(
            "gmparts",
            vec![
                product("--", "Wheel", vec![]),
                product("B2", "   ", vec![]),
                product("C3", "Wheel", vec![]),
            ],
        )]);

        assert_eq!(set.rows.len(), 1);
        assert_eq!(set.invalid.get("gmparts"), Some(&2));
    }

    #[test]
    fn test_cleanup_collapses_whitespace() {
        let mut p = product(
            "A1",
            "  Alloy \n  Wheel ",
            vec![Fitment::new(" 2024", "Ford ", "F-150  Lightning", "", "")],
        );
        p.description = Some("   ".to_string());

        let set = build_rows(&[site("tascaparts", vec![p])]);
        let row = &set.rows[0];

        assert_eq!(row.title, "Alloy Wheel");
        assert_eq!(row.description, None);
        assert_eq!(row.fitment.year, "2024");
        assert_eq!(row.fitment.model, "F-150 Lightning");
    }
}
