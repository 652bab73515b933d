use crate::model::Fitment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reduces a vendor SKU to its normalized part number
///
/// Every character that is not an ASCII letter or digit is dropped; case is
/// preserved. Applying it twice gives the same result as applying it once.
///
/// # Example
///
/// ```
/// use wheel_harvest::normalize_part_number;
///
/// assert_eq!(normalize_part_number("86 527-277 "), "86527277");
/// ```
pub fn normalize_part_number(sku: &str) -> String {
    sku.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// The fields an extractor fills in before a `Product` is built
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDraft {
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub sku: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub msrp: Option<String>,
    pub title: String,
    #[serde(default)]
    pub also_known_as: Option<String>,
    #[serde(default)]
    pub positions: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub applications: Option<String>,
    #[serde(default)]
    pub replaces: Option<String>,
    #[serde(default)]
    pub fitments: Vec<Fitment>,
}

/// A harvested catalog item
///
/// The part number and fitment list are derived at construction and only
/// readable afterwards:
/// - `part_number()` is always `normalize_part_number(&sku)`
/// - `fitments()` is never empty; a product without applications carries a
///   single blank fitment
///
/// Deserialized products go through the same constructor, so a checkpoint
/// file cannot smuggle in a part number that disagrees with its SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProductDraft")]
pub struct Product {
    pub url: String,
    pub image_url: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub sku: String,
    part_number: String,
    pub price: Option<String>,
    pub msrp: Option<String>,
    pub title: String,
    pub also_known_as: Option<String>,
    pub positions: Option<String>,
    pub description: Option<String>,
    pub applications: Option<String>,
    pub replaces: Option<String>,
    fitments: Vec<Fitment>,
}

impl Product {
    /// Builds a product, deriving the part number and defaulting fitments
    pub fn new(draft: ProductDraft) -> Self {
        let part_number = normalize_part_number(&draft.sku);
        let fitments = if draft.fitments.is_empty() {
            vec![Fitment::blank()]
        } else {
            draft.fitments
        };

        Self {
            url: draft.url,
            image_url: draft.image_url,
            scraped_at: draft.scraped_at,
            sku: draft.sku,
            part_number,
            price: draft.price,
            msrp: draft.msrp,
            title: draft.title,
            also_known_as: draft.also_known_as,
            positions: draft.positions,
            description: draft.description,
            applications: draft.applications,
            replaces: draft.replaces,
            fitments,
        }
    }

    pub fn part_number(&self) -> &str {
        &self.part_number
    }

    pub fn fitments(&self) -> &[Fitment] {
        &self.fitments
    }
}

impl From<ProductDraft> for Product {
    fn from(draft: ProductDraft) -> Self {
        Self::new(draft)
    }
}
