use super::parse::FitmentLayout;
use crate::model::ExtractorKind;

/// Selectors and conventions describing one family of catalog sites
///
/// Every selector list is tried in order; the first selector that yields a
/// value wins.
#[derive(Debug, Clone)]
pub struct PageProfile {
    /// Path fragments that mark a link as a product page
    pub product_paths: &'static [&'static str],
    pub make_links: &'static [&'static str],
    pub model_links: &'static [&'static str],

    pub title: &'static [&'static str],
    pub sku: &'static [&'static str],
    pub price: &'static [&'static str],
    pub msrp: &'static [&'static str],
    pub image: &'static [&'static str],
    pub description: &'static [&'static str],
    pub also_known_as: &'static [&'static str],
    pub positions: &'static [&'static str],
    pub applications: &'static [&'static str],
    pub replaces: &'static [&'static str],

    /// Scripts that may embed `{"fitment": [...]}`
    pub fitment_scripts: &'static [&'static str],
    pub fitment_layout: FitmentLayout,
}

impl PageProfile {
    pub fn for_kind(kind: ExtractorKind) -> Self {
        match kind {
            ExtractorKind::Generic => Self::generic(),
            ExtractorKind::RevolutionParts => Self::revolution_parts(),
        }
    }

    /// Broad selectors that fit most storefront templates
    pub fn generic() -> Self {
        Self {
            product_paths: &["/oem-parts/", "/parts/", "/product/", "/products/", "/p/"],
            make_links: &[".make-list a", "a.make-link", "a[data-make]"],
            model_links: &[".model-list a", "a.model-link", "a[data-model]"],
            title: &[
                "h1.product-title",
                "h1[class*=\"product-title\"]",
                "h1[class*=\"product-name\"]",
                "h1.title",
                "h1",
                "div[class*=\"product-name\"]",
            ],
            sku: &[
                "[itemprop=\"sku\"]",
                "span[class*=\"sku\"]",
                "div[class*=\"part-number\"]",
                "span[class*=\"part-number\"]",
            ],
            price: &[
                "strong[class*=\"sale-price\"]",
                "span[class*=\"sale-price\"]",
                "span[class*=\"price-sale\"]",
                "[itemprop=\"price\"]",
                "div[class*=\"price\"]",
            ],
            msrp: &[
                "span[class*=\"list-price\"]",
                "span[class*=\"msrp\"]",
                "div[class*=\"retail-price\"]",
            ],
            image: &[
                "img[class*=\"product-image\"]",
                "img[class*=\"main-image\"]",
                "img[itemprop=\"image\"]",
            ],
            description: &[
                "div[class*=\"description\"]",
                "span[class*=\"description\"]",
                "p[class*=\"description\"]",
            ],
            also_known_as: &[],
            positions: &[],
            applications: &[],
            replaces: &[],
            fitment_scripts: &["script[type=\"application/json\"]"],
            fitment_layout: FitmentLayout::Joined,
        }
    }

    /// RevolutionParts dealer catalogs (`/oem-parts/` product paths)
    pub fn revolution_parts() -> Self {
        Self {
            product_paths: &["/oem-parts/"],
            make_links: &[".make-list a", "a.make-link", "a[data-make]"],
            model_links: &[".model-list a", "a.model-link", "a[data-model]"],
            title: &[
                "h1.product-title",
                "h1",
                "h2.product-title",
                "div.product-title",
                "span.product-title",
                "title",
            ],
            sku: &["span.sku-display", "[itemprop=\"sku\"]"],
            price: &["strong.sale-price-value", "span.sale-price", "div.sale-price"],
            msrp: &["span.list-price-value", "span.list-price", "div.msrp"],
            image: &["img.product-main-image", "img.product-image", "img#product-image"],
            description: &[
                "span.description_body",
                "div.description",
                "p.product-description",
            ],
            also_known_as: &["li.also_known_as h2.list-value", "li.also_known_as .list-value"],
            positions: &["li.footnotes span.list-value", "li.footnotes .list-value"],
            applications: &["li.applications .list-value"],
            replaces: &["li.product-superseded-list .list-value"],
            fitment_scripts: &["script#product_data", "script[type=\"application/json\"]"],
            fitment_layout: FitmentLayout::Combinations,
        }
    }
}
