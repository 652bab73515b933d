use super::listing::{collect_make_model, collect_paged, ListingCollector, ListingLimits};
use super::parse::{clean_price, first_attr, first_text, structured_fitments, table_fitments};
use super::{ExtractionFailure, PageProfile, SiteExtractor};
use crate::classifier::{classify, matched_rule, Classification};
use crate::fetch::FetchClient;
use crate::model::{Product, ProductDraft, RawPage, SearchStrategy, SiteDescriptor};
use crate::url::{category_page_url, join_site_path, parse_base_url, resolve_link, search_page_url};
use async_trait::async_trait;
use scraper::Html;
use url::Url;

/// Selector-driven extractor for storefront-style catalogs
///
/// The descriptor decides how listing pages are walked; the profile decides
/// which elements hold each product field.
pub struct CatalogExtractor {
    site: SiteDescriptor,
    profile: PageProfile,
    limits: ListingLimits,
}

impl CatalogExtractor {
    pub fn new(site: SiteDescriptor, profile: PageProfile, limits: ListingLimits) -> Self {
        Self {
            site,
            profile,
            limits,
        }
    }

    fn base_url(&self) -> Result<Url, ExtractionFailure> {
        parse_base_url(&self.site.base_url).map_err(|e| ExtractionFailure::Malformed {
            url: self.site.base_url.clone(),
            message: e.to_string(),
        })
    }

    fn category_url(&self, base: &Url) -> Result<Url, ExtractionFailure> {
        let path = self.site.category_url.as_deref().unwrap_or("/");
        join_site_path(base, path).map_err(|e| ExtractionFailure::Malformed {
            url: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Builds a product from a fetched page
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Product))` - A wheel with title and SKU
    /// * `Ok(None)` - Not a wheel, or title/SKU missing
    /// * `Err(ExtractionFailure)` - The page URL is unusable
    pub fn parse_product(&self, page: &RawPage) -> Result<Option<Product>, ExtractionFailure> {
        let page_url = Url::parse(&page.final_url)
            .or_else(|_| Url::parse(&page.url))
            .map_err(|e| ExtractionFailure::Malformed {
                url: page.url.clone(),
                message: e.to_string(),
            })?;

        let document = Html::parse_document(&page.body);
        let profile = &self.profile;

        let Some(title) = first_text(&document, profile.title) else {
            tracing::debug!("[{}] No title on {}", self.site.name, page.url);
            return Ok(None);
        };
        let description = first_text(&document, profile.description);

        let description_text = description.as_deref().unwrap_or("");
        if classify(&title, description_text) == Classification::Reject {
            tracing::debug!(
                "[{}] Skipping non-wheel '{}' ({:?})",
                self.site.name,
                title,
                matched_rule(&title, description_text)
            );
            return Ok(None);
        }

        let Some(sku) = first_text(&document, profile.sku) else {
            tracing::debug!("[{}] No SKU on {}", self.site.name, page.url);
            return Ok(None);
        };

        let mut fitments =
            structured_fitments(&document, profile.fitment_scripts, profile.fitment_layout);
        if fitments.is_empty() {
            fitments = table_fitments(&document);
        }
        if fitments.is_empty() {
            tracing::debug!("[{}] No fitment data for '{}'", self.site.name, title);
        }

        let image_url = first_attr(&document, profile.image, "src")
            .and_then(|src| resolve_link(&src, &page_url))
            .map(|u| u.to_string());

        Ok(Some(Product::new(ProductDraft {
            url: page.url.clone(),
            image_url,
            scraped_at: page.fetched_at,
            sku,
            price: first_text(&document, profile.price).and_then(|p| clean_price(&p)),
            msrp: first_text(&document, profile.msrp).and_then(|p| clean_price(&p)),
            title,
            also_known_as: first_text(&document, profile.also_known_as),
            positions: first_text(&document, profile.positions),
            description,
            applications: first_text(&document, profile.applications),
            replaces: first_text(&document, profile.replaces),
            fitments,
        })))
    }
}

#[async_trait]
impl SiteExtractor for CatalogExtractor {
    async fn list_product_urls(
        &self,
        client: &FetchClient,
    ) -> Result<Vec<String>, ExtractionFailure> {
        let base = self.base_url()?;
        let dynamic = self.site.dynamic_rendering;
        let paths = self.profile.product_paths;
        let mut collector = ListingCollector::new(self.limits);

        match self.site.search_strategy {
            SearchStrategy::CategoryPage => {
                let category = self.category_url(&base)?;
                collect_paged(client, dynamic, paths, &mut collector, |page| {
                    Ok(category_page_url(&category, page))
                })
                .await?;
            }
            SearchStrategy::KeywordSearch => {
                let term = self.site.search_term.trim();
                collect_paged(client, dynamic, paths, &mut collector, |page| {
                    search_page_url(&base, term, page).map_err(|e| ExtractionFailure::Malformed {
                        url: base.to_string(),
                        message: e.to_string(),
                    })
                })
                .await?;
            }
            SearchStrategy::MakeModelBrowse => {
                let category = self.category_url(&base)?;
                collect_make_model(client, &self.site, &category, &self.profile, &mut collector)
                    .await?;
            }
        }

        let urls = collector.into_urls();
        tracing::info!("[{}] Found {} product URLs", self.site.name, urls.len());
        Ok(urls)
    }

    async fn extract_product(
        &self,
        client: &FetchClient,
        url: &str,
    ) -> Result<Option<Product>, ExtractionFailure> {
        let page = client
            .fetch(url, self.site.dynamic_rendering)
            .await
            .map_err(|failure| ExtractionFailure::Fetch {
                url: url.to_string(),
                failure,
            })?;
        self.parse_product(&page)
    }
}
