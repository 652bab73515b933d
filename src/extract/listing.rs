//! Product URL discovery
//!
//! Listing pages are walked until one of three things happens: the page
//! ceiling is reached, a later page returns 404, or `max_empty_pages`
//! consecutive pages contribute no new product URL.

use super::parse::{labeled_links, product_links};
use super::ExtractionFailure;
use crate::fetch::{FetchClient, FetchFailure};
use crate::model::SiteDescriptor;
use crate::url::category_page_url;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// Paging limits for one site's listing walk
#[derive(Debug, Clone, Copy)]
pub struct ListingLimits {
    pub max_pages: u32,
    pub max_empty_pages: u32,
}

/// Ordered, deduplicated product URLs plus the page budget left for the site
pub struct ListingCollector {
    urls: Vec<String>,
    seen: HashSet<String>,
    pages_left: u32,
    limits: ListingLimits,
}

impl ListingCollector {
    pub fn new(limits: ListingLimits) -> Self {
        Self {
            urls: Vec::new(),
            seen: HashSet::new(),
            pages_left: limits.max_pages,
            limits,
        }
    }

    /// Adds URLs in order, returning how many were new
    pub fn extend(&mut self, urls: Vec<String>) -> usize {
        let mut added = 0;
        for url in urls {
            if self.seen.insert(url.clone()) {
                self.urls.push(url);
                added += 1;
            }
        }
        added
    }

    pub fn pages_left(&self) -> u32 {
        self.pages_left
    }

    /// Claims one page from the site budget
    pub fn take_page(&mut self) -> bool {
        if self.pages_left == 0 {
            return false;
        }
        self.pages_left -= 1;
        true
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

async fn fetch_html(
    client: &FetchClient,
    url: &Url,
    dynamic: bool,
) -> Result<(String, Url), ExtractionFailure> {
    let page = client
        .fetch(url.as_str(), dynamic)
        .await
        .map_err(|failure| ExtractionFailure::Fetch {
            url: url.to_string(),
            failure,
        })?;
    let final_url = Url::parse(&page.final_url).unwrap_or_else(|_| url.clone());
    Ok((page.body, final_url))
}

/// Walks `page_url(1)`, `page_url(2)`, ... collecting product links
///
/// A failure on the first page is returned; failures on later pages count as
/// empty pages (a 404 ends paging outright).
pub async fn collect_paged<F>(
    client: &FetchClient,
    dynamic: bool,
    product_paths: &[&str],
    collector: &mut ListingCollector,
    page_url: F,
) -> Result<(), ExtractionFailure>
where
    F: Fn(u32) -> Result<Url, ExtractionFailure>,
{
    let mut empty_pages = 0;
    let mut page = 1;

    while collector.take_page() {
        let url = page_url(page)?;
        let added = match fetch_html(client, &url, dynamic).await {
            Ok((body, final_url)) => {
                let links = {
                    let document = Html::parse_document(&body);
                    product_links(&document, &final_url, product_paths)
                };
                collector.extend(links)
            }
            Err(e) if page == 1 => return Err(e),
            Err(ExtractionFailure::Fetch {
                failure: FetchFailure::Status(404),
                ..
            }) => {
                tracing::debug!("Listing page {} not found, paging ends", url);
                break;
            }
            Err(e) => {
                tracing::warn!("Listing page {} skipped: {}", url, e);
                0
            }
        };

        tracing::debug!("Listing page {} added {} product URLs", url, added);

        if added == 0 {
            empty_pages += 1;
            if empty_pages >= collector.limits.max_empty_pages {
                break;
            }
        } else {
            empty_pages = 0;
        }
        page += 1;
    }

    Ok(())
}

/// Category page, then make pages (filtered by brand), then paged model pages
pub async fn collect_make_model(
    client: &FetchClient,
    site: &SiteDescriptor,
    category_url: &Url,
    profile: &super::PageProfile,
    collector: &mut ListingCollector,
) -> Result<(), ExtractionFailure> {
    if !collector.take_page() {
        return Ok(());
    }
    let (body, final_url) = fetch_html(client, category_url, site.dynamic_rendering).await?;
    let makes = {
        let document = Html::parse_document(&body);
        labeled_links(&document, &final_url, profile.make_links)
    };

    let makes: Vec<_> = makes
        .into_iter()
        .filter(|make| site.accepts_brand(&make.label))
        .collect();
    tracing::info!("[{}] {} makes to browse", site.name, makes.len());

    for make in makes {
        if !collector.take_page() {
            break;
        }
        let (body, final_url) =
            match fetch_html(client, &make.url, site.dynamic_rendering).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("[{}] Make page {} skipped: {}", site.name, make.label, e);
                    continue;
                }
            };
        let models = {
            let document = Html::parse_document(&body);
            labeled_links(&document, &final_url, profile.model_links)
        };

        for model in models {
            if collector.pages_left() == 0 {
                return Ok(());
            }
            let result = collect_paged(
                client,
                site.dynamic_rendering,
                profile.product_paths,
                collector,
                |page| Ok(category_page_url(&model.url, page)),
            )
            .await;
            if let Err(e) = result {
                tracing::warn!(
                    "[{}] Model page {} {} skipped: {}",
                    site.name,
                    make.label,
                    model.label,
                    e
                );
            }
        }
    }

    Ok(())
}
