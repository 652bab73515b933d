//! Per-site extraction loop
//!
//! URLs are handed out by a shared index. Each worker owns a fetch client (and
//! therefore its own politeness window). Results carry their URL index so the
//! product order matches listing order no matter which worker finished first.

use crate::extract::SiteExtractor;
use crate::fetch::FetchClient;
use crate::model::Product;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// How the extraction loop of one site ended
#[derive(Debug)]
pub enum SiteExtraction {
    /// Every URL was attempted
    Finished {
        products: Vec<Product>,
        failed_urls: u32,
    },

    /// More URLs failed to fetch than the retry budget allows
    BudgetExhausted {
        failed_urls: u32,
        last_failure: String,
    },

    /// The run was cancelled mid-site
    Interrupted,
}

struct WorkerContext<'a> {
    site: &'a str,
    extractor: &'a dyn SiteExtractor,
    urls: &'a [String],
    budget: u32,
    cancel: &'a CancellationToken,
    next: AtomicUsize,
    failures: AtomicU32,
    exhausted: AtomicBool,
    last_failure: Mutex<Option<String>>,
}

/// Extracts every URL of one site with up to `workers` concurrent workers
pub async fn extract_site(
    site: &str,
    extractor: &dyn SiteExtractor,
    client: &FetchClient,
    urls: &[String],
    workers: usize,
    budget: u32,
    cancel: &CancellationToken,
) -> SiteExtraction {
    let ctx = WorkerContext {
        site,
        extractor,
        urls,
        budget,
        cancel,
        next: AtomicUsize::new(0),
        failures: AtomicU32::new(0),
        exhausted: AtomicBool::new(false),
        last_failure: Mutex::new(None),
    };

    let worker_count = workers.clamp(1, urls.len().max(1));
    let forks: Vec<FetchClient> = (1..worker_count).map(|_| client.fork()).collect();
    let clients: Vec<&FetchClient> = std::iter::once(client).chain(forks.iter()).collect();

    let results =
        futures::future::join_all(clients.into_iter().map(|c| run_worker(&ctx, c))).await;

    let failed_urls = ctx.failures.load(Ordering::SeqCst);
    if cancel.is_cancelled() {
        return SiteExtraction::Interrupted;
    }
    if ctx.exhausted.load(Ordering::SeqCst) {
        let last_failure = ctx
            .last_failure
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
            .unwrap_or_default();
        return SiteExtraction::BudgetExhausted {
            failed_urls,
            last_failure,
        };
    }

    let mut indexed: Vec<(usize, Product)> = results.into_iter().flatten().collect();
    indexed.sort_by_key(|(index, _)| *index);

    SiteExtraction::Finished {
        products: indexed.into_iter().map(|(_, product)| product).collect(),
        failed_urls,
    }
}

async fn run_worker(ctx: &WorkerContext<'_>, client: &FetchClient) -> Vec<(usize, Product)> {
    let mut found = Vec::new();
    let total = ctx.urls.len();

    loop {
        if ctx.cancel.is_cancelled() || ctx.exhausted.load(Ordering::SeqCst) {
            break;
        }

        let index = ctx.next.fetch_add(1, Ordering::SeqCst);
        let Some(url) = ctx.urls.get(index) else {
            break;
        };

        let result = tokio::select! {
            _ = ctx.cancel.cancelled() => None,
            result = ctx.extractor.extract_product(client, url) => Some(result),
        };
        let Some(result) = result else {
            break;
        };

        match result {
            Ok(Some(product)) => {
                tracing::info!(
                    "[{}] ({}/{}) {} - {}",
                    ctx.site,
                    index + 1,
                    total,
                    product.part_number(),
                    product.title
                );
                found.push((index, product));
            }
            Ok(None) => {
                tracing::debug!("[{}] ({}/{}) Skipped {}", ctx.site, index + 1, total, url);
            }
            Err(e) if e.is_fetch_failure() => {
                let count = ctx.failures.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::warn!(
                    "[{}] {} failed ({}, {}/{} of budget): {}",
                    ctx.site,
                    url,
                    e.kind(),
                    count,
                    ctx.budget,
                    e
                );
                if count > ctx.budget {
                    if let Ok(mut last) = ctx.last_failure.lock() {
                        *last = Some(e.to_string());
                    }
                    ctx.exhausted.store(true, Ordering::SeqCst);
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("[{}] Skipping {} ({}): {}", ctx.site, url, e.kind(), e);
            }
        }
    }

    found
}
