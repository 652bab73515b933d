//! Harvest coordinator - drives every configured site to a terminal state
//!
//! For each site in configuration order:
//! - a site with a checkpoint is Completed without fetching anything
//! - otherwise its extractor lists product URLs and extracts each one
//! - a finished site is checkpointed; a site that exhausts its retry budget
//!   or cannot list its products is Failed and the run moves on
//!
//! Cancellation discards the current site's products and leaves the remaining
//! sites Pending for the next run.

use super::workers::{extract_site, SiteExtraction};
use super::{ExtractorFactory, RunOutcome, SiteReport};
use crate::checkpoint::{CheckpointStore, SiteCheckpoint};
use crate::config::Config;
use crate::extract::build_extractor;
use crate::fetch::{FetchClient, PageRenderer};
use crate::model::SiteDescriptor;
use crate::state::SiteState;
use crate::storage::{Ledger, RunStatus};
use crate::HarvestError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

enum SiteRun {
    Finished(SiteReport),
    Interrupted,
}

/// Main harvest coordinator structure
pub struct Orchestrator {
    config: Arc<Config>,
    store: Arc<dyn CheckpointStore>,
    ledger: Box<dyn Ledger>,
    fetch: FetchClient,
    factory: ExtractorFactory,
    states: HashMap<String, SiteState>,
    only_site: Option<String>,
    cancel: CancellationToken,
    config_hash: String,
}

impl Orchestrator {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `store` - Where completed sites are checkpointed
    /// * `ledger` - Run history
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Every site starts Pending
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(
        config: Config,
        store: Arc<dyn CheckpointStore>,
        ledger: Box<dyn Ledger>,
    ) -> Result<Self, HarvestError> {
        let fetch = FetchClient::new(&config.harvest, &config.user_agent)?;
        let states = config
            .sites
            .iter()
            .map(|site| (site.name.clone(), SiteState::Pending))
            .collect();

        Ok(Self {
            config: Arc::new(config),
            store,
            ledger,
            fetch,
            factory: Box::new(build_extractor),
            states,
            only_site: None,
            cancel: CancellationToken::new(),
            config_hash: String::new(),
        })
    }

    /// Installs the renderer used for sites with dynamic rendering
    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.fetch = self.fetch.with_renderer(renderer);
        self
    }

    /// Replaces the descriptor-driven extractor selection
    pub fn with_extractor_factory(mut self, factory: ExtractorFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Hash stored with the run in the ledger
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    /// Restricts the run to a single site
    pub fn with_site_filter(mut self, name: &str) -> Result<Self, HarvestError> {
        if self.config.site(name).is_none() {
            return Err(HarvestError::UnknownSite(name.to_string()));
        }
        self.only_site = Some(name.to_string());
        Ok(self)
    }

    /// Token that cancels this orchestrator's run
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run history this orchestrator writes to
    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    /// Current state of a site
    pub fn state_of(&self, site: &str) -> Option<SiteState> {
        self.states.get(site).copied()
    }

    /// Descriptors this orchestrator will run, in configuration order
    pub fn selected_sites(&self) -> Vec<SiteDescriptor> {
        self.config
            .sites
            .iter()
            .filter(|site| self.only_site.as_deref().map_or(true, |only| only == site.name))
            .cloned()
            .collect()
    }

    /// Deletes the checkpoints of the selected sites
    ///
    /// # Returns
    ///
    /// The number of checkpoints removed
    pub fn reset_checkpoints(&self) -> Result<usize, HarvestError> {
        let mut removed = 0;
        for site in self.selected_sites() {
            if self.store.remove(&site.name)? {
                tracing::info!("Removed checkpoint for {}", site.name);
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn transition(&mut self, site: &str, to: SiteState) -> Result<(), HarvestError> {
        let from = self
            .states
            .get(site)
            .copied()
            .ok_or_else(|| HarvestError::UnknownSite(site.to_string()))?;

        if !from.can_transition_to(to) {
            return Err(HarvestError::InvalidTransition {
                site: site.to_string(),
                from,
                to,
            });
        }

        tracing::debug!("[{}] {} -> {}", site, from, to);
        self.states.insert(site.to_string(), to);
        Ok(())
    }

    /// Runs every selected site until it is terminal or the run is cancelled
    ///
    /// Every site starts the run Pending, so an orchestrator can be run again;
    /// checkpoints decide what a repeated run skips. Ledger write failures are
    /// logged and otherwise ignored.
    pub async fn run(&mut self) -> Result<RunOutcome, HarvestError> {
        for state in self.states.values_mut() {
            *state = SiteState::Pending;
        }

        let run_id = match self.ledger.create_run(&self.config_hash) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Run ledger unavailable: {}", e);
                None
            }
        };
        tracing::info!("Starting harvest run {}", run_id.unwrap_or_default());

        let start_time = std::time::Instant::now();
        let sites = self.selected_sites();
        let mut reports = Vec::new();
        let mut interrupted = false;

        for site in &sites {
            if self.cancel.is_cancelled() {
                interrupted = true;
                break;
            }

            match self.run_site(site).await? {
                SiteRun::Finished(report) => {
                    self.record(run_id, &report);
                    reports.push(report);
                }
                SiteRun::Interrupted => {
                    self.record(
                        run_id,
                        &SiteReport {
                            name: site.name.clone(),
                            state: SiteState::InProgress,
                            products: 0,
                            failed_urls: 0,
                            reason: Some("interrupted".to_string()),
                            resumed: false,
                        },
                    );
                    interrupted = true;
                    break;
                }
            }
        }

        let pending: Vec<String> = sites
            .iter()
            .filter(|site| !self.state_of(&site.name).is_some_and(|s| s.is_terminal()))
            .map(|site| site.name.clone())
            .collect();

        if let Some(run_id) = run_id {
            let status = if interrupted {
                RunStatus::Interrupted
            } else {
                RunStatus::Completed
            };
            if let Err(e) = self.ledger.finish_run(run_id, status) {
                tracing::warn!("Failed to finish run {} in ledger: {}", run_id, e);
            }
        }

        if interrupted {
            tracing::warn!(
                "Harvest interrupted after {:?}; {} sites left pending",
                start_time.elapsed(),
                pending.len()
            );
        } else {
            tracing::info!(
                "Harvest completed: {} sites in {:?}",
                reports.len(),
                start_time.elapsed()
            );
        }

        Ok(RunOutcome {
            run_id,
            reports,
            pending,
            interrupted,
        })
    }

    async fn run_site(&mut self, site: &SiteDescriptor) -> Result<SiteRun, HarvestError> {
        match self.store.load(&site.name) {
            Ok(Some(checkpoint)) => {
                if !checkpoint.matches(site) {
                    tracing::warn!(
                        "[{}] Checkpoint was written with a different site configuration; \
                         use --fresh --site {} to harvest it again",
                        site.name,
                        site.name
                    );
                }
                self.transition(&site.name, SiteState::Completed)?;
                tracing::info!(
                    "[{}] Already completed at {} ({} products), skipping",
                    site.name,
                    checkpoint.completed_at,
                    checkpoint.products.len()
                );
                return Ok(SiteRun::Finished(SiteReport {
                    name: site.name.clone(),
                    state: SiteState::Completed,
                    products: checkpoint.products.len(),
                    failed_urls: 0,
                    reason: None,
                    resumed: true,
                }));
            }
            Ok(None) => {}
            Err(e) => {
                self.transition(&site.name, SiteState::InProgress)?;
                return self.fail(site, 0, format!("unreadable checkpoint: {}", e));
            }
        }

        self.transition(&site.name, SiteState::InProgress)?;
        tracing::info!("[{}] Harvesting {}", site.name, site.base_url);

        let extractor = (self.factory)(site, &self.config.harvest);

        let listing = tokio::select! {
            _ = self.cancel.cancelled() => None,
            result = extractor.list_product_urls(&self.fetch) => Some(result),
        };
        let urls = match listing {
            None => return Ok(SiteRun::Interrupted),
            Some(Ok(urls)) => urls,
            Some(Err(e)) => return self.fail(site, 0, format!("listing failed: {}", e)),
        };

        let extraction = extract_site(
            &site.name,
            extractor.as_ref(),
            &self.fetch,
            &urls,
            self.config.harvest.workers_per_site as usize,
            self.config.harvest.site_retry_budget,
            &self.cancel,
        )
        .await;

        match extraction {
            SiteExtraction::Interrupted => {
                tracing::warn!("[{}] Interrupted; partial results discarded", site.name);
                Ok(SiteRun::Interrupted)
            }
            SiteExtraction::BudgetExhausted {
                failed_urls,
                last_failure,
            } => self.fail(
                site,
                failed_urls,
                format!(
                    "retry budget exhausted: {} failed URLs (budget {}), last: {}",
                    failed_urls, self.config.harvest.site_retry_budget, last_failure
                ),
            ),
            SiteExtraction::Finished {
                products,
                failed_urls,
            } => {
                let count = products.len();
                let checkpoint = SiteCheckpoint::new(site, products);
                if let Err(e) = self.store.save(&checkpoint) {
                    return self.fail(site, failed_urls, format!("checkpoint write failed: {}", e));
                }

                self.transition(&site.name, SiteState::Completed)?;
                tracing::info!(
                    "[{}] Completed: {} products from {} URLs ({} failed)",
                    site.name,
                    count,
                    urls.len(),
                    failed_urls
                );
                Ok(SiteRun::Finished(SiteReport {
                    name: site.name.clone(),
                    state: SiteState::Completed,
                    products: count,
                    failed_urls,
                    reason: None,
                    resumed: false,
                }))
            }
        }
    }

    fn fail(
        &mut self,
        site: &SiteDescriptor,
        failed_urls: u32,
        reason: String,
    ) -> Result<SiteRun, HarvestError> {
        self.transition(&site.name, SiteState::Failed)?;
        tracing::warn!("[{}] Failed: {}", site.name, reason);
        Ok(SiteRun::Finished(SiteReport {
            name: site.name.clone(),
            state: SiteState::Failed,
            products: 0,
            failed_urls,
            reason: Some(reason),
            resumed: false,
        }))
    }

    fn record(&mut self, run_id: Option<i64>, report: &SiteReport) {
        let Some(run_id) = run_id else {
            return;
        };
        if let Err(e) = self.ledger.record_site_outcome(run_id, &report.to_outcome()) {
            tracing::warn!("Failed to record outcome of {} in ledger: {}", report.name, e);
        }
    }
}
