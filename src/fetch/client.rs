use super::{FetchFailure, PageRenderer, UserAgentPool, MIN_CONTENT_BYTES};
use crate::config::{HarvestConfig, UserAgentConfig};
use crate::model::RawPage;
use crate::state::PolitenessWindow;
use chrono::Utc;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Rate-limited, retrying page fetcher
///
/// One client owns one politeness window. Workers that fetch in parallel each
/// get their own client through [`FetchClient::fork`], which shares the
/// connection pool and renderer but not the window.
pub struct FetchClient {
    http: Client,
    renderer: Option<Arc<dyn PageRenderer>>,
    user_agents: UserAgentPool,
    window: Mutex<PolitenessWindow>,
    delay: Duration,
    max_attempts: u32,
    renderer_warned: Arc<AtomicBool>,
}

impl FetchClient {
    /// Builds a fetch client from the harvest and user agent settings
    ///
    /// # Returns
    ///
    /// * `Ok(FetchClient)` - Client ready to fetch
    /// * `Err(reqwest::Error)` - The HTTP client could not be built
    pub fn new(
        harvest: &HarvestConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(harvest.request_timeout())
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            http,
            renderer: None,
            user_agents: UserAgentPool::from_config(user_agent),
            window: Mutex::new(PolitenessWindow::new(harvest.request_delay())),
            delay: harvest.request_delay(),
            max_attempts: harvest.max_attempts.max(1),
            renderer_warned: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Installs the capability used for pages that need dynamic rendering
    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// A client sharing this one's connection pool and renderer, with a fresh
    /// politeness window
    pub fn fork(&self) -> Self {
        Self {
            http: self.http.clone(),
            renderer: self.renderer.clone(),
            user_agents: self.user_agents.clone(),
            window: Mutex::new(PolitenessWindow::new(self.delay)),
            delay: self.delay,
            max_attempts: self.max_attempts,
            renderer_warned: Arc::clone(&self.renderer_warned),
        }
    }

    /// Number of requests this client has sent, retries included
    pub async fn request_count(&self) -> u64 {
        self.window.lock().await.request_count
    }

    /// Fetches a page, retrying transient failures
    ///
    /// The politeness delay is applied before every attempt, so retries are
    /// spaced like ordinary requests. A 404 ends the loop at once.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to fetch
    /// * `needs_dynamic_rendering` - Route through the installed renderer
    ///
    /// # Returns
    ///
    /// * `Ok(RawPage)` - Page with at least `MIN_CONTENT_BYTES` of content
    /// * `Err(FetchFailure)` - The last failure once attempts are exhausted
    pub async fn fetch(
        &self,
        url: &str,
        needs_dynamic_rendering: bool,
    ) -> Result<RawPage, FetchFailure> {
        let renderer = if needs_dynamic_rendering {
            self.renderer_or_warn()
        } else {
            None
        };

        let mut last_failure = FetchFailure::Network("no attempt made".to_string());
        for attempt in 1..=self.max_attempts {
            self.wait_for_window().await;
            let user_agent = self.user_agents.pick().to_string();

            let result = match renderer {
                Some(renderer) => self.fetch_rendered(renderer, url, &user_agent).await,
                None => self.fetch_plain(url, &user_agent).await,
            };

            match result {
                Ok(page) => return Ok(page),
                Err(failure) => {
                    tracing::debug!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        self.max_attempts,
                        url,
                        failure
                    );
                    if !failure.is_retryable() {
                        return Err(failure);
                    }
                    last_failure = failure;
                }
            }
        }

        Err(last_failure)
    }

    fn renderer_or_warn(&self) -> Option<&dyn PageRenderer> {
        match &self.renderer {
            Some(renderer) => Some(renderer.as_ref()),
            None => {
                if !self.renderer_warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!(
                        "Dynamic rendering requested but no renderer is installed; using plain HTTP"
                    );
                }
                None
            }
        }
    }

    /// Sleeps until the politeness window allows the next request and claims it
    async fn wait_for_window(&self) {
        let wait = {
            let mut window = self.window.lock().await;
            let now = Instant::now();
            let wait = window.time_until_next_request(now).unwrap_or(Duration::ZERO);
            window.record_request(now + wait);
            wait
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    async fn fetch_plain(&self, url: &str, user_agent: &str) -> Result<RawPage, FetchFailure> {
        let response = self
            .http
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let body = response.text().await?;
        check_content(&body)?;

        Ok(RawPage {
            url: url.to_string(),
            final_url,
            body,
            fetched_at: Utc::now(),
            status: status.as_u16(),
        })
    }

    async fn fetch_rendered(
        &self,
        renderer: &dyn PageRenderer,
        url: &str,
        user_agent: &str,
    ) -> Result<RawPage, FetchFailure> {
        let rendered = renderer.render(url, user_agent).await?;
        check_content(&rendered.html)?;

        Ok(RawPage {
            url: url.to_string(),
            final_url: rendered.final_url,
            body: rendered.html,
            fetched_at: Utc::now(),
            status: 200,
        })
    }
}

fn check_content(body: &str) -> Result<(), FetchFailure> {
    if body.trim().len() < MIN_CONTENT_BYTES {
        return Err(FetchFailure::EmptyContent);
    }
    Ok(())
}
