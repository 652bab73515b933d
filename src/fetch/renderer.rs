use super::FetchFailure;
use async_trait::async_trait;

/// A page produced by a rendering backend after scripts ran
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub final_url: String,
    pub html: String,
}

/// Opaque page-rendering capability for sites that build their DOM in the browser
///
/// Implementations drive a real browser (or a rendering service); the fetch
/// client only needs the resulting HTML. Politeness and retries are applied
/// by the caller.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str, user_agent: &str) -> Result<RenderedPage, FetchFailure>;
}
