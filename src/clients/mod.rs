pub mod http;

pub use http::HttpClient;

use async_trait::async_trait;

use crate::error::Result;

/// Retrieves the raw markup behind a URL. Retry and per-request timeout
/// policy live in the implementation, not in its callers.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}
