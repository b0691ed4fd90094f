use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::storage::OutputFormat;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub http: HttpConfig,
    pub enrichment: EnrichmentConfig,
    pub marketplace: MarketplaceConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    /// Browser profile name handed to the rquest client (chrome, firefox, safari, edge).
    pub emulation: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            emulation: "chrome".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            retry_base_delay_ms: 500,
            headers: HashMap::new(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub concurrency: usize,
    pub worker_timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            concurrency: 16,
            worker_timeout_secs: 60,
        }
    }
}

impl EnrichmentConfig {
    pub fn worker_timeout(&self) -> Duration {
        Duration::from_secs(self.worker_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Replaces `https://www.ebay<suffix>` when set.
    pub base_url: Option<String>,
    pub skip_first_entry: bool,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            skip_first_entry: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "data".to_string(),
            format: OutputFormat::Csv,
        }
    }
}
