use std::path::Path;
use config::{Config, ConfigError, Environment, File};
use tracing::debug;

mod settings;

pub use settings::{EnrichmentConfig, HttpConfig, MarketplaceConfig, OutputConfig, Settings};

const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

impl Settings {
    /// Loads `config/default.yaml` if present, then `APP_` environment overrides.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_path(Path::new(DEFAULT_CONFIG_PATH), false)
    }

    /// Loads an explicit config file; a missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_path(path, true)
    }

    fn from_path(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        debug!(
            path = %path.display(),
            concurrency = settings.enrichment.concurrency,
            worker_timeout_secs = settings.enrichment.worker_timeout_secs,
            emulation = %settings.http.emulation,
            headers = ?settings.http.headers,
            "Loaded settings"
        );

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enrichment.concurrency == 0 {
            return Err(ConfigError::Message(
                "enrichment.concurrency must be at least 1".to_string(),
            ));
        }
        if self.enrichment.worker_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "enrichment.worker_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
