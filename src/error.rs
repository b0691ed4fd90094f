use thiserror::Error;
use parquet::errors::ParquetError;
use arrow::error::ArrowError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] rquest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Unsupported {parameter} '{value}', please use one of the following: {allowed}")]
    Validation {
        parameter: &'static str,
        value: String,
        allowed: String,
    },

    #[error("Unexpected status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Forbidden - Access denied")]
    Forbidden,

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("No item code in url: {0}")]
    InvalidItemUrl(String),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl Error {
    /// Whether a fetch that failed with this error is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimit | Error::Timeout(_) => true,
            Error::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
