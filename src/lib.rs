pub mod clients;
pub mod config;
pub mod error;
pub mod extractors;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use clients::{HttpClient, PageFetcher};
pub use config::Settings;
pub use error::{Error, Result};
pub use models::{AverageReport, Item, SearchQuery};
pub use services::{ItemsOutcome, MarketplaceService};
pub use storage::{AggregateStore, OutputFormat, export_items};
