pub mod enrichment;
pub mod marketplace;
pub mod statistics;

pub use enrichment::{EnrichmentReport, EnrichmentScheduler, EnrichmentTarget, EnrichmentWorker};
pub use marketplace::{ItemsOutcome, MarketplaceService};
