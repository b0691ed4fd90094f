use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::clients::{HttpClient, PageFetcher};
use crate::config::{EnrichmentConfig, MarketplaceConfig, Settings};
use crate::error::Result;
use crate::extractors::{Extractor, ListingExtractor, SoldPriceExtractor};
use crate::models::{AverageReport, Item, ListingType, SearchQuery};
use crate::services::enrichment::{
    EnrichmentReport, EnrichmentScheduler, EnrichmentTarget, EnrichmentWorker,
};
use crate::services::statistics;
use crate::storage::AggregateStore;

/// Final rows of an `items` query plus how their enrichment went.
#[derive(Debug, Clone)]
pub struct ItemsOutcome {
    pub items: Vec<Item>,
    pub report: EnrichmentReport,
}

/// Entry point for both query modes.
#[derive(Clone)]
pub struct MarketplaceService {
    fetcher: Arc<dyn PageFetcher>,
    marketplace: MarketplaceConfig,
    enrichment: EnrichmentConfig,
}

impl MarketplaceService {
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: &Settings) -> Self {
        Self {
            fetcher,
            marketplace: settings.marketplace.clone(),
            enrichment: settings.enrichment.clone(),
        }
    }

    /// Builds the service around an rquest [`HttpClient`].
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = HttpClient::new(&settings.http)?;
        Ok(Self::new(Arc::new(client), settings))
    }

    pub async fn items(&self, query: &SearchQuery) -> Result<ItemsOutcome> {
        self.items_until(query, std::future::pending()).await
    }

    /// Fetches the first result page, stores its listings, then enriches
    /// them. A failed listing fetch fails the query; a failed detail fetch
    /// only leaves that item un-enriched.
    #[instrument(skip_all, fields(query = %query.query, region = %query.region))]
    pub async fn items_until<S>(&self, query: &SearchQuery, shutdown: S) -> Result<ItemsOutcome>
    where
        S: Future<Output = ()>,
    {
        let url = query.search_url(self.marketplace.base_url.as_deref(), false);
        info!(
            url = %url,
            condition = %query.condition,
            listing_type = %query.listing_type,
            "Fetching listing page"
        );

        let body = self.fetcher.fetch(&url).await?;
        let entries = ListingExtractor::new(self.marketplace.skip_first_entry).extract(&body);

        let store = AggregateStore::new();
        for entry in &entries {
            store.upsert_merge(&entry.item_code, entry.to_patch()).await;
        }
        info!(listings = entries.len(), "Stored listing records");

        let targets: Vec<EnrichmentTarget> = entries.iter().map(EnrichmentTarget::from).collect();
        let worker = EnrichmentWorker::new(self.fetcher.clone(), store.clone());
        let scheduler = EnrichmentScheduler::new(worker, &self.enrichment);
        let report = scheduler.run_until(targets, shutdown).await;

        Ok(ItemsOutcome {
            items: store.get_all().await,
            report,
        })
    }

    /// Trimmed average price and shipping over sold listings. The listing
    /// type filter does not apply to this mode.
    #[instrument(skip_all, fields(query = %query.query, region = %query.region))]
    pub async fn average(&self, query: &SearchQuery) -> Result<AverageReport> {
        let query = query.clone().with_listing_type(ListingType::All);
        let url = query.search_url(self.marketplace.base_url.as_deref(), true);
        info!(url = %url, condition = %query.condition, "Fetching sold listings");

        let body = self.fetcher.fetch(&url).await?;
        let sample = SoldPriceExtractor.extract(&body);
        debug!(
            prices = sample.prices.len(),
            shipping = sample.shipping.len(),
            "Collected price sample"
        );

        let report = statistics::average_report(&sample.prices, &sample.shipping);
        info!(
            price = report.price,
            shipping = report.shipping,
            total = report.total,
            "Computed trimmed averages"
        );
        Ok(report)
    }
}
