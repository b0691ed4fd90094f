use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Item, ItemPatch};

#[derive(Debug, Default)]
struct Records {
    by_code: HashMap<String, ItemPatch>,
    /// Codes in first-insertion order, for stable snapshots.
    order: Vec<String>,
}

/// In-memory item store shared by the extractor and every enrichment worker.
///
/// The only mutation is [`AggregateStore::upsert_merge`], performed under a
/// single write lock, so concurrent merges on the same code never lose or
/// tear a field. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct AggregateStore {
    inner: Arc<RwLock<Records>>,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `patch` under `item_code`, or merges its set fields into the
    /// existing record.
    pub async fn upsert_merge(&self, item_code: &str, patch: ItemPatch) {
        let mut records = self.inner.write().await;
        match records.by_code.get_mut(item_code) {
            Some(existing) => {
                existing.merge(patch);
                debug!(item_code = item_code, "Merged into existing record");
            }
            None => {
                records.order.push(item_code.to_string());
                records.by_code.insert(item_code.to_string(), patch);
                debug!(item_code = item_code, "Inserted new record");
            }
        }
    }

    /// Point-in-time copy of every record with defaults applied. Only final
    /// once the enrichment scheduler has returned.
    pub async fn get_all(&self) -> Vec<Item> {
        let records = self.inner.read().await;
        records
            .order
            .iter()
            .filter_map(|code| {
                records
                    .by_code
                    .get(code)
                    .map(|patch| Item::from_patch(code.as_str(), patch))
            })
            .collect()
    }

    pub async fn get(&self, item_code: &str) -> Option<Item> {
        let records = self.inner.read().await;
        records
            .by_code
            .get(item_code)
            .map(|patch| Item::from_patch(item_code, patch))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_code.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn enriched_count(&self) -> usize {
        let records = self.inner.read().await;
        records.by_code.values().filter(|patch| patch.is_enriched()).count()
    }
}
