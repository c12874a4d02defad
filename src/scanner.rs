use serde::{Deserialize, Serialize};

use crate::catalog::CatalogClient;
use crate::config::{AppConfig, MarketplaceConfig};
use crate::dedup_store::DedupStore;
use crate::models::Query;
use crate::plugins::{NotificationDispatcher, NotificationEvent};
use crate::session::{build_client, SessionProvider};
use crate::utils::error::Result;

/// Counters for one pass over the configured queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub queries_attempted: usize,
    pub queries_failed: usize,
    pub items_fetched: usize,
    pub items_new: usize,
    pub deliveries_failed: usize,
    pub records_failed: usize,
}

/// Ties session, catalog, dedup store and dispatcher into a single pass.
pub struct Scanner {
    session_provider: SessionProvider,
    catalog: CatalogClient,
    dispatcher: NotificationDispatcher,
    store: DedupStore,
    queries: Vec<Query>,
}

impl Scanner {
    pub fn new(
        marketplace: &MarketplaceConfig,
        queries: Vec<Query>,
        store: DedupStore,
        dispatcher: NotificationDispatcher,
    ) -> Result<Self> {
        let client = build_client()?;
        Ok(Self {
            session_provider: SessionProvider::new(client.clone(), marketplace)?,
            catalog: CatalogClient::new(client, marketplace)?,
            dispatcher,
            store,
            queries,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let dispatcher = NotificationDispatcher::from_config(
            &config.notifications,
            build_client()?,
            config.marketplace.timeout(),
        )?;
        let store = DedupStore::new(&config.storage.items_file);

        Self::new(&config.marketplace, config.queries.clone(), store, dispatcher)
    }

    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    /// Run every query once.
    ///
    /// Returns an error only for a fatal-abort: the item history cannot be
    /// read, or no session could be obtained. Query, item, delivery and
    /// storage-write failures are logged and counted in the summary.
    pub async fn run(&mut self) -> Result<RunSummary> {
        self.store.load().await.inspect_err(|e| {
            tracing::error!(path = %self.store.path().display(), error = %e, "Run aborted: item history unavailable");
        })?;

        let session = self.session_provider.acquire().await.inspect_err(|e| {
            tracing::error!(error = %e, "Run aborted: could not acquire a session");
        })?;

        let mut summary = RunSummary::default();
        for query in &self.queries {
            summary.queries_attempted += 1;

            let items = match self.catalog.fetch(query, &session).await {
                Ok(items) => items,
                Err(e) => {
                    summary.queries_failed += 1;
                    tracing::error!(query = %query, error = %e, "Query failed, continuing with next query");
                    continue;
                }
            };

            summary.items_fetched += items.len();
            tracing::info!(query = %query, count = items.len(), "Fetched items");

            for item in items {
                if self.store.contains(&item.id) {
                    continue;
                }

                summary.items_new += 1;
                let item_id = item.id.clone();
                tracing::info!(query = %query, item_id = %item_id, title = %item.title, "New item found");

                let event = NotificationEvent::new(item, query);
                let outcomes = self.dispatcher.notify(&event).await;
                summary.deliveries_failed += outcomes.iter().filter(|o| !o.success).count();

                if let Err(e) = self.store.record(&item_id).await {
                    summary.records_failed += 1;
                    tracing::error!(item_id = %item_id, error = %e, "Failed to persist item id; it may be notified again");
                }
            }
        }

        tracing::info!(
            queries = summary.queries_attempted,
            failed_queries = summary.queries_failed,
            fetched = summary.items_fetched,
            new = summary.items_new,
            failed_deliveries = summary.deliveries_failed,
            "Run complete"
        );

        Ok(summary)
    }
}
