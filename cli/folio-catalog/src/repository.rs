//! The caching entry point for catalog consumers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument};
use url::Url;

use crate::client::{Client, ClientTrait};
use crate::error::CatalogClientError;
use crate::types::CatalogFeed;

/// The operations UI-facing callers may use.
#[allow(async_fn_in_trait)]
pub trait CatalogRepositoryTrait {
    /// Load the top-level catalog at `url`, from cache if it was loaded before.
    async fn load_top_level_catalog(
        &self,
        url: &Url,
    ) -> Result<Option<Arc<CatalogFeed>>, CatalogClientError>;

    /// Search the catalog. Results are never cached.
    async fn search(
        &self,
        query: impl AsRef<str> + Send + Sync,
        base_url: impl AsRef<str> + Send + Sync,
    ) -> Result<Option<Arc<CatalogFeed>>, CatalogClientError>;
}

/// Caches successful top-level fetches by URL for the lifetime of the repository.
///
/// Errors and fetches without a feed are not cached.
/// Two concurrent loads of the same uncached URL both reach the client;
/// whichever finishes last is the one left in the cache.
/// Dropping a pending load leaves the cache untouched.
#[derive(Debug)]
pub struct CatalogRepository<C = Client> {
    client: C,
    cache: Mutex<HashMap<Url, Arc<CatalogFeed>>>,
}

impl<C: ClientTrait> CatalogRepository<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl<C: ClientTrait> CatalogRepositoryTrait for CatalogRepository<C> {
    #[instrument(skip_all, fields(url = %url))]
    async fn load_top_level_catalog(
        &self,
        url: &Url,
    ) -> Result<Option<Arc<CatalogFeed>>, CatalogClientError> {
        if let Some(feed) = self.cache.lock().await.get(url) {
            debug!("catalog cache hit");
            return Ok(Some(Arc::clone(feed)));
        }
        debug!("catalog cache miss");

        // The lock is released while the request is in flight.
        let Some(feed) = self.client.fetch_feed(url).await? else {
            return Ok(None);
        };

        let feed = Arc::new(feed);
        self.cache
            .lock()
            .await
            .insert(url.clone(), Arc::clone(&feed));
        Ok(Some(feed))
    }

    #[instrument(skip_all, fields(query = %query.as_ref()))]
    async fn search(
        &self,
        query: impl AsRef<str> + Send + Sync,
        base_url: impl AsRef<str> + Send + Sync,
    ) -> Result<Option<Arc<CatalogFeed>>, CatalogClientError> {
        let feed = self.client.search(query, base_url).await?;
        Ok(feed.map(Arc::new))
    }
}
