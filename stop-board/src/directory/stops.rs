//! The stop list the user is currently browsing.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::domain::Stop;

use super::client::DirectoryClient;
use super::error::NetworkError;

/// Number of stops shown on the browse page.
pub const BROWSE_PAGE_SIZE: usize = 50;

/// Maximum number of search matches returned.
pub const SEARCH_LIMIT: usize = 20;

/// Queries shorter than this return nothing.
pub const MIN_QUERY_CHARS: usize = 2;

/// Application-owned stop list.
///
/// Replaced wholesale by [`reload`](StopDirectory::reload) on every browse
/// page load; search runs against whatever was loaded last.
#[derive(Clone)]
pub struct StopDirectory {
    inner: Arc<RwLock<Vec<Stop>>>,
    client: DirectoryClient,
}

impl StopDirectory {
    /// Create an empty directory.
    pub fn new(client: DirectoryClient) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
            client,
        }
    }

    /// The underlying client.
    pub fn client(&self) -> &DirectoryClient {
        &self.client
    }

    /// Fetch the stop list and replace the current one.
    ///
    /// On failure the previous list is kept.
    pub async fn reload(&self) -> Result<usize, NetworkError> {
        let stops = self.client.fetch_stop_list().await?;
        let count = stops.len();
        self.replace(stops).await;
        info!(count, "loaded stop list");
        Ok(count)
    }

    /// Install a stop list.
    pub async fn replace(&self, stops: Vec<Stop>) {
        let mut guard = self.inner.write().await;
        *guard = stops;
    }

    /// Number of loaded stops.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether nothing is loaded.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// The first `limit` stops, in directory order.
    pub async fn browse(&self, limit: usize) -> Vec<Stop> {
        let guard = self.inner.read().await;
        guard.iter().take(limit).cloned().collect()
    }

    /// Stops whose primary or secondary name contains `query`.
    ///
    /// Case-insensitive. Queries shorter than [`MIN_QUERY_CHARS`] after
    /// trimming match nothing. Loads the list first if nothing has been
    /// loaded yet.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Stop>, NetworkError> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        if self.is_empty().await {
            self.reload().await?;
        }

        let guard = self.inner.read().await;
        Ok(filter_stops(&guard, &needle, limit))
    }
}

/// First `limit` stops matching a lowercase needle.
fn filter_stops(stops: &[Stop], needle: &str, limit: usize) -> Vec<Stop> {
    stops
        .iter()
        .filter(|s| s.matches(needle))
        .take(limit)
        .cloned()
        .collect()
}
