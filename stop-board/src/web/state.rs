//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::directory::StopDirectory;
use crate::favorites::{FavoritesStore, PendingFavoriteSlot};

/// Shared application state.
///
/// Owns everything the handlers touch; nothing lives in globals.
#[derive(Clone)]
pub struct AppState {
    /// Stop list and directory client
    pub directory: StopDirectory,

    /// Favorites collection. Locked for the whole of each operation so
    /// read-modify-write cycles never interleave.
    pub favorites: Arc<Mutex<FavoritesStore>>,

    /// Browse-to-favorites handoff
    pub pending: PendingFavoriteSlot,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        directory: StopDirectory,
        favorites: FavoritesStore,
        pending: PendingFavoriteSlot,
    ) -> Self {
        Self {
            directory,
            favorites: Arc::new(Mutex::new(favorites)),
            pending,
        }
    }
}
