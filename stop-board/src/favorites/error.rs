//! Favorites error types.

use crate::domain::InvalidStopId;
use crate::storage::StorageError;

/// Errors from favorites operations.
///
/// Every rejection leaves the stored collection unchanged.
#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    /// A required field was empty after trimming
    #[error("{field} must not be empty")]
    Validation { field: &'static str },

    /// The stop ID could never be looked up
    #[error(transparent)]
    InvalidStopId(#[from] InvalidStopId),

    /// The stop is already a favorite
    #[error("stop {stop_id} is already in your favorites")]
    Duplicate { stop_id: String },

    /// No favorite has this ID
    #[error("favorite {id} not found")]
    NotFound { id: String },

    /// Reading or writing the collection failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}
