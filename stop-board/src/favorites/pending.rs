//! Browse-to-favorites handoff.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{SlotStorage, StorageError};

/// Slot holding the pending handoff.
const PENDING_SLOT: &str = "pending_favorite";

/// A stop the user asked to save, waiting for the favorites form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFavorite {
    pub stop_id: String,
    pub stop_name: String,
}

impl PendingFavorite {
    /// Name to pre-fill in the add form.
    pub fn suggested_name(&self) -> String {
        format!("{} Stop", self.stop_name)
    }
}

/// Single-use storage for a [`PendingFavorite`].
#[derive(Clone)]
pub struct PendingFavoriteSlot {
    storage: Arc<dyn SlotStorage>,
}

impl PendingFavoriteSlot {
    pub fn new(storage: Arc<dyn SlotStorage>) -> Self {
        Self { storage }
    }

    /// Store a handoff, replacing any earlier one.
    pub fn put(&self, pending: &PendingFavorite) -> Result<(), StorageError> {
        let json = serde_json::to_string(pending).map_err(|e| StorageError::Corrupt {
            slot: PENDING_SLOT.to_string(),
            message: e.to_string(),
        })?;
        self.storage.write(PENDING_SLOT, &json)
    }

    /// Consume the handoff. The slot is empty afterwards.
    ///
    /// An unreadable handoff is discarded with a warning.
    pub fn take(&self) -> Result<Option<PendingFavorite>, StorageError> {
        let Some(json) = self.storage.read(PENDING_SLOT)? else {
            return Ok(None);
        };
        self.storage.remove(PENDING_SLOT)?;

        match serde_json::from_str(&json) {
            Ok(pending) => Ok(Some(pending)),
            Err(e) => {
                warn!(error = %e, "discarding unreadable pending favorite");
                Ok(None)
            }
        }
    }
}
