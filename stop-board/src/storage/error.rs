//! Storage error types.

/// Errors from reading or writing a storage slot.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("storage I/O error on slot {slot}: {source}")]
    Io {
        slot: String,
        #[source]
        source: std::io::Error,
    },

    /// Slot contents could not be encoded or decoded
    #[error("corrupt data in slot {slot}: {message}")]
    Corrupt { slot: String, message: String },

    /// Slot name would escape the storage directory
    #[error("invalid slot name: {0}")]
    InvalidSlot(String),
}
