//! Named-slot durable storage.
//!
//! Each slot holds one JSON document. Slots are read and written whole;
//! there are no partial updates.

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileSlots;
pub use memory::MemorySlots;

/// Key-value storage of whole documents.
pub trait SlotStorage: Send + Sync {
    /// Read the contents of a slot, or `None` if it has never been written.
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Replace the contents of a slot.
    fn write(&self, slot: &str, contents: &str) -> Result<(), StorageError>;

    /// Clear a slot. Clearing an empty slot is not an error.
    fn remove(&self, slot: &str) -> Result<(), StorageError>;
}
