//! File-backed slot storage.

use std::io::ErrorKind;
use std::path::PathBuf;

use super::{SlotStorage, StorageError};

/// Slot storage that keeps each slot in `<dir>/<slot>.json`.
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    /// Create storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, slot: &str) -> Result<PathBuf, StorageError> {
        let valid = !slot.is_empty()
            && slot
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !valid {
            return Err(StorageError::InvalidSlot(slot.to_string()));
        }
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

impl SlotStorage for FileSlots {
    fn read(&self, slot: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(slot)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                slot: slot.to_string(),
                source,
            }),
        }
    }

    fn write(&self, slot: &str, contents: &str) -> Result<(), StorageError> {
        let path = self.path_for(slot)?;
        let io_err = |source| StorageError::Io {
            slot: slot.to_string(),
            source,
        };

        if !self.dir.as_os_str().is_empty() && !self.dir.exists() {
            std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        }

        // Write to a sibling file first so a crash never leaves half a document
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(io_err)?;
        std::fs::rename(&tmp, &path).map_err(io_err)?;

        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StorageError> {
        let path = self.path_for(slot)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                slot: slot.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_slot_reads_none() {
        let dir = tempdir().unwrap();
        let slots = FileSlots::new(dir.path());
        assert_eq!(slots.read("favorites").unwrap(), None);
    }

    #[test]
    fn write_then_read() {
        let dir = tempdir().unwrap();
        let slots = FileSlots::new(dir.path());

        slots.write("favorites", "[]").unwrap();
        assert_eq!(slots.read("favorites").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("favorites.json").exists());
    }

    #[test]
    fn write_replaces_contents() {
        let dir = tempdir().unwrap();
        let slots = FileSlots::new(dir.path());

        slots.write("favorites", "[1]").unwrap();
        slots.write("favorites", "[2]").unwrap();
        assert_eq!(slots.read("favorites").unwrap().as_deref(), Some("[2]"));
        assert!(!dir.path().join("favorites.json.tmp").exists());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");
        let slots = FileSlots::new(&nested);

        slots.write("pending_favorite", "{}").unwrap();
        assert!(nested.join("pending_favorite.json").exists());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let slots = FileSlots::new(dir.path());

        slots.write("pending_favorite", "{}").unwrap();
        slots.remove("pending_favorite").unwrap();
        assert_eq!(slots.read("pending_favorite").unwrap(), None);
        slots.remove("pending_favorite").unwrap();
    }

    #[test]
    fn rejects_path_like_slot_names() {
        let dir = tempdir().unwrap();
        let slots = FileSlots::new(dir.path());

        assert!(matches!(
            slots.write("../escape", "x"),
            Err(StorageError::InvalidSlot(_))
        ));
        assert!(matches!(slots.read(""), Err(StorageError::InvalidSlot(_))));
    }
}
