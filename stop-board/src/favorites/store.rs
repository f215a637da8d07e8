//! Persisted favorites collection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::StopId;
use crate::storage::{SlotStorage, StorageError};

use super::error::FavoritesError;

/// Slot holding the serialized collection.
const FAVORITES_SLOT: &str = "favorites";

/// A saved stop.
///
/// `id` is generated locally and is unrelated to the transit-system
/// `stop_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStop {
    pub id: String,
    pub stop_id: String,
    pub name: String,
}

/// CRUD over the favorites collection.
///
/// Every call reads the whole collection from storage, and every
/// successful mutation writes it back whole before returning. Mutations
/// take `&mut self`, so a caller sharing the store must serialise access
/// (the web layer keeps it behind a mutex).
///
/// Observers get the new collection after each change via [`subscribe`].
///
/// [`subscribe`]: FavoritesStore::subscribe
pub struct FavoritesStore {
    storage: Arc<dyn SlotStorage>,
    clock: fn() -> DateTime<Utc>,
    changes: watch::Sender<Vec<FavoriteStop>>,
}

impl FavoritesStore {
    /// Open the store, reading the current collection.
    pub fn open(storage: Arc<dyn SlotStorage>) -> Result<Self, FavoritesError> {
        let initial = load(storage.as_ref())?;
        let (changes, _) = watch::channel(initial);

        Ok(Self {
            storage,
            clock: Utc::now,
            changes,
        })
    }

    /// Use a different clock for ID generation.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Receive the collection after every successful change.
    ///
    /// The web pages do not subscribe: every form post redirects, and the
    /// follow-up GET reads the collection afresh.
    pub fn subscribe(&self) -> watch::Receiver<Vec<FavoriteStop>> {
        self.changes.subscribe()
    }

    /// All favorites, in the order they were added.
    pub fn list(&self) -> Result<Vec<FavoriteStop>, FavoritesError> {
        Ok(load(self.storage.as_ref())?)
    }

    /// Add a favorite.
    ///
    /// Both fields are trimmed and must be non-empty. The stop ID must be
    /// one the arrivals lookup accepts, and a stop can only be saved once.
    pub fn add(&mut self, stop_id: &str, name: &str) -> Result<FavoriteStop, FavoritesError> {
        let stop_id = stop_id.trim();
        let name = name.trim();

        if stop_id.is_empty() {
            return Err(FavoritesError::Validation { field: "stop ID" });
        }
        if name.is_empty() {
            return Err(FavoritesError::Validation { field: "name" });
        }
        let stop_id = StopId::parse(stop_id)?;
        let stop_id = stop_id.as_str();

        let mut favorites = load(self.storage.as_ref())?;

        if favorites.iter().any(|f| f.stop_id == stop_id) {
            return Err(FavoritesError::Duplicate {
                stop_id: stop_id.to_string(),
            });
        }

        let now_ms = (self.clock)().timestamp_millis();
        let favorite = FavoriteStop {
            id: next_id(&favorites, now_ms),
            stop_id: stop_id.to_string(),
            name: name.to_string(),
        };
        favorites.push(favorite.clone());

        self.commit(favorites)?;
        info!(id = %favorite.id, stop_id = %favorite.stop_id, "added favorite");

        Ok(favorite)
    }

    /// Rename a favorite.
    ///
    /// The new name is trimmed; an empty name is rejected and the old
    /// name kept.
    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<FavoriteStop, FavoritesError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(FavoritesError::Validation { field: "name" });
        }

        let mut favorites = load(self.storage.as_ref())?;

        let favorite = favorites
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| FavoritesError::NotFound { id: id.to_string() })?;
        favorite.name = new_name.to_string();
        let renamed = favorite.clone();

        self.commit(favorites)?;
        info!(id = %renamed.id, "renamed favorite");

        Ok(renamed)
    }

    /// Remove a favorite.
    ///
    /// Returns whether anything was removed. An unknown ID is a no-op and
    /// leaves storage untouched.
    pub fn remove(&mut self, id: &str) -> Result<bool, FavoritesError> {
        let mut favorites = load(self.storage.as_ref())?;

        let before = favorites.len();
        favorites.retain(|f| f.id != id);
        if favorites.len() == before {
            debug!(id, "remove of unknown favorite ignored");
            return Ok(false);
        }

        self.commit(favorites)?;
        info!(id, "removed favorite");

        Ok(true)
    }

    /// Persist the collection, then publish it.
    fn commit(&mut self, favorites: Vec<FavoriteStop>) -> Result<(), FavoritesError> {
        save(self.storage.as_ref(), &favorites)?;
        self.changes.send_replace(favorites);
        Ok(())
    }
}

/// Read the collection. A slot that was never written is empty.
fn load(storage: &dyn SlotStorage) -> Result<Vec<FavoriteStop>, StorageError> {
    let Some(json) = storage.read(FAVORITES_SLOT)? else {
        return Ok(Vec::new());
    };

    serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
        slot: FAVORITES_SLOT.to_string(),
        message: e.to_string(),
    })
}

fn save(storage: &dyn SlotStorage, favorites: &[FavoriteStop]) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(favorites).map_err(|e| StorageError::Corrupt {
        slot: FAVORITES_SLOT.to_string(),
        message: e.to_string(),
    })?;
    storage.write(FAVORITES_SLOT, &json)
}

/// Time-derived ID, bumped past every existing numeric ID so two adds in
/// the same millisecond (or after a clock step backwards) never collide.
fn next_id(favorites: &[FavoriteStop], now_ms: i64) -> String {
    let newest = favorites
        .iter()
        .filter_map(|f| f.id.parse::<i64>().ok())
        .max();

    match newest {
        Some(max) if max >= now_ms => max.saturating_add(1).to_string(),
        _ => now_ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileSlots, MemorySlots};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 4, 0, 0).unwrap()
    }

    fn store() -> FavoritesStore {
        FavoritesStore::open(Arc::new(MemorySlots::new()))
            .unwrap()
            .with_clock(fixed_clock)
    }

    #[test]
    fn new_store_is_empty() {
        assert!(store().list().unwrap().is_empty());
    }

    #[test]
    fn add_then_list() {
        let mut store = store();
        let added = store.add("123", "Home").unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].stop_id, "123");
        assert_eq!(all[0].name, "Home");
        assert!(!all[0].id.is_empty());
        assert_eq!(all[0], added);
    }

    #[test]
    fn add_trims_fields() {
        let mut store = store();
        let added = store.add("  123 ", "  Home  ").unwrap();
        assert_eq!(added.stop_id, "123");
        assert_eq!(added.name, "Home");
    }

    #[test]
    fn add_rejects_empty_fields() {
        let mut store = store();

        assert!(matches!(
            store.add("", "Home"),
            Err(FavoritesError::Validation { field: "stop ID" })
        ));
        assert!(matches!(
            store.add("123", "   "),
            Err(FavoritesError::Validation { field: "name" })
        ));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn add_rejects_unusable_stop_id() {
        let mut store = store();

        for bad in ["ABC-123", "../etc", "12 34"] {
            assert!(matches!(
                store.add(bad, "Home"),
                Err(FavoritesError::InvalidStopId(_))
            ));
        }
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn add_rejects_duplicate_stop() {
        let mut store = store();
        store.add("123", "Home").unwrap();

        let err = store.add("123", "Work").unwrap_err();
        assert!(matches!(err, FavoritesError::Duplicate { ref stop_id } if stop_id == "123"));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_check_ignores_surrounding_whitespace() {
        let mut store = store();
        store.add("123", "Home").unwrap();
        assert!(matches!(
            store.add(" 123 ", "Work"),
            Err(FavoritesError::Duplicate { .. })
        ));
    }

    #[test]
    fn ids_are_unique_under_a_frozen_clock() {
        let mut store = store();
        let a = store.add("1", "A").unwrap();
        let b = store.add("2", "B").unwrap();
        let c = store.add("3", "C").unwrap();

        assert_eq!(a.id, fixed_clock().timestamp_millis().to_string());
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let mut store = store();
        store.add("c", "Third alphabetically").unwrap();
        store.add("a", "First alphabetically").unwrap();
        store.add("b", "Second alphabetically").unwrap();

        let stops: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|f| f.stop_id)
            .collect();
        assert_eq!(stops, vec!["c", "a", "b"]);
    }

    #[test]
    fn rename_updates_name_in_place() {
        let mut store = store();
        store.add("1", "A").unwrap();
        let b = store.add("2", "B").unwrap();
        store.add("3", "C").unwrap();

        let renamed = store.rename(&b.id, "  Office ").unwrap();
        assert_eq!(renamed.name, "Office");
        assert_eq!(renamed.stop_id, "2");

        let names: Vec<_> = store.list().unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["A", "Office", "C"]);
    }

    #[test]
    fn rename_unknown_id_is_not_found() {
        let mut store = store();
        store.add("123", "Home").unwrap();
        let before = store.list().unwrap();

        assert!(matches!(
            store.rename("nope", "Work"),
            Err(FavoritesError::NotFound { .. })
        ));
        assert_eq!(store.list().unwrap(), before);
    }

    #[test]
    fn rename_to_empty_keeps_old_name() {
        let mut store = store();
        let fav = store.add("123", "Home").unwrap();

        assert!(matches!(
            store.rename(&fav.id, "  "),
            Err(FavoritesError::Validation { .. })
        ));
        assert_eq!(store.list().unwrap()[0].name, "Home");
    }

    #[test]
    fn remove_twice() {
        let mut store = store();
        let fav = store.add("123", "Home").unwrap();
        store.add("456", "Work").unwrap();

        assert!(store.remove(&fav.id).unwrap());
        assert_eq!(store.list().unwrap().len(), 1);

        assert!(!store.remove(&fav.id).unwrap());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn remove_keeps_order_of_remainder() {
        let mut store = store();
        store.add("1", "A").unwrap();
        let b = store.add("2", "B").unwrap();
        store.add("3", "C").unwrap();

        store.remove(&b.id).unwrap();
        let stops: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|f| f.stop_id)
            .collect();
        assert_eq!(stops, vec!["1", "3"]);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempdir().unwrap();
        let storage: Arc<dyn SlotStorage> = Arc::new(FileSlots::new(dir.path()));

        let mut store = FavoritesStore::open(storage.clone()).unwrap();
        store.add("123", "Home").unwrap();
        store.add("456", "Work").unwrap();
        let first = store.list().unwrap();
        drop(store);

        let reopened = FavoritesStore::open(storage).unwrap();
        assert_eq!(reopened.list().unwrap(), first);
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let storage = Arc::new(MemorySlots::new());
        let mut store = FavoritesStore::open(storage.clone()).unwrap();
        store.add("123", "Home").unwrap();

        let raw = storage.read(FAVORITES_SLOT).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["stopId"], "123");
        assert_eq!(value[0]["name"], "Home");
        assert!(value[0]["id"].is_string());
    }

    #[test]
    fn reads_collection_written_elsewhere() {
        let storage = Arc::new(MemorySlots::new());
        storage
            .write(
                FAVORITES_SLOT,
                r#"[{"id":"1700000000000","stopId":"ABC","name":"Gym"}]"#,
            )
            .unwrap();

        let mut store = FavoritesStore::open(storage).unwrap().with_clock(fixed_clock);
        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Gym");

        // New IDs keep moving forward
        let added = store.add("DEF", "Pool").unwrap();
        assert!(added.id.parse::<i64>().unwrap() > 1_700_000_000_000);
    }

    #[test]
    fn corrupt_slot_is_an_error() {
        let storage = Arc::new(MemorySlots::new());
        storage.write(FAVORITES_SLOT, "{not json").unwrap();

        assert!(matches!(
            FavoritesStore::open(storage),
            Err(FavoritesError::Storage(StorageError::Corrupt { .. }))
        ));
    }

    #[test]
    fn subscribers_see_each_change() {
        let mut store = store();
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        let fav = store.add("123", "Home").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.rename(&fav.id, "Flat").unwrap();
        assert_eq!(rx.borrow_and_update()[0].name, "Flat");

        store.remove(&fav.id).unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn rejected_changes_are_not_published() {
        let mut store = store();
        store.add("123", "Home").unwrap();
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        let _ = store.add("123", "Again");
        let _ = store.rename("missing", "X");
        let _ = store.remove("missing");
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn next_id_moves_past_existing() {
        let existing = vec![FavoriteStop {
            id: "500".into(),
            stop_id: "x".into(),
            name: "x".into(),
        }];
        assert_eq!(next_id(&existing, 100), "501");
        assert_eq!(next_id(&existing, 900), "900");
        assert_eq!(next_id(&[], 42), "42");
    }
}
