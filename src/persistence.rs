// Saving and loading the itinerary under a single store key
// Failures are caught here and turned into a one-line notice for the user;
// a failed load never touches the trip that is currently open

use bytes::Bytes;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

use crate::itinerary::{Snapshot, Trip};
use crate::storage::{KeyValueStore, StorageError};

pub const STORAGE_KEY: &str = "ei.itinerary.v1";

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("No saved itinerary")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Corrupt snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),
}

// Messages shown after a save or load attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Saved,
    SaveFailed,
    Loaded,
    NothingSaved,
    LoadFailed,
}

impl Notice {
    pub fn is_failure(&self) -> bool {
        matches!(self, Notice::SaveFailed | Notice::LoadFailed)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Notice::Saved => "Itinerary saved",
            Notice::SaveFailed => "Failed to save.",
            Notice::Loaded => "Itinerary loaded",
            Notice::NothingSaved => "No saved itinerary",
            Notice::LoadFailed => "Failed to load.",
        };
        f.write_str(message)
    }
}

pub struct TripRepository<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> TripRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(&self, trip: &Trip) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec(&trip.to_snapshot())?;
        self.store.set(&self.key, Bytes::from(json))?;
        info!(key = %self.key, days = trip.day_count(), "Itinerary saved");
        Ok(())
    }

    pub fn load(&self) -> Result<Trip, PersistenceError> {
        let data = self
            .store
            .get(&self.key)?
            .filter(|data| !data.iter().all(u8::is_ascii_whitespace))
            .ok_or(PersistenceError::NotFound)?;
        let snapshot: Snapshot = serde_json::from_slice(&data)?;
        let trip = Trip::from_snapshot(snapshot);
        info!(key = %self.key, days = trip.day_count(), "Itinerary loaded");
        Ok(trip)
    }

    pub fn delete(&self) -> Result<bool, PersistenceError> {
        Ok(self.store.remove(&self.key)?)
    }

    pub fn save_with_notice(&self, trip: &Trip) -> Notice {
        match self.save(trip) {
            Ok(()) => Notice::Saved,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Saving itinerary failed");
                Notice::SaveFailed
            }
        }
    }

    /// Replaces `trip` with the saved itinerary. On any failure `trip` is
    /// left exactly as it was.
    pub fn load_into(&self, trip: &mut Trip) -> Notice {
        match self.load() {
            Ok(loaded) => {
                *trip = loaded;
                Notice::Loaded
            }
            Err(PersistenceError::NotFound) => Notice::NothingSaved,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Loading itinerary failed");
                Notice::LoadFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itinerary::Currency;
    use crate::storage::MemoryStore;

    // Store that is always unavailable, like a browser with storage disabled
    struct UnavailableStore;

    impl KeyValueStore for UnavailableStore {
        fn get(&self, _key: &str) -> Result<Option<Bytes>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn set(&self, _key: &str, _value: Bytes) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<bool, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
    }

    fn sample_trip() -> Trip {
        let mut trip = Trip::new(2, Currency::Usd);
        trip.add_activity(1, "Museum", 25.0);
        trip.add_activity(2, "Harbour cruise", 60.0);
        trip
    }

    #[test]
    fn test_save_then_load() {
        let repo = TripRepository::new(MemoryStore::new());
        let trip = sample_trip();

        assert_eq!(repo.save_with_notice(&trip), Notice::Saved);
        assert_eq!(repo.load().unwrap(), trip);

        let stored = repo.store().get(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&stored).unwrap();
        assert_eq!(value["currency"], "USD");
        assert_eq!(value["days"][1]["activities"][0]["cost"], 60);
    }

    #[test]
    fn test_load_into_replaces_trip() {
        let repo = TripRepository::new(MemoryStore::new());
        repo.save(&sample_trip()).unwrap();

        let mut current = Trip::default();
        assert_eq!(repo.load_into(&mut current), Notice::Loaded);
        assert_eq!(current, sample_trip());
    }

    #[test]
    fn test_load_without_saved_data() {
        let repo = TripRepository::new(MemoryStore::new());
        assert!(matches!(repo.load(), Err(PersistenceError::NotFound)));

        let mut current = sample_trip();
        let notice = repo.load_into(&mut current);
        assert_eq!(notice, Notice::NothingSaved);
        assert_eq!(notice.to_string(), "No saved itinerary");
        assert_eq!(current, sample_trip());
    }

    #[test]
    fn test_empty_saved_value_counts_as_nothing_saved() {
        let repo = TripRepository::new(MemoryStore::new());
        for raw in [Bytes::new(), Bytes::from_static(b"  \n")] {
            repo.store().set(STORAGE_KEY, raw).unwrap();
            assert!(matches!(repo.load(), Err(PersistenceError::NotFound)));

            let mut current = sample_trip();
            assert_eq!(repo.load_into(&mut current), Notice::NothingSaved);
            assert_eq!(current, sample_trip());
        }
    }

    #[test]
    fn test_corrupt_json_leaves_trip_untouched() {
        let repo = TripRepository::new(MemoryStore::new());
        repo.store()
            .set(STORAGE_KEY, Bytes::from_static(b"{\"days\": [oops"))
            .unwrap();

        assert!(matches!(repo.load(), Err(PersistenceError::Corrupt(_))));

        let mut current = sample_trip();
        let notice = repo.load_into(&mut current);
        assert_eq!(notice, Notice::LoadFailed);
        assert_eq!(notice.to_string(), "Failed to load.");
        assert_eq!(current, sample_trip());
    }

    #[test]
    fn test_empty_days_are_normalized_on_load() {
        let repo = TripRepository::new(MemoryStore::new());
        repo.store()
            .set(
                STORAGE_KEY,
                Bytes::from_static(b"{\"travelers\":3,\"currency\":\"INR\",\"days\":[]}"),
            )
            .unwrap();

        let trip = repo.load().unwrap();
        assert_eq!(trip.travelers(), 3);
        assert_eq!(trip.day_count(), 1);
        assert!(trip.days()[0].activities.is_empty());
    }

    #[test]
    fn test_unavailable_store_reports_notices() {
        let repo = TripRepository::new(UnavailableStore);
        let mut current = sample_trip();

        let saved = repo.save_with_notice(&current);
        assert_eq!(saved, Notice::SaveFailed);
        assert!(saved.is_failure());
        assert_eq!(saved.to_string(), "Failed to save.");

        assert_eq!(repo.load_into(&mut current), Notice::LoadFailed);
        assert_eq!(current, sample_trip());
        assert!(matches!(repo.delete(), Err(PersistenceError::Storage(_))));
    }

    #[test]
    fn test_custom_key_and_delete() {
        let repo = TripRepository::with_key(MemoryStore::new(), "draft");
        repo.save(&sample_trip()).unwrap();
        assert_eq!(repo.key(), "draft");
        assert!(repo.store().get(STORAGE_KEY).unwrap().is_none());

        assert!(repo.delete().unwrap());
        assert!(matches!(repo.load(), Err(PersistenceError::NotFound)));
    }
}
