//! Client-side trip persistence.
//!
//! Layout inside the key-value store:
//! - `trip_<id>`  → one [`StoredTrip`] document
//! - `trip_index` → `[{id, name, date}]`, appended on save (oldest first)
//!
//! An unreadable index is rebuilt from the `trip_*` documents.
//!
//! There is no locking across processes: two CLIs writing the same store file
//! can lose each other's index updates.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::warn;
use wayfarer_common::{ItineraryError, StoredTrip, Trip, TripIndexEntry};

const INDEX_KEY: &str = "trip_index";

fn trip_key(id: &str) -> String {
    format!("trip_{id}")
}

fn storage(err: impl std::fmt::Display) -> ItineraryError {
    ItineraryError::Storage(err.to_string())
}

// =============================================================================
// KeyValueStore port
// =============================================================================

/// String-keyed, string-valued persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ItineraryError>;
    fn put(&self, key: &str, value: String) -> Result<(), ItineraryError>;
    fn delete(&self, key: &str) -> Result<(), ItineraryError>;
    fn keys(&self) -> Result<Vec<String>, ItineraryError>;
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ItineraryError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> Result<(), ItineraryError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), ItineraryError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, ItineraryError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.keys().cloned().collect())
    }
}

/// All keys in one JSON object on disk. Every write rewrites the file via a
/// temporary sibling and a rename.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, ItineraryError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(storage(format!("{}: {e}", self.path.display()))),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| storage(format!("{} is not a valid store file: {e}", self.path.display())))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), ItineraryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(storage)?;
        }
        let content = serde_json::to_string_pretty(entries).map_err(storage)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        if let Err(e) = std::fs::write(&tmp_path, content)
            .and_then(|()| std::fs::rename(&tmp_path, &self.path))
        {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(storage(format!("{}: {e}", self.path.display())));
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ItineraryError> {
        Ok(self.read_all()?.remove(key))
    }

    fn put(&self, key: &str, value: String) -> Result<(), ItineraryError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), ItineraryError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, ItineraryError> {
        Ok(self.read_all()?.into_keys().collect())
    }
}

// =============================================================================
// TripStore
// =============================================================================

#[derive(Clone)]
pub struct TripStore {
    kv: Arc<dyn KeyValueStore>,
}

impl TripStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persist a freshly generated trip and list it under `start_date`.
    pub fn save_new(&self, trip: Trip, start_date: &str) -> Result<StoredTrip, ItineraryError> {
        self.save_new_at(trip, start_date, Utc::now())
    }

    pub fn save_new_at(
        &self,
        trip: Trip,
        start_date: &str,
        now: DateTime<Utc>,
    ) -> Result<StoredTrip, ItineraryError> {
        let id = self.free_id(now.timestamp_millis())?;
        let stored = StoredTrip {
            id: id.clone(),
            trip,
            created_at: now,
        };
        self.write_trip(&stored)?;

        let mut index = self.read_index()?;
        index.push(TripIndexEntry {
            id,
            name: stored.trip.trip_name.clone(),
            date: start_date.to_string(),
        });
        self.write_index(&index)?;
        Ok(stored)
    }

    /// `None` when the trip is missing or its document cannot be read back.
    pub fn load(&self, id: &str) -> Result<Option<StoredTrip>, ItineraryError> {
        let Some(raw) = self.kv.get(&trip_key(id))? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(stored) => Ok(Some(stored)),
            Err(e) => {
                warn!(id, error = %e, "Stored trip is corrupt, treating as missing");
                Ok(None)
            }
        }
    }

    /// Overwrite the trip under `id`. `createdAt` is refreshed; the index entry is left as is.
    pub fn replace(&self, id: &str, trip: Trip) -> Result<StoredTrip, ItineraryError> {
        if self.kv.get(&trip_key(id))?.is_none() {
            return Err(ItineraryError::NotFound(id.to_string()));
        }
        let stored = StoredTrip {
            id: id.to_string(),
            trip,
            created_at: Utc::now(),
        };
        self.write_trip(&stored)?;
        Ok(stored)
    }

    /// Remove the document and its index entry. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool, ItineraryError> {
        let existed = self.kv.get(&trip_key(id))?.is_some();
        self.kv.delete(&trip_key(id))?;

        let mut index = self.read_index()?;
        let before = index.len();
        index.retain(|entry| entry.id != id);
        let unlisted = index.len() != before;
        if unlisted {
            self.write_index(&index)?;
        }
        Ok(existed || unlisted)
    }

    /// Saved trips, newest first.
    pub fn list(&self) -> Result<Vec<TripIndexEntry>, ItineraryError> {
        let mut index = self.read_index()?;
        index.reverse();
        Ok(index)
    }

    fn free_id(&self, millis: i64) -> Result<String, ItineraryError> {
        let mut candidate = millis;
        while self.kv.get(&trip_key(&candidate.to_string()))?.is_some() {
            candidate += 1;
        }
        Ok(candidate.to_string())
    }

    fn write_trip(&self, stored: &StoredTrip) -> Result<(), ItineraryError> {
        let raw = serde_json::to_string(stored).map_err(storage)?;
        self.kv.put(&trip_key(&stored.id), raw)
    }

    fn read_index(&self) -> Result<Vec<TripIndexEntry>, ItineraryError> {
        let Some(raw) = self.kv.get(INDEX_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(index) => Ok(index),
            Err(e) => {
                warn!(error = %e, "Trip index is corrupt, rebuilding from stored trips");
                self.rebuild_index()
            }
        }
    }

    /// Index entries for every readable `trip_<id>` document, oldest id first.
    /// The listing date falls back to the first day of the trip.
    fn rebuild_index(&self) -> Result<Vec<TripIndexEntry>, ItineraryError> {
        let mut trips = Vec::new();
        for key in self.kv.keys()? {
            if key == INDEX_KEY {
                continue;
            }
            if let Some(id) = key.strip_prefix("trip_") {
                if let Some(stored) = self.load(id)? {
                    trips.push(stored);
                }
            }
        }
        trips.sort_by_key(|stored| (stored.id.parse::<i64>().unwrap_or(i64::MAX), stored.id.clone()));

        Ok(trips
            .into_iter()
            .map(|stored| TripIndexEntry {
                date: stored
                    .trip
                    .days
                    .first()
                    .map(|day| day.date.clone())
                    .unwrap_or_else(|| stored.created_at.date_naive().to_string()),
                name: stored.trip.trip_name,
                id: stored.id,
            })
            .collect())
    }

    fn write_index(&self, index: &[TripIndexEntry]) -> Result<(), ItineraryError> {
        let raw = serde_json::to_string(index).map_err(storage)?;
        self.kv.put(INDEX_KEY, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wayfarer_common::Coordinates;
    use wayfarer_planner::mock_trip;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn round_trip_is_structurally_identical() {
        let store = TripStore::in_memory();
        let trip = mock_trip("Kyoto", "2025-05-01");

        let saved = store.save_new_at(trip.clone(), "2025-05-01", at(1_700_000_000_000)).unwrap();
        assert_eq!(saved.id, "1700000000000");

        let loaded = store.load(&saved.id).unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.trip, trip);
    }

    #[test]
    fn full_precision_coordinates_survive_storage() {
        let store = TripStore::in_memory();
        let points = [
            (-43.682428101879495, -26.791888367640354),
            (0.1 + 0.2, 1.0 / 3.0 * 100.0),
            (std::f64::consts::E * 10.0, -std::f64::consts::PI * 50.0),
            (89.99999999999999, 179.99999999999997),
        ];

        for (i, (lat, lng)) in points.into_iter().enumerate() {
            let mut trip = mock_trip("Kyoto", "2025-05-01");
            trip.days[0].activities[0].coordinates = Some(Coordinates::new(lat, lng));

            let saved = store.save_new_at(trip, "2025-05-01", at(i as i64 + 1)).unwrap();
            let loaded = store.load(&saved.id).unwrap().unwrap();

            let point = loaded.trip.days[0].activities[0].coordinates.unwrap();
            assert_eq!(point.lat.to_bits(), lat.to_bits());
            assert_eq!(point.lng.to_bits(), lng.to_bits());
            assert_eq!(loaded, saved);
        }
    }

    #[test]
    fn ids_are_bumped_when_taken() {
        let store = TripStore::in_memory();
        let now = at(1_700_000_000_000);

        let first = store.save_new_at(mock_trip("Kyoto", "2025-05-01"), "2025-05-01", now).unwrap();
        let second = store.save_new_at(mock_trip("Osaka", "2025-05-02"), "2025-05-02", now).unwrap();

        assert_eq!(first.id, "1700000000000");
        assert_eq!(second.id, "1700000000001");
    }

    #[test]
    fn list_is_newest_first() {
        let store = TripStore::in_memory();
        store.save_new_at(mock_trip("Kyoto", "2025-05-01"), "2025-05-01", at(1)).unwrap();
        store.save_new_at(mock_trip("Lisbon", "2025-06-10"), "2025-06-10", at(2)).unwrap();

        let names: Vec<_> = store.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["Journey to Lisbon", "Journey to Kyoto"]);
    }

    #[test]
    fn delete_removes_document_and_index_entry() {
        let kv = Arc::new(MemoryStore::new());
        let store = TripStore::new(kv.clone());
        let saved = store.save_new_at(mock_trip("Kyoto", "2025-05-01"), "2025-05-01", at(42)).unwrap();

        assert!(store.delete(&saved.id).unwrap());

        assert!(kv.get("trip_42").unwrap().is_none());
        assert!(store.list().unwrap().is_empty());
        assert!(store.load(&saved.id).unwrap().is_none());
        assert!(!store.delete(&saved.id).unwrap());
    }

    #[test]
    fn replace_keeps_index_and_refreshes_created_at() {
        let store = TripStore::in_memory();
        let saved = store.save_new_at(mock_trip("Kyoto", "2025-05-01"), "2025-05-01", at(7)).unwrap();

        let mut edited = saved.trip.clone();
        edited.trip_name = "Kyoto, slower".to_string();
        let replaced = store.replace(&saved.id, edited.clone()).unwrap();

        assert_eq!(replaced.id, saved.id);
        assert!(replaced.created_at > saved.created_at);
        assert_eq!(store.load(&saved.id).unwrap().unwrap().trip, edited);
        assert_eq!(store.list().unwrap()[0].name, "Journey to Kyoto");
    }

    #[test]
    fn replace_unknown_id_is_not_found() {
        let store = TripStore::in_memory();
        let err = store.replace("404", mock_trip("Kyoto", "2025-05-01")).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn corrupt_entries_are_absent() {
        let kv = Arc::new(MemoryStore::new());
        kv.put("trip_1", "{not json".to_string()).unwrap();
        kv.put(INDEX_KEY, "[oops".to_string()).unwrap();
        let store = TripStore::new(kv);

        assert!(store.load("1").unwrap().is_none());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn corrupt_index_is_rebuilt_from_documents() {
        let kv = Arc::new(MemoryStore::new());
        let store = TripStore::new(kv.clone());
        store.save_new_at(mock_trip("Kyoto", "2025-05-01"), "2025-05-01", at(10)).unwrap();
        store.save_new_at(mock_trip("Lisbon", "2025-06-10"), "2025-06-10", at(20)).unwrap();
        kv.put(INDEX_KEY, "[oops".to_string()).unwrap();

        let listed: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|e| (e.id, e.name, e.date))
            .collect();
        assert_eq!(
            listed,
            [
                ("20".to_string(), "Journey to Lisbon".to_string(), "2025-06-10".to_string()),
                ("10".to_string(), "Journey to Kyoto".to_string(), "2025-05-01".to_string()),
            ]
        );

        store.save_new_at(mock_trip("Porto", "2025-07-01"), "2025-07-01", at(30)).unwrap();
        let ids: Vec<_> = store.list().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["30", "20", "10"]);
    }

    #[test]
    fn stored_document_uses_camel_case() {
        let kv = Arc::new(MemoryStore::new());
        let store = TripStore::new(kv.clone());
        store.save_new_at(mock_trip("Kyoto", "2025-05-01"), "2025-05-01", at(5)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&kv.get("trip_5").unwrap().unwrap()).unwrap();
        assert_eq!(raw["id"], "5");
        assert_eq!(raw["tripName"], "Journey to Kyoto");
        assert!(raw["createdAt"].is_string());

        let index: serde_json::Value =
            serde_json::from_str(&kv.get(INDEX_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(index[0]["date"], "2025-05-01");
    }
}
