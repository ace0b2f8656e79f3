//! Persistent read-through cache store
//!
//! Provides a `CacheStore` that persists fetched values as a JSON object in
//! a single file per store, loading the file lazily at most once per process
//! and rewriting it in full after every miss. Entries never expire: a key
//! that is present means its fetch succeeded once and the stored value is
//! replayed forever after.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a backing file could not be loaded.
///
/// Both outcomes collapse to an empty store, but they are logged
/// distinguishably: a missing file is the normal first-run case, while a
/// malformed one means an earlier write was corrupted or truncated.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The backing file does not exist yet.
    #[error("cache file does not exist")]
    NotFound,

    /// The backing file exists but could not be read or parsed as JSON.
    #[error("cache file is unreadable or not valid JSON: {0}")]
    Malformed(String),
}

/// One independently persisted key-value store.
///
/// Each store is backed by `<dir>/<store_id>.json`, a bare JSON object
/// mapping string keys to values. The file is read at most once per process
/// (on first access) and rewritten in full after each miss. There is no
/// expiry metadata and no locking; one interactive session at a time is
/// assumed.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Short name of the store, used in log output
    store_id: &'static str,
    /// Backing file for this store
    path: PathBuf,
    /// In-memory mapping, `None` until first access
    entries: Option<HashMap<String, V>>,
}

impl<V> CacheStore<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    /// Creates a store backed by `<dir>/<store_id>.json`.
    pub fn new(dir: &Path, store_id: &'static str) -> Self {
        Self {
            store_id,
            path: dir.join(format!("{store_id}.json")),
            entries: None,
        }
    }

    /// Returns the cached value for `key`, fetching and persisting it first
    /// if it is not present.
    ///
    /// On a hit the stored value is returned unchanged and `fetch` is never
    /// invoked. On a miss the result of `fetch` is inserted under `key`, the
    /// whole mapping is rewritten to disk, and the value is returned. Errors
    /// from `fetch` propagate unchanged; nothing is retried or stored.
    pub fn get_or_fetch<E, F>(&mut self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let store_id = self.store_id;
        let entries = self.load();
        if let Some(value) = entries.get(key) {
            debug!(store = store_id, key, "cache hit");
            return Ok(value.clone());
        }
        debug!(store = store_id, key, "cache miss, fetching");
        let value = fetch()?;
        entries.insert(key.to_string(), value.clone());
        self.persist();
        Ok(value)
    }

    /// Aggregate variant of [`get_or_fetch`](Self::get_or_fetch) for stores
    /// whose cached unit is the whole mapping.
    ///
    /// A non-empty loaded mapping is a hit. On a miss `fetch` produces the
    /// entire mapping at once, which replaces the store's contents and is
    /// persisted before being returned.
    pub fn get_all_or_fetch<E, F>(&mut self, fetch: F) -> Result<HashMap<String, V>, E>
    where
        F: FnOnce() -> Result<HashMap<String, V>, E>,
    {
        let store_id = self.store_id;
        let entries = self.load();
        if !entries.is_empty() {
            debug!(store = store_id, "cache hit");
            return Ok(entries.clone());
        }
        debug!(store = store_id, "cache miss, fetching");
        let fetched = fetch()?;
        *self.load() = fetched.clone();
        self.persist();
        Ok(fetched)
    }

    /// Loads the backing file on first access; later calls return the
    /// in-memory mapping untouched.
    fn load(&mut self) -> &mut HashMap<String, V> {
        if self.entries.is_none() {
            let loaded = match read_entries(&self.path) {
                Ok(entries) => entries,
                Err(LoadError::NotFound) => {
                    debug!(store = self.store_id, "no cache file yet, starting empty");
                    HashMap::new()
                }
                Err(LoadError::Malformed(reason)) => {
                    warn!(store = self.store_id, %reason, "discarding malformed cache file");
                    HashMap::new()
                }
            };
            self.entries = Some(loaded);
        }
        self.entries.get_or_insert_with(HashMap::new)
    }

    /// Rewrites the whole mapping to the backing file.
    ///
    /// Persist failures are logged and swallowed: the fetched value has
    /// already been handed to the caller, and the store simply refetches on
    /// the next run.
    fn persist(&self) {
        let Some(entries) = self.entries.as_ref() else {
            return;
        };
        if let Some(parent) = self.path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                warn!(store = self.store_id, %error, "failed to create cache directory");
                return;
            }
        }
        let json = match serde_json::to_string_pretty(entries) {
            Ok(json) => json,
            Err(error) => {
                warn!(store = self.store_id, %error, "failed to serialize cache store");
                return;
            }
        };
        if let Err(error) = fs::write(&self.path, json) {
            warn!(store = self.store_id, %error, "failed to persist cache store");
        }
    }
}

/// Reads a backing file as a JSON object, with an explicit existence check.
fn read_entries<V: DeserializeOwned>(path: &Path) -> Result<HashMap<String, V>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound);
    }
    let contents = fs::read_to_string(path).map_err(|e| LoadError::Malformed(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| LoadError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;
    use tempfile::TempDir;

    fn create_test_store(store_id: &'static str) -> (CacheStore<String>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CacheStore::new(temp_dir.path(), store_id);
        (store, temp_dir)
    }

    #[test]
    fn test_miss_fetches_then_hit_replays_without_refetching() {
        let (mut store, _temp_dir) = create_test_store("pages");
        let calls = Cell::new(0);

        let first = store
            .get_or_fetch("https://example.com/a", || {
                calls.set(calls.get() + 1);
                Ok::<_, Infallible>("<html>a</html>".to_string())
            })
            .unwrap();
        let second = store
            .get_or_fetch("https://example.com/a", || {
                calls.set(calls.get() + 1);
                Ok::<_, Infallible>("different".to_string())
            })
            .unwrap();

        assert_eq!(calls.get(), 1, "fetch should run exactly once");
        assert_eq!(first, second, "hit should replay the stored value");
    }

    #[test]
    fn test_store_survives_reload_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let mut store: CacheStore<String> = CacheStore::new(temp_dir.path(), "pages");
        store
            .get_or_fetch("k", || Ok::<_, Infallible>("v".to_string()))
            .unwrap();

        // A fresh store over the same file must replay without fetching.
        let mut reloaded: CacheStore<String> = CacheStore::new(temp_dir.path(), "pages");
        let calls = Cell::new(0);
        let value = reloaded
            .get_or_fetch("k", || {
                calls.set(calls.get() + 1);
                Ok::<_, Infallible>("other".to_string())
            })
            .unwrap();

        assert_eq!(calls.get(), 0);
        assert_eq!(value, "v");
    }

    #[test]
    fn test_backing_file_is_a_bare_json_object() {
        let temp_dir = TempDir::new().unwrap();
        let mut store: CacheStore<String> = CacheStore::new(temp_dir.path(), "pages");
        store
            .get_or_fetch("k", || Ok::<_, Infallible>("v".to_string()))
            .unwrap();

        let contents = fs::read_to_string(temp_dir.path().join("pages.json")).unwrap();
        let on_disk: HashMap<String, String> = serde_json::from_str(&contents).unwrap();
        assert_eq!(on_disk, HashMap::from([("k".to_string(), "v".to_string())]));
    }

    #[test]
    fn test_malformed_file_is_treated_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("pages.json"), "not json {{{").unwrap();

        let mut store: CacheStore<String> = CacheStore::new(temp_dir.path(), "pages");
        let calls = Cell::new(0);
        let value = store
            .get_or_fetch("k", || {
                calls.set(calls.get() + 1);
                Ok::<_, Infallible>("fresh".to_string())
            })
            .unwrap();

        assert_eq!(calls.get(), 1, "malformed file should fall back to a miss");
        assert_eq!(value, "fresh");
    }

    #[test]
    fn test_fetch_error_propagates_and_stores_nothing() {
        let (mut store, temp_dir) = create_test_store("pages");

        let result = store.get_or_fetch("k", || Err::<String, _>("network down"));
        assert_eq!(result.unwrap_err(), "network down");
        assert!(!temp_dir.path().join("pages.json").exists());

        // The key is still a miss afterwards.
        let calls = Cell::new(0);
        store
            .get_or_fetch("k", || {
                calls.set(calls.get() + 1);
                Ok::<_, Infallible>("v".to_string())
            })
            .unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_aggregate_hits_on_any_loaded_entry() {
        let temp_dir = TempDir::new().unwrap();
        let mut store: CacheStore<String> = CacheStore::new(temp_dir.path(), "directory");

        let fetched = store
            .get_all_or_fetch(|| {
                Ok::<_, Infallible>(HashMap::from([("michigan".to_string(), "url".to_string())]))
            })
            .unwrap();
        assert_eq!(fetched.len(), 1);

        let mut reloaded: CacheStore<String> = CacheStore::new(temp_dir.path(), "directory");
        let calls = Cell::new(0);
        let replayed = reloaded
            .get_all_or_fetch(|| {
                calls.set(calls.get() + 1);
                Ok::<_, Infallible>(HashMap::new())
            })
            .unwrap();

        assert_eq!(calls.get(), 0, "non-empty mapping is an aggregate hit");
        assert_eq!(replayed, fetched);
    }

    #[test]
    fn test_read_entries_distinguishes_not_found_from_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pages.json");

        let missing = read_entries::<String>(&path);
        assert!(matches!(missing, Err(LoadError::NotFound)));

        fs::write(&path, "[1, 2, 3]").unwrap();
        let malformed = read_entries::<String>(&path);
        assert!(matches!(malformed, Err(LoadError::Malformed(_))));
    }
}
