//! Named response caches.
//!
//! A `CacheStorage` holds an ordered set of named caches, each mapping a
//! request key to a stored response. Lookups without a cache name search
//! every cache in creation order, the way a browser's cache storage does.
//!
//! When opened with a directory, each named cache is mirrored to
//! `<dir>/<name>.json` after every mutation and reloaded on startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::request::RequestKey;
use super::response::CachedResponse;
use crate::utils::{format_age_minutes, format_bytes};

/// Extension of persisted cache files.
const CACHE_FILE_EXT: &str = "json";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to write cache {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode cache {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create cache directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEntry {
    pub key: RequestKey,
    pub response: CachedResponse,
    pub cached_at: DateTime<Utc>,
}

impl CachedEntry {
    pub fn new(key: RequestKey, response: CachedResponse) -> Self {
        Self {
            key,
            response,
            cached_at: Utc::now(),
        }
    }
}

/// Size and freshness of one named cache, for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSummary {
    pub name: String,
    pub entries: usize,
    /// Total size of the stored response bodies.
    pub bytes: usize,
    /// When the newest entry was stored.
    pub updated_at: Option<DateTime<Utc>>,
}

impl CacheSummary {
    pub fn age_display(&self) -> Option<String> {
        self.updated_at
            .map(|at| format_age_minutes((Utc::now() - at).num_minutes()))
    }

    pub fn size_display(&self) -> String {
        format_bytes(self.bytes)
    }
}

#[derive(Debug, Clone)]
pub struct NamedCache {
    name: String,
    created_at: DateTime<Utc>,
    entries: HashMap<RequestKey, CachedEntry>,
}

impl NamedCache {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            created_at: Utc::now(),
            entries: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &RequestKey) -> Option<&CachedEntry> {
        self.entries.get(key)
    }

    fn summary(&self) -> CacheSummary {
        CacheSummary {
            name: self.name.clone(),
            entries: self.entries.len(),
            bytes: self.entries.values().map(|e| e.response.body.len()).sum(),
            updated_at: self.entries.values().map(|e| e.cached_at).max(),
        }
    }

    fn insert(&mut self, key: RequestKey, response: CachedResponse) {
        self.entries
            .insert(key.clone(), CachedEntry::new(key, response));
    }
}

/// On-disk shape of a named cache. Entries are a list because JSON maps
/// need string keys.
#[derive(Serialize, Deserialize)]
struct PersistedCache {
    name: String,
    created_at: DateTime<Utc>,
    entries: Vec<CachedEntry>,
}

impl From<&NamedCache> for PersistedCache {
    fn from(cache: &NamedCache) -> Self {
        Self {
            name: cache.name.clone(),
            created_at: cache.created_at,
            entries: cache.entries.values().cloned().collect(),
        }
    }
}

impl From<PersistedCache> for NamedCache {
    fn from(persisted: PersistedCache) -> Self {
        Self {
            name: persisted.name,
            created_at: persisted.created_at,
            entries: persisted
                .entries
                .into_iter()
                .map(|entry| (entry.key.clone(), entry))
                .collect(),
        }
    }
}

/// Ordered set of named caches. Clone is cheap and shares the same storage.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    caches: Arc<RwLock<Vec<NamedCache>>>,
    dir: Option<PathBuf>,
}

impl CacheStorage {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open storage mirrored to `dir`, loading any caches already there.
    /// Unreadable cache files are skipped.
    pub fn persistent(dir: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&dir).map_err(|source| CacheError::Directory {
            path: dir.clone(),
            source,
        })?;

        let mut caches: Vec<NamedCache> = Self::load_dir(&dir);
        caches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        debug!(dir = %dir.display(), count = caches.len(), "Loaded persisted caches");

        Ok(Self {
            caches: Arc::new(RwLock::new(caches)),
            dir: Some(dir),
        })
    }

    fn load_dir(dir: &Path) -> Vec<NamedCache> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to list cache directory");
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(CACHE_FILE_EXT)
            })
            .filter_map(|path| {
                let parsed = std::fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|contents| {
                        serde_json::from_str::<PersistedCache>(&contents).map_err(|e| e.to_string())
                    });
                match parsed {
                    Ok(persisted) => Some(NamedCache::from(persisted)),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping unreadable cache file");
                        None
                    }
                }
            })
            .collect()
    }

    fn cache_path(dir: &Path, name: &str) -> PathBuf {
        let file: String = name
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        dir.join(format!("{}.{}", file, CACHE_FILE_EXT))
    }

    fn persist(&self, cache: &NamedCache) -> Result<(), CacheError> {
        let Some(ref dir) = self.dir else {
            return Ok(());
        };
        let contents = serde_json::to_string(&PersistedCache::from(cache)).map_err(|source| {
            CacheError::Encode {
                name: cache.name.clone(),
                source,
            }
        })?;
        std::fs::write(Self::cache_path(dir, &cache.name), contents).map_err(|source| {
            CacheError::Io {
                name: cache.name.clone(),
                source,
            }
        })
    }

    /// Create the named cache if it does not exist yet.
    pub async fn open(&self, name: &str) -> Result<(), CacheError> {
        let mut caches = self.caches.write().await;
        if caches.iter().any(|c| c.name == name) {
            return Ok(());
        }
        let cache = NamedCache::new(name);
        let result = self.persist(&cache);
        caches.push(cache);
        result
    }

    pub async fn has(&self, name: &str) -> bool {
        self.caches.read().await.iter().any(|c| c.name == name)
    }

    /// Cache names in creation order.
    pub async fn keys(&self) -> Vec<String> {
        self.caches.read().await.iter().map(|c| c.name.clone()).collect()
    }

    /// Remove a named cache. Returns whether it existed.
    pub async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let mut caches = self.caches.write().await;
        let before = caches.len();
        caches.retain(|c| c.name != name);
        let existed = caches.len() != before;

        if existed {
            if let Some(ref dir) = self.dir {
                let path = Self::cache_path(dir, name);
                match std::fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(source) => {
                        return Err(CacheError::Io {
                            name: name.to_string(),
                            source,
                        })
                    }
                }
            }
        }
        Ok(existed)
    }

    /// Look the key up in every cache, oldest cache first.
    pub async fn match_request(&self, key: &RequestKey) -> Option<CachedResponse> {
        self.caches
            .read()
            .await
            .iter()
            .find_map(|c| c.get(key))
            .map(|entry| entry.response.clone())
    }

    /// Look the key up in `preferred` first, then in the remaining caches
    /// oldest first. Runtime refreshes of precached URLs land in the
    /// runtime cache, so it has to win over the older precache copy.
    pub async fn match_preferring(
        &self,
        preferred: &str,
        key: &RequestKey,
    ) -> Option<CachedResponse> {
        let caches = self.caches.read().await;
        caches
            .iter()
            .find(|c| c.name == preferred)
            .and_then(|c| c.get(key))
            .or_else(|| {
                caches
                    .iter()
                    .filter(|c| c.name != preferred)
                    .find_map(|c| c.get(key))
            })
            .map(|entry| entry.response.clone())
    }

    pub async fn match_in(&self, name: &str, key: &RequestKey) -> Option<CachedEntry> {
        self.caches
            .read()
            .await
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.get(key))
            .cloned()
    }

    /// Store a response, creating the named cache if needed. The in-memory
    /// copy is updated even when mirroring to disk fails.
    pub async fn put(
        &self,
        name: &str,
        key: RequestKey,
        response: CachedResponse,
    ) -> Result<(), CacheError> {
        self.put_all(name, vec![(key, response)]).await
    }

    /// Store several responses under one lock, so readers never observe a
    /// partially written batch.
    pub async fn put_all(
        &self,
        name: &str,
        entries: Vec<(RequestKey, CachedResponse)>,
    ) -> Result<(), CacheError> {
        let mut caches = self.caches.write().await;
        let idx = match caches.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                caches.push(NamedCache::new(name));
                caches.len() - 1
            }
        };

        let cache = &mut caches[idx];
        for (key, response) in entries {
            cache.insert(key, response);
        }
        self.persist(cache)
    }

    /// One summary per named cache, in creation order.
    pub async fn summary(&self) -> Vec<CacheSummary> {
        self.caches.read().await.iter().map(NamedCache::summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(path: &str) -> RequestKey {
        RequestKey {
            method: "GET".to_string(),
            url: format!("https://folio.example{}", path),
        }
    }

    #[tokio::test]
    async fn test_match_searches_caches_in_creation_order() {
        let storage = CacheStorage::in_memory();
        storage.open("precache").await.expect("open");
        storage
            .put("runtime", key("/a"), CachedResponse::new(200, "runtime"))
            .await
            .expect("put");
        storage
            .put("precache", key("/a"), CachedResponse::new(200, "precache"))
            .await
            .expect("put");

        let hit = storage.match_request(&key("/a")).await.expect("hit");
        assert_eq!(hit.text(), "precache");
        assert!(storage.match_request(&key("/missing")).await.is_none());
        assert_eq!(storage.keys().await, vec!["precache", "runtime"]);
    }

    #[tokio::test]
    async fn test_match_preferring_checks_named_cache_first() {
        let storage = CacheStorage::in_memory();
        storage
            .put("precache", key("/"), CachedResponse::new(200, "shell v1"))
            .await
            .expect("put");
        storage
            .put("precache", key("/only-precached"), CachedResponse::new(200, "old"))
            .await
            .expect("put");
        storage
            .put("runtime", key("/"), CachedResponse::new(200, "shell v2"))
            .await
            .expect("put");

        let hit = storage.match_preferring("runtime", &key("/")).await.expect("hit");
        assert_eq!(hit.text(), "shell v2");
        let fallback = storage
            .match_preferring("runtime", &key("/only-precached"))
            .await
            .expect("falls back to other caches");
        assert_eq!(fallback.text(), "old");
        assert!(storage.match_preferring("missing", &key("/")).await.is_some());
        assert!(storage.match_preferring("runtime", &key("/nope")).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let storage = CacheStorage::in_memory();
        storage.open("old").await.expect("open");
        assert!(storage.delete("old").await.expect("delete"));
        assert!(!storage.delete("old").await.expect("delete"));
        assert!(!storage.has("old").await);
    }

    #[tokio::test]
    async fn test_persistent_storage_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let storage = CacheStorage::persistent(dir.path().to_path_buf()).expect("open dir");
            storage
                .put("portfolio-runtime-v1", key("/static/app.js"), CachedResponse::new(200, "js"))
                .await
                .expect("put");
            storage.open("portfolio-cache-v1").await.expect("open");
        }

        let reopened = CacheStorage::persistent(dir.path().to_path_buf()).expect("reopen");
        let hit = reopened.match_request(&key("/static/app.js")).await.expect("hit");
        assert_eq!(hit.body, b"js".to_vec());
        let mut names = reopened.keys().await;
        names.sort();
        assert_eq!(names, vec!["portfolio-cache-v1", "portfolio-runtime-v1"]);

        assert!(reopened.delete("portfolio-cache-v1").await.expect("delete"));
        assert!(!dir.path().join("portfolio-cache-v1.json").exists());
    }

    #[tokio::test]
    async fn test_failed_mirror_still_updates_memory() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory where the cache file should go makes the write fail.
        std::fs::create_dir(dir.path().join("runtime.json")).expect("mkdir");
        let storage = CacheStorage::persistent(dir.path().to_path_buf()).expect("open dir");

        let result = storage
            .put("runtime", key("/a"), CachedResponse::new(200, "a"))
            .await;
        assert!(matches!(result, Err(CacheError::Io { .. })));
        assert!(storage.match_request(&key("/a")).await.is_some());
    }

    #[tokio::test]
    async fn test_unreadable_cache_file_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("broken.json"), "{not json").expect("write");
        let storage = CacheStorage::persistent(dir.path().to_path_buf()).expect("open dir");
        assert!(storage.keys().await.is_empty());
    }

    #[test]
    fn test_cache_path_replaces_separators() {
        let path = CacheStorage::cache_path(Path::new("/tmp/c"), "a/b");
        assert_eq!(path, PathBuf::from("/tmp/c/a_b.json"));
    }
}
