//! Wiring between the terminal app and the offline cache worker.

use anyhow::{Context, Result};
use folio_core::config::Config;
use folio_core::offline::{
    spawn_worker, CacheStorage, CachedResponse, Fetch, FetchError, HttpFetcher,
    OfflineCacheManager, Request, WorkerHandle,
};
use folio_core::orchestrator::Connectivity;
use reqwest::Url;
use tracing::{debug, warn};

/// Subdirectory of the cache dir holding persisted named caches.
const CACHES_DIR: &str = "caches";

/// Fetcher that refuses to touch the network while the app is offline, so
/// the `o` toggle behaves like losing connectivity.
pub struct SwitchedFetcher {
    inner: HttpFetcher,
    connectivity: Connectivity,
}

impl SwitchedFetcher {
    pub fn new(inner: HttpFetcher, connectivity: Connectivity) -> Self {
        Self {
            inner,
            connectivity,
        }
    }
}

impl Fetch for SwitchedFetcher {
    async fn fetch(&self, request: &Request) -> Result<CachedResponse, FetchError> {
        if !self.connectivity.is_online() {
            debug!(url = %request.url, "Offline, skipping network");
            return Err(FetchError::Offline);
        }
        self.inner.fetch(request).await
    }
}

/// Parse the configured origin, if any.
pub fn origin(config: &Config) -> Result<Option<Url>> {
    config
        .origin
        .as_deref()
        .filter(|o| !o.trim().is_empty())
        .map(|o| Url::parse(o.trim()).with_context(|| format!("Invalid origin URL: {}", o)))
        .transpose()
}

/// Open the cache storage described by the config. Falls back to memory
/// when the cache directory cannot be used.
pub fn open_storage(config: &Config) -> CacheStorage {
    if !config.offline.persist {
        return CacheStorage::in_memory();
    }
    let dir = match config.cache_dir() {
        Ok(dir) => dir.join(CACHES_DIR),
        Err(e) => {
            warn!(error = %e, "No cache directory, caches kept in memory");
            return CacheStorage::in_memory();
        }
    };
    match CacheStorage::persistent(dir) {
        Ok(storage) => storage,
        Err(e) => {
            warn!(error = %e, "Failed to open cache directory, caches kept in memory");
            CacheStorage::in_memory()
        }
    }
}

/// Start a cache worker for `origin`.
pub fn start_worker(config: &Config, origin: Url, connectivity: Connectivity) -> Result<WorkerHandle> {
    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    let manager = OfflineCacheManager::new(
        origin,
        config.offline.clone(),
        open_storage(config),
        SwitchedFetcher::new(fetcher, connectivity),
    );
    Ok(spawn_worker(manager))
}
