//! Install / activate / intercept lifecycle of the offline cache.
//!
//! A manager serves requests from whatever caches exist, so a previous
//! cache generation keeps answering until a new one installs and
//! activates.

use std::sync::{Arc, Mutex};

use futures::future::try_join_all;
use reqwest::Url;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::OfflineConfig;

use super::network::{Fetch, FetchError};
use super::request::{classify, Request, RequestKey};
use super::response::CachedResponse;
use super::storage::{CacheStorage, CacheSummary};
use super::strategy::{serve, Served, ServedFrom, Strategy, StrategyEnv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this generation will never activate.
    Redundant,
}

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Invalid manifest path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Failed to precache {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Failed to precache {url}: status {status}")]
    Status { url: String, status: u16 },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Cannot activate while {0:?}; install must succeed first")]
    NotInstalled(WorkerState),
}

/// Outcome of intercepting a request.
#[derive(Debug)]
pub enum Intercept {
    /// Not handled here; the caller goes to the network itself.
    Passthrough,
    Respond(Served),
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub state: WorkerState,
    pub controlling: bool,
    pub precache: String,
    pub runtime: String,
    /// Every named cache, in creation order.
    pub caches: Vec<CacheSummary>,
}

struct Lifecycle {
    state: WorkerState,
    controlling: bool,
}

pub struct OfflineCacheManager<F> {
    origin: Url,
    config: OfflineConfig,
    storage: CacheStorage,
    network: Arc<F>,
    offline_fallback: Option<RequestKey>,
    lifecycle: Mutex<Lifecycle>,
}

impl<F: Fetch> OfflineCacheManager<F> {
    pub fn new(origin: Url, config: OfflineConfig, storage: CacheStorage, network: F) -> Self {
        let offline_fallback = origin
            .join(&config.offline_fallback)
            .ok()
            .map(|url| Request::get(url).key());

        Self {
            origin,
            config,
            storage,
            network: Arc::new(network),
            offline_fallback,
            lifecycle: Mutex::new(Lifecycle {
                state: WorkerState::Parsed,
                controlling: false,
            }),
        }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn config(&self) -> &OfflineConfig {
        &self.config
    }

    fn with_lifecycle<R>(&self, f: impl FnOnce(&mut Lifecycle) -> R) -> R {
        // The lifecycle is plain data, so a poisoned lock is still usable.
        let mut guard = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn state(&self) -> WorkerState {
        self.with_lifecycle(|l| l.state)
    }

    fn set_state(&self, state: WorkerState) {
        self.with_lifecycle(|l| l.state = state);
    }

    /// Whether this manager has claimed open clients.
    pub fn is_controlling(&self) -> bool {
        self.with_lifecycle(|l| l.controlling)
    }

    /// Resolve a manifest or route path against the origin.
    pub fn resolve(&self, path: &str) -> Result<Url, InstallError> {
        self.origin.join(path).map_err(|e| InstallError::InvalidPath {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Fetch every manifest entry and store them in the precache. Any
    /// failed fetch or non-2xx status fails the whole install and nothing
    /// is written. Re-running it re-fetches and overwrites the entries.
    pub async fn install(&self) -> Result<usize, InstallError> {
        let previous = self.state();
        self.set_state(WorkerState::Installing);
        info!(cache = %self.config.precache_name, count = self.config.manifest.len(), "Precaching resources");

        match self.fetch_manifest().await {
            Ok(entries) => {
                let count = entries.len();
                if let Err(e) = self
                    .storage
                    .put_all(&self.config.precache_name, entries)
                    .await
                {
                    warn!(cache = %self.config.precache_name, error = %e, "Precache written to memory only");
                }
                self.set_state(if previous == WorkerState::Activated {
                    WorkerState::Activated
                } else {
                    WorkerState::Installed
                });
                info!(cache = %self.config.precache_name, count, "Precache complete");
                Ok(count)
            }
            Err(e) => {
                error!(error = %e, "Install failed");
                self.set_state(if previous == WorkerState::Activated {
                    WorkerState::Activated
                } else {
                    WorkerState::Redundant
                });
                Err(e)
            }
        }
    }

    async fn fetch_manifest(&self) -> Result<Vec<(RequestKey, CachedResponse)>, InstallError> {
        let requests = self
            .config
            .manifest
            .iter()
            .map(|path| self.resolve(path).map(Request::get))
            .collect::<Result<Vec<_>, _>>()?;

        let fetches = requests.iter().map(|request| async move {
            let response = self
                .network
                .fetch(request)
                .await
                .map_err(|source| InstallError::Fetch {
                    url: request.url.to_string(),
                    source,
                })?;
            if !response.is_ok() {
                return Err(InstallError::Status {
                    url: request.url.to_string(),
                    status: response.status,
                });
            }
            Ok((request.key(), response))
        });

        try_join_all(fetches).await
    }

    /// Delete every cache that is neither the current precache nor the
    /// current runtime cache, then take control of open clients.
    /// Returns the names of the deleted caches.
    pub async fn activate(&self) -> Result<Vec<String>, LifecycleError> {
        match self.state() {
            WorkerState::Installed | WorkerState::Activated => {}
            other => return Err(LifecycleError::NotInstalled(other)),
        }
        self.set_state(WorkerState::Activating);

        let mut deleted = Vec::new();
        for name in self.storage.keys().await {
            if name == self.config.precache_name || name == self.config.runtime_name {
                continue;
            }
            info!(cache = %name, "Deleting old cache");
            match self.storage.delete(&name).await {
                Ok(_) => {}
                Err(e) => warn!(cache = %name, error = %e, "Old cache file could not be removed"),
            }
            deleted.push(name);
        }

        if let Err(e) = self.storage.open(&self.config.runtime_name).await {
            warn!(cache = %self.config.runtime_name, error = %e, "Runtime cache kept in memory only");
        }

        self.with_lifecycle(|l| {
            l.state = WorkerState::Activated;
            l.controlling = true;
        });
        info!(deleted = deleted.len(), "Activated and claimed clients");
        Ok(deleted)
    }

    /// Classify and answer a request, or pass it through.
    pub async fn intercept(&self, request: &Request) -> Result<Intercept, FetchError> {
        let class = classify(request, &self.origin, &self.config);
        let Some(strategy) = Strategy::for_class(class) else {
            return Ok(Intercept::Passthrough);
        };

        let env = StrategyEnv {
            storage: &self.storage,
            network: &self.network,
            runtime_cache: &self.config.runtime_name,
            offline_fallback: self.offline_fallback.as_ref(),
        };
        serve(strategy, request, &env).await.map(Intercept::Respond)
    }

    /// Intercept, falling through to a plain network fetch for requests
    /// the cache does not handle.
    pub async fn handle(&self, request: &Request) -> Result<Served, FetchError> {
        match self.intercept(request).await? {
            Intercept::Respond(served) => Ok(served),
            Intercept::Passthrough => {
                let response = self.network.fetch(request).await?;
                Ok(Served::new(response, ServedFrom::Network))
            }
        }
    }

    pub async fn status(&self) -> CacheStatus {
        let (state, controlling) = self.with_lifecycle(|l| (l.state, l.controlling));
        CacheStatus {
            state,
            controlling,
            precache: self.config.precache_name.clone(),
            runtime: self.config.runtime_name.clone(),
            caches: self.storage.summary().await,
        }
    }
}
