//! Caching strategies.
//!
//! Each strategy maps a request plus cache/network access to a response.
//! Writes to the runtime cache are best-effort: a failed write is logged
//! and never fails the response.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::network::{Fetch, FetchError};
use super::request::{Request, RequestClass, RequestKey};
use super::response::CachedResponse;
use super::storage::CacheStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

impl Strategy {
    /// Strategy for a request class; `None` means the request is not
    /// intercepted.
    pub fn for_class(class: RequestClass) -> Option<Self> {
        match class {
            RequestClass::CrossOrigin => None,
            RequestClass::Api => Some(Strategy::NetworkFirst),
            RequestClass::StaticAsset => Some(Strategy::CacheFirst),
            RequestClass::Navigation => Some(Strategy::StaleWhileRevalidate),
            RequestClass::Other => Some(Strategy::CacheFirst),
        }
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cache,
    Network,
    OfflineFallback,
}

#[derive(Debug)]
pub struct Served {
    pub response: CachedResponse,
    pub from: ServedFrom,
    /// Background refresh started by stale-while-revalidate. Its result
    /// only updates the cache; awaiting it is optional.
    pub revalidation: Option<JoinHandle<()>>,
}

impl Served {
    pub(crate) fn new(response: CachedResponse, from: ServedFrom) -> Self {
        Self {
            response,
            from,
            revalidation: None,
        }
    }
}

/// Everything a strategy needs besides the request.
pub struct StrategyEnv<'a, F> {
    pub storage: &'a CacheStorage,
    pub network: &'a Arc<F>,
    /// Name of the cache that receives runtime writes.
    pub runtime_cache: &'a str,
    /// Cached page served by cache-first when the network is down.
    pub offline_fallback: Option<&'a RequestKey>,
}

/// Run the given strategy.
pub async fn serve<F: Fetch>(
    strategy: Strategy,
    request: &Request,
    env: &StrategyEnv<'_, F>,
) -> Result<Served, FetchError> {
    match strategy {
        Strategy::CacheFirst => Ok(cache_first(request, env).await),
        Strategy::NetworkFirst => network_first(request, env).await,
        Strategy::StaleWhileRevalidate => stale_while_revalidate(request, env).await,
    }
}

async fn store(storage: &CacheStorage, cache: &str, key: RequestKey, response: CachedResponse) {
    let url = key.url.clone();
    if let Err(e) = storage.put(cache, key, response).await {
        warn!(cache, url = %url, error = %e, "Runtime cache write failed");
    }
}

/// Serve from the cache if present, runtime copies first; otherwise fetch, keeping 2xx responses.
/// With neither, serve the offline page or a synthesized placeholder.
pub async fn cache_first<F: Fetch>(request: &Request, env: &StrategyEnv<'_, F>) -> Served {
    let key = request.key();
    if let Some(cached) = env.storage.match_preferring(env.runtime_cache, &key).await {
        debug!(url = %request.url, "Cache hit");
        return Served::new(cached, ServedFrom::Cache);
    }

    match env.network.fetch(request).await {
        Ok(response) => {
            if response.is_ok() {
                store(env.storage, env.runtime_cache, key, response.clone()).await;
            }
            Served::new(response, ServedFrom::Network)
        }
        Err(e) => {
            warn!(url = %request.url, error = %e, "Network failed, no cached version available");
            let page = match env.offline_fallback {
                Some(fallback) => env.storage.match_preferring(env.runtime_cache, fallback).await,
                None => None,
            };
            Served::new(
                page.unwrap_or_else(CachedResponse::offline_placeholder),
                ServedFrom::OfflineFallback,
            )
        }
    }
}

/// Prefer the network, recording successful responses; fall back to the
/// last cached copy. Without one, the network error is returned.
pub async fn network_first<F: Fetch>(
    request: &Request,
    env: &StrategyEnv<'_, F>,
) -> Result<Served, FetchError> {
    let key = request.key();
    match env.network.fetch(request).await {
        Ok(response) => {
            if response.is_ok() {
                store(env.storage, env.runtime_cache, key, response.clone()).await;
            }
            Ok(Served::new(response, ServedFrom::Network))
        }
        Err(e) => match env.storage.match_preferring(env.runtime_cache, &key).await {
            Some(cached) => {
                debug!(url = %request.url, error = %e, "Network failed, serving cached copy");
                Ok(Served::new(cached, ServedFrom::Cache))
            }
            None => Err(e),
        },
    }
}

/// Serve the cached copy at once and refresh the cache in the background.
/// Without a cached copy, wait for the network.
///
/// The refresh is not guaranteed to land before the next request for the
/// same resource; that request may still see the older copy.
pub async fn stale_while_revalidate<F: Fetch>(
    request: &Request,
    env: &StrategyEnv<'_, F>,
) -> Result<Served, FetchError> {
    let key = request.key();
    let cached = env.storage.match_preferring(env.runtime_cache, &key).await;

    let storage = env.storage.clone();
    let network = Arc::clone(env.network);
    let runtime = env.runtime_cache.to_string();
    let req = request.clone();
    let revalidate = async move {
        let response = network.fetch(&req).await?;
        if response.is_ok() {
            store(&storage, &runtime, req.key(), response.clone()).await;
        }
        Ok::<_, FetchError>(response)
    };

    match cached {
        Some(cached) => {
            let url = request.url.clone();
            let handle = tokio::spawn(async move {
                if let Err(e) = revalidate.await {
                    debug!(url = %url, error = %e, "Revalidation failed, keeping cached copy");
                }
            });
            Ok(Served {
                response: cached,
                from: ServedFrom::Cache,
                revalidation: Some(handle),
            })
        }
        None => {
            let response = revalidate.await?;
            Ok(Served::new(response, ServedFrom::Network))
        }
    }
}
