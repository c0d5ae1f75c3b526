//! Offline cache manager.
//!
//! Intercepts requests for the portfolio origin and answers them from local
//! named caches where possible, so previously seen resources stay available
//! without connectivity.
//!
//! - `request`: request identity and classification
//! - `response`: stored response snapshots
//! - `storage`: named caches with optional on-disk persistence
//! - `network`: the `Fetch` seam and its reqwest implementation
//! - `strategy`: cache-first, network-first and stale-while-revalidate
//! - `manager`: install / activate / intercept lifecycle
//! - `worker`: runs a manager in its own background task

pub mod manager;
pub mod network;
pub mod request;
pub mod response;
pub mod storage;
pub mod strategy;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use manager::{CacheStatus, InstallError, Intercept, LifecycleError, OfflineCacheManager, WorkerState};
pub use network::{Fetch, FetchError, HttpFetcher};
pub use request::{classify, Request, RequestClass, RequestKey, RequestMode};
pub use response::CachedResponse;
pub use storage::{CacheError, CacheStorage, CacheSummary, NamedCache};
pub use strategy::{Served, ServedFrom};
pub use worker::{spawn_worker, WorkerError, WorkerHandle};
