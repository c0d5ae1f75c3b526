//! Background task that owns the cache manager.
//!
//! Lifecycle commands run one at a time in arrival order on a task of
//! their own. Each fetch runs in its own task, so neither a slow install
//! nor a slow network response holds up other requests.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::manager::{CacheStatus, InstallError, LifecycleError, OfflineCacheManager};
use super::network::{Fetch, FetchError};
use super::request::Request;
use super::strategy::Served;

const COMMAND_BUFFER: usize = 64;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Cache worker has stopped")]
    Stopped,

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

enum Lifecycle {
    Install(oneshot::Sender<Result<usize, InstallError>>),
    Activate(oneshot::Sender<Result<Vec<String>, LifecycleError>>),
}

enum WorkerCommand {
    Install(oneshot::Sender<Result<usize, InstallError>>),
    Activate(oneshot::Sender<Result<Vec<String>, LifecycleError>>),
    Fetch(Request, oneshot::Sender<Result<Served, FetchError>>),
    Status(oneshot::Sender<CacheStatus>),
}

/// Cloneable handle to a running cache worker. The worker exits once
/// every handle is dropped.
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<WorkerCommand>,
}

/// Move the manager onto a background task and return a handle to it.
pub fn spawn_worker<F: Fetch>(manager: OfflineCacheManager<F>) -> WorkerHandle {
    let (tx, mut rx) = mpsc::channel(COMMAND_BUFFER);
    let (lifecycle_tx, mut lifecycle_rx) = mpsc::unbounded_channel();
    let manager = Arc::new(manager);

    let lifecycle_manager = Arc::clone(&manager);
    tokio::spawn(async move {
        while let Some(step) = lifecycle_rx.recv().await {
            match step {
                Lifecycle::Install(reply) => {
                    let _ = reply.send(lifecycle_manager.install().await);
                }
                Lifecycle::Activate(reply) => {
                    let _ = reply.send(lifecycle_manager.activate().await);
                }
            }
        }
    });

    tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            match command {
                WorkerCommand::Install(reply) => {
                    let _ = lifecycle_tx.send(Lifecycle::Install(reply));
                }
                WorkerCommand::Activate(reply) => {
                    let _ = lifecycle_tx.send(Lifecycle::Activate(reply));
                }
                WorkerCommand::Fetch(request, reply) => {
                    let manager = Arc::clone(&manager);
                    tokio::spawn(async move {
                        let _ = reply.send(manager.handle(&request).await);
                    });
                }
                WorkerCommand::Status(reply) => {
                    let _ = reply.send(manager.status().await);
                }
            }
        }
        debug!("Cache worker stopped");
    });

    WorkerHandle { tx }
}

impl WorkerHandle {
    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> WorkerCommand,
    ) -> Result<T, WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| WorkerError::Stopped)?;
        rx.await.map_err(|_| WorkerError::Stopped)
    }

    pub async fn install(&self) -> Result<usize, WorkerError> {
        Ok(self.call(WorkerCommand::Install).await??)
    }

    pub async fn activate(&self) -> Result<Vec<String>, WorkerError> {
        Ok(self.call(WorkerCommand::Activate).await??)
    }

    /// Install then activate. A failed install leaves any previously
    /// activated generation in place.
    pub async fn register(&self) -> Result<(), WorkerError> {
        let count = self.install().await?;
        let deleted = self.activate().await?;
        info!(precached = count, purged = deleted.len(), "Offline cache registered");
        Ok(())
    }

    pub async fn fetch(&self, request: Request) -> Result<Served, WorkerError> {
        let url = request.url.clone();
        let result = self
            .call(|reply| WorkerCommand::Fetch(request, reply))
            .await?;
        if let Err(e) = &result {
            warn!(url = %url, error = %e, "Fetch through cache failed");
        }
        Ok(result?)
    }

    pub async fn status(&self) -> Result<CacheStatus, WorkerError> {
        self.call(WorkerCommand::Status).await
    }
}
