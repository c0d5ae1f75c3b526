//! Where view content comes from.

use std::future::Future;

use reqwest::Url;
use thiserror::Error;
use tracing::debug;

use crate::content;
use crate::models::{ViewContent, ViewId};
use crate::offline::{Request, WorkerHandle};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Failed to fetch {view} content: {reason}")]
    Fetch { view: ViewId, reason: String },

    #[error("Fetching {view} content returned status {status}")]
    Status { view: ViewId, status: u16 },

    #[error("Invalid {view} content: {reason}")]
    Invalid { view: ViewId, reason: String },

    #[error("Expected {view} content, got {found}")]
    WrongView { view: ViewId, found: ViewId },
}

/// Loads the content a view renders.
pub trait ViewSource: Send + Sync + 'static {
    fn load(&self, view: ViewId) -> impl Future<Output = Result<ViewContent, LoadError>> + Send;
}

/// Content compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSource;

impl ViewSource for BundledSource {
    async fn load(&self, view: ViewId) -> Result<ViewContent, LoadError> {
        Ok(content::bundled(view))
    }
}

/// Content documents published on the portfolio origin, fetched through
/// the offline cache worker.
#[derive(Clone)]
pub struct RemoteSource {
    worker: WorkerHandle,
    origin: Url,
}

impl RemoteSource {
    pub fn new(worker: WorkerHandle, origin: Url) -> Self {
        Self { worker, origin }
    }

    /// `{origin}/api/views/{slug}.json`
    pub fn content_url(&self, view: ViewId) -> Result<Url, LoadError> {
        self.origin
            .join(&format!("/api/views/{}.json", view.slug()))
            .map_err(|e| LoadError::Fetch {
                view,
                reason: e.to_string(),
            })
    }
}

impl ViewSource for RemoteSource {
    async fn load(&self, view: ViewId) -> Result<ViewContent, LoadError> {
        let url = self.content_url(view)?;
        let served = self
            .worker
            .fetch(Request::get(url))
            .await
            .map_err(|e| LoadError::Fetch {
                view,
                reason: e.to_string(),
            })?;

        if !served.response.is_ok() {
            return Err(LoadError::Status {
                view,
                status: served.response.status,
            });
        }

        let content: ViewContent =
            serde_json::from_slice(&served.response.body).map_err(|e| LoadError::Invalid {
                view,
                reason: e.to_string(),
            })?;
        if content.view() != view {
            return Err(LoadError::WrongView {
                view,
                found: content.view(),
            });
        }

        debug!(%view, from = ?served.from, "View content loaded");
        Ok(content)
    }
}

/// Source picked at startup depending on whether an origin is configured.
#[derive(Clone)]
pub enum ContentSource {
    Bundled(BundledSource),
    Remote(RemoteSource),
}

impl ViewSource for ContentSource {
    async fn load(&self, view: ViewId) -> Result<ViewContent, LoadError> {
        match self {
            ContentSource::Bundled(source) => source.load(view).await,
            ContentSource::Remote(source) => source.load(view).await,
        }
    }
}
