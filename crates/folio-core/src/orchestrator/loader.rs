//! On-demand view content loading.
//!
//! Loads run as spawned tasks and report back over a channel that the UI
//! loop drains without blocking. Each request carries the navigation
//! generation it was made for, so the orchestrator can drop results that
//! arrive after the route has moved on.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error};

use super::source::{LoadError, ViewSource};
use crate::models::{ViewContent, ViewId};

/// Buffer size for completed loads.
/// One slot per view is enough; the extra headroom covers re-requests
/// after a retry.
const CHANNEL_BUFFER_SIZE: usize = 16;

#[derive(Debug)]
pub struct LoadResult {
    pub view: ViewId,
    pub generation: u64,
    pub result: Result<ViewContent, LoadError>,
}

pub struct ViewLoader<S> {
    source: Arc<S>,
    loaded: HashMap<ViewId, ViewContent>,
    /// Outstanding loads and the generation that currently wants each one.
    pending: HashMap<ViewId, u64>,
    tx: mpsc::Sender<(ViewId, Result<ViewContent, LoadError>)>,
    rx: mpsc::Receiver<(ViewId, Result<ViewContent, LoadError>)>,
}

impl<S: ViewSource> ViewLoader<S> {
    pub fn new(source: S) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            source: Arc::new(source),
            loaded: HashMap::new(),
            pending: HashMap::new(),
            tx,
            rx,
        }
    }

    pub fn content(&self, view: ViewId) -> Option<&ViewContent> {
        self.loaded.get(&view)
    }

    pub fn is_loaded(&self, view: ViewId) -> bool {
        self.loaded.contains_key(&view)
    }

    pub fn is_pending(&self, view: ViewId) -> bool {
        self.pending.contains_key(&view)
    }

    /// Start loading `view` for `generation` unless it is already loaded.
    /// A load already in flight is adopted by the newer generation instead
    /// of being started again. Returns true if a new load was spawned.
    pub fn request(&mut self, view: ViewId, generation: u64) -> bool {
        if self.loaded.contains_key(&view) {
            return false;
        }
        if let Some(wanted) = self.pending.get_mut(&view) {
            *wanted = generation;
            return false;
        }

        self.pending.insert(view, generation);
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        debug!(%view, generation, "Loading view content");
        tokio::spawn(async move {
            let result = source.load(view).await;
            if let Err(e) = tx.send((view, result)).await {
                error!(error = %e, "Failed to deliver view content - channel closed");
            }
        });
        true
    }

    /// Drain finished loads. Results are not stored; the caller decides
    /// whether to `accept` them.
    pub fn poll(&mut self) -> Vec<LoadResult> {
        let mut results = Vec::new();
        while let Ok((view, result)) = self.rx.try_recv() {
            let generation = self.pending.remove(&view).unwrap_or_default();
            results.push(LoadResult {
                view,
                generation,
                result,
            });
        }
        results
    }

    pub fn accept(&mut self, view: ViewId, content: ViewContent) {
        self.loaded.insert(view, content);
    }

    /// Drop a view's content so the next request loads it again.
    pub fn forget(&mut self, view: ViewId) {
        self.loaded.remove(&view);
    }

    /// Drop all content. Loads in flight still report back.
    pub fn clear(&mut self) {
        self.loaded.clear();
    }
}
