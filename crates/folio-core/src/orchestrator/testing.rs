//! Scripted view source for orchestrator tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::source::{LoadError, ViewSource};
use crate::content;
use crate::models::{ViewContent, ViewId};

#[derive(Default)]
struct Script {
    delays: HashMap<ViewId, Duration>,
    failing: HashSet<ViewId>,
    loads: Vec<ViewId>,
}

/// Serves bundled content after an optional per-view delay, or fails.
#[derive(Clone, Default)]
pub(crate) struct ScriptedSource {
    script: Arc<Mutex<Script>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with_script<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut script = self.script.lock().expect("script lock poisoned");
        f(&mut script)
    }

    pub(crate) fn with_delay(self, view: ViewId, delay: Duration) -> Self {
        self.with_script(|s| s.delays.insert(view, delay));
        self
    }

    pub(crate) fn failing(self, view: ViewId) -> Self {
        self.set_failing(view, true);
        self
    }

    pub(crate) fn set_failing(&self, view: ViewId, failing: bool) {
        self.with_script(|s| {
            if failing {
                s.failing.insert(view);
            } else {
                s.failing.remove(&view);
            }
        });
    }

    pub(crate) fn load_count(&self, view: ViewId) -> usize {
        self.with_script(|s| s.loads.iter().filter(|v| **v == view).count())
    }
}

impl ViewSource for ScriptedSource {
    async fn load(&self, view: ViewId) -> Result<ViewContent, LoadError> {
        let delay = self.with_script(|s| {
            s.loads.push(view);
            s.delays.get(&view).copied()
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.with_script(|s| s.failing.contains(&view)) {
            return Err(LoadError::Fetch {
                view,
                reason: "scripted failure".to_string(),
            });
        }
        Ok(content::bundled(view))
    }
}
