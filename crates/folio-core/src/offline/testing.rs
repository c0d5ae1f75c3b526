//! Scripted network for strategy and lifecycle tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::network::{Fetch, FetchError};
use super::request::Request;
use super::response::CachedResponse;

#[derive(Default)]
struct Script {
    responses: HashMap<String, CachedResponse>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    offline: bool,
    calls: Vec<String>,
}

/// Answers from a fixed table keyed by URL; unknown URLs get a 404.
#[derive(Clone, Default)]
pub(crate) struct ScriptedNetwork {
    script: Arc<Mutex<Script>>,
}

impl ScriptedNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with_script<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut script = self.script.lock().expect("script lock poisoned");
        f(&mut script)
    }

    pub(crate) fn respond(&self, url: &str, response: CachedResponse) {
        self.with_script(|s| {
            s.responses.insert(url.to_string(), response);
        });
    }

    pub(crate) fn respond_ok(&self, url: &str, body: &str) {
        self.respond(url, CachedResponse::new(200, body));
    }

    pub(crate) fn fail(&self, url: &str) {
        self.with_script(|s| {
            s.failing.insert(url.to_string());
        });
    }

    /// Hold responses for `url` back by `delay` (tokio time, so paused
    /// clocks advance through it).
    pub(crate) fn delay(&self, url: &str, delay: Duration) {
        self.with_script(|s| {
            s.delays.insert(url.to_string(), delay);
        });
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.with_script(|s| s.offline = offline);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.with_script(|s| s.calls.clone())
    }

    pub(crate) fn call_count(&self, url: &str) -> usize {
        self.with_script(|s| s.calls.iter().filter(|c| c.as_str() == url).count())
    }
}

impl Fetch for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<CachedResponse, FetchError> {
        let url = request.url.as_str().to_string();
        let delay = self.with_script(|s| {
            s.calls.push(url.clone());
            s.delays.get(&url).copied()
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.with_script(|s| {
            if s.offline {
                return Err(FetchError::Offline);
            }
            if s.failing.contains(&url) {
                return Err(FetchError::Network(format!("scripted failure for {}", url)));
            }
            Ok(s
                .responses
                .get(&url)
                .cloned()
                .unwrap_or_else(|| CachedResponse::new(404, "not found")))
        })
    }
}
