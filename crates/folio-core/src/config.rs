//! Application configuration management.
//!
//! This module handles loading and saving the configuration: the portfolio
//! origin, offline cache policy, orchestrator timings and email relay ids.
//!
//! Configuration is stored at `~/.config/folio/config.json`. Environment
//! variables override the relay ids and origin so secrets can live in `.env`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ViewId;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "folio";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default EmailJS REST endpoint.
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not find {0} directory")]
    MissingDir(&'static str),

    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Portfolio origin, e.g. `https://portfolio.example.com`. Bundled
    /// content is used when unset.
    pub origin: Option<String>,
    pub offline: OfflineConfig,
    pub orchestrator: OrchestratorConfig,
    pub relay: RelayConfig,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `FOLIO_ORIGIN` and `EMAILJS_*` overrides from the environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(origin) = non_empty("FOLIO_ORIGIN") {
            self.origin = Some(origin);
        }
        if let Some(id) = non_empty("EMAILJS_SERVICE_ID") {
            self.relay.service_id = Some(id);
        }
        if let Some(id) = non_empty("EMAILJS_TEMPLATE_ID") {
            self.relay.template_id = Some(id);
        }
        if let Some(key) = non_empty("EMAILJS_PUBLIC_KEY") {
            self.relay.public_key = Some(key);
        }
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::MissingDir("config"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for persisted caches and log files.
    pub fn cache_dir(&self) -> Result<PathBuf, ConfigError> {
        let cache_dir = dirs::cache_dir().ok_or(ConfigError::MissingDir("cache"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

/// Offline cache policy: cache generation names, the precache manifest
/// and the request classification rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    pub precache_name: String,
    pub runtime_name: String,
    /// Shell resources fetched at install time, in order.
    pub manifest: Vec<String>,
    pub api_prefix: String,
    pub static_prefixes: Vec<String>,
    /// Extensions (without the dot) treated as static assets.
    pub static_extensions: Vec<String>,
    /// Path of the cached page served when the network is unreachable.
    pub offline_fallback: String,
    /// Persist named caches under the cache directory.
    pub persist: bool,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            precache_name: "portfolio-cache-v1".to_string(),
            runtime_name: "portfolio-runtime-v1".to_string(),
            manifest: vec![
                "/".to_string(),
                "/static/js/bundle.js".to_string(),
                "/static/css/main.css".to_string(),
                "/manifest.json".to_string(),
            ],
            api_prefix: "/api/".to_string(),
            static_prefixes: vec!["/static/".to_string()],
            static_extensions: ["js", "css", "svg", "png", "jpg", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            offline_fallback: "/offline.html".to_string(),
            persist: true,
        }
    }
}

/// Timings for view readiness, transitions and scrolling.
///
/// The delays and margin are tuned by eye, not part of any contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub home_delay_ms: u64,
    pub project_delay_ms: u64,
    pub poc_delay_ms: u64,
    pub contact_delay_ms: u64,
    /// Scroll-spy lookahead, in rows.
    pub scroll_margin: usize,
    pub transition_ms: u64,
    pub frame_ms: u64,
    pub smooth_scroll_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            home_delay_ms: 2000,
            project_delay_ms: 800,
            poc_delay_ms: 1500,
            contact_delay_ms: 1200,
            scroll_margin: 3,
            transition_ms: 800,
            frame_ms: 16,
            smooth_scroll_ms: 300,
        }
    }
}

impl OrchestratorConfig {
    /// How long a view shows its skeleton when no readiness signal arrives.
    pub fn readiness_delay(&self, view: ViewId) -> Duration {
        let ms = match view {
            ViewId::Home => self.home_delay_ms,
            ViewId::Project => self.project_delay_ms,
            ViewId::Poc => self.poc_delay_ms,
            ViewId::Contact => self.contact_delay_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }

    pub fn smooth_scroll_duration(&self) -> Duration {
        Duration::from_millis(self.smooth_scroll_ms)
    }
}

/// Identifiers for the transactional email relay. All three must be set
/// before the contact form can send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub public_key: Option<String>,
    pub endpoint: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            service_id: None,
            template_id: None,
            public_key: None,
            endpoint: DEFAULT_RELAY_ENDPOINT.to_string(),
        }
    }
}

impl RelayConfig {
    pub fn is_configured(&self) -> bool {
        [&self.service_id, &self.template_id, &self.public_key]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_readiness_delays() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.readiness_delay(ViewId::Home), Duration::from_millis(2000));
        assert_eq!(config.readiness_delay(ViewId::Project), Duration::from_millis(800));
        assert!(config.readiness_delay(ViewId::Home) > config.readiness_delay(ViewId::Project));
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let json = r#"{"origin":"https://folio.example","offline":{"runtime_name":"rt-v2"}}"#;
        let config: Config = serde_json::from_str(json).expect("parse partial config");
        assert_eq!(config.origin.as_deref(), Some("https://folio.example"));
        assert_eq!(config.offline.runtime_name, "rt-v2");
        assert_eq!(config.offline.precache_name, "portfolio-cache-v1");
        assert_eq!(config.offline.manifest.len(), 4);
        assert_eq!(config.orchestrator.home_delay_ms, 2000);
    }

    #[test]
    fn test_env_overrides_skip_empty_values() {
        let env: HashMap<&str, &str> = [
            ("FOLIO_ORIGIN", "https://env.example"),
            ("EMAILJS_SERVICE_ID", "svc"),
            ("EMAILJS_TEMPLATE_ID", "  "),
            ("EMAILJS_PUBLIC_KEY", "pk"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.relay.template_id = Some("from-file".to_string());
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.origin.as_deref(), Some("https://env.example"));
        assert_eq!(config.relay.service_id.as_deref(), Some("svc"));
        assert_eq!(config.relay.template_id.as_deref(), Some("from-file"));
        assert!(config.relay.is_configured());
    }

    #[test]
    fn test_relay_not_configured_when_any_id_missing() {
        let relay = RelayConfig {
            service_id: Some("svc".to_string()),
            template_id: None,
            public_key: Some("pk".to_string()),
            ..Default::default()
        };
        assert!(!relay.is_configured());
    }
}
