use std::fmt;

use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};

use crate::config::OfflineConfig;

/// How the request was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// A full-page navigation.
    Navigate,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            mode: RequestMode::Other,
        }
    }

    pub fn navigate(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            mode: RequestMode::Navigate,
        }
    }

    pub fn key(&self) -> RequestKey {
        RequestKey {
            method: self.method.as_str().to_string(),
            url: self.url.as_str().to_string(),
        }
    }
}

/// Cache lookup identity: method plus the full URL, matched exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Request class, which decides the caching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Not intercepted; goes straight to the network.
    CrossOrigin,
    Api,
    StaticAsset,
    Navigation,
    Other,
}

/// Classify a request. First match wins: cross-origin, API prefix, static
/// asset, navigation, then everything else.
pub fn classify(request: &Request, origin: &Url, config: &OfflineConfig) -> RequestClass {
    if request.url.origin() != origin.origin() {
        return RequestClass::CrossOrigin;
    }

    let path = request.url.path();
    if path.starts_with(&config.api_prefix) {
        return RequestClass::Api;
    }

    if is_static_asset(path, config) {
        return RequestClass::StaticAsset;
    }

    if request.mode == RequestMode::Navigate {
        return RequestClass::Navigation;
    }

    RequestClass::Other
}

fn is_static_asset(path: &str, config: &OfflineConfig) -> bool {
    if config.static_prefixes.iter().any(|prefix| path.starts_with(prefix)) {
        return true;
    }

    let file_name = path.rsplit('/').next().unwrap_or_default();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => config
            .static_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://folio.example").expect("origin")
    }

    fn classify_get(url: &str) -> RequestClass {
        let req = Request::get(Url::parse(url).expect("url"));
        classify(&req, &origin(), &OfflineConfig::default())
    }

    fn classify_nav(url: &str) -> RequestClass {
        let req = Request::navigate(Url::parse(url).expect("url"));
        classify(&req, &origin(), &OfflineConfig::default())
    }

    #[test]
    fn test_cross_origin_is_excluded_first() {
        assert_eq!(classify_get("https://cdn.example/static/app.js"), RequestClass::CrossOrigin);
        assert_eq!(classify_nav("http://folio.example/home"), RequestClass::CrossOrigin);
        assert_eq!(classify_get("https://folio.example:8443/api/x"), RequestClass::CrossOrigin);
    }

    #[test]
    fn test_api_prefix_beats_static_extension() {
        assert_eq!(classify_get("https://folio.example/api/views/home.json"), RequestClass::Api);
        assert_eq!(classify_get("https://folio.example/api/logo.png"), RequestClass::Api);
    }

    #[test]
    fn test_static_assets_by_prefix_and_extension() {
        assert_eq!(classify_get("https://folio.example/static/media/a.bin"), RequestClass::StaticAsset);
        assert_eq!(classify_get("https://folio.example/logo.SVG"), RequestClass::StaticAsset);
        assert_eq!(classify_get("https://folio.example/img/photo.webp?v=2"), RequestClass::StaticAsset);
        assert_eq!(classify_nav("https://folio.example/bundle.js"), RequestClass::StaticAsset);
    }

    #[test]
    fn test_extension_must_be_final_and_named() {
        assert_eq!(classify_get("https://folio.example/manifest.json"), RequestClass::Other);
        assert_eq!(classify_get("https://folio.example/.css"), RequestClass::Other);
        assert_eq!(classify_get("https://folio.example/a.css/page"), RequestClass::Other);
    }

    #[test]
    fn test_navigation_then_default() {
        assert_eq!(classify_nav("https://folio.example/project"), RequestClass::Navigation);
        assert_eq!(classify_get("https://folio.example/project"), RequestClass::Other);
    }

    #[test]
    fn test_key_is_method_and_full_url() {
        let a = Request::get(Url::parse("https://folio.example/a?x=1").expect("url"));
        let b = Request::navigate(Url::parse("https://folio.example/a?x=1").expect("url"));
        let c = Request::get(Url::parse("https://folio.example/a?x=2").expect("url"));
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
        assert_eq!(a.key().to_string(), "GET https://folio.example/a?x=1");
    }
}
