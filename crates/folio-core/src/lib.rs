//! Core library for folio, a terminal portfolio.
//!
//! - `offline`: the offline cache manager and its background worker
//! - `orchestrator`: routing, view readiness, transitions and scroll-spy
//! - `contact`: contact form validation and the mail relay
//! - `models` / `content`: view identifiers and portfolio content
//! - `config`: persisted configuration with environment overrides

pub mod config;
pub mod contact;
pub mod content;
pub mod models;
pub mod offline;
pub mod orchestrator;
pub mod utils;

pub use config::Config;
