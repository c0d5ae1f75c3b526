//! Utility functions for string formatting.

pub mod format;

pub use format::{format_age_minutes, format_bytes, truncate_string};
