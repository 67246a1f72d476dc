//! # Halite Stats
//!
//! Per-category performance scores from a Halite player's match history.
//!
//! ## Architecture
//!
//! - **models**: Match records, player ids and category buckets
//! - **calculate**: Game scoring and category aggregation
//! - **fetch**: Match history providers (HTTP API, saved file)
//! - **report**: Text and JSON rendering
//! - **session**: Interactive prompt loop
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod report;
pub mod session;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "30s", "2m", "500ms").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(n) = s.strip_suffix("ms") {
        return n.parse().ok().map(Duration::from_millis);
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
