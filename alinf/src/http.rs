//! HTTP client construction.
//!
//! Each inflector owns its client, built once when the inflector is created.
//! Timeouts are applied per request so each provider keeps its own ceiling.

use std::time::Duration;

const USER_AGENT: &str = concat!("alinf/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client with the crate's user agent and connect timeout.
pub fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("[HTTP] Failed to build tuned client ({}), using defaults", e);
            reqwest::Client::new()
        })
}

/// Describe a reqwest failure, calling out timeouts explicitly.
pub fn describe_error(e: &reqwest::Error, timeout: Duration) -> String {
    if e.is_timeout() {
        format!("Request timed out after {:?}", timeout)
    } else {
        format!("Request failed: {}", e)
    }
}
