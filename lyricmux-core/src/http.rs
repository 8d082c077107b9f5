//! Shared HTTP client construction for backends.

use crate::config::BackendsConfig;
use crate::error::CoreError;
use std::time::Duration;

/// User agent for backend requests; some catalogs reject non-browser agents
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Build a client with per-call timeouts and no retries.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn build_client(timeout: Duration, connect_timeout: Duration) -> Result<reqwest::Client, CoreError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Build a client from the `[backends]` config section.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn client_from_config(config: &BackendsConfig) -> Result<reqwest::Client, CoreError> {
    build_client(config.timeout(), config.connect_timeout())
}
