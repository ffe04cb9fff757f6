//! HTTP client creation and configuration utilities

use reqwest::Client;
use std::time::Duration;

/// Creates an HTTP client with a request timeout, connection pooling and
/// the user agent Reddit requires from API clients.
///
/// # Arguments
/// * `timeout_seconds` - Per-request timeout
/// * `user_agent` - Value sent in the `User-Agent` header on every request
pub fn create_http_client_with_timeout(
    timeout_seconds: u64,
    user_agent: &str,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .pool_max_idle_per_host(crate::constants::HTTP_POOL_MAX_IDLE_PER_HOST)
        .user_agent(user_agent)
        .build()
}
