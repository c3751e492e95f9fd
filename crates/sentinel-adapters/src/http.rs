//! Shared HTTP client construction.

use std::time::Duration;

use reqwest::{Client, Response};
use sentinel_core::{SentinelError, SentinelResult};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn build_http_client(timeout: Duration) -> SentinelResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SentinelError::provider("http", format!("failed to build HTTP client: {}", e)))
}

/// Turn a non-success response into a provider error carrying a truncated body.
pub(crate) async fn ensure_success(provider: &str, response: Response) -> SentinelResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(SentinelError::provider(
        provider,
        format!("{} error {}: {}", provider, status, truncate(&body, 320)),
    ))
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefgh", 3), "abc...");
    }
}
