//! Shared HTTP client with connection pooling.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;

/// Default request timeout for transcription uploads.
///
/// Large media files over slow links can take minutes; no operation-level
/// deadline beyond this transport timeout is enforced.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

static HTTP_CLIENT: OnceCell<reqwest::Client> = OnceCell::new();

/// Shared reqwest client for all outbound calls.
pub fn get_http_client() -> Result<&'static reqwest::Client> {
    HTTP_CLIENT.get_or_try_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")
    })
}
