//! Raw byte retrieval with retry for transient HTTP failures.
//!
//! Remote sources go through [`send_with_retry`], which retries connection
//! errors, timeouts, HTTP 429 and HTTP 5xx with exponential backoff. HTTP
//! 4xx (other than 429) is permanent and fails immediately.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest as _, Sha256};
use world_population_dataset_models::SourceFingerprint;

use crate::config::DataSource;
use crate::progress::ProgressCallback;
use crate::LoadError;

/// Maximum number of retry attempts for transient HTTP errors.
///
/// With exponential backoff (2s, 4s, 8s, 16s) the total wait before giving
/// up is 30 seconds.
const MAX_RETRIES: u32 = 4;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Reads the full contents of `source`.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read, or if the HTTP request
/// fails after all retries.
pub async fn fetch_bytes(
    source: &DataSource,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<u8>, LoadError> {
    let bytes = match source {
        DataSource::Path(path) => tokio::fs::read(path).await?,
        DataSource::Url(url) => {
            let client = reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?;
            let response = send_with_retry(|| client.get(url), MAX_RETRIES).await?;
            if let Some(len) = response.content_length() {
                progress.set_total(len);
            }
            response.bytes().await?.to_vec()
        }
    };

    progress.inc(bytes.len() as u64);
    log::debug!("Read {} bytes from {source}", bytes.len());

    Ok(bytes)
}

/// Fingerprints `bytes` as read from `source`.
#[must_use]
pub fn fingerprint(source: &DataSource, bytes: &[u8]) -> SourceFingerprint {
    SourceFingerprint {
        source_id: source.source_id(),
        sha256: hex::encode(Sha256::digest(bytes)),
    }
}

/// Sends the request built by `build_request`, retrying transient failures
/// up to `max_retries` times. Returns the first 2xx/3xx response.
async fn send_with_retry<F>(
    build_request: F,
    max_retries: u32,
) -> Result<reqwest::Response, LoadError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(LoadError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status} from {}", response.url());
                        attempt += 1;
                        continue;
                    }
                    return Err(status_error(&response));
                }

                if status.is_client_error() {
                    return Err(status_error(&response));
                }

                return Ok(response);
            }
        }
    }
}

fn status_error(response: &reqwest::Response) -> LoadError {
    LoadError::HttpStatus {
        url: response.url().to_string(),
        status: response.status().as_u16(),
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
