//! Retry wrapper around relay calls.
//!
//! Deliberately minimal: bounded attempts, linear backoff, no jitter, no
//! circuit breaker. Submissions are synchronous and user-initiated, so a
//! handful of retries covers transient blips without a queue.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use tokio::time::sleep;
use tracing::warn;

/// Sends `request` up to `max_attempts` times. A failed attempt is a
/// transport error or a non-2xx status; after each one except the last,
/// waits `base_delay * attempt` and retries. The final attempt's outcome
/// is returned untouched, so callers see the real response or error.
///
/// Requests with a non-cloneable body are sent once.
pub async fn fetch_with_retry(
    mut request: RequestBuilder,
    max_attempts: u32,
    base_delay: Duration,
) -> Result<Response, reqwest::Error> {
    let mut attempt = 1u32;

    loop {
        let (current, kept) = match request.try_clone() {
            Some(clone) => (clone, Some(request)),
            None => (request, None),
        };

        let result = current.send().await;
        let failed = match &result {
            Ok(response) => !response.status().is_success(),
            Err(_) => true,
        };

        match kept {
            Some(next) if failed && attempt < max_attempts => {
                let delay = base_delay * attempt;
                warn!("Attempt {attempt}/{max_attempts} failed, retrying in {delay:?}");
                sleep(delay).await;

                request = next;
                attempt += 1;
            }
            _ => return result,
        }
    }
}
