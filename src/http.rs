//! Blocking HTTP plumbing shared by the bridge and RPC clients.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use tracing::warn;

use crate::error::Error;

/// Exponential backoff for transport failures, 5xx and 429 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

pub fn build_client(timeout: Duration) -> Result<Client, Error> {
    Ok(Client::builder().timeout(timeout).build()?)
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Sends the request built by `build`, retrying per `policy`.
///
/// Non-retryable statuses are returned to the caller as-is. The last
/// retryable response (or transport error) is returned once retries run out.
pub fn send_with_retry(
    policy: &RetryPolicy,
    label: &str,
    build: impl Fn() -> RequestBuilder,
) -> Result<Response, Error> {
    let mut attempt = 0;
    loop {
        let outcome = build().send();
        let retryable = match &outcome {
            Ok(resp) => is_retryable_status(resp.status()),
            Err(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        };

        if !retryable || attempt >= policy.max_retries {
            return outcome.map_err(Error::from);
        }

        attempt += 1;
        let delay = policy.delay_for_attempt(attempt);
        match &outcome {
            Ok(resp) => warn!(
                label,
                attempt,
                status = %resp.status(),
                delay_ms = delay.as_millis() as u64,
                "retrying request"
            ),
            Err(e) => warn!(
                label,
                attempt,
                error = %e,
                delay_ms = delay.as_millis() as u64,
                "retrying request"
            ),
        }
        std::thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(1_000),
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(800));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_millis(1_000));
    }

    #[test]
    fn no_retry_policy_has_zero_delay() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_retries, 0);
        assert_eq!(policy.delay_for_attempt(1), Duration::ZERO);
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::OK));
    }
}
