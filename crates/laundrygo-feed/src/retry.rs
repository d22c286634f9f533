//! Retry with exponential back-off and jitter for database requests and
//! stream reconnects.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx, dropped streams). Everything else
//! is returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::FeedError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset, body cut short.
/// - HTTP 5xx responses.
/// - [`FeedError::Disconnected`]: the event stream ended or went idle.
///
/// **Not retriable:**
/// - HTTP 4xx responses, including rejected credentials.
/// - [`FeedError::Cancelled`] and [`FeedError::AuthRevoked`]: the server
///   refused the stream; reconnecting will be refused again.
/// - Malformed responses and bad URLs.
pub(crate) fn is_retriable(err: &FeedError) -> bool {
    match err {
        FeedError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.is_body()
                || e.status().is_some_and(|s| s.is_server_error())
        }
        FeedError::Disconnected(_) => true,
        FeedError::InvalidUrl { .. }
        | FeedError::InvalidKey(_)
        | FeedError::Deserialize { .. }
        | FeedError::UnexpectedResponse { .. }
        | FeedError::Cancelled(_)
        | FeedError::AuthRevoked => false,
    }
}

/// Returns `true` only when the request never reached the server, so a
/// non-idempotent write can be repeated without creating a duplicate.
pub(crate) fn is_unsent(err: &FeedError) -> bool {
    matches!(err, FeedError::Http(e) if e.is_connect())
}

/// Delay before retry number `attempt` (1-based): `base × 2^(attempt-1)`,
/// capped at 60 s, with ±25 % jitter.
pub(crate) fn backoff_delay(attempt: u32, backoff_base_ms: u64) -> Duration {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    Duration::from_millis(delay_ms)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Attempt | Sleep before next attempt        |
/// |---------|----------------------------------|
/// | 1       | 1 000 ms × 2⁰ ± 25 % jitter     |
/// | 2       | 1 000 ms × 2¹ ± 25 % jitter     |
/// | 3       | 1 000 ms × 2² ± 25 % jitter     |
///
/// Delay is capped at 60 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    operation: F,
) -> Result<T, FeedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FeedError>>,
{
    retry_when(is_retriable, max_retries, backoff_base_ms, operation).await
}

/// Like [`retry_with_backoff`] but with a caller-chosen retry predicate.
pub(crate) async fn retry_when<T, F, Fut>(
    should_retry: fn(&FeedError) -> bool,
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FeedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FeedError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !should_retry(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = backoff_delay(attempt, backoff_base_ms);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "database request failed, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn deserialize_err() -> FeedError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        FeedError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
    }

    async fn connect_err() -> FeedError {
        let err = reqwest::Client::new()
            .get("http://0.0.0.0:1")
            .send()
            .await
            .unwrap_err();
        FeedError::Http(err)
    }

    #[test]
    fn server_refusals_are_not_retriable() {
        assert!(!is_retriable(&FeedError::Cancelled("permission denied".to_owned())));
        assert!(!is_retriable(&FeedError::AuthRevoked));
        assert!(!is_retriable(&deserialize_err()));
    }

    #[test]
    fn disconnect_is_retriable() {
        assert!(is_retriable(&FeedError::Disconnected("eof".to_owned())));
        assert!(!is_unsent(&FeedError::Disconnected("eof".to_owned())));
    }

    #[test]
    fn backoff_doubles_within_jitter_and_caps() {
        for attempt in 1..=4u32 {
            let nominal = 1_000u64 << (attempt - 1);
            let ms = u64::try_from(backoff_delay(attempt, 1_000).as_millis()).unwrap();
            assert!(ms >= nominal * 3 / 4 && ms <= nominal * 5 / 4, "attempt {attempt}: {ms}");
        }
        let ms = backoff_delay(30, 1_000).as_millis();
        assert!(ms <= 75_000, "capped delay too large: {ms}");
        assert_eq!(backoff_delay(3, 0), Duration::ZERO);
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, FeedError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn does_not_retry_cancelled_stream() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(FeedError::Cancelled("rules".to_owned()))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "Cancelled must not be retried");
        assert!(matches!(result, Err(FeedError::Cancelled(_))));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err::<u32, _>(connect_err().await)
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99, "should succeed after retries");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(FeedError::Disconnected("eof".to_owned()))
            }
        })
        .await;
        assert!(matches!(result, Err(FeedError::Disconnected(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3, "one try plus two retries");
    }

    #[tokio::test]
    async fn unsent_predicate_retries_connect_errors_only() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_when(is_unsent, 1, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(connect_err().await)
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
