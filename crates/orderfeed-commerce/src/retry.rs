//! Recovery policy for failed commerce API reads.
//!
//! A failed read either gives up, backs off and tries again (throttling, 5xx,
//! dropped connections), or retries once straight away with a fresh token
//! after a 401. Back-off retries are opt-in through configuration; the token
//! refresh always happens.

use std::future::Future;
use std::time::Duration;

use crate::error::CommerceError;

/// Longest single back-off sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// What to do after a failed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recovery {
    Fail,
    Backoff,
    RefreshToken,
}

impl Recovery {
    pub(crate) fn for_error(err: &CommerceError) -> Self {
        match err {
            CommerceError::Unauthorized { .. } => Self::RefreshToken,
            CommerceError::UnexpectedStatus { status, .. } => match status {
                429 | 500..=599 => Self::Backoff,
                _ => Self::Fail,
            },
            CommerceError::Http(e) if e.is_timeout() || e.is_connect() => Self::Backoff,
            _ => Self::Fail,
        }
    }
}

/// How many back-off retries a read gets and how long the first one waits.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub(crate) fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    /// Ceiling for the `retry`-th back-off (1-based): the base delay doubled
    /// per earlier retry, never above [`MAX_BACKOFF`].
    pub(crate) fn ceiling(&self, retry: u32) -> Duration {
        let doublings = retry.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1 << doublings)
            .min(MAX_BACKOFF)
    }

    /// Sleep before the `retry`-th back-off: somewhere in the upper half of
    /// [`RetryPolicy::ceiling`].
    fn delay(&self, retry: u32) -> Duration {
        let ceiling = self.ceiling(retry);
        if ceiling.is_zero() {
            return ceiling;
        }
        ceiling.mul_f64(rand::random_range(0.5..=1.0))
    }

    /// Runs `read` until it succeeds or [`Recovery::for_error`] says to stop.
    pub(crate) async fn run<T, F, Fut>(&self, resource: &str, mut read: F) -> Result<T, CommerceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CommerceError>>,
    {
        let mut backoffs = 0u32;
        let mut token_refreshed = false;

        loop {
            let err = match read().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            match Recovery::for_error(&err) {
                Recovery::RefreshToken if !token_refreshed => {
                    token_refreshed = true;
                    tracing::info!(resource, "bearer token rejected; retrying with a new token");
                }
                Recovery::Backoff if backoffs < self.max_retries => {
                    backoffs += 1;
                    let delay = self.delay(backoffs);
                    tracing::warn!(
                        resource,
                        retry = backoffs,
                        max_retries = self.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "commerce API read failed; backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                _ => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn status(code: u16) -> CommerceError {
        CommerceError::UnexpectedStatus {
            status: code,
            url: "http://localhost/v1/buyers/b1".to_owned(),
        }
    }

    fn unauthorized() -> CommerceError {
        CommerceError::Unauthorized {
            resource: "buyer b1".to_owned(),
        }
    }

    #[test]
    fn throttling_and_server_errors_back_off() {
        assert_eq!(Recovery::for_error(&status(429)), Recovery::Backoff);
        assert_eq!(Recovery::for_error(&status(502)), Recovery::Backoff);
        assert_eq!(Recovery::for_error(&status(400)), Recovery::Fail);
        assert_eq!(Recovery::for_error(&status(403)), Recovery::Fail);
    }

    #[test]
    fn rejected_token_is_refreshed_but_bad_credentials_are_not() {
        assert_eq!(Recovery::for_error(&unauthorized()), Recovery::RefreshToken);
        assert_eq!(
            Recovery::for_error(&CommerceError::Auth("invalid_client".to_owned())),
            Recovery::Fail
        );
        assert_eq!(
            Recovery::for_error(&CommerceError::NotFound {
                resource: "supplier s1".to_owned()
            }),
            Recovery::Fail
        );
    }

    #[test]
    fn ceiling_doubles_and_saturates() {
        let policy = RetryPolicy::new(5, 250);
        assert_eq!(policy.ceiling(1), Duration::from_millis(250));
        assert_eq!(policy.ceiling(3), Duration::from_millis(1_000));
        assert_eq!(policy.ceiling(40), MAX_BACKOFF);

        let huge = RetryPolicy::new(5, u64::MAX);
        assert_eq!(huge.ceiling(2), MAX_BACKOFF);
    }

    #[test]
    fn delay_stays_in_upper_half_of_ceiling() {
        let policy = RetryPolicy::new(3, 400);
        for _ in 0..50 {
            let delay = policy.delay(2);
            assert!(delay >= Duration::from_millis(400) && delay <= Duration::from_millis(800));
        }
        assert!(RetryPolicy::new(3, 0).delay(3).is_zero());
    }

    #[tokio::test]
    async fn no_backoff_retries_by_default() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = RetryPolicy::new(0, 0)
            .run("buyer b1", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status(503))
            })
            .await;
        assert!(matches!(
            result,
            Err(CommerceError::UnexpectedStatus { status: 503, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backs_off_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = RetryPolicy::new(3, 0)
            .run("buyer b1", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(status(500))
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn token_refresh_happens_once_even_without_retries() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = RetryPolicy::new(0, 0)
            .run("buyer b1", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(unauthorized())
            })
            .await;
        assert!(matches!(result, Err(CommerceError::Unauthorized { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn not_found_is_returned_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = RetryPolicy::new(3, 0)
            .run("supplier s1", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(CommerceError::NotFound {
                    resource: "supplier s1".to_owned(),
                })
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(CommerceError::NotFound { .. })));
    }
}
