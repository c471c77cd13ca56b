//! Retry loop with exponential backoff and jitter

use crate::errors::RetryError;
use crate::options::RetryOptions;
use core_types::debug_log;
use std::fmt::Display;
use std::future::Future;

/// Result of one retried invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOutcome<T, E> {
    /// Data of the successful attempt, or the error of the last one
    pub result: Result<T, E>,
    /// Attempts made, including the first
    pub attempts: u32,
    /// The last failure happened with no retries left
    pub exhausted: bool,
}

impl<T, E> RetryOutcome<T, E> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn data(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&E> {
        self.result.as_ref().err()
    }

    /// Throw-style view of the outcome
    pub fn into_result(self) -> Result<T, RetryError<E>> {
        let attempts = self.attempts;
        let exhausted = self.exhausted;
        self.result.map_err(|source| {
            if exhausted {
                RetryError::Exhausted { attempts, source }
            } else {
                RetryError::NotRetryable { attempts, source }
            }
        })
    }
}

/// Run `operation` until it succeeds, fails with an error the retry
/// condition rejects, or `max_retries` retries have been used.
///
/// No sleep happens after the terminal failure. `on_retry` receives the
/// 1-based number of the attempt that just failed.
pub async fn execute_with_retry<T, E, F, Fut>(
    mut operation: F,
    options: &RetryOptions<E>,
) -> RetryOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        let attempts = attempt + 1;
        let error = match operation().await {
            Ok(data) => {
                if attempt > 0 {
                    debug_log!("Operation succeeded on attempt {}", attempts);
                }
                return RetryOutcome {
                    result: Ok(data),
                    attempts,
                    exhausted: false,
                };
            }
            Err(error) => error,
        };

        let exhausted = attempt >= options.max_retries;
        if exhausted || !(options.retry_condition)(&error) {
            tracing::warn!(
                attempts,
                exhausted,
                error = %error,
                "Operation failed, giving up"
            );
            return RetryOutcome {
                result: Err(error),
                attempts,
                exhausted,
            };
        }

        let delay = options.backoff_delay(attempt) + options.jitter_sample();
        if let Some(on_retry) = &options.on_retry {
            on_retry(attempts, &error);
        }
        debug_log!(
            "Attempt {} failed ({}), retrying in {}ms",
            attempts,
            error,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::OperationError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn quick_options() -> RetryOptions<OperationError> {
        RetryOptions::default()
            .with_max_retries(2)
            .with_jitter(Duration::ZERO)
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_max_retries() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let outcome: RetryOutcome<(), _> = execute_with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(OperationError::Network("unreachable".into())) }
            },
            &quick_options(),
        )
        .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.attempts, 3);
        assert!(outcome.exhausted);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff, nothing after the last failure
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(3000));
        assert!(waited < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_error_short_circuits() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();
        let options = quick_options().with_max_retries(5).retry_if(|_| false);

        let outcome: RetryOutcome<(), _> = execute_with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(OperationError::status(401, "unauthorized")) }
            },
            &options,
        )
        .await;

        assert_eq!(outcome.attempts, 1);
        assert!(!outcome.exhausted);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(matches!(
            outcome.into_result(),
            Err(RetryError::NotRetryable { attempts: 1, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_and_reports_retries() {
        let calls = AtomicU32::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let options = quick_options().on_retry(move |attempt, err: &OperationError| {
            recorder.lock().unwrap().push((attempt, err.to_string()));
        });

        let outcome = execute_with_retry(
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call < 2 {
                        Err(OperationError::status(502, "bad gateway"))
                    } else {
                        Ok("payload")
                    }
                }
            },
            &options,
        )
        .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.data(), Some(&"payload"));
        assert_eq!(outcome.attempts, 3);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, 1);
        assert_eq!(seen[1].0, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_jitter_extends_backoff_within_bound() {
        let options = quick_options()
            .with_max_retries(1)
            .with_jitter(Duration::from_millis(1000));
        let started = tokio::time::Instant::now();

        let outcome: RetryOutcome<(), _> = execute_with_retry(
            || async { Err(OperationError::Timeout("slow upstream".into())) },
            &options,
        )
        .await;

        assert_eq!(outcome.attempts, 2);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(1000));
        assert!(waited < Duration::from_millis(2100));
    }

    #[tokio::test]
    async fn test_first_success_makes_one_attempt() {
        let outcome = execute_with_retry(
            || async { Ok::<_, OperationError>(7) },
            &quick_options(),
        )
        .await;
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.into_result().unwrap(), 7);
    }
}
