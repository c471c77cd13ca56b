//! Integration tests for the retry handler

use resilience_core::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn no_jitter() -> RetryOptions<OperationError> {
    RetryOptions::default().with_jitter(Duration::ZERO)
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_operation_makes_three_attempts() {
    let calls = AtomicU32::new(0);
    let outcome: RetryOutcome<String, _> = execute_with_retry(
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(OperationError::Timeout("upstream took too long".into())) }
        },
        &no_jitter().with_max_retries(2),
    )
    .await;

    assert_eq!(outcome.attempts, 3);
    assert!(!outcome.is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(matches!(outcome.error(), Some(OperationError::Timeout(_))));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_error_makes_one_attempt() {
    let outcome: RetryOutcome<String, _> = execute_with_retry(
        || async { Err(OperationError::status(422, "invalid payload")) },
        &no_jitter().with_max_retries(10),
    )
    .await;

    assert_eq!(outcome.attempts, 1);
    assert!(!outcome.exhausted);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_schedule_doubles() {
    let waits = Arc::new(Mutex::new(Vec::new()));
    let recorder = waits.clone();
    let started = tokio::time::Instant::now();
    let options = no_jitter()
        .with_max_retries(3)
        .with_base_delay(Duration::from_millis(200))
        .on_retry(move |attempt, _| {
            recorder.lock().unwrap().push((attempt, started.elapsed()));
        });

    let outcome: RetryOutcome<(), _> = execute_with_retry(
        || async { Err(OperationError::Network("connection reset".into())) },
        &options,
    )
    .await;
    assert_eq!(outcome.attempts, 4);

    let waits = waits.lock().unwrap();
    let attempts: Vec<u32> = waits.iter().map(|(attempt, _)| *attempt).collect();
    assert_eq!(attempts, vec![1, 2, 3]);
    // Sleeps of 200ms, 400ms and 800ms precede attempts 2, 3 and 4
    assert!(waits[1].1 >= Duration::from_millis(200));
    assert!(waits[2].1 >= Duration::from_millis(600));
    assert!(started.elapsed() >= Duration::from_millis(1400));
}

#[tokio::test(start_paused = true)]
async fn test_profiles_from_config() {
    let config = AppConfig::default();
    let policy = RetryProfile::Database.policy_from(&config.retry);
    let options: RetryOptions<std::io::Error> = RetryProfile::Database.options(&policy);

    let calls = AtomicU32::new(0);
    let outcome = execute_with_retry(
        || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "db down"))
                } else {
                    Ok(call)
                }
            }
        },
        &options,
    )
    .await;

    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.data(), Some(&1));
}

#[tokio::test(start_paused = true)]
async fn test_api_wrapper_is_reusable() {
    let calls = AtomicU32::new(0);
    let policy = RetryPolicy::api_defaults().with_jitter_ms(0);
    let mut fetch_profile = create_api_retry_wrapper(
        || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                match call {
                    0 => Err(OperationError::status(500, "internal error")),
                    1 => Ok("profile".to_string()),
                    _ => Err(OperationError::status(404, "gone")),
                }
            }
        },
        &policy,
    );

    assert_eq!(fetch_profile.call().await.unwrap(), "profile");
    let err = fetch_profile.call().await.unwrap_err();
    assert!(matches!(err, RetryError::NotRetryable { attempts: 1, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
