//! Preset retry policies for API, data-layer and auth calls

use crate::classify::{ClassifyError, ErrorClass};
use crate::errors::RetryError;
use crate::executor::{execute_with_retry, RetryOutcome};
use crate::options::RetryOptions;
use config::{RetryConfig, RetryPolicy};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

/// Call family a retry preset is tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryProfile {
    /// Network failures, timeouts and 5xx responses
    Api,
    /// Connection failures and timeouts
    Database,
    /// Service unavailable only
    Auth,
}

impl RetryProfile {
    pub fn should_retry(&self, class: ErrorClass) -> bool {
        match self {
            RetryProfile::Api => class.is_transient(),
            RetryProfile::Database => {
                matches!(class, ErrorClass::Connection | ErrorClass::Timeout)
            }
            RetryProfile::Auth => class == ErrorClass::Status(503),
        }
    }

    pub fn default_policy(&self) -> RetryPolicy {
        match self {
            RetryProfile::Api => RetryPolicy::api_defaults(),
            RetryProfile::Database => RetryPolicy::database_defaults(),
            RetryProfile::Auth => RetryPolicy::auth_defaults(),
        }
    }

    /// This profile's policy out of the loaded retry config
    pub fn policy_from(&self, config: &RetryConfig) -> RetryPolicy {
        match self {
            RetryProfile::Api => config.api,
            RetryProfile::Database => config.database,
            RetryProfile::Auth => config.auth,
        }
    }

    pub fn options<E>(&self, policy: &RetryPolicy) -> RetryOptions<E>
    where
        E: ClassifyError + 'static,
    {
        let profile = *self;
        RetryOptions::from_policy(
            policy,
            Arc::new(move |err: &E| profile.should_retry(err.classify())),
        )
    }

    pub fn default_options<E>(&self) -> RetryOptions<E>
    where
        E: ClassifyError + 'static,
    {
        self.options(&self.default_policy())
    }
}

pub async fn retry_api_call<T, E, F, Fut>(operation: F) -> RetryOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ClassifyError + Display + 'static,
{
    execute_with_retry(operation, &RetryProfile::Api.default_options()).await
}

pub async fn retry_database_call<T, E, F, Fut>(operation: F) -> RetryOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ClassifyError + Display + 'static,
{
    execute_with_retry(operation, &RetryProfile::Database.default_options()).await
}

pub async fn retry_auth_call<T, E, F, Fut>(operation: F) -> RetryOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ClassifyError + Display + 'static,
{
    execute_with_retry(operation, &RetryProfile::Auth.default_options()).await
}

/// Reusable throw-style call through the API profile
pub struct ApiRetryWrapper<F, E> {
    operation: F,
    options: RetryOptions<E>,
}

impl<F, E> ApiRetryWrapper<F, E> {
    pub fn options(&self) -> &RetryOptions<E> {
        &self.options
    }

    pub async fn call<T, Fut>(&mut self) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        execute_with_retry(&mut self.operation, &self.options)
            .await
            .into_result()
    }
}

/// Wrap `operation` so every call retries through the API profile and
/// returns the last error once retries are used up
pub fn create_api_retry_wrapper<F, E>(operation: F, policy: &RetryPolicy) -> ApiRetryWrapper<F, E>
where
    E: ClassifyError + 'static,
{
    ApiRetryWrapper {
        operation,
        options: RetryProfile::Api.options(policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::OperationError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_profile_conditions() {
        assert!(RetryProfile::Api.should_retry(ErrorClass::Status(500)));
        assert!(RetryProfile::Api.should_retry(ErrorClass::Network));
        assert!(!RetryProfile::Api.should_retry(ErrorClass::Status(429)));

        assert!(RetryProfile::Database.should_retry(ErrorClass::Connection));
        assert!(!RetryProfile::Database.should_retry(ErrorClass::Status(500)));

        assert!(RetryProfile::Auth.should_retry(ErrorClass::Status(503)));
        assert!(!RetryProfile::Auth.should_retry(ErrorClass::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_database_call_uses_two_retries() {
        let calls = AtomicU32::new(0);
        let outcome: RetryOutcome<(), _> = retry_database_call(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(OperationError::Connection("pool exhausted".into())) }
        })
        .await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_call_ignores_client_errors() {
        let outcome: RetryOutcome<(), _> =
            retry_auth_call(|| async { Err(OperationError::status(401, "expired token")) }).await;
        assert_eq!(outcome.attempts, 1);

        let outcome: RetryOutcome<(), _> =
            retry_auth_call(|| async { Err(OperationError::status(503, "maintenance")) }).await;
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrapper_returns_last_error() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(1, 100, 1000, 2.0).with_jitter_ms(0);
        let mut fetch = create_api_retry_wrapper(
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move { Err::<u32, _>(OperationError::status(500 + call as u16, "upstream")) }
            },
            &policy,
        );

        let err = fetch.call().await.unwrap_err();
        assert_eq!(err.attempts(), 2);
        assert!(matches!(err, RetryError::Exhausted { .. }));
        assert_eq!(err.into_inner(), OperationError::status(501, "upstream"));
    }
}
