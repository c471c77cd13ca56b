//! # Retry System
//!
//! Exponential backoff with jitter around fallible async operations,
//! plus preset profiles for API, data-layer and auth calls.

pub mod classify;
pub mod errors;
pub mod executor;
pub mod options;
pub mod prelude;
pub mod profiles;

// Re-export centralized config
pub use config::{RetryConfig, RetryPolicy};

pub use classify::{ClassifyError, ErrorClass, OperationError};
pub use errors::RetryError;
pub use executor::{execute_with_retry, RetryOutcome};
pub use options::{RetryCallback, RetryCondition, RetryOptions};
pub use profiles::{
    create_api_retry_wrapper, retry_api_call, retry_auth_call, retry_database_call,
    ApiRetryWrapper, RetryProfile,
};
