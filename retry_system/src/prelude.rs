//! Convenience re-exports for common retry-system usage

pub use crate::classify::{ClassifyError, ErrorClass, OperationError};
pub use crate::errors::RetryError;
pub use crate::executor::{execute_with_retry, RetryOutcome};
pub use crate::options::RetryOptions;
pub use crate::profiles::{
    create_api_retry_wrapper, retry_api_call, retry_auth_call, retry_database_call, RetryProfile,
};

pub use config::RetryPolicy;
