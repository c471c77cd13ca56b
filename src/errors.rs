//! Error types for the resilience-core crate
//!
//! Only `ResilienceContext` construction and the request pipeline return
//! these; cache, metrics and alert operations log their own faults.

use cache_system::CacheError;
use config::ConfigError;
use retry_system::{OperationError, RetryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResilienceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache storage error: {0}")]
    Cache(#[from] CacheError),

    #[error("Request failed: {0}")]
    Request(#[from] RetryError<OperationError>),
}

impl ResilienceError {
    /// Attempts made by a failed request, if this is one
    pub fn attempts(&self) -> Option<u32> {
        match self {
            ResilienceError::Request(err) => Some(err.attempts()),
            _ => None,
        }
    }
}
