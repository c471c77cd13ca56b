//! Error types for cache operations
//!
//! This module defines the errors raised by the persistence layer.
//! Public cache operations log these and keep working in memory.

use thiserror::Error;

/// Cache system errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Storage IO error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Storage quota exceeded for key {key}: {size} bytes")]
    QuotaExceeded { key: String, size: usize },

    #[error("Persistence is not configured for this cache")]
    PersistenceDisabled,

    #[error("General cache error: {0}")]
    General(String),
}
