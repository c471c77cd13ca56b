//! Convenience re-exports for common resilience-core usage
//!
//! # Example
//!
//! ```rust
//! use resilience_core::prelude::*;
//!
//! let cache: CacheManager<u32> = CacheManager::new(CacheConfig::api_defaults());
//! cache.set("answer", 42, None);
//! assert_eq!(cache.get("answer"), Some(42));
//! ```

// Core components
pub use crate::core::{BackgroundTasks, ResilienceContext};
pub use crate::errors::ResilienceError;

// Re-export centralized config
pub use config::{AppConfig, CacheSettings, ConfigError, RetryConfig};

pub use core_types::{
    Clock, ManualClock, MetadataMap, MetadataValue, SharedClock, Severity, SystemClock, TaskHandle,
};

pub use alert_system::prelude::*;
pub use cache_system::prelude::*;
pub use metrics_system::prelude::*;
pub use retry_system::prelude::*;

// Common external dependencies
pub use anyhow;
pub use tokio;
