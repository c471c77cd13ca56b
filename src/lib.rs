//! # Resilience Core
//!
//! A runtime resilience layer for application call sites: a TTL+LRU cache
//! with optional persistence, a performance metrics collector, an alert
//! manager that deduplicates threshold violations over time, and a retry
//! handler with exponential backoff and jitter.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resilience_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = ResilienceContext::new(AppConfig::default())?;
//!     let mut tasks = context.start_background_tasks();
//!
//!     context.alerts().on_alert(|alert| {
//!         println!("{}", alert.message);
//!         Ok(())
//!     });
//!
//!     let jobs: Vec<String> = context
//!         .fetch_api("/api/jobs", None::<&()>, || async {
//!             Ok(vec!["Rust engineer".to_string()])
//!         })
//!         .await?;
//!     println!("Fetched {} jobs", jobs.len());
//!
//!     tasks.stop();
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use crate::core::{BackgroundTasks, ResilienceContext};
pub use crate::errors::ResilienceError;

// Re-export centralized config
pub use config::{
    AlertConfig, AppConfig, CacheConfig, CacheSettings, MetricsConfig, RetryConfig, RetryPolicy,
};

// Re-export workspace crates
pub use alert_system;
pub use cache_system;
pub use core_types;
pub use metrics_system;
pub use retry_system;

// Logging macros shared by every crate
pub use core_types::{debug_log, trace_log};
