//! Shared types for the resilience workspace
//!
//! This crate provides the value union used for free-form metadata,
//! the severity scale, the injectable clock and the logging macros
//! used by every other crate.

/// Conditional debug logging macros
/// These macros only emit events when the `debug-logging` feature is enabled;
/// otherwise the arguments are type-checked and discarded
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

pub mod clock;
pub mod serialize;
pub mod severity;
pub mod task;
pub mod value;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use serialize::{serialize_to_metadata, serialize_to_value};
pub use severity::Severity;
pub use task::{spawn_periodic, TaskHandle};
pub use value::{MetadataMap, MetadataValue};
