//! # Alert System
//!
//! Turns metric aggregates, cache statistics and memory pressure into a
//! small set of deduplicated, severity-ranked alerts.

pub mod alert;
pub mod callbacks;
pub mod checks;
pub mod manager;
pub mod memory;
pub mod monitor;
pub mod prelude;

// Re-export centralized config
pub use config::AlertConfig;

pub use alert::{Alert, AlertKind};
pub use callbacks::{AlertCallback, CallbackId, CallbackRegistry};
pub use manager::{AlertManager, AlertStatistics};
pub use memory::{MemoryProbe, MemorySample, NoMemoryProbe, ProcessMemoryProbe, StaticMemoryProbe};
