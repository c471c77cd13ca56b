//! Convenience re-exports for common alert-system usage

pub use crate::alert::{Alert, AlertKind};
pub use crate::callbacks::CallbackId;
pub use crate::manager::{AlertManager, AlertStatistics};
pub use crate::memory::{MemoryProbe, MemorySample, NoMemoryProbe, ProcessMemoryProbe, StaticMemoryProbe};

pub use config::AlertConfig;
pub use core_types::Severity;
