//! Convenience re-exports for common cache-system usage

// Core cache system components
pub use crate::entry::CacheEntry;
pub use crate::errors::CacheError;
pub use crate::manager::CacheManager;
pub use crate::specialized::{ApiCache, RouteCache};
pub use crate::stats::{CacheHealth, CacheStats, LookupCounts};
pub use crate::storage::{FileStorage, MemoryStorage, StorageBackend};

// Re-export centralized config
pub use config::CacheConfig;

// Common external dependencies
pub use serde::{Deserialize, Serialize};
pub use serde_json;
