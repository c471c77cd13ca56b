//! Cache system for in-process caching
//!
//! This crate provides a bounded TTL + LRU cache with optional
//! persistence, plus the route and API response specializations.

pub mod access_order;
pub mod cleanup;
pub mod entry;
pub mod errors;
pub mod manager;
pub mod prelude;
pub mod specialized;
pub mod stats;
pub mod storage;

// Re-export centralized config
pub use config::CacheConfig;

pub use access_order::AccessOrder;
pub use entry::CacheEntry;
pub use errors::CacheError;
pub use manager::CacheManager;
pub use specialized::{ApiCache, RouteCache};
pub use stats::{CacheHealth, CacheStats, EntryAccess, LookupCounts};
pub use storage::{FileStorage, MemoryStorage, StorageBackend};
