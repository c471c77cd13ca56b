//! Cache statistics
//!
//! Snapshot types returned by `CacheManager::stats` and the lightweight
//! lookup counters consumed by the alert manager.

use serde::{Deserialize, Serialize};

/// Number of most-accessed entries reported by default
pub const DEFAULT_TOP_ENTRIES: usize = 10;

/// Point-in-time statistics for one cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    /// Serialized length of every entry's data, doubled as a UTF-16 estimate
    pub estimated_size_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, 0.0 before the first lookup
    pub hit_rate: f64,
    pub top_entries: Vec<EntryAccess>,
}

/// Access summary for a single entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryAccess {
    pub key: String,
    pub access_count: u32,
    pub age_ms: u64,
    pub remaining_ms: u64,
}

/// Hit and miss counters since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupCounts {
    pub hits: u64,
    pub misses: u64,
}

impl LookupCounts {
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_ratio(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.hits as f64 / total as f64),
        }
    }
}

/// Health signals a cache exposes to monitoring
pub trait CacheHealth: Send + Sync {
    fn lookup_counts(&self) -> LookupCounts;

    fn entry_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio() {
        assert_eq!(LookupCounts::default().hit_ratio(), None);
        let counts = LookupCounts { hits: 3, misses: 1 };
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.hit_ratio(), Some(0.75));
    }
}
