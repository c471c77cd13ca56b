use serde::{Deserialize, Serialize};

/// A cached value with its expiry and access bookkeeping.
///
/// Timestamps are wall-clock milliseconds since the Unix epoch so that
/// persisted entries can be checked against the clock after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
    pub ttl_ms: u64,
    pub access_count: u32,
    pub last_accessed: i64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, now_ms: i64, ttl_ms: u64) -> Self {
        Self {
            data,
            timestamp: now_ms,
            ttl_ms,
            access_count: 0,
            last_accessed: now_ms,
        }
    }

    /// Valid iff `now - timestamp <= ttl`
    pub fn is_valid(&self, now_ms: i64) -> bool {
        self.age_ms(now_ms) <= self.ttl_ms
    }

    pub fn age_ms(&self, now_ms: i64) -> u64 {
        now_ms.saturating_sub(self.timestamp).max(0) as u64
    }

    pub fn remaining_ms(&self, now_ms: i64) -> u64 {
        self.ttl_ms.saturating_sub(self.age_ms(now_ms))
    }

    pub(crate) fn record_access(&mut self, now_ms: i64) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed = now_ms;
    }
}
