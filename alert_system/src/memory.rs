//! Memory introspection for the memory-pressure check

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Used and total bytes at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySample {
    pub used_bytes: u64,
    pub total_bytes: u64,
}

impl MemorySample {
    pub fn usage_ratio(&self) -> Option<f64> {
        (self.total_bytes > 0).then(|| self.used_bytes as f64 / self.total_bytes as f64)
    }
}

/// Source of memory samples. `None` means unavailable; the check is skipped.
pub trait MemoryProbe: Send + Sync + Debug {
    fn sample(&self) -> Option<MemorySample>;
}

/// Probe for hosts without memory introspection
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMemoryProbe;

impl MemoryProbe for NoMemoryProbe {
    fn sample(&self) -> Option<MemorySample> {
        None
    }
}

const CGROUP_V2_LIMIT: &str = "/sys/fs/cgroup/memory.max";
const CGROUP_V1_LIMIT: &str = "/sys/fs/cgroup/memory/memory.limit_in_bytes";

/// cgroup v1 reports "no limit" as a page-aligned value near `i64::MAX`
const UNLIMITED_FLOOR: u64 = 1 << 62;

/// Resident memory of this process against its memory limit.
///
/// The limit is the explicit budget when one is given, otherwise the
/// cgroup limit of the process. Without either there is nothing to
/// compare against and the probe reports no sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessMemoryProbe {
    budget_bytes: Option<u64>,
}

impl ProcessMemoryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure against a fixed budget instead of the cgroup limit
    pub fn with_budget(budget_bytes: u64) -> Self {
        Self {
            budget_bytes: Some(budget_bytes),
        }
    }

    /// Parse `VmRSS` (kB) out of `/proc/self/status` text
    pub fn parse_resident(status: &str) -> Option<u64> {
        status
            .lines()
            .find(|line| line.starts_with("VmRSS:"))
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|kb| kb.parse::<u64>().ok())
            .map(|kb| kb * 1024)
    }

    /// Parse a cgroup memory limit; `max` and the v1 sentinel mean unlimited
    pub fn parse_limit(content: &str) -> Option<u64> {
        let limit = content.trim().parse::<u64>().ok()?;
        (limit > 0 && limit < UNLIMITED_FLOOR).then_some(limit)
    }

    fn limit(&self) -> Option<u64> {
        if let Some(budget) = self.budget_bytes {
            return Some(budget);
        }
        [CGROUP_V2_LIMIT, CGROUP_V1_LIMIT]
            .iter()
            .find_map(|path| std::fs::read_to_string(path).ok())
            .and_then(|content| Self::parse_limit(&content))
    }
}

impl MemoryProbe for ProcessMemoryProbe {
    fn sample(&self) -> Option<MemorySample> {
        let total_bytes = self.limit()?;
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        Some(MemorySample {
            used_bytes: Self::parse_resident(&status)?,
            total_bytes,
        })
    }
}

/// Fixed sample, for tests and embedding hosts that measure memory themselves
#[derive(Debug, Clone, Copy)]
pub struct StaticMemoryProbe(pub MemorySample);

impl MemoryProbe for StaticMemoryProbe {
    fn sample(&self) -> Option<MemorySample> {
        Some(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resident() {
        let status = "Name:\tworker\nVmPeak:\t  900 kB\nVmRSS:\t  2048 kB\nThreads:\t4\n";
        assert_eq!(ProcessMemoryProbe::parse_resident(status), Some(2048 * 1024));
        assert_eq!(ProcessMemoryProbe::parse_resident("Name:\tworker\n"), None);
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(ProcessMemoryProbe::parse_limit("536870912\n"), Some(536_870_912));
        assert_eq!(ProcessMemoryProbe::parse_limit("max\n"), None);
        assert_eq!(ProcessMemoryProbe::parse_limit("9223372036854771712"), None);
        assert_eq!(MemorySample { used_bytes: 1, total_bytes: 0 }.usage_ratio(), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_budget_measures_this_process() {
        let sample = ProcessMemoryProbe::with_budget(u64::MAX).sample().unwrap();
        assert_eq!(sample.total_bytes, u64::MAX);
        assert!(sample.used_bytes > 0);
        assert!(sample.usage_ratio().unwrap() < 0.01);
    }
}
