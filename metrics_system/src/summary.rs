use crate::metric::{Metric, MetricKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate of one metric kind over the summary window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindSummary {
    pub count: usize,
    pub average_ms: f64,
    pub max_ms: f64,
}

/// Aggregated view of recent metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub window_ms: u64,
    pub total_metrics: usize,
    pub by_kind: BTreeMap<MetricKind, KindSummary>,
    /// Slowest operations in the window, slowest first
    pub slowest: Vec<Metric>,
    /// Metrics in the window above their kind's medium limit
    pub threshold_violations: usize,
}

impl PerformanceSummary {
    pub fn average_ms(&self, kind: MetricKind) -> Option<f64> {
        self.by_kind.get(&kind).map(|s| s.average_ms)
    }

    pub(crate) fn build(
        window_ms: u64,
        recent: &[&Metric],
        slowest_count: usize,
        threshold_violations: usize,
    ) -> Self {
        let mut by_kind: BTreeMap<MetricKind, KindSummary> = BTreeMap::new();
        for metric in recent {
            let entry = by_kind.entry(metric.kind).or_insert(KindSummary {
                count: 0,
                average_ms: 0.0,
                max_ms: 0.0,
            });
            entry.count += 1;
            // Running mean
            entry.average_ms += (metric.duration_ms - entry.average_ms) / entry.count as f64;
            entry.max_ms = entry.max_ms.max(metric.duration_ms);
        }

        let mut slowest: Vec<Metric> = recent.iter().map(|m| (*m).clone()).collect();
        slowest.sort_by(|a, b| b.duration_ms.total_cmp(&a.duration_ms));
        slowest.truncate(slowest_count);

        Self {
            window_ms,
            total_metrics: recent.len(),
            by_kind,
            slowest,
            threshold_violations,
        }
    }
}
