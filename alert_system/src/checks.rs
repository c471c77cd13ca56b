//! Monitoring checks run on each tick
//!
//! Every check reads aggregates only. A check that has too little data
//! to decide raises nothing.

use crate::alert::{Alert, AlertKind};
use crate::manager::AlertManager;
use core_types::{debug_log, serialize_to_metadata, Severity};
use metrics_system::{Metric, MetricKind};
use serde::Serialize;
use std::sync::PoisonError;

#[derive(Serialize)]
struct DurationDetails {
    metric_kind: &'static str,
    average_ms: f64,
    max_ms: f64,
    samples: usize,
    threshold_ms: f64,
}

#[derive(Serialize)]
struct ErrorRateDetails {
    error_rate: f64,
    failed: usize,
    total: usize,
}

#[derive(Serialize)]
struct MemoryDetails {
    usage_ratio: f64,
    used_bytes: u64,
    total_bytes: u64,
}

#[derive(Serialize)]
struct DegradationDetails {
    recent_average_ms: f64,
    baseline_average_ms: f64,
    slowdown: f64,
}

#[derive(Serialize)]
struct HitRateDetails {
    cache: String,
    hit_rate: f64,
    hits: u64,
    misses: u64,
    entries: usize,
}

impl AlertManager {
    /// Run every check once and return the alerts raised or updated
    pub fn run_checks_once(&self) -> Vec<Alert> {
        let mut raised = Vec::new();
        raised.extend(self.check_durations());
        raised.extend(self.check_error_rate());
        raised.extend(self.check_memory());
        raised.extend(self.check_degradation());
        raised.extend(self.check_cache_hit_rates());
        debug_log!("Monitoring checks raised {} alerts", raised.len());
        raised
    }

    /// Average duration per kind over the summary window
    fn check_durations(&self) -> Vec<Alert> {
        let summary = self.metrics.performance_summary();
        let thresholds = self.metrics.thresholds();

        summary
            .by_kind
            .iter()
            .filter_map(|(kind, stats)| {
                let severity = thresholds.severity(*kind, stats.average_ms)?;
                let limits = thresholds.for_kind(*kind);
                let details = serialize_to_metadata(&DurationDetails {
                    metric_kind: kind.as_str(),
                    average_ms: stats.average_ms,
                    max_ms: stats.max_ms,
                    samples: stats.count,
                    threshold_ms: threshold_for(severity, limits),
                });
                Some(self.create_alert(AlertKind::for_metric(*kind), severity, details))
            })
            .collect()
    }

    /// Share of failed calls among the most recent api-call metrics
    fn check_error_rate(&self) -> Option<Alert> {
        let recent = self
            .metrics
            .metrics_by_kind(MetricKind::ApiCall, self.config.error_rate_sample);
        if recent.is_empty() {
            return None;
        }

        let failed = recent
            .iter()
            .filter(|m| m.metadata.api_success() == Some(false))
            .count();
        let rate = failed as f64 / recent.len() as f64;
        let limits = &self.config.error_rate;
        let severity = Severity::from_limits(rate, limits.medium, limits.high, limits.critical)?;

        let details = serialize_to_metadata(&ErrorRateDetails {
            error_rate: rate,
            failed,
            total: recent.len(),
        });
        Some(self.create_alert(AlertKind::HighErrorRate, severity, details))
    }

    fn check_memory(&self) -> Option<Alert> {
        let sample = self.memory.sample()?;
        let ratio = sample.usage_ratio()?;
        let limits = &self.config.memory;
        let severity = Severity::from_limits(ratio, limits.medium, limits.high, limits.critical)?;

        let details = serialize_to_metadata(&MemoryDetails {
            usage_ratio: ratio,
            used_bytes: sample.used_bytes,
            total_bytes: sample.total_bytes,
        });
        Some(self.create_alert(AlertKind::HighMemoryUsage, severity, details))
    }

    /// Newest page loads against the oldest retained ones. Needs two
    /// disjoint samples, so at least twice the sample size must be retained.
    fn check_degradation(&self) -> Option<Alert> {
        let sample = self.config.degradation_sample;
        if sample == 0 || self.metrics.count_by_kind(MetricKind::PageLoad) < sample * 2 {
            return None;
        }

        let recent = average_duration(&self.metrics.metrics_by_kind(MetricKind::PageLoad, sample))?;
        let baseline = average_duration(&self.metrics.oldest_by_kind(MetricKind::PageLoad, sample))?;
        if baseline <= 0.0 {
            return None;
        }

        let slowdown = (recent - baseline) / baseline;
        let limits = &self.config.degradation;
        let severity =
            Severity::from_limits(slowdown, limits.medium, limits.high, limits.critical)?;

        let details = serialize_to_metadata(&DegradationDetails {
            recent_average_ms: recent,
            baseline_average_ms: baseline,
            slowdown,
        });
        Some(self.create_alert(AlertKind::PerformanceDegradation, severity, details))
    }

    /// Hit ratio of every watched cache with enough lookups to judge
    fn check_cache_hit_rates(&self) -> Vec<Alert> {
        let limits = self.config.cache_hit_rate;
        let watched: Vec<_> = self
            .caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, cache)| (name.clone(), cache.lookup_counts(), cache.entry_count()))
            .collect();

        watched
            .into_iter()
            .filter_map(|(name, counts, entries)| {
                if counts.total() < limits.min_lookups {
                    return None;
                }
                let ratio = counts.hit_ratio()?;
                let severity = if ratio < limits.critical_below {
                    Severity::Critical
                } else if ratio < limits.high_below {
                    Severity::High
                } else if ratio < limits.medium_below {
                    Severity::Medium
                } else {
                    return None;
                };

                let details = serialize_to_metadata(&HitRateDetails {
                    cache: name,
                    hit_rate: ratio,
                    hits: counts.hits,
                    misses: counts.misses,
                    entries,
                });
                Some(self.create_alert(AlertKind::LowCacheHitRate, severity, details))
            })
            .collect()
    }
}

fn average_duration(metrics: &[Metric]) -> Option<f64> {
    if metrics.is_empty() {
        return None;
    }
    Some(metrics.iter().map(|m| m.duration_ms).sum::<f64>() / metrics.len() as f64)
}

fn threshold_for(severity: Severity, limits: &config::DurationThresholds) -> f64 {
    match severity {
        Severity::Critical => limits.critical_ms,
        Severity::High => limits.high_ms,
        _ => limits.medium_ms,
    }
}
