//! Alert types and definitions
//!
//! This module defines the alerts raised by the alert manager.

use core_types::{MetadataMap, Severity};
use metrics_system::MetricKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition an alert reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    SlowPageLoad,
    SlowComponentRender,
    SlowApiCall,
    SlowDatabaseQuery,
    SlowNavigation,
    HighErrorRate,
    HighMemoryUsage,
    PerformanceDegradation,
    LowCacheHitRate,
}

impl AlertKind {
    /// Duration alert for a metric kind
    pub fn for_metric(kind: MetricKind) -> Self {
        match kind {
            MetricKind::PageLoad => AlertKind::SlowPageLoad,
            MetricKind::ComponentRender => AlertKind::SlowComponentRender,
            MetricKind::ApiCall => AlertKind::SlowApiCall,
            MetricKind::DatabaseQuery => AlertKind::SlowDatabaseQuery,
            MetricKind::Navigation => AlertKind::SlowNavigation,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::SlowPageLoad => "slow-page-load",
            AlertKind::SlowComponentRender => "slow-component-render",
            AlertKind::SlowApiCall => "slow-api-call",
            AlertKind::SlowDatabaseQuery => "slow-database-query",
            AlertKind::SlowNavigation => "slow-navigation",
            AlertKind::HighErrorRate => "high-error-rate",
            AlertKind::HighMemoryUsage => "high-memory-usage",
            AlertKind::PerformanceDegradation => "performance-degradation",
            AlertKind::LowCacheHitRate => "low-cache-hit-rate",
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            AlertKind::SlowPageLoad => "Average page load time is above threshold",
            AlertKind::SlowComponentRender => "Average component render time is above threshold",
            AlertKind::SlowApiCall => "Average API call time is above threshold",
            AlertKind::SlowDatabaseQuery => "Average database query time is above threshold",
            AlertKind::SlowNavigation => "Average navigation time is above threshold",
            AlertKind::HighErrorRate => "API error rate is above threshold",
            AlertKind::HighMemoryUsage => "Memory usage is above threshold",
            AlertKind::PerformanceDegradation => "Page loads are getting slower than the baseline",
            AlertKind::LowCacheHitRate => "Cache hit rate is below threshold",
        }
    }

    pub fn message(&self, severity: Severity) -> String {
        format!("[{}] {}", severity.as_str().to_uppercase(), self.summary())
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raised alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub details: MetadataMap,
    /// Time of the last raise or in-place update
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Raises folded into this alert, 1 for a fresh alert
    pub occurrences: u32,
    pub resolved: bool,
    pub resolved_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        severity: Severity,
        details: MetadataMap,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            severity,
            message: kind.message(severity),
            details,
            timestamp: now,
            created_at: now,
            occurrences: 1,
            resolved: false,
            resolved_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.resolved
    }

    /// Fold a repeat raise into this alert, keeping the higher severity
    pub(crate) fn absorb(
        &mut self,
        severity: Severity,
        details: MetadataMap,
        now: chrono::DateTime<chrono::Utc>,
    ) {
        self.details.extend(details);
        self.timestamp = now;
        self.occurrences = self.occurrences.saturating_add(1);
        if severity > self.severity {
            self.severity = severity;
            self.message = self.kind.message(severity);
        }
    }
}
