use crate::metric::MetricKind;
use config::{DurationThresholds, MetricThresholds};
use core_types::Severity;

/// Per-kind duration limits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdTable {
    limits: MetricThresholds,
}

impl ThresholdTable {
    pub fn new(limits: MetricThresholds) -> Self {
        Self { limits }
    }

    pub fn for_kind(&self, kind: MetricKind) -> &DurationThresholds {
        match kind {
            MetricKind::PageLoad => &self.limits.page_load,
            MetricKind::ComponentRender => &self.limits.component_render,
            MetricKind::ApiCall => &self.limits.api_call,
            MetricKind::DatabaseQuery => &self.limits.database_query,
            MetricKind::Navigation => &self.limits.navigation,
        }
    }

    /// Highest severity whose limit `duration_ms` exceeds
    pub fn severity(&self, kind: MetricKind, duration_ms: f64) -> Option<Severity> {
        let limits = self.for_kind(kind);
        Severity::from_limits(
            duration_ms,
            limits.medium_ms,
            limits.high_ms,
            limits.critical_ms,
        )
    }
}
