//! Convenience re-exports for common metrics-system usage

pub use crate::collector::MetricsCollector;
pub use crate::errors::MetricsError;
pub use crate::metric::{
    ApiCallInfo, Metric, MetricKind, MetricMetadata, NavigationInfo, QueryInfo, RenderInfo,
};
pub use crate::summary::{KindSummary, PerformanceSummary};
pub use crate::thresholds::ThresholdTable;

// Re-export centralized config
pub use config::MetricsConfig;
