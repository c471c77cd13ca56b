//! Metrics system for operation timing
//!
//! This crate records durations of instrumented operations into a
//! bounded buffer, flags threshold violations as they happen and
//! aggregates recent metrics for downstream alerting.

pub mod collector;
pub mod errors;
pub mod metric;
pub mod prelude;
pub mod summary;
pub mod thresholds;

// Re-export centralized config
pub use config::{DurationThresholds, MetricThresholds, MetricsConfig};

pub use collector::MetricsCollector;
pub use errors::MetricsError;
pub use metric::{
    ApiCallInfo, Metric, MetricKind, MetricMetadata, NavigationInfo, QueryInfo, RenderInfo,
};
pub use summary::{KindSummary, PerformanceSummary};
pub use thresholds::ThresholdTable;
