use thiserror::Error;

/// Metrics system errors
#[derive(Error, Debug, PartialEq)]
pub enum MetricsError {
    #[error("No measurement named {0} was started")]
    MeasureNotStarted(String),

    #[error("Measurement {name} ended before it started ({start_ms}ms > {end_ms}ms)")]
    ClockWentBackwards {
        name: String,
        start_ms: f64,
        end_ms: f64,
    },
}
