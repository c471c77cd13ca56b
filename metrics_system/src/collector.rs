//! Metrics collector implementation
//!
//! Metrics land in a bounded buffer. Once it grows past capacity it is
//! trimmed to the most recent `retain_on_trim` entries in one step.

use crate::errors::MetricsError;
use crate::metric::{Metric, MetricKind, MetricMetadata};
use crate::summary::PerformanceSummary;
use crate::thresholds::ThresholdTable;
use config::MetricsConfig;
use core_types::{debug_log, SharedClock, Severity, SystemClock};
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn as_millis_f64(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

/// Start marker of an open measurement
#[derive(Debug, Clone)]
struct Mark {
    kind: MetricKind,
    started: Duration,
    metadata: MetricMetadata,
}

#[derive(Debug, Default)]
struct CollectorState {
    metrics: VecDeque<Metric>,
    marks: HashMap<String, Mark>,
    url: Option<String>,
    user_agent: Option<String>,
}

/// Records timed operations and flags slow ones
pub struct MetricsCollector {
    config: MetricsConfig,
    thresholds: ThresholdTable,
    clock: SharedClock,
    state: Mutex<CollectorState>,
}

impl Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("buffered", &self.len())
            .field("capacity", &self.config.buffer_capacity)
            .finish()
    }
}

impl MetricsCollector {
    pub fn new(config: MetricsConfig) -> Self {
        Self::with_clock(config, SystemClock::shared())
    }

    pub fn with_clock(config: MetricsConfig, clock: SharedClock) -> Self {
        Self {
            thresholds: ThresholdTable::new(config.thresholds.clone()),
            config,
            clock,
            state: Mutex::new(CollectorState::default()),
        }
    }

    /// Stamp every subsequent metric with the given page URL and user agent
    pub fn set_context(&self, url: Option<String>, user_agent: Option<String>) {
        let mut state = self.lock_state();
        state.url = url;
        state.user_agent = user_agent;
    }

    pub fn track_page_load(&self, name: &str, duration_ms: f64, metadata: MetricMetadata) -> Metric {
        self.record(MetricKind::PageLoad, name, duration_ms, metadata)
    }

    pub fn track_component_render(
        &self,
        name: &str,
        duration_ms: f64,
        metadata: MetricMetadata,
    ) -> Metric {
        self.record(MetricKind::ComponentRender, name, duration_ms, metadata)
    }

    pub fn track_api_call(&self, name: &str, duration_ms: f64, metadata: MetricMetadata) -> Metric {
        self.record(MetricKind::ApiCall, name, duration_ms, metadata)
    }

    pub fn track_database_query(
        &self,
        name: &str,
        duration_ms: f64,
        metadata: MetricMetadata,
    ) -> Metric {
        self.record(MetricKind::DatabaseQuery, name, duration_ms, metadata)
    }

    pub fn track_navigation(&self, name: &str, duration_ms: f64, metadata: MetricMetadata) -> Metric {
        self.record(MetricKind::Navigation, name, duration_ms, metadata)
    }

    /// Record an operation that ended now and lasted `duration_ms`
    pub fn record(
        &self,
        kind: MetricKind,
        name: &str,
        duration_ms: f64,
        metadata: MetricMetadata,
    ) -> Metric {
        let end = as_millis_f64(self.clock.monotonic());
        let duration_ms = duration_ms.max(0.0);
        self.add_metric(kind, name, end - duration_ms, end, duration_ms, metadata)
    }

    /// Open a measurement. Starting a name twice restarts it.
    pub fn start_measure(&self, name: &str, kind: MetricKind, metadata: MetricMetadata) {
        let mark = Mark {
            kind,
            started: self.clock.monotonic(),
            metadata,
        };
        if self.lock_state().marks.insert(name.to_string(), mark).is_some() {
            debug_log!("Restarted measurement {}", name);
        }
    }

    /// Close a measurement and record it
    pub fn try_end_measure(&self, name: &str) -> Result<Metric, MetricsError> {
        let ended = self.clock.monotonic();
        let mark = self
            .lock_state()
            .marks
            .remove(name)
            .ok_or_else(|| MetricsError::MeasureNotStarted(name.to_string()))?;

        let start_ms = as_millis_f64(mark.started);
        let end_ms = as_millis_f64(ended);
        if end_ms < start_ms {
            return Err(MetricsError::ClockWentBackwards {
                name: name.to_string(),
                start_ms,
                end_ms,
            });
        }
        Ok(self.add_metric(
            mark.kind,
            name,
            start_ms,
            end_ms,
            end_ms - start_ms,
            mark.metadata,
        ))
    }

    /// Close a measurement; failures are logged and yield `None`
    pub fn end_measure(&self, name: &str) -> Option<Metric> {
        match self.try_end_measure(name) {
            Ok(metric) => Some(metric),
            Err(e) => {
                tracing::warn!(measure = %name, error = %e, "measurement could not be recorded");
                None
            }
        }
    }

    /// Time `operation` and record it under `name`
    pub async fn measure_async<F, R>(
        &self,
        name: &str,
        kind: MetricKind,
        metadata: MetricMetadata,
        operation: F,
    ) -> R
    where
        F: Future<Output = R>,
    {
        let started = self.clock.monotonic();
        let output = operation.await;
        let ended = self.clock.monotonic();
        let start_ms = as_millis_f64(started);
        let end_ms = as_millis_f64(ended);
        self.add_metric(kind, name, start_ms, end_ms, end_ms - start_ms, metadata);
        output
    }

    /// Aggregate the metrics recorded within the summary window
    pub fn performance_summary(&self) -> PerformanceSummary {
        let window = self.config.summary_window();
        let cutoff =
            self.clock.now() - chrono::Duration::milliseconds(window.as_millis() as i64);
        let state = self.lock_state();

        let recent: Vec<&Metric> = state
            .metrics
            .iter()
            .filter(|m| m.timestamp >= cutoff)
            .collect();
        let violations = recent
            .iter()
            .filter(|m| self.thresholds.severity(m.kind, m.duration_ms).is_some())
            .count();

        PerformanceSummary::build(
            window.as_millis() as u64,
            &recent,
            self.config.slowest_count,
            violations,
        )
    }

    /// Metrics of `kind`, most recent first
    pub fn metrics_by_kind(&self, kind: MetricKind, limit: usize) -> Vec<Metric> {
        self.lock_state()
            .metrics
            .iter()
            .rev()
            .filter(|m| m.kind == kind)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Metrics of `kind`, oldest retained first
    pub fn oldest_by_kind(&self, kind: MetricKind, limit: usize) -> Vec<Metric> {
        self.lock_state()
            .metrics
            .iter()
            .filter(|m| m.kind == kind)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn count_by_kind(&self, kind: MetricKind) -> usize {
        self.lock_state()
            .metrics
            .iter()
            .filter(|m| m.kind == kind)
            .count()
    }

    pub fn clear_metrics(&self) {
        let mut state = self.lock_state();
        state.metrics.clear();
        state.marks.clear();
    }

    pub fn len(&self) -> usize {
        self.lock_state().metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn open_measures(&self) -> usize {
        self.lock_state().marks.len()
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    fn add_metric(
        &self,
        kind: MetricKind,
        name: &str,
        start_time: f64,
        end_time: f64,
        duration_ms: f64,
        metadata: MetricMetadata,
    ) -> Metric {
        let mut state = self.lock_state();
        let metric = Metric {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            kind,
            start_time,
            end_time,
            duration_ms,
            metadata,
            timestamp: self.clock.now(),
            url: state.url.clone(),
            user_agent: state.user_agent.clone(),
        };

        state.metrics.push_back(metric.clone());
        if state.metrics.len() > self.config.buffer_capacity {
            let excess = state.metrics.len() - self.config.retain_on_trim;
            state.metrics.drain(..excess);
            debug_log!("Trimmed {} metrics from the buffer", excess);
        }
        drop(state);

        self.check_threshold(&metric);
        metric
    }

    /// Log a warning when a single metric crosses its kind's limits
    fn check_threshold(&self, metric: &Metric) -> Option<Severity> {
        let severity = self.thresholds.severity(metric.kind, metric.duration_ms)?;
        tracing::warn!(
            metric = %metric.name,
            kind = %metric.kind,
            duration_ms = metric.duration_ms,
            severity = %severity,
            "performance threshold exceeded"
        );
        Some(severity)
    }

    fn lock_state(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
