//! Alert manager implementation
//!
//! Alerts are deduplicated per kind: a repeat raise within the dedup
//! window updates the open alert in place. Resolution is terminal.

use crate::alert::{Alert, AlertKind};
use crate::callbacks::{CallbackId, CallbackRegistry};
use crate::memory::{MemoryProbe, NoMemoryProbe, ProcessMemoryProbe};
use cache_system::CacheHealth;
use config::AlertConfig;
use core_types::{debug_log, MetadataMap, SharedClock, Severity, SystemClock};
use metrics_system::MetricsCollector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Counts over the statistics window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertStatistics {
    /// Alerts currently in the log
    pub total: usize,
    /// Unresolved alerts in the log
    pub active: usize,
    /// Alerts updated within the window
    pub recent: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_kind: BTreeMap<AlertKind, usize>,
    pub window_hours: u64,
}

/// Raises, deduplicates and resolves alerts
pub struct AlertManager {
    pub(crate) config: AlertConfig,
    pub(crate) metrics: Arc<MetricsCollector>,
    pub(crate) caches: RwLock<Vec<(String, Arc<dyn CacheHealth>)>>,
    pub(crate) memory: Arc<dyn MemoryProbe>,
    clock: SharedClock,
    alerts: Mutex<VecDeque<Alert>>,
    callbacks: CallbackRegistry,
}

impl std::fmt::Debug for AlertManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertManager")
            .field("alerts", &self.lock_alerts().len())
            .field("callbacks", &self.callbacks)
            .field("memory_probe", &self.memory)
            .finish()
    }
}

impl AlertManager {
    /// Create a manager reading aggregates from `metrics`
    pub fn new(config: AlertConfig, metrics: Arc<MetricsCollector>) -> Self {
        let memory: Arc<dyn MemoryProbe> = if cfg!(target_os = "linux") {
            Arc::new(ProcessMemoryProbe::new())
        } else {
            Arc::new(NoMemoryProbe)
        };

        Self {
            config,
            metrics,
            caches: RwLock::new(Vec::new()),
            memory,
            clock: SystemClock::shared(),
            alerts: Mutex::new(VecDeque::new()),
            callbacks: CallbackRegistry::new(),
        }
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_memory_probe(mut self, probe: Arc<dyn MemoryProbe>) -> Self {
        self.memory = probe;
        self
    }

    /// Include a cache's hit ratio in the monitoring checks
    pub fn watch_cache(&self, name: &str, cache: Arc<dyn CacheHealth>) {
        let mut caches = self.caches.write().unwrap_or_else(PoisonError::into_inner);
        caches.retain(|(existing, _)| existing != name);
        caches.push((name.to_string(), cache));
    }

    /// Raise an alert, or fold it into an open alert of the same kind
    /// updated within the dedup window. Callbacks fire for new alerts only.
    pub fn create_alert(&self, kind: AlertKind, severity: Severity, details: MetadataMap) -> Alert {
        let now = self.clock.now();
        let window = chrono::Duration::seconds(self.config.dedup_window_seconds as i64);

        let mut alerts = self.lock_alerts();
        if let Some(existing) = alerts
            .iter_mut()
            .rev()
            .find(|a| a.kind == kind && !a.resolved && now - a.timestamp <= window)
        {
            existing.absorb(severity, details, now);
            debug_log!("Updated alert {} ({})", existing.id, kind);
            return existing.clone();
        }

        let alert = Alert::new(kind, severity, details, now);
        alerts.push_back(alert.clone());
        if alerts.len() > self.config.max_alerts {
            let excess = alerts.len() - self.config.retain_on_trim;
            alerts.drain(..excess);
        }
        drop(alerts);

        tracing::warn!(
            alert = %alert.id,
            kind = %alert.kind,
            severity = %alert.severity,
            "{}",
            alert.message
        );
        self.callbacks.emit(&alert);
        alert
    }

    /// Mark an alert resolved. Returns `false` for unknown ids; resolving
    /// twice keeps the first resolution time.
    pub fn resolve_alert(&self, id: &str) -> bool {
        let now = self.clock.now();
        let mut alerts = self.lock_alerts();
        match alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                if !alert.resolved {
                    alert.resolved = true;
                    alert.resolved_at = Some(now);
                    debug_log!("Resolved alert {}", id);
                }
                true
            }
            None => false,
        }
    }

    pub fn on_alert<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&Alert) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callbacks.add_callback(callback)
    }

    pub fn remove_alert_callback(&self, id: CallbackId) -> bool {
        self.callbacks.remove_callback(id)
    }

    pub fn get_active_alerts(&self) -> Vec<Alert> {
        self.lock_alerts()
            .iter()
            .filter(|a| a.is_active())
            .cloned()
            .collect()
    }

    /// Every alert in the log, oldest first
    pub fn get_all_alerts(&self) -> Vec<Alert> {
        self.lock_alerts().iter().cloned().collect()
    }

    pub fn get_alert(&self, id: &str) -> Option<Alert> {
        self.lock_alerts().iter().find(|a| a.id == id).cloned()
    }

    /// Drop resolved alerts from the log and return how many were dropped
    pub fn clear_resolved_alerts(&self) -> usize {
        let mut alerts = self.lock_alerts();
        let before = alerts.len();
        alerts.retain(Alert::is_active);
        before - alerts.len()
    }

    pub fn get_alert_statistics(&self) -> AlertStatistics {
        let window_hours = self.config.statistics_window_hours;
        let cutoff = self.clock.now() - chrono::Duration::hours(window_hours as i64);
        let alerts = self.lock_alerts();

        let mut by_severity = BTreeMap::new();
        let mut by_kind = BTreeMap::new();
        let mut recent = 0;
        for alert in alerts.iter().filter(|a| a.timestamp >= cutoff) {
            recent += 1;
            *by_severity.entry(alert.severity).or_insert(0) += 1;
            *by_kind.entry(alert.kind).or_insert(0) += 1;
        }

        AlertStatistics {
            total: alerts.len(),
            active: alerts.iter().filter(|a| a.is_active()).count(),
            recent,
            by_severity,
            by_kind,
            window_hours,
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    fn lock_alerts(&self) -> MutexGuard<'_, VecDeque<Alert>> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::MetricsConfig;
    use core_types::{ManualClock, MetadataValue};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn manager() -> (AlertManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let metrics = Arc::new(MetricsCollector::with_clock(
            MetricsConfig::default(),
            clock.clone(),
        ));
        let manager = AlertManager::new(AlertConfig::default(), metrics)
            .with_clock(clock.clone())
            .with_memory_probe(Arc::new(NoMemoryProbe));
        (manager, clock)
    }

    fn details(key: &str, value: f64) -> MetadataMap {
        let mut map = MetadataMap::new();
        map.insert(key.to_string(), MetadataValue::Float(value));
        map
    }

    #[test]
    fn test_repeat_within_window_updates_in_place() {
        let (alerts, clock) = manager();
        let first = alerts.create_alert(AlertKind::HighErrorRate, Severity::Medium, details("rate", 0.06));
        clock.advance(Duration::from_secs(120));
        let second = alerts.create_alert(AlertKind::HighErrorRate, Severity::Medium, details("rate", 0.08));

        assert_eq!(first.id, second.id);
        let active = alerts.get_active_alerts();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].details["rate"], MetadataValue::Float(0.08));
        assert_eq!(active[0].occurrences, 2);
    }

    #[test]
    fn test_window_slides_with_each_update() {
        let (alerts, clock) = manager();
        let first = alerts.create_alert(AlertKind::SlowApiCall, Severity::High, MetadataMap::new());
        clock.advance(Duration::from_secs(240));
        alerts.create_alert(AlertKind::SlowApiCall, Severity::High, MetadataMap::new());
        clock.advance(Duration::from_secs(240));
        let third = alerts.create_alert(AlertKind::SlowApiCall, Severity::High, MetadataMap::new());
        assert_eq!(first.id, third.id);

        clock.advance(Duration::from_secs(301));
        let fourth = alerts.create_alert(AlertKind::SlowApiCall, Severity::High, MetadataMap::new());
        assert_ne!(first.id, fourth.id);
        assert_eq!(alerts.get_active_alerts().len(), 2);
    }

    #[test]
    fn test_resolution_is_terminal() {
        let (alerts, clock) = manager();
        let first = alerts.create_alert(AlertKind::HighMemoryUsage, Severity::High, MetadataMap::new());
        assert!(alerts.resolve_alert(&first.id));

        let resolved_at = alerts.get_alert(&first.id).and_then(|a| a.resolved_at);
        clock.advance(Duration::from_secs(5));
        assert!(alerts.resolve_alert(&first.id));
        assert_eq!(alerts.get_alert(&first.id).and_then(|a| a.resolved_at), resolved_at);
        assert!(!alerts.resolve_alert("unknown"));

        let second = alerts.create_alert(AlertKind::HighMemoryUsage, Severity::High, MetadataMap::new());
        assert_ne!(first.id, second.id);
        assert_eq!(alerts.get_active_alerts().len(), 1);
        assert_eq!(alerts.get_all_alerts().len(), 2);
    }

    #[test]
    fn test_callbacks_fire_for_new_alerts_only() {
        let (alerts, _) = manager();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let id = alerts.on_alert(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        alerts.on_alert(|_| Err(anyhow::anyhow!("broken subscriber")));

        alerts.create_alert(AlertKind::SlowPageLoad, Severity::Medium, MetadataMap::new());
        alerts.create_alert(AlertKind::SlowPageLoad, Severity::High, MetadataMap::new());
        alerts.create_alert(AlertKind::SlowNavigation, Severity::Medium, MetadataMap::new());
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        assert!(alerts.remove_alert_callback(id));
        alerts.create_alert(AlertKind::HighErrorRate, Severity::Medium, MetadataMap::new());
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_log_is_bounded() {
        let (alerts, _) = manager();
        for _ in 0..101 {
            let alert = alerts.create_alert(AlertKind::SlowApiCall, Severity::Medium, MetadataMap::new());
            alerts.resolve_alert(&alert.id);
        }
        assert_eq!(alerts.get_all_alerts().len(), 50);
    }

    #[test]
    fn test_clear_resolved_and_statistics() {
        let (alerts, clock) = manager();
        let old = alerts.create_alert(AlertKind::SlowPageLoad, Severity::Critical, MetadataMap::new());
        clock.advance(Duration::from_secs(25 * 3600));

        let a = alerts.create_alert(AlertKind::HighErrorRate, Severity::High, MetadataMap::new());
        alerts.create_alert(AlertKind::SlowApiCall, Severity::High, MetadataMap::new());
        alerts.create_alert(AlertKind::HighMemoryUsage, Severity::Medium, MetadataMap::new());
        alerts.resolve_alert(&a.id);

        let stats = alerts.get_alert_statistics();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.recent, 3);
        assert_eq!(stats.by_severity.get(&Severity::High), Some(&2));
        assert_eq!(stats.by_severity.get(&Severity::Critical), None);
        assert_eq!(stats.by_kind.get(&AlertKind::SlowPageLoad), None);

        assert_eq!(alerts.clear_resolved_alerts(), 1);
        assert!(alerts.get_alert(&a.id).is_none());
        assert!(alerts.get_alert(&old.id).is_some());
    }
}
