//! Core resilience context
//!
//! `ResilienceContext` owns one instance of every component, built from a
//! single `AppConfig`, and wires the cache → retry → metrics request path.

use std::future::Future;
use std::sync::Arc;

use alert_system::{AlertManager, MemoryProbe};
use cache_system::{ApiCache, FileStorage, MemoryStorage, RouteCache, StorageBackend};
use config::AppConfig;
use core_types::{debug_log, SharedClock, SystemClock, TaskHandle};
use metrics_system::{ApiCallInfo, MetricsCollector};
use retry_system::{execute_with_retry, OperationError, RetryProfile};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::ResilienceError;

/// Timers started by `ResilienceContext::start_background_tasks`
#[derive(Debug)]
pub struct BackgroundTasks {
    pub route_cleanup: TaskHandle,
    pub api_cleanup: TaskHandle,
    pub monitoring: TaskHandle,
}

impl BackgroundTasks {
    /// Stop every timer. Idempotent; dropping the value has the same effect.
    pub fn stop(&mut self) {
        self.route_cleanup.stop();
        self.api_cleanup.stop();
        self.monitoring.stop();
    }

    pub fn is_running(&self) -> bool {
        self.route_cleanup.is_running()
            || self.api_cleanup.is_running()
            || self.monitoring.is_running()
    }
}

/// Shared handle to the caches, metrics collector and alert manager
#[derive(Debug, Clone)]
pub struct ResilienceContext {
    config: Arc<AppConfig>,
    clock: SharedClock,
    route_cache: RouteCache,
    api_cache: ApiCache,
    metrics: Arc<MetricsCollector>,
    alerts: Arc<AlertManager>,
}

impl ResilienceContext {
    /// Build every component from `config` with the system clock.
    ///
    /// A persistent route cache is mirrored into `cache.storage_dir` when
    /// set, otherwise into storage shared by every context in the process.
    pub fn new(config: AppConfig) -> Result<Self, ResilienceError> {
        let storage: Arc<dyn StorageBackend> = match &config.cache.storage_dir {
            Some(dir) => Arc::new(FileStorage::new(dir)?),
            None => Arc::new(MemoryStorage::process()),
        };
        Self::with_parts(config, SystemClock::shared(), Some(storage), None)
    }

    /// Build with an explicit clock, route storage and memory probe
    pub fn with_parts(
        config: AppConfig,
        clock: SharedClock,
        route_storage: Option<Arc<dyn StorageBackend>>,
        memory_probe: Option<Arc<dyn MemoryProbe>>,
    ) -> Result<Self, ResilienceError> {
        config.validate()?;

        let route_cache = RouteCache::with_clock(config.cache.route.clone(), route_storage, clock.clone())
            .with_idle_delay(config.cache.idle_preload_delay());
        let api_cache = ApiCache::with_clock(config.cache.api.clone(), clock.clone());
        let metrics = Arc::new(MetricsCollector::with_clock(config.metrics.clone(), clock.clone()));

        let mut alerts = AlertManager::new(config.alert.clone(), metrics.clone()).with_clock(clock.clone());
        if let Some(probe) = memory_probe {
            alerts = alerts.with_memory_probe(probe);
        }
        alerts.watch_cache("route", route_cache.manager().clone());
        alerts.watch_cache("api", api_cache.manager().clone());

        debug_log!(
            "Resilience context ready (route cache {}, api cache {})",
            config.cache.route.max_size,
            config.cache.api.max_size
        );

        Ok(Self {
            config: Arc::new(config),
            clock,
            route_cache,
            api_cache,
            metrics,
            alerts: Arc::new(alerts),
        })
    }

    /// Load configuration from the environment and build the context
    pub fn from_env() -> Result<Self, ResilienceError> {
        Self::new(AppConfig::load()?)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn route_cache(&self) -> &RouteCache {
        &self.route_cache
    }

    pub fn api_cache(&self) -> &ApiCache {
        &self.api_cache
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    pub fn alerts(&self) -> &Arc<AlertManager> {
        &self.alerts
    }

    /// Fetch through the API cache and the API retry profile.
    ///
    /// A fresh cached response short-circuits the call. Otherwise the
    /// fetch is retried per `retry.api`, recorded as an `api-call` metric
    /// and cached on success.
    pub async fn fetch_api<P, D, F, Fut>(
        &self,
        endpoint: &str,
        params: Option<&P>,
        fetch: F,
    ) -> Result<D, ResilienceError>
    where
        P: Serialize,
        D: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<D, OperationError>>,
    {
        if let Some(cached) = self.api_cache.get_api_response::<P, D>(endpoint, params) {
            debug_log!("Serving {} from the API cache", endpoint);
            return Ok(cached);
        }

        let options = RetryProfile::Api.options(&self.config.retry.api);
        let started = self.clock.monotonic();
        let outcome = execute_with_retry(fetch, &options).await;
        let elapsed = self.clock.monotonic().saturating_sub(started);

        let mut info = if outcome.is_success() {
            ApiCallInfo::succeeded(outcome.attempts)
        } else {
            ApiCallInfo::failed(outcome.attempts)
        }
        .with_endpoint(endpoint);
        if let Some(OperationError::Status { status, .. }) = outcome.error() {
            info = info.with_status(*status);
        }
        self.metrics
            .track_api_call(endpoint, elapsed.as_secs_f64() * 1000.0, info.into());

        let data = outcome.into_result()?;
        self.api_cache.cache_api_response(endpoint, params, &data, None);
        Ok(data)
    }

    /// Start cache cleanup for both caches and alert monitoring at the
    /// configured intervals. Must be called from within a Tokio runtime.
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let cleanup_interval = self.config.cache.cleanup_interval();
        let tasks = BackgroundTasks {
            route_cleanup: self.route_cache.manager().start_cleanup(cleanup_interval),
            api_cleanup: self.api_cache.manager().start_cleanup(cleanup_interval),
            monitoring: self.alerts.start_default_monitoring(),
        };
        tracing::info!(
            cleanup_interval_secs = cleanup_interval.as_secs(),
            monitoring_interval_secs = self.config.alert.monitoring_interval_seconds,
            "Background tasks started"
        );
        tasks
    }
}
