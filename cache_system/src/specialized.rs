//! Route and API response caches
//!
//! Thin wrappers over `CacheManager<serde_json::Value>` with the key
//! schemes and defaults used by navigation and request call sites.

use crate::manager::CacheManager;
use crate::storage::StorageBackend;
use base64::{Engine, engine::general_purpose::STANDARD};
use config::CacheConfig;
use core_types::{SharedClock, SystemClock};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

fn to_value<D: Serialize>(key: &str, data: &D) -> Option<Value> {
    match serde_json::to_value(data) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "value is not cacheable");
            None
        }
    }
}

fn from_value<D: DeserializeOwned>(key: &str, value: Value) -> Option<D> {
    match serde_json::from_value(value) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "cached value does not match the requested type");
            None
        }
    }
}

/// Cache of data fetched for navigation targets
#[derive(Debug, Clone)]
pub struct RouteCache {
    inner: Arc<CacheManager<Value>>,
    idle_delay: Duration,
}

impl RouteCache {
    pub fn new(config: CacheConfig, storage: Option<Arc<dyn StorageBackend>>) -> Self {
        Self::with_clock(config, storage, SystemClock::shared())
    }

    pub fn with_clock(
        config: CacheConfig,
        storage: Option<Arc<dyn StorageBackend>>,
        clock: SharedClock,
    ) -> Self {
        Self {
            inner: Arc::new(CacheManager::with_parts(config, storage, clock)),
            idle_delay: Duration::from_millis(100),
        }
    }

    /// Delay used by `preload_route_when_idle`
    pub fn with_idle_delay(mut self, idle_delay: Duration) -> Self {
        self.idle_delay = idle_delay;
        self
    }

    pub fn cache_route_data<D: Serialize>(&self, route: &str, data: &D) {
        if let Some(value) = to_value(route, data) {
            self.inner.set(route, value, None);
        }
    }

    pub fn get_route_data<D: DeserializeOwned>(&self, route: &str) -> Option<D> {
        let value = self.inner.get(route)?;
        from_value(route, value)
    }

    /// Load data for `route` unless it is already cached
    pub async fn preload_route<D, F, Fut, E>(&self, route: &str, loader: F)
    where
        D: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<D, E>>,
        E: Display,
    {
        let key = route.to_string();
        self.inner
            .preload(
                route,
                || async move {
                    match loader().await {
                        Ok(data) => serde_json::to_value(&data)
                            .map_err(|e| format!("value for {} is not cacheable: {}", key, e)),
                        Err(e) => Err(e.to_string()),
                    }
                },
                None,
            )
            .await;
    }

    /// Preload `route` in the background once the idle delay has passed
    pub fn preload_route_when_idle<D, F, Fut, E>(&self, route: &str, loader: F) -> JoinHandle<()>
    where
        D: Serialize + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<D, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let cache = self.clone();
        let route = route.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(cache.idle_delay).await;
            cache.preload_route(&route, loader).await;
        })
    }

    pub fn manager(&self) -> &Arc<CacheManager<Value>> {
        &self.inner
    }
}

/// Cache of API responses keyed by endpoint and request parameters
#[derive(Debug, Clone)]
pub struct ApiCache {
    inner: Arc<CacheManager<Value>>,
}

impl ApiCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock::shared())
    }

    /// API responses never outlive the process, so no backend is taken
    pub fn with_clock(config: CacheConfig, clock: SharedClock) -> Self {
        Self {
            inner: Arc::new(CacheManager::with_parts(config, None, clock)),
        }
    }

    /// `endpoint` alone, or `endpoint:base64(json(params))`
    pub fn api_key<P: Serialize>(endpoint: &str, params: Option<&P>) -> String {
        let encoded = params
            .and_then(|p| serde_json::to_string(p).ok())
            .map(|json| STANDARD.encode(json));
        match encoded {
            Some(encoded) => format!("{}:{}", endpoint, encoded),
            None => endpoint.to_string(),
        }
    }

    pub fn cache_api_response<P: Serialize, D: Serialize>(
        &self,
        endpoint: &str,
        params: Option<&P>,
        data: &D,
        ttl: Option<Duration>,
    ) {
        let key = Self::api_key(endpoint, params);
        if let Some(value) = to_value(&key, data) {
            self.inner.set(&key, value, ttl);
        }
    }

    pub fn get_api_response<P: Serialize, D: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Option<&P>,
    ) -> Option<D> {
        let key = Self::api_key(endpoint, params);
        let value = self.inner.get(&key)?;
        from_value(&key, value)
    }

    pub fn invalidate<P: Serialize>(&self, endpoint: &str, params: Option<&P>) -> bool {
        self.inner.delete(&Self::api_key(endpoint, params))
    }

    /// Drop every cached response for `endpoint`, whatever its parameters
    pub fn invalidate_endpoint(&self, endpoint: &str) -> usize {
        let prefix = format!("{}:", endpoint);
        self.inner
            .keys()
            .into_iter()
            .filter(|key| key == endpoint || key.starts_with(&prefix))
            .filter(|key| self.inner.delete(key))
            .count()
    }

    pub fn manager(&self) -> &Arc<CacheManager<Value>> {
        &self.inner
    }
}
