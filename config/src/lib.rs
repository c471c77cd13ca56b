//! # Configuration Management for the resilience core
//!
//! This crate provides centralized configuration structures for the cache,
//! metrics, alerting and retry components. Every field has a default, so a
//! TOML file only needs to name the values it overrides.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{CacheConfig, RetryPolicy};
//!
//! // A persisted cache holding at most 50 entries for 10 minutes each
//! let routes = CacheConfig::new(50, 600_000, true, "route-cache".to_string());
//!
//! // Three retries starting at one second, capped at ten
//! let policy = RetryPolicy::new(3, 1000, 10_000, 2.0);
//! assert!(routes.persist);
//! assert_eq!(policy.max_retries, 3);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [cache]
//! cleanup_interval_seconds = 300
//! storage_dir = "./.cache"
//!
//! [cache.route]
//! max_size = 50
//! default_ttl_ms = 600000
//! persist = true
//! storage_key = "route-cache"
//!
//! [metrics]
//! buffer_capacity = 1000
//! retain_on_trim = 500
//!
//! [metrics.thresholds.page_load]
//! medium_ms = 3000
//! high_ms = 5000
//! critical_ms = 10000
//!
//! [alert]
//! monitoring_interval_seconds = 30
//! dedup_window_seconds = 300
//!
//! [retry.api]
//! max_retries = 3
//! base_delay_ms = 1000
//! max_delay_ms = 10000
//! backoff_multiplier = 2.0
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from RESILIENCE_CONFIG or ./resilience.toml, falling back to defaults
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::{env, path::Path, time::Duration};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./resilience.toml";
const CONFIG_PATH_ENV: &str = "RESILIENCE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheSettings,
    pub metrics: MetricsConfig,
    pub alert: AlertConfig,
    pub retry: RetryConfig,
}

/// Configuration of a single cache instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub max_size: usize,
    /// TTL applied when `set` is called without one
    pub default_ttl_ms: u64,
    /// Mirror the cache into the storage backend on every mutation
    pub persist: bool,
    /// Key of the blob in the storage backend
    pub storage_key: String,
}

/// Cache section: the two specialized caches plus shared settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    #[serde(deserialize_with = "route_cache")]
    pub route: CacheConfig,
    #[serde(deserialize_with = "api_cache")]
    pub api: CacheConfig,
    pub cleanup_interval_seconds: u64,
    /// Directory for file-backed persistence; in-memory storage when unset
    pub storage_dir: Option<String>,
    /// Delay before a deferred preload runs
    pub idle_preload_delay_ms: u64,
}

/// Escalating duration limits for one metric kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationThresholds {
    pub medium_ms: f64,
    pub high_ms: f64,
    pub critical_ms: f64,
}

/// Duration limits for every metric kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricThresholds {
    #[serde(deserialize_with = "page_load_limits")]
    pub page_load: DurationThresholds,
    #[serde(deserialize_with = "component_render_limits")]
    pub component_render: DurationThresholds,
    #[serde(deserialize_with = "api_call_limits")]
    pub api_call: DurationThresholds,
    #[serde(deserialize_with = "database_query_limits")]
    pub database_query: DurationThresholds,
    #[serde(deserialize_with = "navigation_limits")]
    pub navigation: DurationThresholds,
}

/// Metrics collector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub buffer_capacity: usize,
    pub retain_on_trim: usize,
    pub summary_window_seconds: u64,
    pub slowest_count: usize,
    pub thresholds: MetricThresholds,
}

/// Escalating ratio limits (0.0 - 1.0) where higher is worse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

/// Cache hit-ratio limits where lower is worse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitRateThresholds {
    pub medium_below: f64,
    pub high_below: f64,
    pub critical_below: f64,
    /// Lookups required before the ratio is judged
    pub min_lookups: u64,
}

/// Alert manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub monitoring_interval_seconds: u64,
    pub dedup_window_seconds: u64,
    pub max_alerts: usize,
    pub retain_on_trim: usize,
    pub statistics_window_hours: u64,
    #[serde(deserialize_with = "error_rate_limits")]
    pub error_rate: RatioThresholds,
    /// Number of most recent api-call metrics considered by the error-rate check
    pub error_rate_sample: usize,
    #[serde(deserialize_with = "memory_limits")]
    pub memory: RatioThresholds,
    #[serde(deserialize_with = "degradation_limits")]
    pub degradation: RatioThresholds,
    /// Size of the recent and baseline page-load windows
    pub degradation_sample: usize,
    pub cache_hit_rate: HitRateThresholds,
}

/// Backoff policy for one retry profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    /// Upper bound of the random delay added to every backoff
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

/// Retry profiles for the three call families
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    #[serde(deserialize_with = "api_policy")]
    pub api: RetryPolicy,
    #[serde(deserialize_with = "database_policy")]
    pub database: RetryPolicy,
    #[serde(deserialize_with = "auth_policy")]
    pub auth: RetryPolicy,
}

fn default_jitter_ms() -> u64 {
    1000
}

/// A section whose omitted fields are filled from a preset rather than
/// from the type's `Default`
trait Overlay: Sized {
    type Partial: for<'de> Deserialize<'de>;

    fn overlay(self, partial: Self::Partial) -> Self;
}

#[derive(Deserialize)]
struct PartialCacheConfig {
    max_size: Option<usize>,
    default_ttl_ms: Option<u64>,
    persist: Option<bool>,
    storage_key: Option<String>,
}

impl Overlay for CacheConfig {
    type Partial = PartialCacheConfig;

    fn overlay(self, partial: PartialCacheConfig) -> Self {
        Self {
            max_size: partial.max_size.unwrap_or(self.max_size),
            default_ttl_ms: partial.default_ttl_ms.unwrap_or(self.default_ttl_ms),
            persist: partial.persist.unwrap_or(self.persist),
            storage_key: partial.storage_key.unwrap_or(self.storage_key),
        }
    }
}

#[derive(Deserialize)]
struct PartialDurationThresholds {
    medium_ms: Option<f64>,
    high_ms: Option<f64>,
    critical_ms: Option<f64>,
}

impl Overlay for DurationThresholds {
    type Partial = PartialDurationThresholds;

    fn overlay(self, partial: PartialDurationThresholds) -> Self {
        Self {
            medium_ms: partial.medium_ms.unwrap_or(self.medium_ms),
            high_ms: partial.high_ms.unwrap_or(self.high_ms),
            critical_ms: partial.critical_ms.unwrap_or(self.critical_ms),
        }
    }
}

#[derive(Deserialize)]
struct PartialRatioThresholds {
    medium: Option<f64>,
    high: Option<f64>,
    critical: Option<f64>,
}

impl Overlay for RatioThresholds {
    type Partial = PartialRatioThresholds;

    fn overlay(self, partial: PartialRatioThresholds) -> Self {
        Self {
            medium: partial.medium.unwrap_or(self.medium),
            high: partial.high.unwrap_or(self.high),
            critical: partial.critical.unwrap_or(self.critical),
        }
    }
}

#[derive(Deserialize)]
struct PartialRetryPolicy {
    max_retries: Option<u32>,
    base_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    backoff_multiplier: Option<f64>,
    jitter_ms: Option<u64>,
}

impl Overlay for RetryPolicy {
    type Partial = PartialRetryPolicy;

    fn overlay(self, partial: PartialRetryPolicy) -> Self {
        Self {
            max_retries: partial.max_retries.unwrap_or(self.max_retries),
            base_delay_ms: partial.base_delay_ms.unwrap_or(self.base_delay_ms),
            max_delay_ms: partial.max_delay_ms.unwrap_or(self.max_delay_ms),
            backoff_multiplier: partial.backoff_multiplier.unwrap_or(self.backoff_multiplier),
            jitter_ms: partial.jitter_ms.unwrap_or(self.jitter_ms),
        }
    }
}

macro_rules! preset_section {
    ($name:ident, $ty:ty, $preset:expr) => {
        fn $name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<$ty, D::Error> {
            let partial = <$ty as Overlay>::Partial::deserialize(deserializer)?;
            Ok($preset.overlay(partial))
        }
    };
}

preset_section!(route_cache, CacheConfig, CacheConfig::route_defaults());
preset_section!(api_cache, CacheConfig, CacheConfig::api_defaults());
preset_section!(page_load_limits, DurationThresholds, MetricThresholds::default().page_load);
preset_section!(component_render_limits, DurationThresholds, MetricThresholds::default().component_render);
preset_section!(api_call_limits, DurationThresholds, MetricThresholds::default().api_call);
preset_section!(database_query_limits, DurationThresholds, MetricThresholds::default().database_query);
preset_section!(navigation_limits, DurationThresholds, MetricThresholds::default().navigation);
preset_section!(error_rate_limits, RatioThresholds, AlertConfig::default().error_rate);
preset_section!(memory_limits, RatioThresholds, AlertConfig::default().memory);
preset_section!(degradation_limits, RatioThresholds, AlertConfig::default().degradation);
preset_section!(api_policy, RetryPolicy, RetryPolicy::api_defaults());
preset_section!(database_policy, RetryPolicy, RetryPolicy::database_defaults());
preset_section!(auth_policy, RetryPolicy, RetryPolicy::auth_defaults());

impl AppConfig {
    /// Load configuration from the TOML file named in the environment or the default path.
    ///
    /// Falls back to built-in defaults when neither exists.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }

        let config = if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            Self::from_file(&config_path)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Cache validations
        self.cache.route.validate("cache.route")?;
        self.cache.api.validate("cache.api")?;
        if self.cache.cleanup_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Cache cleanup_interval_seconds must be greater than 0".to_string(),
            ));
        }

        // Metrics validations
        if self.metrics.buffer_capacity == 0 {
            return Err(ConfigError::Invalid(
                "Metrics buffer_capacity must be greater than 0".to_string(),
            ));
        }
        if self.metrics.retain_on_trim >= self.metrics.buffer_capacity {
            return Err(ConfigError::Invalid(
                "Metrics retain_on_trim must be less than buffer_capacity".to_string(),
            ));
        }
        if self.metrics.summary_window_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Metrics summary_window_seconds must be greater than 0".to_string(),
            ));
        }
        let thresholds = &self.metrics.thresholds;
        for (name, limits) in [
            ("page_load", &thresholds.page_load),
            ("component_render", &thresholds.component_render),
            ("api_call", &thresholds.api_call),
            ("database_query", &thresholds.database_query),
            ("navigation", &thresholds.navigation),
        ] {
            if !limits.is_ascending() {
                return Err(ConfigError::Invalid(format!(
                    "Metrics thresholds for {} must be ascending and positive",
                    name
                )));
            }
        }

        // Alert validations
        if self.alert.monitoring_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Alert monitoring_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.alert.max_alerts == 0 {
            return Err(ConfigError::Invalid(
                "Alert max_alerts must be greater than 0".to_string(),
            ));
        }
        if self.alert.retain_on_trim >= self.alert.max_alerts {
            return Err(ConfigError::Invalid(
                "Alert retain_on_trim must be less than max_alerts".to_string(),
            ));
        }
        for (name, limits) in [
            ("error_rate", &self.alert.error_rate),
            ("memory", &self.alert.memory),
            ("degradation", &self.alert.degradation),
        ] {
            if !limits.is_ascending() {
                return Err(ConfigError::Invalid(format!(
                    "Alert {} thresholds must be ascending and positive",
                    name
                )));
            }
        }
        if !self.alert.cache_hit_rate.is_descending() {
            return Err(ConfigError::Invalid(
                "Alert cache_hit_rate thresholds must be descending within 0.0..=1.0".to_string(),
            ));
        }
        if self.alert.error_rate_sample == 0 || self.alert.degradation_sample == 0 {
            return Err(ConfigError::Invalid(
                "Alert sample sizes must be greater than 0".to_string(),
            ));
        }

        // Retry validations
        self.retry.api.validate("retry.api")?;
        self.retry.database.validate("retry.database")?;
        self.retry.auth.validate("retry.auth")?;

        Ok(())
    }
}

impl CacheConfig {
    /// Create a new cache configuration
    pub fn new(max_size: usize, default_ttl_ms: u64, persist: bool, storage_key: String) -> Self {
        Self {
            max_size,
            default_ttl_ms,
            persist,
            storage_key,
        }
    }

    /// Route-result cache: 10 minutes, persisted, 50 entries
    pub fn route_defaults() -> Self {
        Self::new(50, 10 * 60 * 1000, true, "route-cache".to_string())
    }

    /// API-response cache: 5 minutes, session only, 100 entries
    pub fn api_defaults() -> Self {
        Self::new(100, 5 * 60 * 1000, false, "api-cache".to_string())
    }

    pub fn with_persistence(mut self, storage_key: &str) -> Self {
        self.persist = true;
        self.storage_key = storage_key.to_string();
        self
    }

    /// Get default TTL as Duration
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if self.max_size == 0 {
            return Err(ConfigError::Invalid(format!(
                "{} max_size must be greater than 0",
                section
            )));
        }
        if self.default_ttl_ms == 0 {
            return Err(ConfigError::Invalid(format!(
                "{} default_ttl_ms must be greater than 0",
                section
            )));
        }
        if self.persist && self.storage_key.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{} storage_key cannot be empty when persist is enabled",
                section
            )));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            default_ttl_ms: 5 * 60 * 1000,
            persist: false,
            storage_key: "cache".to_string(),
        }
    }
}

impl CacheSettings {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }

    pub fn idle_preload_delay(&self) -> Duration {
        Duration::from_millis(self.idle_preload_delay_ms)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            route: CacheConfig::route_defaults(),
            api: CacheConfig::api_defaults(),
            cleanup_interval_seconds: 300,
            storage_dir: None,
            idle_preload_delay_ms: 100,
        }
    }
}

impl DurationThresholds {
    pub fn new(medium_ms: f64, high_ms: f64, critical_ms: f64) -> Self {
        Self {
            medium_ms,
            high_ms,
            critical_ms,
        }
    }

    fn is_ascending(&self) -> bool {
        self.medium_ms > 0.0 && self.medium_ms < self.high_ms && self.high_ms < self.critical_ms
    }
}

impl Default for MetricThresholds {
    fn default() -> Self {
        Self {
            page_load: DurationThresholds::new(3000.0, 5000.0, 10000.0),
            component_render: DurationThresholds::new(100.0, 500.0, 1000.0),
            api_call: DurationThresholds::new(1000.0, 3000.0, 5000.0),
            database_query: DurationThresholds::new(500.0, 1000.0, 3000.0),
            navigation: DurationThresholds::new(1000.0, 2000.0, 5000.0),
        }
    }
}

impl MetricsConfig {
    pub fn summary_window(&self) -> Duration {
        Duration::from_secs(self.summary_window_seconds)
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 1000,
            retain_on_trim: 500,
            summary_window_seconds: 300,
            slowest_count: 10,
            thresholds: MetricThresholds::default(),
        }
    }
}

impl RatioThresholds {
    pub fn new(medium: f64, high: f64, critical: f64) -> Self {
        Self {
            medium,
            high,
            critical,
        }
    }

    fn is_ascending(&self) -> bool {
        self.medium > 0.0 && self.medium < self.high && self.high < self.critical
    }
}

impl HitRateThresholds {
    fn is_descending(&self) -> bool {
        self.medium_below <= 1.0
            && self.medium_below > self.high_below
            && self.high_below > self.critical_below
            && self.critical_below >= 0.0
    }
}

impl Default for HitRateThresholds {
    fn default() -> Self {
        Self {
            medium_below: 0.6,
            high_below: 0.4,
            critical_below: 0.2,
            min_lookups: 20,
        }
    }
}

impl AlertConfig {
    pub fn monitoring_interval(&self) -> Duration {
        Duration::from_secs(self.monitoring_interval_seconds)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.dedup_window_seconds)
    }

    pub fn statistics_window(&self) -> Duration {
        Duration::from_secs(self.statistics_window_hours * 3600)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            monitoring_interval_seconds: 30,
            dedup_window_seconds: 300,
            max_alerts: 100,
            retain_on_trim: 50,
            statistics_window_hours: 24,
            error_rate: RatioThresholds::new(0.05, 0.10, 0.20),
            error_rate_sample: 100,
            memory: RatioThresholds::new(0.70, 0.80, 0.90),
            degradation: RatioThresholds::new(0.25, 0.50, 1.00),
            degradation_sample: 10,
            cache_hit_rate: HitRateThresholds::default(),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with the default jitter
    pub fn new(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64, backoff_multiplier: f64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
            backoff_multiplier,
            jitter_ms: default_jitter_ms(),
        }
    }

    pub fn with_jitter_ms(mut self, jitter_ms: u64) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    /// API calls: 3 retries from 1s
    pub fn api_defaults() -> Self {
        Self::new(3, 1000, 10_000, 2.0)
    }

    /// Data-layer calls: 2 retries from 500ms
    pub fn database_defaults() -> Self {
        Self::new(2, 500, 5_000, 2.0)
    }

    /// Auth calls: 1 retry from 2s
    pub fn auth_defaults() -> Self {
        Self::new(1, 2000, 5_000, 2.0)
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if !(self.backoff_multiplier >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "{} backoff_multiplier must be at least 1.0",
                section
            )));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "{} base_delay_ms cannot be greater than max_delay_ms",
                section
            )));
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::api_defaults()
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            api: RetryPolicy::api_defaults(),
            database: RetryPolicy::database_defaults(),
            auth: RetryPolicy::auth_defaults(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.route, CacheConfig::route_defaults());
        assert!(!config.cache.api.persist);
        assert_eq!(config.metrics.buffer_capacity, 1000);
        assert_eq!(config.alert.max_alerts, 100);
        assert_eq!(config.retry.database.max_retries, 2);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [cache.api]
            max_size = 10

            [retry.auth]
            max_retries = 0
            base_delay_ms = 100
            max_delay_ms = 200
            backoff_multiplier = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.api.max_size, 10);
        assert_eq!(config.cache.api.default_ttl_ms, 300_000);
        assert_eq!(config.retry.auth.max_retries, 0);
        assert_eq!(config.retry.auth.jitter_ms, 1000);
        assert_eq!(config.retry.api, RetryPolicy::api_defaults());
    }

    #[test]
    fn test_partial_route_section_keeps_route_preset() {
        let config = AppConfig::from_toml_str("[cache.route]\nmax_size = 20").unwrap();

        let route = &config.cache.route;
        assert_eq!(route.max_size, 20);
        assert!(route.persist);
        assert_eq!(route.default_ttl_ms, 600_000);
        assert_eq!(route.storage_key, "route-cache");
        assert_eq!(config.cache.api, CacheConfig::api_defaults());
    }

    #[test]
    fn test_partial_nested_sections_use_their_presets() {
        let config = AppConfig::from_toml_str(
            r#"
            [retry.auth]
            max_retries = 0

            [metrics.thresholds.component_render]
            critical_ms = 2000.0

            [alert.memory]
            critical = 0.95

            [alert.cache_hit_rate]
            min_lookups = 5
            "#,
        )
        .unwrap();

        let auth = config.retry.auth;
        assert_eq!(auth.max_retries, 0);
        assert_eq!(auth.base_delay_ms, 2000);
        assert_eq!(auth.max_delay_ms, 5000);

        let render = config.metrics.thresholds.component_render;
        assert_eq!(render, DurationThresholds::new(100.0, 500.0, 2000.0));
        assert_eq!(config.metrics.thresholds.page_load, MetricThresholds::default().page_load);

        assert_eq!(config.alert.memory, RatioThresholds::new(0.70, 0.80, 0.95));
        assert_eq!(config.alert.cache_hit_rate.min_lookups, 5);
        assert_eq!(config.alert.cache_hit_rate.critical_below, 0.2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            "[cache.route]\nmax_size = 0",
            "[cache.route]\nstorage_key = \"\"",
            "[metrics]\nretain_on_trim = 1000",
            "[metrics.thresholds.page_load]\nmedium_ms = 5000.0\nhigh_ms = 3000.0\ncritical_ms = 10000.0",
            "[alert]\nmonitoring_interval_seconds = 0",
            "[retry.api]\nmax_retries = 3\nbase_delay_ms = 20000\nmax_delay_ms = 100\nbackoff_multiplier = 2.0",
        ];

        for case in cases {
            let result = AppConfig::from_toml_str(case);
            assert!(
                matches!(result, Err(ConfigError::Invalid(_))),
                "Should reject: {}",
                case
            );
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[alert]\ndedup_window_seconds = 60").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.alert.dedup_window(), Duration::from_secs(60));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = AppConfig::from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
