use crate::classify::ClassifyError;
use config::RetryPolicy;
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Decides whether a failure is worth another attempt
pub type RetryCondition<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Called with the number of the failed attempt before each backoff sleep
pub type RetryCallback<E> = Arc<dyn Fn(u32, &E) + Send + Sync>;

/// Retry behaviour for one invocation
pub struct RetryOptions<E> {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Upper bound of the random delay added to every backoff
    pub jitter: Duration,
    pub retry_condition: RetryCondition<E>,
    pub on_retry: Option<RetryCallback<E>>,
}

impl<E> Clone for RetryOptions<E> {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            backoff_multiplier: self.backoff_multiplier,
            jitter: self.jitter,
            retry_condition: self.retry_condition.clone(),
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_multiplier", &self.backoff_multiplier)
            .field("jitter", &self.jitter)
            .field("has_on_retry", &self.on_retry.is_some())
            .finish()
    }
}

impl<E: ClassifyError + 'static> Default for RetryOptions<E> {
    /// 3 retries from 1s, doubling up to 10s; retries network, timeout and 5xx failures
    fn default() -> Self {
        Self::from_policy(
            &RetryPolicy::api_defaults(),
            Arc::new(|err: &E| err.classify().is_transient()),
        )
    }
}

impl<E> RetryOptions<E> {
    pub fn from_policy(policy: &RetryPolicy, retry_condition: RetryCondition<E>) -> Self {
        Self {
            max_retries: policy.max_retries,
            base_delay: Duration::from_millis(policy.base_delay_ms),
            max_delay: Duration::from_millis(policy.max_delay_ms),
            backoff_multiplier: policy.backoff_multiplier,
            jitter: Duration::from_millis(policy.jitter_ms),
            retry_condition,
            on_retry: None,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn retry_if<F>(mut self, condition: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retry_condition = Arc::new(condition);
        self
    }

    pub fn on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(u32, &E) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(callback));
        self
    }

    /// `min(base * multiplier^attempt, max)` for a zero-based attempt, without jitter
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let base_ms = self.base_delay.as_millis() as f64;
        let max_ms = self.max_delay.as_millis() as f64;
        let delay_ms = (base_ms * factor).min(max_ms);
        if delay_ms.is_finite() && delay_ms > 0.0 {
            Duration::from_millis(delay_ms as u64)
        } else {
            Duration::ZERO
        }
    }

    pub(crate) fn jitter_sample(&self) -> Duration {
        let bound = self.jitter.as_millis() as u64;
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..bound))
    }
}
