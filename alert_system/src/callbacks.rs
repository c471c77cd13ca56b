use crate::alert::Alert;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Alert subscriber. Errors are logged and never stop other subscribers.
pub type AlertCallback = Arc<dyn Fn(&Alert) -> anyhow::Result<()> + Send + Sync>;

/// Identifier returned when registering a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackId(u64);

/// Registry of alert subscribers
pub struct CallbackRegistry {
    next_id: AtomicU64,
    callbacks: RwLock<Vec<(CallbackId, AlertCallback)>>,
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: RwLock::new(Vec::new()),
        }
    }

    /// Add alert callback
    pub fn add_callback<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&Alert) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    pub fn remove_callback(&self, id: CallbackId) -> bool {
        let mut callbacks = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Deliver `alert` to every subscriber and return how many failed.
    ///
    /// The list is snapshotted first so callbacks may register or remove
    /// subscribers without deadlocking.
    pub fn emit(&self, alert: &Alert) -> usize {
        let snapshot: Vec<(CallbackId, AlertCallback)> = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut failures = 0;
        for (id, callback) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| callback(alert))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    tracing::warn!(callback = ?id, alert = %alert.id, error = %e, "alert callback failed");
                }
                Err(_) => {
                    failures += 1;
                    tracing::error!(callback = ?id, alert = %alert.id, "alert callback panicked");
                }
            }
        }
        failures
    }

    /// Clear all callbacks
    pub fn clear_callbacks(&self) {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Get number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks
            .read()
            .map(|c| c.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertKind;
    use core_types::{MetadataMap, Severity};
    use std::sync::atomic::AtomicUsize;

    fn sample_alert() -> Alert {
        Alert::new(
            AlertKind::HighErrorRate,
            Severity::High,
            MetadataMap::new(),
            chrono::Utc::now(),
        )
    }

    #[test]
    fn test_failing_callbacks_do_not_block_others() {
        let registry = CallbackRegistry::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        registry.add_callback(|_| Err(anyhow::anyhow!("subscriber offline")));
        registry.add_callback(|_| panic!("subscriber bug"));
        let counter = delivered.clone();
        registry.add_callback(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(registry.emit(&sample_alert()), 2);
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_callback() {
        let registry = CallbackRegistry::new();
        let first = registry.add_callback(|_| Ok(()));
        let second = registry.add_callback(|_| Ok(()));
        assert_ne!(first, second);

        assert!(registry.remove_callback(first));
        assert!(!registry.remove_callback(first));
        assert_eq!(registry.callback_count(), 1);

        registry.clear_callbacks();
        assert_eq!(registry.callback_count(), 0);
    }
}
