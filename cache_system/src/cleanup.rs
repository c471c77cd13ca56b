use crate::manager::CacheManager;
use core_types::{debug_log, spawn_periodic, TaskHandle};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

impl<T> CacheManager<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + 'static,
{
    /// Sweep expired entries every `interval` until the handle is stopped.
    ///
    /// The task holds only a weak reference and ends once the cache is dropped.
    pub fn start_cleanup(self: &Arc<Self>, interval: Duration) -> TaskHandle {
        let weak = Arc::downgrade(self);
        spawn_periodic("cache-cleanup", interval, false, move || {
            let alive = match weak.upgrade() {
                Some(cache) => {
                    let removed = cache.cleanup();
                    debug_log!("Periodic cleanup removed {} entries", removed);
                    true
                }
                None => false,
            };
            std::future::ready(alive)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::CacheConfig;
    use core_types::ManualClock;

    #[tokio::test(start_paused = true)]
    async fn test_periodic_cleanup_sweeps_unread_keys() {
        let clock = Arc::new(ManualClock::new());
        let config = CacheConfig::new(10, 1000, false, "sweep".to_string());
        let cache: Arc<CacheManager<u32>> =
            Arc::new(CacheManager::with_parts(config, None, clock.clone()));
        cache.set("never-read", 1, Some(Duration::from_millis(10)));

        let mut handle = cache.start_cleanup(Duration::from_secs(300));
        clock.advance_millis(20);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(cache.len(), 1);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(cache.len(), 0);

        handle.stop();
        assert!(!handle.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_ends_with_cache() {
        let config = CacheConfig::new(10, 1000, false, "sweep".to_string());
        let cache: Arc<CacheManager<u32>> = Arc::new(CacheManager::new(config));
        let handle = cache.start_cleanup(Duration::from_secs(1));

        drop(cache);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!handle.is_running());
    }
}
