//! Cancellable periodic tasks
//!
//! Timer-driven work (cache sweeps, alert monitoring) runs as a Tokio task
//! owned by a [`TaskHandle`]. Dropping the handle stops the task.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running periodic task
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    task: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the task is still scheduled
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            crate::debug_log!("Stopped periodic task {}", self.name);
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run `tick` every `interval` until it returns `false` or the handle is stopped.
///
/// With `immediate` set the first run happens right away, otherwise after one
/// full interval. Must be called from within a Tokio runtime.
pub fn spawn_periodic<F, Fut>(
    name: &'static str,
    interval: Duration,
    immediate: bool,
    mut tick: F,
) -> TaskHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send,
{
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if !immediate {
            // The first tick of a Tokio interval completes at once
            ticker.tick().await;
        }
        loop {
            ticker.tick().await;
            if !tick().await {
                crate::debug_log!("Periodic task {} finished", name);
                break;
            }
        }
    });

    TaskHandle {
        name,
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_immediate_task_runs_then_repeats() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let mut handle = spawn_periodic("test", Duration::from_secs(10), true, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }
        });

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        handle.stop();
        assert!(!handle.is_running());
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_ends_when_tick_returns_false() {
        let handle = spawn_periodic("once", Duration::from_secs(1), false, || async { false });
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!handle.is_running());
    }
}
