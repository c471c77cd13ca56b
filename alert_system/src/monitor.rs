use crate::manager::AlertManager;
use core_types::{debug_log, spawn_periodic, TaskHandle};
use std::sync::Arc;
use std::time::Duration;

impl AlertManager {
    /// Run the checks now and then every `interval`. Stopping or dropping
    /// the handle ends monitoring, as does dropping the manager.
    pub fn start_monitoring(self: &Arc<Self>, interval: Duration) -> TaskHandle {
        let weak = Arc::downgrade(self);
        tracing::info!(interval_ms = interval.as_millis() as u64, "Alert monitoring started");
        spawn_periodic("alert-monitoring", interval, true, move || {
            let alive = match weak.upgrade() {
                Some(manager) => {
                    let raised = manager.run_checks_once();
                    debug_log!("Monitoring tick produced {} alerts", raised.len());
                    true
                }
                None => false,
            };
            std::future::ready(alive)
        })
    }

    /// Monitoring at the configured interval
    pub fn start_default_monitoring(self: &Arc<Self>) -> TaskHandle {
        self.start_monitoring(self.config.monitoring_interval())
    }
}
