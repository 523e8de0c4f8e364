use std::time::Duration;

use super::PeriodicTask;
use crate::state::SharedState;

/// Logs a one-line summary of the shared state.
pub struct HealthMonitor {
    state: SharedState,
    period: Duration,
}

impl HealthMonitor {
    pub fn new(state: SharedState, period: Duration) -> Self {
        Self { state, period }
    }

    pub fn summary(&self) -> String {
        let reading = self.state.latest.snapshot();
        format!(
            "Health - distance: {:.1} cm, valid: {}, LED: {}, queued: {}",
            reading.distance_cm(),
            reading.is_valid(),
            self.state.led.get().as_str(),
            self.state.queue.len()
        )
    }
}

impl PeriodicTask for HealthMonitor {
    fn name(&self) -> &'static str {
        "health"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn run_cycle(&mut self) {
        log::info!("{}", self.summary());
    }
}
