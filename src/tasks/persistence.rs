use std::time::Duration;

use super::PeriodicTask;
use crate::{
    history::{HistoryRecord, HistoryStore},
    state::DistanceDrain,
};

/// Moves samples from the queue to the history store. Holds the queue's only drain.
///
/// Each cycle waits up to `wait` for one sample. A sample that fails to persist is logged
/// and lost.
pub struct PersistenceTask<S> {
    drain: DistanceDrain,
    store: S,
    wait: Duration,
    period: Duration,
    written: u64,
}

impl<S: HistoryStore> PersistenceTask<S> {
    pub fn new(drain: DistanceDrain, store: S, wait: Duration, period: Duration) -> Self {
        Self {
            drain,
            store,
            wait,
            period,
            written: 0,
        }
    }

    /// Samples written since the task was created.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl<S: HistoryStore> PeriodicTask for PersistenceTask<S> {
    fn name(&self) -> &'static str {
        "persistence"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn run_cycle(&mut self) {
        // Receiving only fails on timeout; the next cycle waits again.
        let Ok(sample) = self.drain.receive_timeout(self.wait) else {
            return;
        };

        match self.store.append(&HistoryRecord::from(sample)) {
            Ok(()) => {
                self.written += 1;
                log::debug!(
                    "Stored {:.2} cm at {} ms",
                    sample.distance_cm,
                    sample.timestamp_ms
                );
            }
            Err(err) => log::error!("Failed to store sample: {:?}", err),
        }
    }
}
