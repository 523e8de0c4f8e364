//! Read access to the shared state for the HTTP layer.
//!
//! Nothing here removes samples from the queue; persistence stays the only drainer.

use std::{sync::PoisonError, time::Duration};

use crate::{
    history::{stream_json_array, HistoryError, HistorySource},
    state::{DistanceReading, LedState, SharedState},
    tasks::{Actuator, ActuatorError, SharedActuator},
};

pub struct SnapshotServer<A, H> {
    state: SharedState,
    actuator: SharedActuator<A>,
    history: Option<H>,
}

impl<A: Actuator, H: HistorySource> SnapshotServer<A, H> {
    /// `history` is `None` when the storage could not be brought up.
    pub fn new(state: SharedState, actuator: SharedActuator<A>, history: Option<H>) -> Self {
        Self {
            state,
            actuator,
            history,
        }
    }

    pub fn current_distance(&self) -> DistanceReading {
        self.state.latest.snapshot()
    }

    pub fn led_status(&self) -> LedState {
        self.state.led.get()
    }

    /// Newest queued sample of the current reading, or the latest-value slot otherwise.
    pub fn freshest_distance(&self) -> f32 {
        self.state
            .current_sample(Some(Duration::ZERO))
            .map(|sample| sample.distance_cm)
            .unwrap_or_else(|| self.current_distance().distance_cm())
    }

    pub fn history_available(&self) -> bool {
        self.history
            .as_ref()
            .is_some_and(|history| history.is_available())
    }

    /// Streams the persisted history as a JSON array.
    ///
    /// # Errors
    ///
    /// - `HistoryError::NotFound`: no storage, or nothing persisted yet.
    /// - Any error returned by `emit`, which aborts the stream.
    pub fn stream_history<F>(&self, emit: F) -> Result<(), HistoryError>
    where
        F: FnMut(&str) -> Result<(), HistoryError>,
    {
        match &self.history {
            Some(history) => stream_json_array(history, emit),
            None => Err(HistoryError::NotFound),
        }
    }

    /// Drives the actuator directly. The next actuation cycle overwrites it and the reported
    /// LED status is left untouched.
    pub fn override_actuator(&self, state: LedState) -> Result<(), ActuatorError> {
        log::info!("Actuator override: {}", state.as_str());
        self.actuator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drive(state)
    }
}
