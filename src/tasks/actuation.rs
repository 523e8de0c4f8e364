use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use super::PeriodicTask;
use crate::state::{LedState, SharedState};

#[derive(Debug)]
pub enum ActuatorError {
    CannotSetLevel,
}

/// Output driven by the distance threshold, an LED on the reference board.
pub trait Actuator {
    fn drive(&mut self, state: LedState) -> Result<(), ActuatorError>;
}

/// The actuator is driven by the actuation task and, on request, by the HTTP override.
pub type SharedActuator<A> = Arc<Mutex<A>>;

/// Turns the actuator on while the latest valid distance is below the threshold.
///
/// Invalid readings count as "too far". The decision and the LED status come from a single
/// snapshot of the latest-value slot.
pub struct ActuationTask<A> {
    actuator: SharedActuator<A>,
    state: SharedState,
    threshold_cm: f32,
    period: Duration,
    last: Option<LedState>,
}

impl<A: Actuator> ActuationTask<A> {
    pub fn new(
        actuator: SharedActuator<A>,
        state: SharedState,
        threshold_cm: f32,
        period: Duration,
    ) -> Self {
        Self {
            actuator,
            state,
            threshold_cm,
            period,
            last: None,
        }
    }

    fn decide(&self) -> (LedState, f32) {
        let reading = self.state.latest.snapshot();
        let on = reading
            .valid_distance()
            .is_some_and(|distance| distance < self.threshold_cm);
        (LedState::from(on), reading.distance_cm())
    }
}

impl<A: Actuator> PeriodicTask for ActuationTask<A> {
    fn name(&self) -> &'static str {
        "actuation"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn run_cycle(&mut self) {
        let (decision, distance_cm) = self.decide();
        let driven = self
            .actuator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drive(decision);
        if let Err(err) = driven {
            log::error!("Failed to drive LED: {:?}", err);
        }
        self.state.led.set(decision);

        if decision.is_on() && self.last != Some(LedState::On) {
            log::info!(
                "LED ON - Distance: {:.1} cm < {:.1} cm",
                distance_cm,
                self.threshold_cm
            );
        }
        self.last = Some(decision);
    }
}
