use std::time::Duration;

use super::PeriodicTask;
use crate::{
    sensors::{is_valid_distance, RangingHal, HCSR04},
    state::{DistanceReading, DistanceSample, SharedState},
    utils::clock::Clock,
};

/// Measures a distance each cycle and publishes it. The only producer of distance data.
///
/// A valid reading goes to the latest-value slot and, without blocking, to the sample queue
/// (dropped if the queue is full). Anything else, including a timeout, marks the slot invalid.
pub struct SensorTask<H, C> {
    sensor: HCSR04<H>,
    clock: C,
    state: SharedState,
    period: Duration,
    dropped: u32,
}

impl<H: RangingHal, C: Clock> SensorTask<H, C> {
    pub fn new(sensor: HCSR04<H>, clock: C, state: SharedState, period: Duration) -> Self {
        Self {
            sensor,
            clock,
            state,
            period,
            dropped: 0,
        }
    }

    /// Samples dropped so far because the queue was full.
    pub fn dropped_samples(&self) -> u32 {
        self.dropped
    }

    fn publish(&mut self, distance_cm: f32) {
        if !is_valid_distance(distance_cm) {
            self.state.latest.publish(DistanceReading::invalid());
            log::warn!("Distance reading error or out of range");
            return;
        }

        let sample = DistanceSample::new(distance_cm, self.clock.now_ms());
        if self.state.publish_sample(sample).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            log::debug!("Sample queue full, dropped {:.1} cm", distance_cm);
        }
        log::info!("Distance: {:.1} cm", distance_cm);
    }
}

impl<H: RangingHal, C: Clock> PeriodicTask for SensorTask<H, C> {
    fn name(&self) -> &'static str {
        "sensor"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn run_cycle(&mut self) {
        let distance_cm = self.sensor.measure();
        self.publish(distance_cm);
    }
}
