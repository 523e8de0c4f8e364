//! Process-wide state shared between the periodic tasks.
//!
//! Every task receives a clone of [`SharedState`] at construction instead of reaching for
//! globals. The sensor task is the only writer of the latest-value slot and the only sender
//! on the sample queue; the actuation task is the only writer of the LED status.

mod latest;
mod led;
mod sample_queue;

use std::{sync::Arc, time::Duration};

pub use latest::{DistanceReading, LatestDistanceSlot};
pub use led::{LedState, LedStatus};
pub use sample_queue::{SampleDrain, SampleQueue, SampleQueueError, SAMPLE_QUEUE_CAPACITY};

/// A validated distance measurement and the time it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSample {
    pub distance_cm: f32,
    /// Milliseconds since boot.
    pub timestamp_ms: u64,
    /// Slot generation the sample was published under. Zero until published.
    pub generation: u32,
}

impl DistanceSample {
    pub fn new(distance_cm: f32, timestamp_ms: u64) -> Self {
        Self {
            distance_cm,
            timestamp_ms,
            generation: 0,
        }
    }
}

pub type DistanceQueue = SampleQueue<DistanceSample>;
pub type DistanceDrain = SampleDrain<DistanceSample>;

#[derive(Clone, Default)]
pub struct SharedState {
    pub latest: Arc<LatestDistanceSlot>,
    pub led: Arc<LedStatus>,
    pub queue: Arc<DistanceQueue>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a valid sample to the slot, then offers it to the queue tagged with the
    /// slot generation.
    ///
    /// # Errors
    ///
    /// - `SampleQueueError::Full`: the slot was updated but the queue dropped the sample.
    pub fn publish_sample(&self, sample: DistanceSample) -> Result<(), SampleQueueError> {
        let generation = self
            .latest
            .publish(DistanceReading::valid(sample.distance_cm));
        self.queue.try_send(DistanceSample {
            generation,
            ..sample
        })
    }

    /// Newest queued sample, only if it is the one currently held by the slot.
    ///
    /// A queue nobody drains fills up and keeps its old samples; those are never returned.
    pub fn current_sample(&self, timeout: Option<Duration>) -> Option<DistanceSample> {
        self.queue
            .peek_latest(timeout)
            .ok()
            .filter(|sample| sample.generation == self.latest.generation())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn current_sample_follows_the_slot() {
        let state = SharedState::new();
        state.publish_sample(DistanceSample::new(12.0, 10)).unwrap();
        let sample = state.current_sample(Some(Duration::ZERO)).unwrap();
        assert_eq!(sample.distance_cm, 12.0);
        assert_eq!(sample.generation, state.latest.generation());

        state.latest.publish(DistanceReading::invalid());
        assert_eq!(state.current_sample(Some(Duration::ZERO)), None);
        assert_eq!(state.queue.len(), 1);
    }

    #[test]
    fn undrained_full_queue_never_serves_old_samples() {
        let state = SharedState::new();
        for i in 0..SAMPLE_QUEUE_CAPACITY {
            state
                .publish_sample(DistanceSample::new(5.0, i as u64))
                .unwrap();
        }
        for i in 0..20 {
            let result = state.publish_sample(DistanceSample::new(150.0, 100 + i));
            assert_eq!(result, Err(SampleQueueError::Full));
        }
        assert_eq!(state.latest.snapshot(), DistanceReading::valid(150.0));
        assert_eq!(state.current_sample(Some(Duration::ZERO)), None);
    }
}
