mod hc_sr04;

pub use hc_sr04::{
    distance_from_echo_us, is_valid_distance, RangingError, RangingHal, ECHO_EDGE_TIMEOUT_US,
    HCSR04, MAX_VALID_DISTANCE_CM, MEASUREMENT_FAILED, MIN_VALID_DISTANCE_CM,
};

#[cfg(target_os = "espidf")]
pub use hc_sr04::EspRangingPins;

#[cfg(test)]
pub(crate) use hc_sr04::test::FakeEcho;
