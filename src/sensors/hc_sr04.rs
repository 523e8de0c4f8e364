use crate::utils::clock::Clock;

const SOUND_SPEED_M_S: f32 = 340.0;
const SOUND_SPEED_CM_US: f32 = SOUND_SPEED_M_S * 100.0 / 1_000_000.0;
const TRIGGER_SETTLE_US: u32 = 4;
const TRIGGER_PULSE_US: u32 = 10;

/// Maximum time spent waiting on each edge of the echo pulse.
pub const ECHO_EDGE_TIMEOUT_US: u64 = 10_000;

/// Returned by [`HCSR04::measure`] when no distance could be measured.
pub const MEASUREMENT_FAILED: f32 = -1.0;

/// Lower bound (exclusive) of the sensor's rated range, in centimeters.
pub const MIN_VALID_DISTANCE_CM: f32 = 0.0;
/// Upper bound (exclusive) of the sensor's rated range, in centimeters.
pub const MAX_VALID_DISTANCE_CM: f32 = 400.0;

#[derive(Debug)]
pub enum RangingError {
    CannotDriveTrigger,
}

/// Hardware capabilities the ranging protocol needs: drive the trigger line, read the echo
/// line, wait a few microseconds and read a monotonic microsecond clock.
pub trait RangingHal: Clock {
    fn set_trigger(&mut self, high: bool) -> Result<(), RangingError>;

    fn echo_is_high(&mut self) -> bool;

    fn delay_us(&mut self, us: u32);
}

/// Simple abstraction of the HCSR04 that facilitates its handling
pub struct HCSR04<H> {
    hal: H,
}

impl<H: RangingHal> HCSR04<H> {
    pub fn new(hal: H) -> HCSR04<H> {
        HCSR04 { hal }
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// Returns the distance of the object in front of the sensor in centimeters.
    ///
    /// Polls the echo line without yielding. Each edge of the echo pulse gets its own
    /// [`ECHO_EDGE_TIMEOUT_US`] window: the first one starts when the trigger pulse ends,
    /// the second one at the rising edge.
    ///
    /// # Returns
    ///
    /// A f32 representing the distance in centimeters, or [`MEASUREMENT_FAILED`] if the
    /// trigger could not be driven or an edge did not arrive in time.
    pub fn measure(&mut self) -> f32 {
        if let Err(err) = self.send_trigger_pulse() {
            log::warn!("Ultrasonic trigger failed: {:?}", err);
            return MEASUREMENT_FAILED;
        }

        let pulse_end = self.hal.now_us();
        let Some(echo_start) = self.wait_for_echo(true, pulse_end) else {
            return MEASUREMENT_FAILED;
        };
        let Some(echo_end) = self.wait_for_echo(false, echo_start) else {
            return MEASUREMENT_FAILED;
        };

        distance_from_echo_us(echo_end - echo_start)
    }

    /// First set the trigger to Low for a few micro-seconds to get a clean signal.
    /// Then set the trigger pin high for 10 micro-seconds to send the sonic burst
    fn send_trigger_pulse(&mut self) -> Result<(), RangingError> {
        self.hal.set_trigger(false)?;
        self.hal.delay_us(TRIGGER_SETTLE_US);
        self.hal.set_trigger(true)?;
        self.hal.delay_us(TRIGGER_PULSE_US);
        self.hal.set_trigger(false)
    }

    /// Spins until the echo line reaches `high`, returning the time it did. Gives up once
    /// more than [`ECHO_EDGE_TIMEOUT_US`] have passed since `window_start`.
    fn wait_for_echo(&mut self, high: bool, window_start: u64) -> Option<u64> {
        while self.hal.echo_is_high() != high {
            if self.hal.now_us().saturating_sub(window_start) > ECHO_EDGE_TIMEOUT_US {
                return None;
            }
        }
        Some(self.hal.now_us())
    }
}

/// We divide by 2 because if not we get the distance of the roundtrip
pub fn distance_from_echo_us(echo_us: u64) -> f32 {
    (echo_us as f32 * SOUND_SPEED_CM_US) / 2.0
}

/// Whether `distance_cm` lies inside the sensor's rated range. The failure sentinel never does.
pub fn is_valid_distance(distance_cm: f32) -> bool {
    distance_cm > MIN_VALID_DISTANCE_CM && distance_cm < MAX_VALID_DISTANCE_CM
}

#[cfg(target_os = "espidf")]
pub use esp::EspRangingPins;

#[cfg(target_os = "espidf")]
mod esp {
    use super::{RangingError, RangingHal};
    use crate::{
        gpio::{DigitalIn, DigitalOut},
        utils::clock::{BootClock, Clock},
    };
    use esp_idf_svc::hal::delay::Delay;

    /// Trigger and echo pins of an HC-SR04 wired to the ESP32
    pub struct EspRangingPins<'a> {
        trig: DigitalOut<'a>,
        echo: DigitalIn<'a>,
        delay: Delay,
    }

    impl<'a> EspRangingPins<'a> {
        pub fn new(trig: DigitalOut<'a>, echo: DigitalIn<'a>) -> Self {
            Self {
                trig,
                echo,
                delay: Delay::new_default(),
            }
        }
    }

    impl Clock for EspRangingPins<'_> {
        fn now_us(&self) -> u64 {
            BootClock.now_us()
        }
    }

    impl RangingHal for EspRangingPins<'_> {
        fn set_trigger(&mut self, high: bool) -> Result<(), RangingError> {
            let result = if high {
                self.trig.set_high()
            } else {
                self.trig.set_low()
            };
            result.map_err(|_| RangingError::CannotDriveTrigger)
        }

        fn echo_is_high(&mut self) -> bool {
            self.echo.is_high()
        }

        fn delay_us(&mut self, us: u32) {
            self.delay.delay_us(us);
        }
    }
}
