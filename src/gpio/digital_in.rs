use esp_idf_svc::hal::gpio::{AnyIOPin, Input, PinDriver, Pull};

use super::PinId;

/// Enums the different errors possible when working with the digital in
#[derive(Debug)]
pub enum DigitalInError {
    CannotSetPinAsInput,
    CannotSetPullForPin,
}

/// Driver for receiving digital inputs from a particular Pin. Polled only, no interrupts.
pub struct DigitalIn<'a> {
    pin_driver: PinDriver<'a, AnyIOPin, Input>,
}

impl<'a> DigitalIn<'a> {
    /// Creates a new `DigitalIn` for a specified pin.
    ///
    /// # Errors
    ///
    /// - `DigitalInError::CannotSetPinAsInput`: If the pin cannot be set as an input.
    /// - `DigitalInError::CannotSetPullForPin`: If the pull resistor cannot be configured.
    pub fn new(pin: PinId, pull: Pull) -> Result<DigitalIn<'a>, DigitalInError> {
        let mut pin_driver = PinDriver::input(pin.into_any_io_pin())
            .map_err(|_| DigitalInError::CannotSetPinAsInput)?;
        pin_driver
            .set_pull(pull)
            .map_err(|_| DigitalInError::CannotSetPullForPin)?;
        Ok(DigitalIn { pin_driver })
    }

    pub fn is_high(&self) -> bool {
        self.pin_driver.is_high()
    }
}
