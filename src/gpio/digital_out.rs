use esp_idf_svc::hal::gpio::{AnyIOPin, Level, Output, PinDriver};

use super::PinId;
use crate::{
    state::LedState,
    tasks::{Actuator, ActuatorError},
};

/// Enums the different errors possible when working with the digital out
#[derive(Debug)]
pub enum DigitalOutError {
    CannotSetPinAsOutput,
    InvalidPin,
}

/// Driver to handle a digital output for a particular Pin
pub struct DigitalOut<'a> {
    pin_driver: PinDriver<'a, AnyIOPin, Output>,
}

impl<'a> DigitalOut<'a> {
    /// Creates a new `DigitalOut` for a specified pin. The pin starts low.
    ///
    /// # Errors
    ///
    /// - `DigitalOutError::CannotSetPinAsOutput`: If the pin cannot be set as an output.
    pub fn new(pin: PinId) -> Result<DigitalOut<'a>, DigitalOutError> {
        let mut pin_driver = PinDriver::output(pin.into_any_io_pin())
            .map_err(|_| DigitalOutError::CannotSetPinAsOutput)?;
        pin_driver
            .set_low()
            .map_err(|_| DigitalOutError::InvalidPin)?;
        Ok(DigitalOut { pin_driver })
    }

    pub fn set_level(&mut self, level: Level) -> Result<(), DigitalOutError> {
        self.pin_driver
            .set_level(level)
            .map_err(|_| DigitalOutError::InvalidPin)
    }

    pub fn set_high(&mut self) -> Result<(), DigitalOutError> {
        self.set_level(Level::High)
    }

    pub fn set_low(&mut self) -> Result<(), DigitalOutError> {
        self.set_level(Level::Low)
    }
}

impl Actuator for DigitalOut<'_> {
    fn drive(&mut self, state: LedState) -> Result<(), ActuatorError> {
        let result = if state.is_on() {
            self.set_high()
        } else {
            self.set_low()
        };
        result.map_err(|_| ActuatorError::CannotSetLevel)
    }
}
