use esp_idf_svc::{
    hal::{
        delay::TickType,
        i2c::{I2cConfig, I2cDriver, I2C0},
        units::FromValueType,
    },
    sys::{ESP_ERR_INVALID_ARG, ESP_ERR_TIMEOUT},
};

use crate::{config::OledConfig, gpio::PinId};

const PROBE_TIMEOUT_MS: u64 = 50;

#[derive(Debug)]
pub enum I2CError {
    InvalidArg,
    DriverError,
    NoDeviceAtAddress(u8),
    TimeoutError,
}

/// I2C master on the single controller of the ESP32-C3.
pub struct I2CMaster<'a> {
    driver: I2cDriver<'a>,
}

impl<'a> I2CMaster<'a> {
    /// Creates the bus on the given pins at the OLED's clock rate.
    ///
    /// # Errors
    ///
    /// - `I2CError::InvalidArg`: The pins or the clock rate were rejected.
    /// - `I2CError::DriverError`: Any other driver failure.
    pub fn new(
        sda: PinId,
        scl: PinId,
        i2c: I2C0,
        config: &OledConfig,
    ) -> Result<I2CMaster<'a>, I2CError> {
        let i2c_config = I2cConfig::new().baudrate(config.clock_hz.Hz().into());
        let driver = I2cDriver::new(
            i2c,
            sda.into_any_io_pin(),
            scl.into_any_io_pin(),
            &i2c_config,
        )
        .map_err(|error| match error.code() {
            ESP_ERR_INVALID_ARG => I2CError::InvalidArg,
            _ => I2CError::DriverError,
        })?;

        Ok(I2CMaster { driver })
    }

    /// Checks that a device acknowledges `addr`.
    ///
    /// # Errors
    ///
    /// - `I2CError::TimeoutError`: The bus stayed busy.
    /// - `I2CError::NoDeviceAtAddress`: Nothing acknowledged the address.
    pub fn probe(&mut self, addr: u8) -> Result<(), I2CError> {
        let timeout = TickType::new_millis(PROBE_TIMEOUT_MS).ticks();
        self.driver
            .write(addr, &[], timeout)
            .map_err(|error| match error.code() {
                ESP_ERR_TIMEOUT => I2CError::TimeoutError,
                _ => I2CError::NoDeviceAtAddress(addr),
            })
    }

    /// Hands the bus over to a device driver.
    pub fn into_driver(self) -> I2cDriver<'a> {
        self.driver
    }
}
