use crate::{
    gpio::PinError,
    tasks::{DisplayError, TaskSpawnError},
};
#[cfg(target_os = "espidf")]
use crate::{
    gpio::{DigitalInError, DigitalOutError},
    serial::I2CError,
    storage::SdCardError,
    wifi::{HttpServerError, WifiError},
};

#[derive(Debug)]
pub enum AppError {
    /// The sample queue handed out its drain before.
    DrainAlreadyClaimed,
    DisplayError(DisplayError),
    PinError(PinError),
    TaskSpawnError(TaskSpawnError),
    #[cfg(target_os = "espidf")]
    DigitalInError(DigitalInError),
    #[cfg(target_os = "espidf")]
    DigitalOutError(DigitalOutError),
    #[cfg(target_os = "espidf")]
    HttpServerError(HttpServerError),
    #[cfg(target_os = "espidf")]
    I2CError(I2CError),
    /// `Peripherals` or the system event loop were already taken.
    #[cfg(target_os = "espidf")]
    PeripheralsUnavailable,
    #[cfg(target_os = "espidf")]
    SdCardError(SdCardError),
    #[cfg(target_os = "espidf")]
    WifiError(WifiError),
}

macro_rules! impl_from_error {
    ($($(#[$attr:meta])* $error:ident),* $(,)?) => {
        $(
            $(#[$attr])*
            impl From<$error> for AppError {
                fn from(value: $error) -> Self {
                    AppError::$error(value)
                }
            }
        )*
    };
}

impl_from_error!(
    DisplayError,
    PinError,
    TaskSpawnError,
    #[cfg(target_os = "espidf")]
    DigitalInError,
    #[cfg(target_os = "espidf")]
    DigitalOutError,
    #[cfg(target_os = "espidf")]
    HttpServerError,
    #[cfg(target_os = "espidf")]
    I2CError,
    #[cfg(target_os = "espidf")]
    SdCardError,
    #[cfg(target_os = "espidf")]
    WifiError,
);

#[cfg(test)]
mod test {
    use super::*;
    use crate::gpio::PinAllocator;

    fn take_twice() -> Result<(), AppError> {
        let mut pins = PinAllocator::new();
        pins.take(2)?;
        pins.take(2)?;
        Ok(())
    }

    #[test]
    fn module_errors_convert_with_question_mark() {
        assert!(matches!(
            take_twice(),
            Err(AppError::PinError(PinError::AlreadyTaken(2)))
        ));
    }
}
