const PIN_COUNT: usize = 22;
/// Wired to the SPI flash on the ESP32-C3.
const FLASH_PINS_BOUNDS: (u8, u8) = (12, 17);

#[derive(Debug, PartialEq, Eq)]
pub enum PinError {
    NotAPin(u8),
    AlreadyTaken(u8),
}

/// Exclusive handle to one GPIO. Only obtainable from a [`PinAllocator`].
#[derive(Debug, PartialEq, Eq)]
pub struct PinId(u8);

impl PinId {
    pub fn number(&self) -> u8 {
        self.0
    }

    #[cfg(target_os = "espidf")]
    pub fn into_any_io_pin(self) -> esp_idf_svc::hal::gpio::AnyIOPin {
        // The allocator hands out each number once, so no other driver owns this pin.
        unsafe { esp_idf_svc::hal::gpio::AnyIOPin::new(self.0 as i32) }
    }
}

/// Hands out each GPIO at most once, so configured pin numbers cannot collide.
#[derive(Debug)]
pub struct PinAllocator {
    taken: [bool; PIN_COUNT],
}

impl PinAllocator {
    pub fn new() -> Self {
        Self {
            taken: [false; PIN_COUNT],
        }
    }

    /// Takes the GPIO with number `pin_num`.
    ///
    /// # Errors
    ///
    /// - `PinError::NotAPin`: The number is out of range or reserved for the flash.
    /// - `PinError::AlreadyTaken`: The pin was handed out before.
    pub fn take(&mut self, pin_num: u8) -> Result<PinId, PinError> {
        if pin_num >= FLASH_PINS_BOUNDS.0 && pin_num <= FLASH_PINS_BOUNDS.1 {
            return Err(PinError::NotAPin(pin_num));
        }
        let slot = self
            .taken
            .get_mut(pin_num as usize)
            .ok_or(PinError::NotAPin(pin_num))?;
        if *slot {
            return Err(PinError::AlreadyTaken(pin_num));
        }
        *slot = true;
        Ok(PinId(pin_num))
    }
}

impl Default for PinAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::PinConfig;

    #[test]
    fn pins_are_handed_out_once() {
        let mut pins = PinAllocator::new();
        assert_eq!(pins.take(8).unwrap().number(), 8);
        assert_eq!(pins.take(8), Err(PinError::AlreadyTaken(8)));
    }

    #[test]
    fn invalid_pins_are_rejected() {
        let mut pins = PinAllocator::new();
        assert_eq!(pins.take(22), Err(PinError::NotAPin(22)));
        assert_eq!(pins.take(14), Err(PinError::NotAPin(14)));
    }

    #[test]
    fn default_pin_map_has_no_collisions() {
        let config = PinConfig::default();
        let mut pins = PinAllocator::new();
        for pin in [
            config.trigger,
            config.echo,
            config.led,
            config.oled_sda,
            config.oled_scl,
            config.sd_sclk,
            config.sd_mosi,
            config.sd_miso,
            config.sd_cs,
        ] {
            assert!(pins.take(pin).is_ok(), "pin {pin}");
        }
    }
}
