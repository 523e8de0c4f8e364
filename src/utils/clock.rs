#[cfg(not(target_os = "espidf"))]
use std::{sync::OnceLock, time::Instant};

const MICRO_IN_MILLI: u64 = 1000;

/// Monotonic microsecond time source.
pub trait Clock {
    /// Microseconds elapsed since boot. Never goes backwards.
    fn now_us(&self) -> u64;

    /// Milliseconds elapsed since boot.
    fn now_ms(&self) -> u64 {
        self.now_us() / MICRO_IN_MILLI
    }
}

/// Clock counting from boot. On the device it reads the `esp_timer`, on a host
/// it counts from the first time any `BootClock` is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootClock;

#[cfg(target_os = "espidf")]
impl Clock for BootClock {
    fn now_us(&self) -> u64 {
        let now = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        now.max(0) as u64
    }
}

#[cfg(not(target_os = "espidf"))]
impl Clock for BootClock {
    fn now_us(&self) -> u64 {
        static BOOT: OnceLock<Instant> = OnceLock::new();
        BOOT.get_or_init(Instant::now).elapsed().as_micros() as u64
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
