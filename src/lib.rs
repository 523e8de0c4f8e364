//! Ultrasonic distance logger for the ESP32-C3.
//!
//! An HC-SR04 is sampled periodically; the result is shared with an LED actuator, an SSD1306
//! status screen, an SD card history and a small HTTP API, each running on its own thread.
//! Everything that does not touch the hardware builds and tests on the host.

pub mod config;
pub mod display;
pub mod gpio;
pub mod history;
pub mod sensors;
#[cfg(target_os = "espidf")]
pub mod serial;
pub mod snapshot;
pub mod state;
#[cfg(target_os = "espidf")]
pub mod storage;
pub mod tasks;
pub mod utils;
pub mod wifi;

pub use config::AppConfig;
pub use utils::app_error::AppError;
