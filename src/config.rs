//! Deployment configuration. Every value has a default matching the reference board
//! (ESP32-C3, HC-SR04, SSD1306 128x64 on I2C, SD card on SPI).

use std::{path::PathBuf, time::Duration};

const DEFAULT_AP_SSID: &str = "SmartEmbed";
const DEFAULT_AP_PASSWORD: &str = "smartembed";

#[derive(Debug, Clone)]
pub struct PinConfig {
    pub trigger: u8,
    pub echo: u8,
    pub led: u8,
    pub oled_sda: u8,
    pub oled_scl: u8,
    pub sd_sclk: u8,
    pub sd_mosi: u8,
    pub sd_miso: u8,
    pub sd_cs: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            trigger: 8,
            echo: 7,
            led: 2,
            oled_sda: 3,
            oled_scl: 0,
            sd_sclk: 4,
            sd_mosi: 6,
            sd_miso: 5,
            sd_cs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OledConfig {
    pub i2c_address: u8,
    pub clock_hz: u32,
}

impl Default for OledConfig {
    fn default() -> Self {
        Self {
            i2c_address: 0x3C,
            clock_hz: 400_000,
        }
    }
}

/// Cadence of every periodic task.
#[derive(Debug, Clone)]
pub struct TaskTiming {
    /// Pause after each measurement.
    pub sensor_period: Duration,
    pub actuation_period: Duration,
    pub display_period: Duration,
    /// How long the display waits for a queued sample before using the latest-value slot.
    pub display_peek_timeout: Duration,
    /// Longest wait for a sample to persist.
    pub persistence_wait: Duration,
    /// Pause after each persistence attempt, whatever its outcome.
    pub persistence_period: Duration,
    pub health_period: Duration,
}

impl Default for TaskTiming {
    fn default() -> Self {
        Self {
            sensor_period: Duration::from_millis(500),
            actuation_period: Duration::from_millis(100),
            display_period: Duration::from_millis(200),
            display_peek_timeout: Duration::from_millis(500),
            persistence_wait: Duration::from_millis(1000),
            persistence_period: Duration::from_millis(100),
            health_period: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub mount_point: String,
    pub file_name: String,
}

impl HistoryConfig {
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.mount_point).join(&self.file_name)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            mount_point: "/sdcard".to_string(),
            file_name: "sensor.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WifiApConfig {
    pub ssid: String,
    /// `None` leaves the access point open.
    pub password: Option<String>,
    pub channel: u8,
    pub max_connections: u16,
}

impl Default for WifiApConfig {
    fn default() -> Self {
        let password = option_env!("DISTANCE_LOGGER_AP_PASSWORD").unwrap_or(DEFAULT_AP_PASSWORD);
        Self {
            ssid: option_env!("DISTANCE_LOGGER_AP_SSID")
                .unwrap_or(DEFAULT_AP_SSID)
                .to_string(),
            password: (!password.is_empty()).then(|| password.to_string()),
            channel: 1,
            max_connections: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pins: PinConfig,
    pub oled: OledConfig,
    pub timing: TaskTiming,
    /// The LED turns on below this distance.
    pub threshold_cm: f32,
    pub history: HistoryConfig,
    pub wifi: WifiApConfig,
    pub http_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pins: PinConfig::default(),
            oled: OledConfig::default(),
            timing: TaskTiming::default(),
            threshold_cm: 10.0,
            history: HistoryConfig::default(),
            wifi: WifiApConfig::default(),
            http_port: 80,
        }
    }
}
