use std::net::Ipv4Addr;

use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AccessPointConfiguration, AuthMethod, BlockingWifi, Configuration, EspWifi},
};

use crate::config::WifiApConfig;

/// Error types related to WIFI operations.
#[derive(Debug)]
pub enum WifiError {
    ConfigurationError,
    InformationError,
    InvalidCredentials,
    NvsAlreadyTaken,
    StartingError,
}

/// Abstraction of the driver that controls the wifi. The device hosts its own access point,
/// so clients connect to it directly.
pub struct WifiDriver<'a> {
    controller: BlockingWifi<EspWifi<'a>>,
}

impl<'a> WifiDriver<'a> {
    /// Creates a new WifiDriver.
    ///
    /// Takes the default NVS partition, where the wifi stack keeps its calibration data.
    ///
    /// # Errors
    ///
    /// - `WifiError::NvsAlreadyTaken`: If the NVS Default Partition was already taken.
    /// - `WifiError::StartingError`: If there is an error initializing the driver.
    pub fn new(event_loop: EspSystemEventLoop, modem: modem::Modem) -> Result<Self, WifiError> {
        let nvs = EspDefaultNvsPartition::take().map_err(|_| WifiError::NvsAlreadyTaken)?;
        let wifi = EspWifi::new(modem, event_loop.clone(), Some(nvs))
            .map_err(|_| WifiError::StartingError)?;
        Ok(WifiDriver {
            controller: BlockingWifi::wrap(wifi, event_loop)
                .map_err(|_| WifiError::StartingError)?,
        })
    }

    /// Starts the access point and waits until its interface is up.
    ///
    /// WPA2 is used when the configuration carries a password, otherwise the network is open.
    ///
    /// # Returns
    ///
    /// The address clients reach the device at.
    ///
    /// # Errors
    ///
    /// - `WifiError::InvalidCredentials`: SSID longer than 32 bytes or password longer than 64.
    /// - `WifiError::ConfigurationError`: If the configuration of the wifi driver fails.
    /// - `WifiError::StartingError`: Error while starting the access point.
    /// - `WifiError::InformationError`: If the address of the interface cannot be read.
    pub fn start_access_point(&mut self, config: &WifiApConfig) -> Result<Ipv4Addr, WifiError> {
        let (auth_method, password) = match &config.password {
            Some(password) => (AuthMethod::WPA2Personal, password.as_str()),
            None => (AuthMethod::None, ""),
        };

        let configuration = Configuration::AccessPoint(AccessPointConfiguration {
            ssid: config
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| WifiError::InvalidCredentials)?,
            password: password
                .try_into()
                .map_err(|_| WifiError::InvalidCredentials)?,
            auth_method,
            channel: config.channel,
            max_connections: config.max_connections,
            ..Default::default()
        });

        self.controller
            .set_configuration(&configuration)
            .map_err(|_| WifiError::ConfigurationError)?;
        self.controller
            .start()
            .map_err(|_| WifiError::StartingError)?;
        self.controller
            .wait_netif_up()
            .map_err(|_| WifiError::StartingError)?;

        let address = self.get_address_info()?;
        log::info!("Access point '{}' up at {}", config.ssid, address);
        Ok(address)
    }

    /// Address of the access point interface.
    ///
    /// # Errors
    ///
    /// - `WifiError::InformationError`: If the netif information cannot be read.
    pub fn get_address_info(&self) -> Result<Ipv4Addr, WifiError> {
        let info = self
            .controller
            .wifi()
            .ap_netif()
            .get_ip_info()
            .map_err(|_| WifiError::InformationError)?;
        Ok(info.ip)
    }
}
