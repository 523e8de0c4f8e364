pub mod http;
#[cfg(target_os = "espidf")]
mod http_server;
#[cfg(target_os = "espidf")]
mod wifi_driver;

#[cfg(target_os = "espidf")]
pub use http_server::{HttpServer, HttpServerError};
#[cfg(target_os = "espidf")]
pub use wifi_driver::{WifiDriver, WifiError};
