use std::sync::Arc;

use esp_idf_svc::{
    http::{
        server::{Configuration, EspHttpServer},
        Method,
    },
    io::{EspIOError, Write},
};

use super::http::{
    led_control_body, led_status_body, parse_led_query, ultrasonic_body, DASHBOARD_HTML,
    HTML_CONTENT_TYPE, JSON_CONTENT_TYPE,
};
use crate::{
    history::{HistoryError, HistorySource},
    snapshot::SnapshotServer,
    tasks::Actuator,
    utils::clock::{BootClock, Clock},
};

#[derive(Debug)]
pub enum HttpServerError {
    CannotStart,
    CannotRegisterHandler,
}

/// The local HTTP API. Routes stay registered for as long as the value is alive.
pub struct HttpServer<'a> {
    _server: EspHttpServer<'a>,
}

impl HttpServer<'static> {
    /// Starts the server and registers every route.
    ///
    /// # Arguments
    ///
    /// - `port`: TCP port to listen on.
    /// - `snapshot`: read access to the shared state, cloned into each handler.
    ///
    /// # Errors
    ///
    /// - `HttpServerError::CannotStart`: The ESP-IDF httpd could not be started.
    /// - `HttpServerError::CannotRegisterHandler`: A route could not be registered.
    pub fn start<A, H>(
        port: u16,
        snapshot: Arc<SnapshotServer<A, H>>,
    ) -> Result<Self, HttpServerError>
    where
        A: Actuator + Send + 'static,
        H: HistorySource + Send + Sync + 'static,
    {
        let configuration = Configuration {
            http_port: port,
            uri_match_wildcard: true,
            ..Default::default()
        };
        let mut server =
            EspHttpServer::new(&configuration).map_err(|_| HttpServerError::CannotStart)?;

        server
            .fn_handler("/", Method::Get, |req| -> Result<(), EspIOError> {
                req.into_response(200, None, &[("Content-Type", HTML_CONTENT_TYPE)])?
                    .write_all(DASHBOARD_HTML.as_bytes())
            })
            .map_err(|_| HttpServerError::CannotRegisterHandler)?;

        let ultrasonic = snapshot.clone();
        server
            .fn_handler("/ultrasonic", Method::Get, move |req| -> Result<(), EspIOError> {
                let body = ultrasonic_body(
                    ultrasonic.freshest_distance(),
                    BootClock.now_ms(),
                    ultrasonic.led_status(),
                );
                log::info!("GET /ultrasonic -> {}", body);
                req.into_response(200, None, &[("Content-Type", JSON_CONTENT_TYPE)])?
                    .write_all(body.as_bytes())
            })
            .map_err(|_| HttpServerError::CannotRegisterHandler)?;

        let led_control = snapshot.clone();
        server
            .fn_handler("/led", Method::Get, move |req| -> Result<(), EspIOError> {
                let requested = parse_led_query(req.uri());
                log::info!("GET {} -> {:?}", req.uri(), requested);
                if let Ok(state) = requested {
                    if let Err(err) = led_control.override_actuator(state) {
                        log::error!("LED override failed: {:?}", err);
                    }
                }
                req.into_response(200, None, &[("Content-Type", JSON_CONTENT_TYPE)])?
                    .write_all(led_control_body(requested).as_bytes())
            })
            .map_err(|_| HttpServerError::CannotRegisterHandler)?;

        let led_status = snapshot.clone();
        server
            .fn_handler("/led/status", Method::Get, move |req| -> Result<(), EspIOError> {
                let body = led_status_body(led_status.led_status());
                log::info!("GET /led/status -> {}", body);
                req.into_response(200, None, &[("Content-Type", JSON_CONTENT_TYPE)])?
                    .write_all(body.as_bytes())
            })
            .map_err(|_| HttpServerError::CannotRegisterHandler)?;

        let history = snapshot;
        server
            .fn_handler("/sensor/history", Method::Get, move |req| -> Result<(), EspIOError> {
                if !history.history_available() {
                    log::info!("GET /sensor/history -> 404");
                    req.into_status_response(404)?;
                    return Ok(());
                }
                let mut response =
                    req.into_response(200, None, &[("Content-Type", JSON_CONTENT_TYPE)])?;
                let streamed = history.stream_history(|chunk| {
                    response
                        .write_all(chunk.as_bytes())
                        .map_err(|_| HistoryError::StreamClosed)
                });
                if let Err(err) = streamed {
                    log::warn!("History stream aborted: {:?}", err);
                }
                Ok(())
            })
            .map_err(|_| HttpServerError::CannotRegisterHandler)?;

        // Must stay last: handlers are matched in registration order.
        for method in [Method::Get, Method::Post] {
            server
                .fn_handler("/*", method, |req| -> Result<(), EspIOError> {
                    log::info!("{} -> 404", req.uri());
                    req.into_status_response(404)?
                        .write_all(b"Not found")
                })
                .map_err(|_| HttpServerError::CannotRegisterHandler)?;
        }

        log::info!("HTTP server listening on port {}", port);
        Ok(Self { _server: server })
    }
}
