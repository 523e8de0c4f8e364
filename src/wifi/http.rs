//! Request parsing and response bodies of the local HTTP API.

use crate::state::LedState;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const HTML_CONTENT_TYPE: &str = "text/html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedRequestError {
    /// The request carried no query string.
    InvalidRequest,
    MissingState,
    /// `state` was neither `on` nor `off`.
    InvalidState,
}

impl LedRequestError {
    pub fn message(&self) -> &'static str {
        match self {
            LedRequestError::InvalidRequest => "Invalid request",
            LedRequestError::MissingState => "Missing state parameter",
            LedRequestError::InvalidState => "Invalid state",
        }
    }
}

/// Extracts the requested LED state from a `/led?state=on|off` URI.
pub fn parse_led_query(uri: &str) -> Result<LedState, LedRequestError> {
    let query = match uri.split_once('?') {
        Some((_, query)) if !query.is_empty() => query,
        _ => return Err(LedRequestError::InvalidRequest),
    };
    let value = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find_map(|(key, value)| (key == "state").then_some(value))
        .ok_or(LedRequestError::MissingState)?;
    match value {
        "on" => Ok(LedState::On),
        "off" => Ok(LedState::Off),
        _ => Err(LedRequestError::InvalidState),
    }
}

pub fn ultrasonic_body(distance_cm: f32, timestamp_ms: u64, led: LedState) -> String {
    format!(
        "{{\"distance\":{:.2},\"timestamp\":{},\"led\":\"{}\"}}",
        distance_cm,
        timestamp_ms,
        led.as_str()
    )
}

pub fn led_status_body(led: LedState) -> String {
    format!("{{\"status\":\"success\",\"led\":\"{}\"}}", led.as_str())
}

pub fn led_control_body(result: Result<LedState, LedRequestError>) -> String {
    match result {
        Ok(led) => led_status_body(led),
        Err(err) => format!(
            "{{\"status\":\"error\",\"message\":\"{}\"}}",
            err.message()
        ),
    }
}

/// Dashboard served at `/`. Polls the JSON routes once per second.
pub const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Distance Logger</title>
<style>
body { font-family: sans-serif; margin: 2em; }
.value { font-size: 2.5em; }
button { font-size: 1.2em; margin-right: 0.5em; }
</style>
</head>
<body>
<h1>Distance Logger</h1>
<p class="value"><span id="distance">--</span> cm</p>
<p>LED: <span id="led">--</span></p>
<p><button onclick="setLed('on')">LED ON</button><button onclick="setLed('off')">LED OFF</button></p>
<h2>History</h2>
<p><a href="/sensor/history">Download history (JSON)</a></p>
<script>
async function refresh() {
  try {
    const data = await (await fetch('/ultrasonic')).json();
    document.getElementById('distance').textContent = data.distance.toFixed(2);
    document.getElementById('led').textContent = data.led;
  } catch (e) {}
}
async function setLed(state) {
  await fetch('/led?state=' + state);
  refresh();
}
setInterval(refresh, 1000);
refresh();
</script>
</body>
</html>
"#;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn led_query_parsing() {
        assert_eq!(parse_led_query("/led?state=on"), Ok(LedState::On));
        assert_eq!(parse_led_query("/led?x=1&state=off"), Ok(LedState::Off));
        assert_eq!(
            parse_led_query("/led"),
            Err(LedRequestError::InvalidRequest)
        );
        assert_eq!(
            parse_led_query("/led?"),
            Err(LedRequestError::InvalidRequest)
        );
        assert_eq!(
            parse_led_query("/led?mode=on"),
            Err(LedRequestError::MissingState)
        );
        assert_eq!(
            parse_led_query("/led?state=blink"),
            Err(LedRequestError::InvalidState)
        );
    }

    #[test]
    fn led_bodies() {
        assert_eq!(
            led_status_body(LedState::On),
            "{\"status\":\"success\",\"led\":\"on\"}"
        );
        assert_eq!(
            led_control_body(Ok(LedState::Off)),
            "{\"status\":\"success\",\"led\":\"off\"}"
        );
        assert_eq!(
            led_control_body(Err(LedRequestError::MissingState)),
            "{\"status\":\"error\",\"message\":\"Missing state parameter\"}"
        );
    }

    #[test]
    fn ultrasonic_body_format() {
        assert_eq!(
            ultrasonic_body(9.996, 12345, LedState::On),
            "{\"distance\":10.00,\"timestamp\":12345,\"led\":\"on\"}"
        );
    }
}
