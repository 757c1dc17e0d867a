//! W3C WebDriver client for headless map capture.
//!
//! Speaks the wire protocol directly against a chromedriver endpoint
//! rather than pulling in a browser-automation framework; the capture
//! flow only needs five commands (new session, navigate, find element,
//! displayed, element screenshot) plus session teardown.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use image::{ImageFormat, RgbImage};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use extract_common::{ExtractError, ExtractResult};

use crate::MapCapture;

/// W3C element identifier key in find-element responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Configuration for the WebDriver capture client.
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// Base URL of the chromedriver endpoint
    pub endpoint: String,
    /// Browser window width in pixels
    pub window_width: u32,
    /// Browser window height in pixels
    pub window_height: u32,
    /// Maximum time to wait for the map element to become visible
    pub visibility_timeout: Duration,
    /// Delay between visibility polls
    pub poll_interval: Duration,
    /// Fixed settle delay after the element is visible, letting tiles
    /// finish drawing before the screenshot fires
    pub settle_delay: Duration,
    /// HTTP request timeout for individual WebDriver commands
    pub request_timeout: Duration,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9515".to_string(),
            window_width: 1920,
            window_height: 1080,
            visibility_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
            settle_delay: Duration::from_secs(5),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Headless-browser capture over the WebDriver protocol.
pub struct WebDriverCapture {
    client: Client,
    config: WebDriverConfig,
}

impl WebDriverCapture {
    /// Create a capture client against the configured endpoint.
    pub fn new(config: WebDriverConfig) -> ExtractResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ExtractError::capture(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn command_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// POST a WebDriver command and unwrap the `value` envelope.
    async fn wd_post(&self, path: &str, body: Value) -> ExtractResult<Value> {
        let response = self
            .client
            .post(self.command_url(path))
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::capture(format!("WebDriver request failed: {}", e)))?;
        unwrap_envelope(path, response.status(), response.json().await.ok()).map(|v| v.0)
    }

    /// GET a WebDriver command and unwrap the `value` envelope.
    async fn wd_get(&self, path: &str) -> ExtractResult<Value> {
        let response = self
            .client
            .get(self.command_url(path))
            .send()
            .await
            .map_err(|e| ExtractError::capture(format!("WebDriver request failed: {}", e)))?;
        unwrap_envelope(path, response.status(), response.json().await.ok()).map(|v| v.0)
    }

    async fn create_session(&self) -> ExtractResult<String> {
        let value = self
            .wd_post(
                "session",
                session_request_body(self.config.window_width, self.config.window_height),
            )
            .await?;
        value
            .get("sessionId")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| ExtractError::capture("session response missing sessionId"))
    }

    async fn delete_session(&self, session_id: &str) -> ExtractResult<()> {
        let response = self
            .client
            .delete(self.command_url(&format!("session/{}", session_id)))
            .send()
            .await
            .map_err(|e| ExtractError::capture(format!("WebDriver request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(ExtractError::capture(format!(
                "session delete returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn navigate(&self, session_id: &str, url: &str) -> ExtractResult<()> {
        self.wd_post(&format!("session/{}/url", session_id), json!({ "url": url }))
            .await?;
        Ok(())
    }

    /// Look up the element once; `None` while the page has not created
    /// it yet.
    async fn try_find_element(
        &self,
        session_id: &str,
        selector: &str,
    ) -> ExtractResult<Option<String>> {
        let response = self
            .client
            .post(self.command_url(&format!("session/{}/element", session_id)))
            .json(&json!({ "using": "css selector", "value": selector }))
            .send()
            .await
            .map_err(|e| ExtractError::capture(format!("WebDriver request failed: {}", e)))?;

        // no-such-element comes back as 404; that just means keep polling
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let value =
            unwrap_envelope("element", response.status(), response.json().await.ok())?.0;
        element_reference(&value).map(Some)
    }

    async fn is_displayed(&self, session_id: &str, element_ref: &str) -> ExtractResult<bool> {
        let value = self
            .wd_get(&format!(
                "session/{}/element/{}/displayed",
                session_id, element_ref
            ))
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn element_screenshot(
        &self,
        session_id: &str,
        element_ref: &str,
    ) -> ExtractResult<RgbImage> {
        let value = self
            .wd_get(&format!(
                "session/{}/element/{}/screenshot",
                session_id, element_ref
            ))
            .await?;
        let encoded = value
            .as_str()
            .ok_or_else(|| ExtractError::capture("screenshot response was not a string"))?;
        decode_screenshot(encoded)
    }

    /// Wait for the element, settle, screenshot. Runs inside an open
    /// session; the caller owns teardown.
    async fn capture_in_session(
        &self,
        session_id: &str,
        url: &str,
        element_id: &str,
    ) -> ExtractResult<RgbImage> {
        self.navigate(session_id, url).await?;

        let selector = css_selector_for(element_id);
        let deadline = Instant::now() + self.config.visibility_timeout;
        let element_ref = loop {
            if let Some(element_ref) = self.try_find_element(session_id, &selector).await? {
                if self.is_displayed(session_id, &element_ref).await? {
                    break element_ref;
                }
            }
            if Instant::now() >= deadline {
                return Err(ExtractError::capture(format!(
                    "element '{}' not visible within {:.1}s",
                    selector,
                    self.config.visibility_timeout.as_secs_f64()
                )));
            }
            sleep(self.config.poll_interval).await;
        };

        debug!(
            selector = %selector,
            settle_secs = self.config.settle_delay.as_secs_f64(),
            "map element visible, waiting for tiles to settle"
        );
        sleep(self.config.settle_delay).await;

        self.element_screenshot(session_id, &element_ref).await
    }
}

#[async_trait]
impl MapCapture for WebDriverCapture {
    async fn capture(&self, url: &str, element_id: &str) -> ExtractResult<RgbImage> {
        let session_id = self.create_session().await?;
        debug!(session_id = %session_id, url = %url, "WebDriver session created");

        let result = self.capture_in_session(&session_id, url, element_id).await;

        // Teardown runs on both paths; a leaked session pins a whole
        // browser process on the driver host.
        if let Err(e) = self.delete_session(&session_id).await {
            warn!(session_id = %session_id, error = %e, "failed to delete WebDriver session");
        }

        result
    }
}

/// New-session payload for a fixed-size headless Chrome window.
fn session_request_body(width: u32, height: u32) -> Value {
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": {
                    "args": [
                        "--headless",
                        format!("--window-size={},{}", width, height),
                    ]
                }
            }
        }
    })
}

fn css_selector_for(element_id: &str) -> String {
    format!("#{}", element_id.trim_start_matches('#'))
}

/// Pull the opaque element reference out of a find-element response.
fn element_reference(value: &Value) -> ExtractResult<String> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| ExtractError::capture("find-element response missing element reference"))
}

/// Decode a base64 PNG screenshot payload into an RGB raster.
fn decode_screenshot(encoded: &str) -> ExtractResult<RgbImage> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| ExtractError::capture(format!("invalid base64 screenshot: {}", e)))?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map_err(|e| ExtractError::capture(format!("invalid PNG screenshot: {}", e)))?;
    Ok(image.to_rgb8())
}

/// Newtype so envelope unwrapping has one return shape.
#[derive(Debug)]
struct Unwrapped(Value);

/// Check status and strip the W3C `{"value": ...}` envelope, surfacing
/// the protocol's own error message when present.
fn unwrap_envelope(
    command: &str,
    status: StatusCode,
    body: Option<Value>,
) -> ExtractResult<Unwrapped> {
    let value = body.and_then(|mut b| b.get_mut("value").map(Value::take));
    if !status.is_success() {
        let message = value
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("no error detail")
            .to_string();
        return Err(ExtractError::capture(format!(
            "{} command returned {}: {}",
            command, status, message
        )));
    }
    value
        .map(Unwrapped)
        .ok_or_else(|| ExtractError::capture(format!("{} response missing value envelope", command)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{png_bytes, solid_image};

    #[test]
    fn test_session_request_shape() {
        let body = session_request_body(1920, 1080);
        let args = &body["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"];
        assert_eq!(args[0], "--headless");
        assert_eq!(args[1], "--window-size=1920,1080");
        assert_eq!(
            body["capabilities"]["alwaysMatch"]["browserName"],
            "chrome"
        );
    }

    #[test]
    fn test_css_selector_formatting() {
        assert_eq!(css_selector_for("wv-map"), "#wv-map");
        assert_eq!(css_selector_for("#wv-map"), "#wv-map");
    }

    #[test]
    fn test_element_reference_extraction() {
        let value = json!({ ELEMENT_KEY: "abc-123" });
        assert_eq!(element_reference(&value).unwrap(), "abc-123");

        let missing = json!({ "unrelated": true });
        assert!(element_reference(&missing).is_err());
    }

    #[test]
    fn test_unwrap_envelope_success() {
        let body = json!({ "value": { "sessionId": "s1" } });
        let value = unwrap_envelope("session", StatusCode::OK, Some(body))
            .unwrap()
            .0;
        assert_eq!(value["sessionId"], "s1");
    }

    #[test]
    fn test_unwrap_envelope_protocol_error() {
        let body = json!({
            "value": { "error": "no such window", "message": "window was closed" }
        });
        let err = unwrap_envelope("url", StatusCode::INTERNAL_SERVER_ERROR, Some(body))
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("url command"));
        assert!(text.contains("window was closed"));
    }

    #[test]
    fn test_unwrap_envelope_missing_value() {
        let err = unwrap_envelope("session", StatusCode::OK, Some(json!({}))).unwrap_err();
        assert!(err.to_string().contains("missing value envelope"));
    }

    #[test]
    fn test_decode_screenshot_round_trip() {
        let img = solid_image(6, 4, [120, 30, 200]);
        let encoded = base64::engine::general_purpose::STANDARD.encode(png_bytes(&img));

        let decoded = decode_screenshot(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), (6, 4));
        assert_eq!(decoded.get_pixel(3, 2).0, [120, 30, 200]);
    }

    #[test]
    fn test_decode_screenshot_rejects_garbage() {
        assert!(decode_screenshot("!!not-base64!!").is_err());

        let not_png = base64::engine::general_purpose::STANDARD.encode(b"plain text");
        assert!(decode_screenshot(&not_png).is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = WebDriverConfig::default();
        assert_eq!(config.endpoint, "http://localhost:9515");
        assert_eq!(config.window_width, 1920);
        assert_eq!(config.window_height, 1080);
        assert_eq!(config.visibility_timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.settle_delay, Duration::from_secs(5));
    }
}
