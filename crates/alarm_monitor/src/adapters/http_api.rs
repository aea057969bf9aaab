// Rust guideline compliant 2026-10-19

//! HTTP adapter for the `AlarmApi` port.
//!
//! Talks JSON to the lab service via `reqwest`. The session token travels in
//! the [`SESSION_HEADER`] header. A non-2xx status, a connection failure or an
//! undecodable body all map to `ApiError::Transport`; a decoded envelope with
//! `success: false` maps to `ApiError::Rejected`.
//!
//! | Operation            | Request                  |
//! |----------------------|--------------------------|
//! | `get_all_alarms`     | `GET    {base}/alarms`   |
//! | `get_home_page_data` | `GET    {base}/home`     |
//! | `edit_alarm`         | `PUT    {base}/alarms`   |
//! | `remove_alarm`       | `DELETE {base}/alarms/{id}` |
//! | `add_alarm`          | `POST   {base}/alarms`   |

use std::time::Duration;

use domain::{
    Alarm, AlarmApi, AlarmForm, AlarmId, ApiEnvelope, ApiError, DeviceConfig, SessionToken,
};
use serde::de::DeserializeOwned;

/// Header carrying the session token.
pub const SESSION_HEADER: &str = "x-lab-api";

// ---------------------------------------------------------------------------
// HttpApiError
// ---------------------------------------------------------------------------

/// Errors raised while setting up the HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpApiError {
    /// The supplied configuration is invalid.
    #[error("invalid http api configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// The underlying HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// HttpApiConfig + builder
// ---------------------------------------------------------------------------

/// Connection settings for [`HttpAlarmApi`].
///
/// Construct via [`HttpApiConfig::builder`].
#[derive(Debug, Clone)]
pub struct HttpApiConfig {
    /// Service root, without trailing slash (e.g. `http://lab.local/api`).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Builder for [`HttpApiConfig`].
#[derive(Debug)]
pub struct HttpApiConfigBuilder {
    base_url: String,
    timeout: Duration,
}

impl HttpApiConfig {
    /// Create a builder. `base_url` is the only required parameter.
    ///
    /// Default values: `timeout = 5 s`.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> HttpApiConfigBuilder {
        HttpApiConfigBuilder {
            base_url: base_url.into(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl HttpApiConfigBuilder {
    /// Override the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpApiError::InvalidConfig`] when `base_url` is not an
    /// `http(s)://` URL or `timeout` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<HttpApiConfig, HttpApiError> {
        let base_url = self.base_url.trim_end_matches('/').to_owned();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(HttpApiError::InvalidConfig {
                reason: format!("base_url must start with http:// or https://, got {base_url:?}"),
            });
        }
        if self.timeout.is_zero() {
            return Err(HttpApiError::InvalidConfig {
                reason: "timeout must be non-zero".to_owned(),
            });
        }
        Ok(HttpApiConfig { base_url, timeout: self.timeout })
    }
}

// ---------------------------------------------------------------------------
// HttpAlarmApi
// ---------------------------------------------------------------------------

/// `AlarmApi` adapter backed by a `reqwest::Client`.
#[derive(Debug)]
pub struct HttpAlarmApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAlarmApi {
    /// Build the adapter and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpApiError::Client`] when the client cannot be built
    /// (e.g. TLS backend initialisation failure).
    pub fn new(config: HttpApiConfig) -> Result<Self, HttpApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, base_url: config.base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Send `request` with the session header and decode the envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        token: &SessionToken,
    ) -> Result<ApiEnvelope<T>, ApiError> {
        let response = request
            .header(SESSION_HEADER, token.as_str())
            .send()
            .await
            .map_err(transport)?;
        tracing::debug!(status = %response.status(), url = %response.url(), "http_api.response");
        response
            .error_for_status()
            .map_err(transport)?
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(transport)
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport { reason: e.to_string() }
}

impl AlarmApi for HttpAlarmApi {
    async fn get_all_alarms(&self, token: &SessionToken) -> Result<Vec<Alarm>, ApiError> {
        let request = self.client.get(self.url("alarms"));
        self.send::<Vec<Alarm>>(request, token).await?.into_result()
    }

    async fn get_home_page_data(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<DeviceConfig>, ApiError> {
        let request = self.client.get(self.url("home"));
        self.send::<Vec<DeviceConfig>>(request, token).await?.into_result()
    }

    async fn edit_alarm(&self, token: &SessionToken, alarm: &Alarm) -> Result<(), ApiError> {
        let request = self.client.put(self.url("alarms")).json(alarm);
        self.send::<serde_json::Value>(request, token).await?.into_ack()
    }

    async fn remove_alarm(&self, token: &SessionToken, id: &AlarmId) -> Result<(), ApiError> {
        let request = self.client.delete(self.url(&format!("alarms/{id}")));
        self.send::<serde_json::Value>(request, token).await?.into_ack()
    }

    async fn add_alarm(&self, token: &SessionToken, form: &AlarmForm) -> Result<(), ApiError> {
        let request = self.client.post(self.url("alarms")).json(form);
        self.send::<serde_json::Value>(request, token).await?.into_ack()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{HttpAlarmApi, HttpApiConfig, HttpApiError};
    use domain::{AlarmApi as _, AlarmForm, AlarmId, AlarmStatus, ApiError, SessionToken};
    use serde_json::json;
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// True once the buffered request holds its full head and body.
    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw).to_lowercase();
        let Some(head_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..head_end]
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= head_end + 4 + content_length
    }

    /// Serve exactly one HTTP response; the handle yields the raw request.
    async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            while !request_complete(&request) {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}/"), handle)
    }

    fn make_api(base_url: &str) -> HttpAlarmApi {
        HttpAlarmApi::new(HttpApiConfig::builder(base_url).build().unwrap()).unwrap()
    }

    fn token() -> SessionToken {
        SessionToken::new("lab-key")
    }

    #[test]
    fn config_trims_trailing_slash() {
        let config = HttpApiConfig::builder("http://lab.local/api/").build().unwrap();
        assert_eq!(config.base_url, "http://lab.local/api");
    }

    #[test]
    fn config_rejects_non_http_url() {
        let result = HttpApiConfig::builder("lab.local").build();
        assert!(matches!(result, Err(HttpApiError::InvalidConfig { .. })));
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let result = HttpApiConfig::builder("http://lab.local")
            .timeout(std::time::Duration::ZERO)
            .build();
        assert!(matches!(result, Err(HttpApiError::InvalidConfig { .. })));
    }

    #[tokio::test]
    async fn get_all_alarms_sends_token_and_decodes() {
        let body = json!({
            "success": true,
            "data": [{ "AlarmID": 0, "Status": "Triggered", "DeviceName": "Freezer" }]
        })
        .to_string();
        let (base, server) = serve_once("200 OK", body).await;

        let alarms = make_api(&base).get_all_alarms(&token()).await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].id, AlarmId::Server(0));
        assert_eq!(alarms[0].status, AlarmStatus::Triggered);
        assert!(request.starts_with("GET /alarms HTTP/1.1"), "request: {request}");
        assert!(request.to_lowercase().contains("x-lab-api: lab-key"));
    }

    #[tokio::test]
    async fn home_page_data_decodes_devices() {
        let body = json!({
            "success": true,
            "data": [{ "_id": "a1", "DeviceID": 4, "DeviceName": "Incubator", "Frequency": 2.0, "Units": "C" }]
        })
        .to_string();
        let (base, server) = serve_once("200 OK", body).await;

        let devices = make_api(&base).get_home_page_data(&token()).await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(devices[0].device_name, "Incubator");
        assert!(request.starts_with("GET /home HTTP/1.1"));
    }

    #[tokio::test]
    async fn rejected_envelope_maps_to_rejected() {
        let body = json!({ "success": false, "message": "unknown lab" }).to_string();
        let (base, server) = serve_once("200 OK", body).await;

        let result = make_api(&base).get_all_alarms(&token()).await;
        server.await.unwrap();

        assert_eq!(result, Err(ApiError::Rejected { message: "unknown lab".to_owned() }));
    }

    #[tokio::test]
    async fn server_error_maps_to_transport() {
        let (base, server) = serve_once("500 Internal Server Error", "{}".to_owned()).await;

        let result = make_api(&base).get_all_alarms(&token()).await;
        server.await.unwrap();

        assert!(matches!(result, Err(ApiError::Transport { .. })), "got {result:?}");
    }

    #[tokio::test]
    async fn remove_alarm_uses_id_in_path() {
        let (base, server) = serve_once("200 OK", json!({ "success": true }).to_string()).await;

        make_api(&base).remove_alarm(&token(), &AlarmId::Server(3)).await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("DELETE /alarms/3 HTTP/1.1"), "request: {request}");
    }

    #[tokio::test]
    async fn add_alarm_posts_form_fields() {
        let (base, server) = serve_once("200 OK", json!({ "success": true }).to_string()).await;

        let form = AlarmForm::default().with("DeviceName", "Cold Room").with("Threshold", 8);
        make_api(&base).add_alarm(&token(), &form).await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("POST /alarms HTTP/1.1"));
        assert!(request.contains("\"DeviceName\":\"Cold Room\""), "request: {request}");
    }

    #[tokio::test]
    async fn connection_refused_maps_to_transport() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = make_api(&format!("http://{addr}")).get_all_alarms(&token()).await;
        assert!(matches!(result, Err(ApiError::Transport { .. })), "got {result:?}");
    }
}
