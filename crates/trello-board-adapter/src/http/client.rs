/*
[INPUT]:  HTTP configuration (base URL, timeouts, key/token credentials)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::fmt;
use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::http::{Result, TrelloError};

/// Base URL for the Trello REST API
const API_BASE_URL: &str = "https://api.trello.com";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// API key + token pair sent as `key`/`token` query parameters
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_token: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_token: api_token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Main HTTP client for the Trello API
#[derive(Debug, Clone)]
pub struct TrelloClient {
    http_client: Client,
    base_url: Url,
    timeout: Duration,
    credentials: Option<Credentials>,
}

impl TrelloClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, API_BASE_URL)
    }

    /// Create a client against another host (mock servers, proxies)
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            timeout: config.timeout,
            credentials: None,
        })
    }

    /// Builder-style variant of [`TrelloClient::set_credentials`]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Build full URL for an API endpoint
    pub(crate) fn api_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint)?)
    }

    /// Build an authenticated request builder for an endpoint
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.api_url(endpoint)?;
        self.request_url(method, url)
    }

    /// Build an authenticated request builder for a prepared URL
    pub(crate) fn request_url(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| TrelloError::Authentication {
                message: "API key and token not configured".to_string(),
            })?;
        Ok(self.http_client.request(method, url).query(&[
            ("key", credentials.api_key.as_str()),
            ("token", credentials.api_token.as_str()),
        ]))
    }

    /// Send a request and decode a JSON body, mapping HTTP failures to [`TrelloError`]
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await.map_err(|err| self.transport_error(err))?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), %body, "Trello request failed");
            return Err(TrelloError::from_status(status, body, retry_after));
        }

        let body = response.text().await.map_err(|err| self.transport_error(err))?;
        serde_json::from_str(&body).map_err(|err| {
            debug!(error = %err, %body, "Failed to decode Trello response");
            TrelloError::Serialization(err)
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> TrelloError {
        if err.is_timeout() {
            TrelloError::Timeout {
                duration: self.timeout.as_secs(),
            }
        } else {
            TrelloError::Http(err)
        }
    }
}
