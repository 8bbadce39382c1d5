// ABOUTME: Connection parameters for a Lavalink node
// ABOUTME: Builds endpoint URLs and the authentication header set

use crate::error::Error;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use std::time::Duration;

/// Value sent in the `Client-Name` header
pub const CLIENT_NAME: &str = concat!("lava-rs/", env!("CARGO_PKG_VERSION"));

/// API version prefix for every endpoint
pub const API_VERSION: &str = "v3";

const USER_ID: HeaderName = HeaderName::from_static("user-id");
const CLIENT_NAME_HEADER: HeaderName = HeaderName::from_static("client-name");
const RESUME_KEY: HeaderName = HeaderName::from_static("resume-key");

/// Where and how to reach a node
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Node hostname or address
    pub host: String,
    /// Node port
    pub port: u16,
    /// Node password, sent as `Authorization`
    pub password: String,
    /// Discord user id of the bot, sent as `User-Id`
    pub bot_id: u64,
    /// Key for resuming a previous session
    pub resume_key: Option<String>,
    /// Use `wss`/`https` instead of `ws`/`http`
    pub ssl: bool,
    /// Ask the node to include stack traces in REST error payloads
    pub trace: bool,
    /// Timeout for every REST call, the WebSocket handshake, and the close frame
    pub request_timeout: Duration,
}

impl ConnectionConfig {
    /// Create a plain-text config with no resume key
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>, bot_id: u64) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            bot_id,
            resume_key: None,
            ssl: false,
            trace: false,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Resume a previous session with `key`
    pub fn with_resume_key(mut self, key: impl Into<String>) -> Self {
        self.resume_key = Some(key.into());
        self
    }

    /// Use `wss`/`https`
    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.ssl = ssl;
        self
    }

    /// Request stack traces in REST error payloads
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Bound REST calls, the handshake, and the close frame by `timeout`
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// `{ws|wss}://{host}:{port}/v3/websocket`
    pub fn websocket_url(&self) -> String {
        let scheme = if self.ssl { "wss" } else { "ws" };
        format!("{scheme}://{}:{}/{API_VERSION}/websocket", self.host, self.port)
    }

    /// `{http|https}://{host}:{port}/v3`
    pub fn rest_base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}/{API_VERSION}", self.host, self.port)
    }

    /// Headers sent on the WebSocket handshake and on every REST call
    pub fn headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();

        let mut password = HeaderValue::from_str(&self.password)
            .map_err(|_| Error::InvalidHeader("Authorization"))?;
        password.set_sensitive(true);
        headers.insert(AUTHORIZATION, password);
        headers.insert(USER_ID, HeaderValue::from(self.bot_id));
        headers.insert(CLIENT_NAME_HEADER, HeaderValue::from_static(CLIENT_NAME));

        if let Some(key) = &self.resume_key {
            let key = HeaderValue::from_str(key).map_err(|_| Error::InvalidHeader("Resume-Key"))?;
            headers.insert(RESUME_KEY, key);
        }

        Ok(headers)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"***")
            .field("bot_id", &self.bot_id)
            .field("resume_key", &self.resume_key.as_ref().map(|_| "***"))
            .field("ssl", &self.ssl)
            .field("trace", &self.trace)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
