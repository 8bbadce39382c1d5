// ABOUTME: Authenticated HTTP client for the node's REST API
// ABOUTME: Maps non-success responses to LavalinkError, success bodies to typed models

use super::error::LavalinkError;
use crate::error::Error;
use crate::node::ConnectionConfig;
use crate::protocol::models::Player;
use crate::protocol::payload::FromPayload;
use serde_json::Value;

/// REST client sharing the session's credentials
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    trace: bool,
}

impl RestClient {
    /// Build a client with the config's header set as default headers
    pub fn new(config: &ConnectionConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .default_headers(config.headers()?)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.rest_base_url(),
            trace: config.trace,
        })
    }

    /// `{http|https}://{host}:{port}/v3`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Underlying HTTP client, for endpoints this crate does not wrap
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// GET `{base_url}/{path}` and return the decoded JSON body.
    ///
    /// A non-success status fails with [`Error::Api`] when the body is a node error payload,
    /// and with [`Error::Http`] otherwise. An empty success body decodes to `Value::Null`.
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        log::debug!("GET {url}");

        let mut request = self.http.get(&url);
        if self.trace {
            request = request.query(&[("trace", "true")]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            return match serde_json::from_slice::<LavalinkError>(&body) {
                Ok(err) => {
                    log::warn!("GET {url} failed: {err}");
                    Err(Error::Api(err))
                }
                Err(_) => Err(Error::Http(format!("{status} from {url}"))),
            };
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body)
            .map_err(|e| Error::Protocol(format!("invalid response body from {url}: {e}")))
    }

    /// List the players of a session, in the order the node returns them.
    ///
    /// Accepts a bare array or an object with a `players` array. Fails as a whole if any
    /// element does not decode.
    pub async fn get_players(&self, session_id: &str) -> Result<Vec<Player>, Error> {
        let body = self.get(&format!("sessions/{session_id}/players")).await?;

        let players = match body {
            Value::Array(_) => body,
            Value::Object(mut map) => map
                .remove("players")
                .ok_or_else(|| Error::Protocol("player listing has no `players` field".to_string()))?,
            other => {
                return Err(Error::Protocol(format!(
                    "expected a player listing, got {other}"
                )))
            }
        };

        Vec::<Player>::from_payload(&players)
    }
}
