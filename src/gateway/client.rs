//! Shared HTTP client for the finance backend.
//!
//! Base URL, timeouts and bearer injection are configured once here; the
//! REST gateways only deal with paths, payloads and response shapes.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderName, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::{GatewayError, GatewayResult};
use crate::config::ApiConfig;
use crate::session::SecureString;

/// Source of the current access token.
pub trait BearerSource: Send + Sync {
    fn bearer_token(&self) -> Option<SecureString>;
}

/// Header name and value for authentication.
pub type AuthHeader = (HeaderName, String);

/// Build the `Authorization: Bearer` header for a token.
///
/// Returns `None` for a missing or empty token.
pub fn build_auth_header(token: Option<&SecureString>) -> Option<AuthHeader> {
    let token = token?;
    if token.expose().is_empty() {
        return None;
    }
    Some((AUTHORIZATION, format!("Bearer {}", token.expose())))
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    bearer: Option<Arc<dyn BearerSource>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> GatewayResult<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            bearer: None,
        })
    }

    /// Attach the token source used for every request.
    pub fn with_bearer(mut self, source: Arc<dyn BearerSource>) -> Self {
        self.bearer = Some(source);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> GatewayResult<Value> {
        let builder = self.request(Method::GET, path, query)?;
        self.execute(builder).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> GatewayResult<Value> {
        let mut builder = self.request(Method::POST, path, &[])?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(builder).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> GatewayResult<Value> {
        let builder = self.request(Method::PUT, path, &[])?.json(body);
        self.execute(builder).await
    }

    pub async fn delete(&self, path: &str) -> GatewayResult<Value> {
        let builder = self.request(Method::DELETE, path, &[])?;
        self.execute(builder).await
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
    ) -> GatewayResult<RequestBuilder> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| GatewayError::InvalidRequest(format!("{}{}: {}", self.base_url, path, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        tracing::debug!(method = %method, url = %url, "Gateway request");

        let mut builder = self.http.request(method, url);
        let token = self.bearer.as_ref().and_then(|source| source.bearer_token());
        if let Some((name, value)) = build_auth_header(token.as_ref()) {
            builder = builder.header(name, value);
        }
        Ok(builder)
    }

    async fn execute(&self, builder: RequestBuilder) -> GatewayResult<Value> {
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let err = GatewayError::from_status(status.as_u16(), error_message(&body));
            tracing::debug!(
                status = status.as_u16(),
                error_type = err.error_type(),
                "Gateway rejected request"
            );
            return Err(err);
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                duration: self.timeout.as_secs(),
            }
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Connection(err.to_string())
        }
    }
}

/// Pull `message` (or `error`) out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Strip the `{data, message, code}` envelope if present.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode a (possibly enveloped) payload into `T`.
pub fn decode<T: DeserializeOwned>(value: Value) -> GatewayResult<T> {
    serde_json::from_value(unwrap_envelope(value)).map_err(|e| GatewayError::Decode(e.to_string()))
}
