//! Authentication endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::client::{decode, unwrap_envelope, ApiClient};
use super::error::GatewayResult;
use crate::model::User;
use crate::session::SecureString;

pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/auth/signup";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecureString,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: SecureString,
    pub full_name: String,
}

/// Tokens (and, except on refresh, the user) returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: SecureString,
    pub refresh_token: SecureString,
    #[serde(default)]
    pub user: Option<User>,
}

#[async_trait]
pub trait AuthGateway: Send + Sync + 'static {
    async fn login(&self, request: &LoginRequest) -> GatewayResult<AuthResponse>;

    async fn signup(&self, request: &SignupRequest) -> GatewayResult<AuthResponse>;

    async fn refresh(&self, refresh_token: &SecureString) -> GatewayResult<AuthResponse>;

    async fn logout(&self) -> GatewayResult<()>;

    /// Returns the server's confirmation message.
    async fn forgot_password(&self, email: &str) -> GatewayResult<String>;

    async fn reset_password(&self, token: &str, password: &SecureString) -> GatewayResult<String>;
}

pub struct RestAuthGateway {
    client: ApiClient,
}

impl RestAuthGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthGateway for RestAuthGateway {
    async fn login(&self, request: &LoginRequest) -> GatewayResult<AuthResponse> {
        decode(self.client.post(LOGIN_PATH, Some(request)).await?)
    }

    async fn signup(&self, request: &SignupRequest) -> GatewayResult<AuthResponse> {
        decode(self.client.post(SIGNUP_PATH, Some(request)).await?)
    }

    async fn refresh(&self, refresh_token: &SecureString) -> GatewayResult<AuthResponse> {
        let body = json!({ "refreshToken": refresh_token.expose() });
        decode(self.client.post(REFRESH_PATH, Some(&body)).await?)
    }

    async fn logout(&self) -> GatewayResult<()> {
        self.client.post::<Value>(LOGOUT_PATH, None).await?;
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> GatewayResult<String> {
        let body = json!({ "email": email });
        let value = self.client.post(FORGOT_PASSWORD_PATH, Some(&body)).await?;
        Ok(confirmation(value))
    }

    async fn reset_password(&self, token: &str, password: &SecureString) -> GatewayResult<String> {
        let body = json!({ "token": token, "password": password.expose() });
        let value = self.client.post(RESET_PASSWORD_PATH, Some(&body)).await?;
        Ok(confirmation(value))
    }
}

fn confirmation(value: Value) -> String {
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);
    message
        .or_else(|| {
            unwrap_envelope(value)
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_default()
}
