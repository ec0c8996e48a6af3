use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::gateway::{AuthGateway, AuthResponse, GatewayError, GatewayResult, LoginRequest, SignupRequest};
use crate::model::User;
use crate::session::{AuthTransition, SecureString, Session};

/// Requests that change the auth session.
#[derive(Debug, Clone)]
pub enum AuthIntent {
    Login(LoginRequest),
    Signup(SignupRequest),
    /// Exchange the stored refresh token for new tokens.
    Refresh,
    Logout,
}

impl AuthIntent {
    fn slot(&self) -> usize {
        match self {
            AuthIntent::Login(_) => 0,
            AuthIntent::Signup(_) => 1,
            AuthIntent::Refresh => 2,
            AuthIntent::Logout => 3,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AuthIntent::Login(_) => "login",
            AuthIntent::Signup(_) => "signup",
            AuthIntent::Refresh => "refresh",
            AuthIntent::Logout => "logout",
        }
    }
}

/// Runs auth intents and keeps storage in step with the session.
///
/// A newer intent of the same kind supersedes an older one still in
/// flight: the older response is dropped.
pub struct AuthRunner<G: ?Sized> {
    session: Session,
    gateway: Arc<G>,
    issued: Arc<[AtomicU64; 4]>,
}

impl<G: ?Sized> Clone for AuthRunner<G> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            gateway: Arc::clone(&self.gateway),
            issued: Arc::clone(&self.issued),
        }
    }
}

impl<G: AuthGateway + ?Sized> AuthRunner<G> {
    pub fn new(session: Session, gateway: Arc<G>) -> Self {
        Self {
            session,
            gateway,
            issued: Arc::new(Default::default()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn execute(&self, intent: AuthIntent) {
        let slot = intent.slot();
        let token = self.issued[slot].fetch_add(1, Ordering::SeqCst) + 1;
        let name = intent.name();
        tracing::debug!(intent = name, token, "Auth intent started");

        let is_latest = || self.issued[slot].load(Ordering::SeqCst) == token;
        match intent {
            AuthIntent::Login(request) => self.login(request, is_latest).await,
            AuthIntent::Signup(request) => self.signup(request, is_latest).await,
            AuthIntent::Refresh => self.refresh(is_latest).await,
            AuthIntent::Logout => self.logout().await,
        }
    }

    /// Run an intent on its own task.
    pub fn dispatch(&self, intent: AuthIntent) -> JoinHandle<()> {
        let runner = self.clone();
        tokio::spawn(async move { runner.execute(intent).await })
    }

    async fn login(&self, request: LoginRequest, is_latest: impl Fn() -> bool) {
        self.session.dispatch(AuthTransition::BeginLogin);
        let result = self.gateway.login(&request).await.and_then(require_user);
        if !is_latest() {
            tracing::debug!("Discarding superseded login response");
            return;
        }
        match result {
            Ok((user, access_token, refresh_token)) => {
                self.persist(&user, &access_token, &refresh_token);
                tracing::info!(email = %user.email, "Login successful");
                self.session.dispatch(AuthTransition::CompleteLogin {
                    user,
                    access_token,
                    refresh_token,
                });
            }
            Err(err) => {
                tracing::warn!(error_type = err.error_type(), error = %err, "Login failed");
                self.session.dispatch(AuthTransition::FailLogin {
                    message: err.message_or("Login failed"),
                });
            }
        }
    }

    async fn signup(&self, request: SignupRequest, is_latest: impl Fn() -> bool) {
        self.session.dispatch(AuthTransition::BeginSignup);
        let result = self.gateway.signup(&request).await.and_then(require_user);
        if !is_latest() {
            tracing::debug!("Discarding superseded signup response");
            return;
        }
        match result {
            Ok((user, access_token, refresh_token)) => {
                self.persist(&user, &access_token, &refresh_token);
                tracing::info!(email = %user.email, "Signup successful");
                self.session.dispatch(AuthTransition::CompleteSignup {
                    user,
                    access_token,
                    refresh_token,
                });
            }
            Err(err) => {
                tracing::warn!(error_type = err.error_type(), error = %err, "Signup failed");
                self.session.dispatch(AuthTransition::FailSignup {
                    message: err.message_or("Signup failed"),
                });
            }
        }
    }

    async fn refresh(&self, is_latest: impl Fn() -> bool) {
        let refresh_token = self.session.snapshot().refresh_token.clone();
        self.session.dispatch(AuthTransition::BeginRefresh);

        let result = match refresh_token {
            Some(token) => self.gateway.refresh(&token).await,
            None => Err(GatewayError::Unauthorized {
                message: "No refresh token available".to_string(),
            }),
        };
        if !is_latest() {
            tracing::debug!("Discarding superseded refresh response");
            return;
        }

        match result {
            Ok(response) => {
                if let Err(e) = self
                    .session
                    .persist_tokens(&response.access_token, &response.refresh_token)
                {
                    tracing::warn!(error = %e, "Failed to persist refreshed tokens");
                }
                tracing::info!("Token refreshed");
                self.session.dispatch(AuthTransition::CompleteRefresh {
                    access_token: response.access_token,
                    refresh_token: response.refresh_token,
                });
            }
            Err(err) => {
                tracing::warn!(error_type = err.error_type(), error = %err, "Token refresh failed");
                if let Err(e) = self.session.clear_persisted() {
                    tracing::warn!(error = %e, "Failed to clear persisted session");
                }
                self.session.dispatch(AuthTransition::FailRefresh {
                    message: err.message_or("Token refresh failed"),
                });
            }
        }
    }

    /// Log out on the server, then locally. Local state is cleared even
    /// when the server call fails.
    async fn logout(&self) {
        if let Err(err) = self.gateway.logout().await {
            tracing::warn!(error = %err, "Server logout failed");
        }
        self.session.force_logout();
    }

    pub async fn forgot_password(&self, email: &str) -> GatewayResult<String> {
        self.gateway.forgot_password(email).await
    }

    pub async fn reset_password(&self, token: &str, password: &SecureString) -> GatewayResult<String> {
        self.gateway.reset_password(token, password).await
    }

    fn persist(&self, user: &User, access_token: &SecureString, refresh_token: &SecureString) {
        let result = self
            .session
            .persist_tokens(access_token, refresh_token)
            .and_then(|()| self.session.persist_user(user));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist session");
        }
    }
}

fn require_user(response: AuthResponse) -> GatewayResult<(User, SecureString, SecureString)> {
    match response.user {
        Some(user) => Ok((user, response.access_token, response.refresh_token)),
        None => Err(GatewayError::Decode(
            "auth response did not include the user".to_string(),
        )),
    }
}
