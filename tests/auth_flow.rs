//! Auth intents against the mock backend with file-backed sessions.

mod common;

use std::sync::Arc;

use common::mock_backend::{MockBackend, MockResponse};
use expense_flow::effects::{AuthIntent, AuthRunner};
use expense_flow::gateway::{AuthGateway, LoginRequest, RestAuthGateway};
use expense_flow::session::{
    AuthTransition, FileSessionStorage, SecureString, Session, ACCESS_TOKEN_KEY,
};
use serde_json::json;
use tempfile::TempDir;

fn file_session(dir: &TempDir) -> Session {
    let storage = FileSessionStorage::new(dir.path().join("session.json"));
    let session = Session::new(Arc::new(storage));
    session.init();
    session
}

fn runner(backend: &MockBackend, session: &Session) -> AuthRunner<dyn AuthGateway> {
    let client = common::client(&backend.base_url()).with_bearer(Arc::new(session.clone()));
    let gateway: Arc<dyn AuthGateway> = Arc::new(RestAuthGateway::new(client));
    AuthRunner::new(session.clone(), gateway)
}

fn login(password: &str) -> AuthIntent {
    AuthIntent::Login(LoginRequest {
        email: "an@example.com".to_string(),
        password: SecureString::new(password.to_string()),
    })
}

fn tokens_json(access: &str, refresh: &str) -> serde_json::Value {
    json!({
        "accessToken": access,
        "refreshToken": refresh,
        "user": common::user_json()
    })
}

#[tokio::test]
async fn rejected_login_leaves_session_empty() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let session = file_session(&dir);

    backend
        .enqueue_response(MockResponse::error(401, "Invalid credentials"))
        .await;
    runner(&backend, &session).execute(login("wrong")).await;

    let state = session.snapshot();
    assert!(state.user.is_none());
    assert!(state.access_token.is_none());
    assert!(!state.is_authenticated);
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
    assert!(session.load_persisted().unwrap().is_empty());

    let requests = backend.captured_requests().await;
    assert_eq!(requests[0].path, "/auth/login");
    assert_eq!(requests[0].json()["email"], "an@example.com");
    assert_eq!(requests[0].json()["password"], "wrong");
}

#[tokio::test]
async fn login_persists_and_next_session_hydrates() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let session = file_session(&dir);

    backend
        .enqueue_response(MockResponse::enveloped(tokens_json("access-1", "refresh-1")))
        .await;
    runner(&backend, &session).execute(login("Secret123")).await;

    let state = session.snapshot();
    assert!(state.is_authenticated);
    assert_eq!(state.user, Some(common::user()));
    assert_eq!(
        state.access_token.as_ref().map(|t| t.expose()),
        Some("access-1")
    );

    // Another process starting later picks the session up from the file.
    let next = file_session(&dir);
    let hydrated = next.snapshot();
    assert!(hydrated.is_authenticated);
    assert_eq!(hydrated.user, Some(common::user()));
    assert_eq!(
        hydrated.refresh_token.as_ref().map(|t| t.expose()),
        Some("refresh-1")
    );
}

#[tokio::test]
async fn refresh_sends_stored_token_and_keeps_user() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let session = file_session(&dir);
    session.dispatch(AuthTransition::CompleteLogin {
        user: common::user(),
        access_token: SecureString::new("old-access".to_string()),
        refresh_token: SecureString::new("old-refresh".to_string()),
    });

    backend
        .enqueue_response(MockResponse::enveloped(json!({
            "accessToken": "new-access",
            "refreshToken": "new-refresh"
        })))
        .await;
    runner(&backend, &session).execute(AuthIntent::Refresh).await;

    let requests = backend.captured_requests().await;
    assert_eq!(requests[0].path, "/auth/refresh");
    assert_eq!(requests[0].json(), json!({ "refreshToken": "old-refresh" }));
    assert_eq!(
        requests[0].header("authorization"),
        Some("Bearer old-access")
    );

    let state = session.snapshot();
    assert_eq!(state.user, Some(common::user()));
    assert_eq!(
        state.access_token.as_ref().map(|t| t.expose()),
        Some("new-access")
    );
    assert_eq!(
        session.storage().get(ACCESS_TOKEN_KEY).unwrap().as_deref(),
        Some("new-access")
    );
}

#[tokio::test]
async fn failed_refresh_clears_everything() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let session = file_session(&dir);
    session
        .persist_tokens(
            &SecureString::new("a".to_string()),
            &SecureString::new("r".to_string()),
        )
        .unwrap();
    session.rehydrate().unwrap();
    assert!(session.is_authenticated());

    backend
        .enqueue_response(MockResponse::error(401, "Refresh token revoked"))
        .await;
    runner(&backend, &session).execute(AuthIntent::Refresh).await;

    let state = session.snapshot();
    assert!(!state.is_authenticated);
    assert_eq!(state.error.as_deref(), Some("Refresh token revoked"));
    assert!(session.load_persisted().unwrap().is_empty());
}

#[tokio::test]
async fn logout_clears_state_when_server_fails() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let session = file_session(&dir);

    backend
        .enqueue_response(MockResponse::enveloped(tokens_json("access-1", "refresh-1")))
        .await;
    let auth = runner(&backend, &session);
    auth.execute(login("Secret123")).await;
    assert!(session.is_authenticated());

    backend
        .enqueue_response(MockResponse::error(500, "boom"))
        .await;
    auth.execute(AuthIntent::Logout).await;

    let requests = backend.captured_requests().await;
    let logout = requests.last().unwrap();
    assert_eq!(logout.method, "POST");
    assert_eq!(logout.path, "/auth/logout");
    assert!(logout.body.is_empty());

    assert!(!session.is_authenticated());
    assert!(session.snapshot().user.is_none());
    assert!(file_session(&dir).snapshot().access_token.is_none());
}

#[tokio::test]
async fn password_recovery_returns_server_message() {
    let backend = MockBackend::start().await;
    let session = Session::in_memory();
    let auth = runner(&backend, &session);

    backend
        .enqueue_response(MockResponse::json(json!({
            "message": "Reset link sent",
            "data": null
        })))
        .await;
    let message = auth.forgot_password("an@example.com").await.unwrap();
    assert_eq!(message, "Reset link sent");

    backend
        .enqueue_response(MockResponse::error(400, "Token expired"))
        .await;
    let err = auth
        .reset_password("tok", &SecureString::new("Secret123".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.message().as_deref(), Some("Token expired"));

    let requests = backend.captured_requests().await;
    assert_eq!(requests[0].path, "/auth/forgot-password");
    assert_eq!(requests[1].path, "/auth/reset-password");
    assert_eq!(
        requests[1].json(),
        json!({ "token": "tok", "password": "Secret123" })
    );
    assert!(!session.is_authenticated());
}
