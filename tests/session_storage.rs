//! File-backed sessions shared between processes.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::wait_until;
use expense_flow::events::{AppEvent, EventBus, Route};
use expense_flow::session::{
    FileSessionStorage, SecureString, Session, SessionWatcher, USER_KEY,
};
use tempfile::TempDir;

fn session_at(dir: &TempDir) -> Session {
    let storage = FileSessionStorage::new(dir.path().join("session.json"));
    let session = Session::new(Arc::new(storage));
    session.init();
    session
}

fn sign_in(session: &Session) {
    session
        .persist_tokens(
            &SecureString::new("access-1".to_string()),
            &SecureString::new("refresh-1".to_string()),
        )
        .unwrap();
    session.persist_user(&common::user()).unwrap();
}

#[test]
fn corrupt_file_starts_logged_out() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("session.json"), "{ not json").unwrap();

    let session = session_at(&dir);
    assert!(!session.is_authenticated());

    // Writing again replaces the corrupt content.
    sign_in(&session);
    let state = session.rehydrate().unwrap();
    assert!(state.is_authenticated);
    assert_eq!(state.user, Some(common::user()));
}

#[test]
fn unreadable_user_keeps_tokens() {
    let dir = TempDir::new().unwrap();
    let session = session_at(&dir);
    sign_in(&session);
    session.storage().set(USER_KEY, "{broken").unwrap();

    let state = session_at(&dir).snapshot();
    assert!(state.is_authenticated);
    assert!(state.user.is_none());
}

#[tokio::test]
async fn watcher_follows_login_and_logout_elsewhere() {
    let dir = TempDir::new().unwrap();
    let other_process = session_at(&dir);
    let session = session_at(&dir);
    let events = EventBus::default();
    let mut rx = events.subscribe();

    let _watcher = SessionWatcher::start(session.clone(), Some(events.clone()), 50).unwrap();

    sign_in(&other_process);
    assert!(
        wait_until(Duration::from_secs(5), || session.snapshot().user.is_some()).await,
        "login in the other process was not picked up"
    );
    assert!(session.is_authenticated());
    assert_eq!(session.snapshot().user, Some(common::user()));

    other_process.force_logout();
    assert!(
        wait_until(Duration::from_secs(5), || !session.is_authenticated()).await,
        "logout in the other process was not picked up"
    );

    let mut received = Vec::new();
    while let Ok(event) = rx.try_recv() {
        received.push(event);
    }
    assert!(received.contains(&AppEvent::SessionChanged {
        authenticated: true
    }));
    assert!(received.contains(&AppEvent::Navigate(Route::Login)));
}
