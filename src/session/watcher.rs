//! Cross-process session sync with file watching and debouncing.
//!
//! When another process logs in or out, the shared session file changes;
//! the watcher re-hydrates the auth store from it.

use std::ffi::OsString;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;

use super::Session;
use crate::events::{AppEvent, EventBus, Route};

/// Errors that can occur during session watching.
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("Failed to create file watcher: {0}")]
    WatcherInit(#[from] notify::Error),

    #[error("Session storage has no backing file")]
    NoBackingFile,

    #[error("Session path has no parent directory")]
    NoParentDir,
}

/// Watches the session file and re-hydrates on changes.
///
/// Runs in a background thread with debouncing to group rapid writes.
pub struct SessionWatcher {
    // Dropping the watcher closes the event channel, which ends the thread.
    _watcher: RecommendedWatcher,
    _debounce_handle: thread::JoinHandle<()>,
}

impl SessionWatcher {
    /// Start watching the session's storage file.
    ///
    /// `events` receives `SessionChanged` after every re-hydration, plus a
    /// navigation to the login route when the session ended elsewhere.
    pub fn start(
        session: Session,
        events: Option<EventBus>,
        debounce_ms: u64,
    ) -> Result<Self, WatcherError> {
        let path = session
            .storage()
            .location()
            .ok_or(WatcherError::NoBackingFile)?
            .to_path_buf();
        let watch_dir = path.parent().ok_or(WatcherError::NoParentDir)?;
        std::fs::create_dir_all(watch_dir).map_err(notify::Error::io)?;
        let file_name = path.file_name().map(|s| s.to_os_string()).unwrap_or_default();

        let (raw_tx, raw_rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                if let Ok(event) = result {
                    let _ = raw_tx.send(event);
                }
            },
            notify::Config::default(),
        )?;

        // Watch the directory: the file is replaced by rename on every write.
        watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

        let debounce_handle = thread::spawn(move || {
            debounce_loop(raw_rx, session, events, file_name, debounce_ms);
        });

        tracing::debug!(path = %path.display(), "Watching session file");

        Ok(Self {
            _watcher: watcher,
            _debounce_handle: debounce_handle,
        })
    }
}

fn debounce_loop(
    rx: mpsc::Receiver<Event>,
    session: Session,
    events: Option<EventBus>,
    file_name: OsString,
    debounce_ms: u64,
) {
    let debounce = Duration::from_millis(debounce_ms);
    let mut pending: Option<Instant> = None;

    loop {
        let timeout = if pending.is_some() {
            debounce
        } else {
            Duration::from_secs(60)
        };

        match rx.recv_timeout(timeout) {
            Ok(event) => {
                if is_session_event(&event, &file_name) {
                    pending = Some(Instant::now());
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Some(last) = pending {
                    if last.elapsed() >= debounce {
                        rehydrate(&session, events.as_ref());
                        pending = None;
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn rehydrate(session: &Session, events: Option<&EventBus>) {
    let was_authenticated = session.snapshot().is_authenticated;
    match session.rehydrate() {
        Ok(state) => {
            tracing::info!(
                authenticated = state.is_authenticated,
                "Session changed in another process"
            );
            if let Some(events) = events {
                events.publish(AppEvent::SessionChanged {
                    authenticated: state.is_authenticated,
                });
                if was_authenticated && !state.is_authenticated {
                    events.publish(AppEvent::Navigate(Route::Login));
                }
            }
        }
        Err(e) => tracing::warn!(error = %e, "Session re-hydration failed"),
    }
}

fn is_session_event(event: &Event, file_name: &OsString) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    );

    relevant
        && event
            .paths
            .iter()
            .any(|p| p.file_name().is_some_and(|name| name == file_name))
}
