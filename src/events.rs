//! Application events for consumers: navigation requests, notifications
//! and session changes.

use tokio::sync::broadcast;

use crate::effects::RejectionHandler;
use crate::gateway::{GatewayError, StatusClass};
use crate::session::Session;

/// Places a consumer can be asked to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    ForgotPassword,
    Dashboard,
    Transactions,
    Accounts,
    Categories,
    Reports,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::ForgotPassword => "/forgot-password",
            Route::Dashboard => "/dashboard",
            Route::Transactions => "/transactions",
            Route::Accounts => "/accounts",
            Route::Categories => "/categories",
            Route::Reports => "/reports",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Navigate(Route),
    Notify(Notification),
    SessionChanged { authenticated: bool },
}

/// Fan-out channel for [`AppEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Events with no subscriber are dropped.
    pub fn publish(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        self.publish(AppEvent::Notify(Notification {
            level,
            message: message.into(),
        }));
    }
}

/// Routes gateway rejections to the session and to notifications.
///
/// An unauthorized response ends the session and asks for the login
/// screen. Forbidden, not-found and server errors become error
/// notifications with a class-specific message; anything else is shown
/// with its own message.
#[derive(Clone)]
pub struct FailureRouter {
    events: EventBus,
    session: Option<Session>,
}

impl FailureRouter {
    pub fn new(events: EventBus, session: Option<Session>) -> Self {
        Self { events, session }
    }
}

impl RejectionHandler for FailureRouter {
    fn on_rejection(&self, error: &GatewayError) {
        match error.status_class() {
            StatusClass::Unauthorized => {
                if let Some(session) = &self.session {
                    session.force_logout();
                }
                self.events
                    .notify(NotificationLevel::Warning, error.user_message());
                self.events.publish(AppEvent::Navigate(Route::Login));
            }
            StatusClass::Forbidden
            | StatusClass::NotFound
            | StatusClass::ServerError
            | StatusClass::Other => {
                self.events.notify(NotificationLevel::Error, error.user_message());
            }
        }
    }
}
