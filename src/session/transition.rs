use super::credentials::SecureString;
use super::state::PersistedSession;
use crate::model::User;
use crate::store::Transition;

/// State transitions for the auth session.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthTransition {
    BeginLogin,
    CompleteLogin {
        user: User,
        access_token: SecureString,
        refresh_token: SecureString,
    },
    FailLogin {
        message: String,
    },

    BeginSignup,
    CompleteSignup {
        user: User,
        access_token: SecureString,
        refresh_token: SecureString,
    },
    FailSignup {
        message: String,
    },

    BeginRefresh,
    /// Replaces both tokens; the user is kept.
    CompleteRefresh {
        access_token: SecureString,
        refresh_token: SecureString,
    },
    FailRefresh {
        message: String,
    },

    Logout,
    /// Load a previously persisted session.
    Hydrate(PersistedSession),
    ClearError,
}

impl Transition for AuthTransition {}
