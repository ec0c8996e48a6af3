use super::credentials::SecureString;
use crate::model::User;
use crate::store::StoreState;

/// Authentication session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub access_token: Option<SecureString>,
    pub refresh_token: Option<SecureString>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl StoreState for AuthState {}

/// Session values read back from storage at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedSession {
    pub user: Option<User>,
    pub access_token: Option<SecureString>,
    pub refresh_token: Option<SecureString>,
}

impl PersistedSession {
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.access_token.is_none() && self.refresh_token.is_none()
    }
}
