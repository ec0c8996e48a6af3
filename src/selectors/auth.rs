use crate::model::User;
use crate::session::AuthState;

pub fn user(state: &AuthState) -> Option<&User> {
    state.user.as_ref()
}

pub fn is_authenticated(state: &AuthState) -> bool {
    state.is_authenticated
}

pub fn is_loading(state: &AuthState) -> bool {
    state.is_loading
}

pub fn error(state: &AuthState) -> Option<&str> {
    state.error.as_deref()
}

/// Name to greet the user with, if anyone is logged in.
pub fn display_name(state: &AuthState) -> Option<&str> {
    state.user.as_ref().map(User::display_name)
}
