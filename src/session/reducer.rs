use super::state::AuthState;
use super::transition::AuthTransition;
use crate::store::Reducer;

pub struct AuthReducer;

impl Reducer for AuthReducer {
    type State = AuthState;
    type Transition = AuthTransition;

    fn reduce(state: AuthState, transition: AuthTransition) -> AuthState {
        match transition {
            AuthTransition::BeginLogin
            | AuthTransition::BeginSignup
            | AuthTransition::BeginRefresh => AuthState {
                is_loading: true,
                error: None,
                ..state
            },

            AuthTransition::CompleteLogin {
                user,
                access_token,
                refresh_token,
            }
            | AuthTransition::CompleteSignup {
                user,
                access_token,
                refresh_token,
            } => AuthState {
                user: Some(user),
                access_token: Some(access_token),
                refresh_token: Some(refresh_token),
                is_authenticated: true,
                is_loading: false,
                error: None,
            },

            AuthTransition::FailLogin { message } | AuthTransition::FailRefresh { message } => {
                AuthState {
                    error: Some(message),
                    ..AuthState::default()
                }
            }

            // Stored identity is left as is.
            AuthTransition::FailSignup { message } => AuthState {
                is_authenticated: false,
                is_loading: false,
                error: Some(message),
                ..state
            },

            AuthTransition::CompleteRefresh {
                access_token,
                refresh_token,
            } => AuthState {
                access_token: Some(access_token),
                refresh_token: Some(refresh_token),
                is_loading: false,
                error: None,
                ..state
            },

            AuthTransition::Logout => AuthState::default(),

            AuthTransition::Hydrate(persisted) => AuthState {
                is_authenticated: persisted
                    .access_token
                    .as_ref()
                    .is_some_and(|token| !token.is_empty()),
                user: persisted.user,
                access_token: persisted.access_token,
                refresh_token: persisted.refresh_token,
                ..state
            },

            AuthTransition::ClearError => AuthState {
                error: None,
                ..state
            },
        }
    }
}
