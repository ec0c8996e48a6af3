//! Authentication session: store, persistence and cross-process sync.
//!
//! [`Session`] is an explicitly constructed handle. It is passed to the API
//! client (as the bearer source) and to the runners that need to end the
//! session on an unauthorized response.

mod credentials;
mod reducer;
mod state;
mod storage;
mod transition;
mod watcher;

use std::sync::Arc;

pub use credentials::SecureString;
pub use reducer::AuthReducer;
pub use state::{AuthState, PersistedSession};
pub use storage::{
    FileSessionStorage, MemorySessionStorage, SessionStorage, StorageError, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY, STORAGE_KEYS, USER_KEY,
};
pub use transition::AuthTransition;
pub use watcher::{SessionWatcher, WatcherError};

use crate::gateway::BearerSource;
use crate::model::User;
use crate::store::Store;

pub type AuthStore = Store<AuthReducer>;

#[derive(Clone)]
pub struct Session {
    store: AuthStore,
    storage: Arc<dyn SessionStorage>,
}

impl Session {
    /// Session with empty state. Call [`Session::init`] to load storage.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            store: AuthStore::default(),
            storage,
        }
    }

    /// Session backed by volatile storage.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStorage::new()))
    }

    /// Hydrate the store from storage.
    ///
    /// Unreadable storage is logged and treated as logged out.
    pub fn init(&self) -> Arc<AuthState> {
        match self.rehydrate() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load persisted session");
                self.store.dispatch(AuthTransition::Hydrate(PersistedSession::default()))
            }
        }
    }

    /// Re-read storage and hydrate the store from it.
    pub fn rehydrate(&self) -> Result<Arc<AuthState>, StorageError> {
        let persisted = self.load_persisted()?;
        Ok(self.store.dispatch(AuthTransition::Hydrate(persisted)))
    }

    /// Clear in-memory state without touching storage.
    pub fn reset(&self) {
        self.store.dispatch(AuthTransition::Logout);
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    pub fn snapshot(&self) -> Arc<AuthState> {
        self.store.snapshot()
    }

    pub fn dispatch(&self, transition: AuthTransition) -> Arc<AuthState> {
        self.store.dispatch(transition)
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.select(|state| state.is_authenticated)
    }

    pub fn load_persisted(&self) -> Result<PersistedSession, StorageError> {
        let token = |key: &str| -> Result<Option<SecureString>, StorageError> {
            Ok(self
                .storage
                .get(key)?
                .filter(|value| !value.is_empty())
                .map(SecureString::new))
        };

        let user = match self.storage.get(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unreadable persisted user");
                    None
                }
            },
            None => None,
        };

        Ok(PersistedSession {
            user,
            access_token: token(ACCESS_TOKEN_KEY)?,
            refresh_token: token(REFRESH_TOKEN_KEY)?,
        })
    }

    /// Persist both tokens.
    pub fn persist_tokens(
        &self,
        access_token: &SecureString,
        refresh_token: &SecureString,
    ) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, access_token.expose())?;
        self.storage.set(REFRESH_TOKEN_KEY, refresh_token.expose())
    }

    pub fn persist_user(&self, user: &User) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user)?;
        self.storage.set(USER_KEY, &raw)
    }

    /// Remove every persisted session key.
    pub fn clear_persisted(&self) -> Result<(), StorageError> {
        for key in STORAGE_KEYS {
            self.storage.remove(key)?;
        }
        Ok(())
    }

    /// End the session locally: clear storage and state.
    ///
    /// Storage failures are logged; the in-memory session is cleared
    /// regardless.
    pub fn force_logout(&self) {
        if let Err(e) = self.clear_persisted() {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }
        self.store.dispatch(AuthTransition::Logout);
        tracing::info!("Session ended");
    }
}

impl BearerSource for Session {
    fn bearer_token(&self) -> Option<SecureString> {
        self.store.select(|state| state.access_token.clone())
    }
}
