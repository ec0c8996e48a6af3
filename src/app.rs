//! Composition root: one session, one event bus, one runner per resource
//! kind.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::effects::{AuthIntent, AuthRunner, EffectRunner, RejectionHandler};
use crate::events::{EventBus, FailureRouter};
use crate::gateway::{
    ApiClient, AuthGateway, GatewayError, InMemoryGateway, ResourceGateway, RestAuthGateway,
    RestGateway,
};
use crate::model::{Account, Category, Transaction};
use crate::resource::{Resource, ResourceState, ResourceStore, ResourceTransition};
use crate::session::{FileSessionStorage, Session, SessionWatcher, WatcherError};

/// Runner over a boxed gateway.
pub type Runner<R> = EffectRunner<R, dyn ResourceGateway<R>>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to build API client: {0}")]
    Client(#[from] GatewayError),

    #[error("Failed to watch session file: {0}")]
    Watch(#[from] WatcherError),
}

/// The gateways an [`App`] talks to.
pub struct Gateways {
    pub accounts: Arc<dyn ResourceGateway<Account>>,
    pub categories: Arc<dyn ResourceGateway<Category>>,
    pub transactions: Arc<dyn ResourceGateway<Transaction>>,
    pub auth: Arc<dyn AuthGateway>,
}

impl Gateways {
    /// REST gateways sharing one client.
    pub fn rest(client: &ApiClient) -> Self {
        Self {
            accounts: Arc::new(RestGateway::<Account>::new(client.clone())),
            categories: Arc::new(RestGateway::<Category>::new(client.clone())),
            transactions: Arc::new(RestGateway::<Transaction>::new(client.clone())),
            auth: Arc::new(RestAuthGateway::new(client.clone())),
        }
    }

    /// In-memory resource gateways for offline use, with the given auth
    /// gateway.
    pub fn in_memory(auth: Arc<dyn AuthGateway>) -> Self {
        Self {
            accounts: Arc::new(InMemoryGateway::<Account>::new()),
            categories: Arc::new(InMemoryGateway::<Category>::new()),
            transactions: Arc::new(InMemoryGateway::<Transaction>::new()),
            auth,
        }
    }
}

#[derive(Clone)]
pub struct App {
    config: Config,
    events: EventBus,
    session: Session,
    accounts: Runner<Account>,
    categories: Runner<Category>,
    transactions: Runner<Transaction>,
    auth: AuthRunner<dyn AuthGateway>,
}

impl App {
    pub fn new(config: Config, session: Session, gateways: Gateways) -> Self {
        let events = EventBus::default();
        let router: Arc<dyn RejectionHandler> =
            Arc::new(FailureRouter::new(events.clone(), Some(session.clone())));
        let page_size = config.pagination.default_page_size;

        Self {
            accounts: runner(gateways.accounts, page_size, &router),
            categories: runner(gateways.categories, page_size, &router),
            transactions: runner(gateways.transactions, page_size, &router),
            auth: AuthRunner::new(session.clone(), gateways.auth),
            config,
            events,
            session,
        }
    }

    /// App against the REST backend, with the session persisted to the
    /// configured file and hydrated from it.
    pub fn connect(config: Config) -> Result<Self, AppError> {
        let path = config.session_path();
        tracing::debug!(path = %path.display(), base_url = %config.api.base_url, "Connecting");

        let session = Session::new(Arc::new(FileSessionStorage::new(path)));
        session.init();
        let client = ApiClient::new(&config.api)?.with_bearer(Arc::new(session.clone()));
        Ok(Self::new(config, session, Gateways::rest(&client)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn accounts(&self) -> &Runner<Account> {
        &self.accounts
    }

    pub fn categories(&self) -> &Runner<Category> {
        &self.categories
    }

    pub fn transactions(&self) -> &Runner<Transaction> {
        &self.transactions
    }

    pub fn auth(&self) -> &AuthRunner<dyn AuthGateway> {
        &self.auth
    }

    /// Log out and drop every cached resource.
    pub async fn logout(&self) {
        self.auth.execute(AuthIntent::Logout).await;
        self.reset_stores();
    }

    /// Put every resource store back to its initial state.
    pub fn reset_stores(&self) {
        reset(self.accounts.store());
        reset(self.categories.store());
        reset(self.transactions.store());
    }

    /// Reset the resource stores whenever the session ends, whatever ended
    /// it (logout, an unauthorized response or another process).
    pub fn spawn_session_guard(&self) -> JoinHandle<()> {
        let app = self.clone();
        let mut updates = self.session.store().subscribe();
        tokio::spawn(async move {
            let mut was_authenticated = updates.borrow_and_update().is_authenticated;
            while updates.changed().await.is_ok() {
                let authenticated = updates.borrow_and_update().is_authenticated;
                if was_authenticated && !authenticated {
                    tracing::info!("Session ended, clearing cached resources");
                    app.reset_stores();
                }
                was_authenticated = authenticated;
            }
        })
    }

    /// Follow session changes made by other processes.
    pub fn watch_session(&self) -> Result<SessionWatcher, AppError> {
        let watcher = SessionWatcher::start(
            self.session.clone(),
            Some(self.events.clone()),
            self.config.session.watch_debounce_ms,
        )?;
        Ok(watcher)
    }
}

fn runner<R: Resource>(
    gateway: Arc<dyn ResourceGateway<R>>,
    page_size: u32,
    router: &Arc<dyn RejectionHandler>,
) -> Runner<R> {
    let store = ResourceStore::new(ResourceState::with_page_size(page_size));
    EffectRunner::new(store, gateway).with_rejection_handler(Arc::clone(router))
}

fn reset<R: Resource>(store: &ResourceStore<R>) {
    store.dispatch(ResourceTransition::Reset);
}
