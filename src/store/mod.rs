//! Unidirectional state container primitives.
//!
//! Every piece of client state (one store per resource kind plus the auth
//! session) follows the same flow:
//!
//! ```text
//! Transition ──→ Reducer ──→ State ──→ Selectors / Consumers
//!     ↑                                      │
//!     └──────── Effect runners ←─────────────┘
//! ```
//!
//! - **State**: Immutable snapshot handed out as `Arc<State>`
//! - **Transition**: Request lifecycle events or local edits
//! - **Reducer**: Pure function that transforms state based on transitions

mod reducer;
mod state;
mod transition;

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

pub use reducer::Reducer;
pub use state::StoreState;
pub use transition::Transition;

/// Thread-safe holder of the current state snapshot for one reducer.
///
/// Transitions are applied one at a time under a write lock, so a reader
/// never observes a half-applied transition. Readers get an immutable
/// `Arc` snapshot; a new snapshot is created for every transition, which
/// lets selectors memoize on pointer identity.
pub struct Store<R: Reducer> {
    inner: Arc<StoreInner<R::State>>,
    _reducer: PhantomData<fn() -> R>,
}

struct StoreInner<S> {
    current: RwLock<Arc<S>>,
    notifier: watch::Sender<Arc<S>>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _reducer: PhantomData,
        }
    }
}

impl<R: Reducer> Default for Store<R> {
    fn default() -> Self {
        Self::new(R::State::default())
    }
}

impl<R: Reducer> Store<R> {
    /// Create a store holding `initial`.
    pub fn new(initial: R::State) -> Self {
        let initial = Arc::new(initial);
        let (notifier, _) = watch::channel(Arc::clone(&initial));
        Self {
            inner: Arc::new(StoreInner {
                current: RwLock::new(initial),
                notifier,
            }),
            _reducer: PhantomData,
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<R::State> {
        Arc::clone(&self.inner.current.read())
    }

    /// Read a projection of the current state without cloning the snapshot.
    pub fn select<T>(&self, f: impl FnOnce(&R::State) -> T) -> T {
        let guard = self.inner.current.read();
        f(&guard)
    }

    /// Apply a transition atomically and publish the resulting snapshot.
    pub fn dispatch(&self, transition: R::Transition) -> Arc<R::State> {
        let mut guard = self.inner.current.write();
        let state = R::State::clone(&guard);
        let next = Arc::new(R::reduce(state, transition));
        *guard = Arc::clone(&next);
        self.inner.notifier.send_replace(Arc::clone(&next));
        next
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<R::State>> {
        self.inner.notifier.subscribe()
    }
}
