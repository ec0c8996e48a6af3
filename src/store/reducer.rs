//! Reducer trait for the store architecture.

use super::state::StoreState;
use super::transition::Transition;

/// Reducer transforms state based on transitions.
///
/// The reducer is the only place where state changes happen.
/// It must be a pure function: (State, Transition) -> State
pub trait Reducer {
    /// The state type this reducer operates on.
    type State: StoreState;

    /// The transition type this reducer handles.
    type Transition: Transition;

    /// Process a transition and return the new state.
    ///
    /// This should be a pure function with no side effects.
    fn reduce(state: Self::State, transition: Self::Transition) -> Self::State;
}
