//! Base trait for transitions in the store architecture.

/// Marker trait for transition objects.
///
/// Transitions represent:
/// - Requests that have started (`Begin*`)
/// - Responses that have arrived (`Complete*`)
/// - Failures reported by a gateway (`Fail*`)
/// - Local edits such as filter or page changes
///
/// Transitions are processed by reducers to produce new states.
pub trait Transition: Send + 'static {}
