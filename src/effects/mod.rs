//! Effect runners: the only place where gateways are called.
//!
//! A runner receives an intent, emits the matching `Begin*` transition,
//! awaits the gateway and emits exactly one terminal transition. Gateway
//! rejections never escape a runner; they become `Fail*` transitions and
//! are reported to the configured [`RejectionHandler`].

mod auth;
mod runner;

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::gateway::GatewayError;
use crate::resource::{Operation, Resource};

pub use auth::{AuthIntent, AuthRunner};
pub use runner::EffectRunner;

/// Requests a consumer can make of a resource runner.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceIntent<R: Resource> {
    List { criteria: R::Filter },
    Create { draft: R::Draft },
    Update { id: String, patch: R::Patch },
    Delete { id: String },
    FetchOne { id: String },
}

impl<R: Resource> ResourceIntent<R> {
    pub fn operation(&self) -> Operation {
        match self {
            ResourceIntent::List { .. } => Operation::List,
            ResourceIntent::Create { .. } => Operation::Create,
            ResourceIntent::Update { .. } => Operation::Update,
            ResourceIntent::Delete { .. } => Operation::Delete,
            ResourceIntent::FetchOne { .. } => Operation::FetchOne,
        }
    }
}

/// How overlapping requests of the same operation kind settle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// Every terminal is applied; the last one to arrive wins.
    #[default]
    LastTerminalWins,
    /// Terminals of requests superseded by a newer request of the same
    /// operation kind are discarded.
    LatestIssued,
}

/// Receives every gateway rejection a runner handles.
pub trait RejectionHandler: Send + Sync {
    fn on_rejection(&self, error: &GatewayError);
}

/// Per-operation sequence tokens.
#[derive(Debug, Default)]
pub(crate) struct Sequencer {
    issued: [AtomicU64; 5],
}

impl Sequencer {
    /// Stamp a new request of `operation`.
    pub(crate) fn issue(&self, operation: Operation) -> u64 {
        self.issued[operation.index()].fetch_add(1, AtomicOrdering::SeqCst) + 1
    }

    /// Whether `token` is the newest request of `operation`.
    pub(crate) fn is_latest(&self, operation: Operation, token: u64) -> bool {
        self.issued[operation.index()].load(AtomicOrdering::SeqCst) == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequencer_tracks_each_operation_separately() {
        let seq = Sequencer::default();
        let first = seq.issue(Operation::List);
        let create = seq.issue(Operation::Create);
        assert!(seq.is_latest(Operation::List, first));

        let second = seq.issue(Operation::List);
        assert!(!seq.is_latest(Operation::List, first));
        assert!(seq.is_latest(Operation::List, second));
        assert!(seq.is_latest(Operation::Create, create));
    }
}
