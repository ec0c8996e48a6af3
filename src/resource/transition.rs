use super::{Operation, Resource};
use crate::store::Transition;

/// State transitions for a resource store.
///
/// Each request lifecycle has a `Begin*`, a `Complete*` and a `Fail*`
/// transition. The remaining variants are local edits.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceTransition<R: Resource> {
    BeginList {
        criteria: R::Filter,
    },
    CompleteList {
        items: Vec<R>,
        total: u64,
        page: u32,
        page_size: u32,
    },
    FailList {
        message: String,
    },

    BeginCreate {
        draft: R::Draft,
    },
    CompleteCreate {
        entity: R,
    },
    FailCreate {
        message: String,
    },

    BeginUpdate {
        id: String,
        patch: R::Patch,
    },
    CompleteUpdate {
        entity: R,
    },
    FailUpdate {
        message: String,
    },

    BeginDelete {
        id: String,
    },
    CompleteDelete {
        id: String,
    },
    FailDelete {
        message: String,
    },

    BeginFetchOne {
        id: String,
    },
    CompleteFetchOne {
        entity: R,
    },
    FailFetchOne {
        message: String,
    },

    /// Replace the filter and go back to page 1.
    SetFilter {
        criteria: R::Filter,
    },
    ClearFilter,
    /// Set the page number. Not validated against `total_pages`.
    SetPage {
        page: u32,
    },
    SetPageSize {
        page_size: u32,
    },
    ClearErrors,
    ClearSuccess,
    /// Return to the initial state (used on logout).
    Reset,
}

impl<R: Resource> ResourceTransition<R> {
    /// The failure transition for `operation`.
    pub fn failed(operation: Operation, message: String) -> Self {
        match operation {
            Operation::List => ResourceTransition::FailList { message },
            Operation::Create => ResourceTransition::FailCreate { message },
            Operation::Update => ResourceTransition::FailUpdate { message },
            Operation::Delete => ResourceTransition::FailDelete { message },
            Operation::FetchOne => ResourceTransition::FailFetchOne { message },
        }
    }

    /// The request operation this transition belongs to, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ResourceTransition::BeginList { .. }
            | ResourceTransition::CompleteList { .. }
            | ResourceTransition::FailList { .. } => Some(Operation::List),
            ResourceTransition::BeginCreate { .. }
            | ResourceTransition::CompleteCreate { .. }
            | ResourceTransition::FailCreate { .. } => Some(Operation::Create),
            ResourceTransition::BeginUpdate { .. }
            | ResourceTransition::CompleteUpdate { .. }
            | ResourceTransition::FailUpdate { .. } => Some(Operation::Update),
            ResourceTransition::BeginDelete { .. }
            | ResourceTransition::CompleteDelete { .. }
            | ResourceTransition::FailDelete { .. } => Some(Operation::Delete),
            ResourceTransition::BeginFetchOne { .. }
            | ResourceTransition::CompleteFetchOne { .. }
            | ResourceTransition::FailFetchOne { .. } => Some(Operation::FetchOne),
            ResourceTransition::SetFilter { .. }
            | ResourceTransition::ClearFilter
            | ResourceTransition::SetPage { .. }
            | ResourceTransition::SetPageSize { .. }
            | ResourceTransition::ClearErrors
            | ResourceTransition::ClearSuccess
            | ResourceTransition::Reset => None,
        }
    }
}

impl<R: Resource> Transition for ResourceTransition<R> {}
