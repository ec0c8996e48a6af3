//! Generic resource collection store.
//!
//! One `ResourceState<R>` / `ResourceReducer<R>` pair serves every server
//! resource kind. The kind-specific parts (entity, draft, patch and filter
//! types plus the REST path) come from the [`Resource`] trait.

mod pagination;
mod reducer;
mod state;
mod transition;

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::Store;

pub use pagination::Pagination;
pub use reducer::ResourceReducer;
pub use state::{OperationErrors, PendingFlags, ResourceState, DEFAULT_PAGE_SIZE};
pub use transition::ResourceTransition;

/// Shared store for one resource kind.
pub type ResourceStore<R> = Store<ResourceReducer<R>>;

/// A server-side entity mirrored by a resource store.
pub trait Resource:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Payload for creating a new entity.
    type Draft: Clone + Debug + PartialEq + Serialize + Send + Sync + 'static;
    /// Partial update payload.
    type Patch: Clone + Debug + PartialEq + Serialize + Send + Sync + 'static;
    /// List criteria, serializable to query key/value pairs.
    type Filter: Clone + Debug + Default + PartialEq + Serialize + Send + Sync + 'static;

    const KIND: ResourceKind;

    fn id(&self) -> &str;
}

/// The resource kinds the client mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Account,
    Category,
    Transaction,
}

impl ResourceKind {
    /// REST collection path.
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Account => "/accounts",
            ResourceKind::Category => "/categories",
            ResourceKind::Transaction => "/transactions",
        }
    }

    /// Lowercase singular name, used in messages and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Account => "account",
            ResourceKind::Category => "category",
            ResourceKind::Transaction => "transaction",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Account => "accounts",
            ResourceKind::Category => "categories",
            ResourceKind::Transaction => "transactions",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ResourceKind::Account => "Account",
            ResourceKind::Category => "Category",
            ResourceKind::Transaction => "Transaction",
        }
    }

    /// Message used when a gateway rejection carries no message of its own.
    pub fn fallback_message(&self, operation: Operation) -> String {
        match operation {
            Operation::List => format!("Failed to fetch {}", self.plural()),
            Operation::Create => format!("Failed to create {}", self.label()),
            Operation::Update => format!("Failed to update {}", self.label()),
            Operation::Delete => format!("Failed to delete {}", self.label()),
            Operation::FetchOne => format!("Failed to fetch {}", self.label()),
        }
    }

    /// Message recorded after a successful mutation.
    pub fn success_message(&self, operation: Operation) -> Option<String> {
        let verb = match operation {
            Operation::Create => "created",
            Operation::Update => "updated",
            Operation::Delete => "deleted",
            Operation::List | Operation::FetchOne => return None,
        };
        Some(format!("{} {} successfully", self.title(), verb))
    }
}

/// Operation kinds tracked per resource store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
    FetchOne,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::FetchOne,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::FetchOne => "fetch_one",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Operation::List => 0,
            Operation::Create => 1,
            Operation::Update => 2,
            Operation::Delete => 3,
            Operation::FetchOne => 4,
        }
    }
}
