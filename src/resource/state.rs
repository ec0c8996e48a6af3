use chrono::{DateTime, Utc};

use super::pagination::Pagination;
use super::{Operation, Resource};
use crate::store::StoreState;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// In-flight flags, one per operation kind.
///
/// A second concurrent request of the same kind re-sets the same flag; the
/// flag clears on the first terminal transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingFlags {
    pub listing: bool,
    pub creating: bool,
    pub updating: bool,
    pub deleting: bool,
    pub fetching_one: bool,
}

impl PendingFlags {
    pub fn get(&self, operation: Operation) -> bool {
        match operation {
            Operation::List => self.listing,
            Operation::Create => self.creating,
            Operation::Update => self.updating,
            Operation::Delete => self.deleting,
            Operation::FetchOne => self.fetching_one,
        }
    }

    pub fn set(&mut self, operation: Operation, value: bool) {
        let flag = match operation {
            Operation::List => &mut self.listing,
            Operation::Create => &mut self.creating,
            Operation::Update => &mut self.updating,
            Operation::Delete => &mut self.deleting,
            Operation::FetchOne => &mut self.fetching_one,
        };
        *flag = value;
    }

    pub fn any(&self) -> bool {
        Operation::ALL.iter().any(|op| self.get(*op))
    }
}

/// Last failure message per operation kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationErrors {
    pub list: Option<String>,
    pub create: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
    pub fetch_one: Option<String>,
}

impl OperationErrors {
    pub fn get(&self, operation: Operation) -> Option<&str> {
        self.slot(operation).as_deref()
    }

    pub fn set(&mut self, operation: Operation, message: Option<String>) {
        *self.slot_mut(operation) = message;
    }

    fn slot(&self, operation: Operation) -> &Option<String> {
        match operation {
            Operation::List => &self.list,
            Operation::Create => &self.create,
            Operation::Update => &self.update,
            Operation::Delete => &self.delete,
            Operation::FetchOne => &self.fetch_one,
        }
    }

    fn slot_mut(&mut self, operation: Operation) -> &mut Option<String> {
        match operation {
            Operation::List => &mut self.list,
            Operation::Create => &mut self.create,
            Operation::Update => &mut self.update,
            Operation::Delete => &mut self.delete,
            Operation::FetchOne => &mut self.fetch_one,
        }
    }
}

/// Client copy of one resource kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<R: Resource> {
    /// Entities in server order as of the last list fetch, unique by id.
    pub items: Vec<R>,
    /// Entity loaded by a fetch-one request, independent of `items`.
    pub focused: Option<R>,
    pub pending: PendingFlags,
    /// Most recent failure of any operation.
    pub last_error: Option<String>,
    pub errors: OperationErrors,
    pub filter: R::Filter,
    pub pagination: Pagination,
    /// Stamped on every successful list.
    pub last_updated: Option<DateTime<Utc>>,
    /// Set by a successful create, update or delete.
    pub success_message: Option<String>,
    initial_page_size: u32,
}

impl<R: Resource> ResourceState<R> {
    /// Empty state on page 1 with the given page size.
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            focused: None,
            pending: PendingFlags::default(),
            last_error: None,
            errors: OperationErrors::default(),
            filter: R::Filter::default(),
            pagination: Pagination::new(page_size),
            last_updated: None,
            success_message: None,
            initial_page_size: page_size,
        }
    }

    /// The state a reset returns to.
    pub fn initial(&self) -> Self {
        Self::with_page_size(self.initial_page_size)
    }

    pub fn total_pages(&self) -> u64 {
        self.pagination.total_pages()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

impl<R: Resource> Default for ResourceState<R> {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl<R: Resource> StoreState for ResourceState<R> {}
