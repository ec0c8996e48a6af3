use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::error::{GatewayError, GatewayResult};
use super::{ListQuery, Page, ResourceGateway};
use crate::resource::{Operation, Resource};

/// How many list queries `InMemoryGateway` remembers.
pub const LIST_QUERY_HISTORY: usize = 32;

/// Entities that can be created, patched and filtered without a server.
pub trait LocalRecord: Resource {
    fn from_draft(id: String, user_id: &str, draft: &Self::Draft, now: DateTime<Utc>) -> Self;

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>);

    fn matches(&self, filter: &Self::Filter) -> bool;
}

/// Gateway that keeps records in memory.
///
/// Newest records come first, as the backend orders them. Failures and
/// latency can be scripted per operation.
pub struct InMemoryGateway<R: Resource> {
    user_id: String,
    inner: Mutex<MemoryInner<R>>,
}

struct MemoryInner<R: Resource> {
    records: Vec<R>,
    failures: HashMap<Operation, VecDeque<GatewayError>>,
    delays: HashMap<Operation, VecDeque<Duration>>,
    ids: VecDeque<String>,
    list_queries: VecDeque<ListQuery<R::Filter>>,
}

impl<R: LocalRecord> Default for InMemoryGateway<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: LocalRecord> InMemoryGateway<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            user_id: "local".to_string(),
            inner: Mutex::new(MemoryInner {
                records,
                failures: HashMap::new(),
                delays: HashMap::new(),
                ids: VecDeque::new(),
                list_queries: VecDeque::new(),
            }),
        }
    }

    /// Owner id stamped on created records.
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Reject the next call of `operation` with `error`.
    pub fn fail_next(&self, operation: Operation, error: GatewayError) {
        self.inner
            .lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Delay the next call of `operation`.
    pub fn delay_next(&self, operation: Operation, delay: Duration) {
        self.inner
            .lock()
            .delays
            .entry(operation)
            .or_default()
            .push_back(delay);
    }

    /// Ids handed out to the next created records, in order. Random ids
    /// are generated once the queue is empty.
    pub fn queue_ids<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.lock().ids.extend(ids.into_iter().map(Into::into));
    }

    pub fn records(&self) -> Vec<R> {
        self.inner.lock().records.clone()
    }

    /// The last `LIST_QUERY_HISTORY` list queries, oldest first.
    pub fn list_queries(&self) -> Vec<ListQuery<R::Filter>> {
        self.inner.lock().list_queries.iter().cloned().collect()
    }

    async fn before(&self, operation: Operation) -> GatewayResult<()> {
        let (delay, failure) = {
            let mut inner = self.inner.lock();
            let delay = inner
                .delays
                .get_mut(&operation)
                .and_then(VecDeque::pop_front);
            let failure = inner
                .failures
                .get_mut(&operation)
                .and_then(VecDeque::pop_front);
            (delay, failure)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> GatewayError {
        GatewayError::NotFound {
            message: format!("{} {} not found", R::KIND.label(), id),
        }
    }
}

#[async_trait]
impl<R: LocalRecord> ResourceGateway<R> for InMemoryGateway<R> {
    async fn list(&self, query: &ListQuery<R::Filter>) -> GatewayResult<Page<R>> {
        {
            let mut inner = self.inner.lock();
            if inner.list_queries.len() == LIST_QUERY_HISTORY {
                inner.list_queries.pop_front();
            }
            inner.list_queries.push_back(query.clone());
        }
        self.before(Operation::List).await?;

        let inner = self.inner.lock();
        let matching: Vec<&R> = inner
            .records
            .iter()
            .filter(|record| record.matches(&query.criteria))
            .collect();
        let total = matching.len() as u64;
        let items = if query.page_size == 0 {
            matching.into_iter().cloned().collect()
        } else {
            let skip = query.page.saturating_sub(1) as usize * query.page_size as usize;
            matching
                .into_iter()
                .skip(skip)
                .take(query.page_size as usize)
                .cloned()
                .collect()
        };

        Ok(Page {
            items,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn get_one(&self, id: &str) -> GatewayResult<R> {
        self.before(Operation::FetchOne).await?;
        self.inner
            .lock()
            .records
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, draft: &R::Draft) -> GatewayResult<R> {
        self.before(Operation::Create).await?;
        let mut inner = self.inner.lock();
        let id = inner
            .ids
            .pop_front()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let record = R::from_draft(id, &self.user_id, draft, Utc::now());
        inner.records.insert(0, record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: &R::Patch) -> GatewayResult<R> {
        self.before(Operation::Update).await?;
        let mut inner = self.inner.lock();
        let record = inner
            .records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.apply_patch(patch, Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        self.before(Operation::Delete).await?;
        let mut inner = self.inner.lock();
        let index = inner
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        inner.records.remove(index);
        Ok(())
    }
}
