use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{OrderingPolicy, RejectionHandler, ResourceIntent, Sequencer};
use crate::gateway::{GatewayError, ListQuery, ResourceGateway};
use crate::resource::{Operation, Resource, ResourceStore, ResourceTransition};

/// Runs resource intents against a gateway and feeds the results into the
/// store.
///
/// Intents are neither coalesced nor cancelled: every intent gets its own
/// request and its own terminal transition.
pub struct EffectRunner<R: Resource, G: ?Sized> {
    store: ResourceStore<R>,
    gateway: Arc<G>,
    policy: OrderingPolicy,
    sequencer: Arc<Sequencer>,
    rejections: Option<Arc<dyn RejectionHandler>>,
}

impl<R: Resource, G: ?Sized> Clone for EffectRunner<R, G> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            gateway: Arc::clone(&self.gateway),
            policy: self.policy,
            sequencer: Arc::clone(&self.sequencer),
            rejections: self.rejections.clone(),
        }
    }
}

impl<R: Resource, G: ResourceGateway<R> + ?Sized> EffectRunner<R, G> {
    pub fn new(store: ResourceStore<R>, gateway: Arc<G>) -> Self {
        Self {
            store,
            gateway,
            policy: OrderingPolicy::default(),
            sequencer: Arc::new(Sequencer::default()),
            rejections: None,
        }
    }

    pub fn with_policy(mut self, policy: OrderingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_rejection_handler(mut self, handler: Arc<dyn RejectionHandler>) -> Self {
        self.rejections = Some(handler);
        self
    }

    pub fn store(&self) -> &ResourceStore<R> {
        &self.store
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Run one intent to its terminal transition.
    ///
    /// Returns the follow-up intent, if any: a successful create, update
    /// or delete asks for a re-list with the filter active at that moment.
    pub async fn execute(&self, intent: ResourceIntent<R>) -> Option<ResourceIntent<R>> {
        let operation = intent.operation();
        let token = self.sequencer.issue(operation);
        tracing::debug!(
            kind = R::KIND.label(),
            operation = operation.as_str(),
            token,
            "Intent started"
        );

        match intent {
            ResourceIntent::List { criteria } => {
                let state = self.store.dispatch(ResourceTransition::BeginList {
                    criteria: criteria.clone(),
                });
                let query = ListQuery::new(
                    criteria,
                    state.pagination.page,
                    state.pagination.page_size,
                );
                match self.gateway.list(&query).await {
                    Ok(page) => {
                        self.settle(
                            operation,
                            token,
                            ResourceTransition::CompleteList {
                                items: page.items,
                                total: page.total,
                                page: page.page,
                                page_size: page.page_size,
                            },
                        );
                    }
                    Err(err) => self.reject(operation, token, err),
                }
                None
            }

            ResourceIntent::Create { draft } => {
                self.store.dispatch(ResourceTransition::BeginCreate {
                    draft: draft.clone(),
                });
                match self.gateway.create(&draft).await {
                    Ok(entity) => {
                        tracing::info!(kind = R::KIND.label(), id = entity.id(), "Created");
                        self.settle_then_refresh(
                            operation,
                            token,
                            ResourceTransition::CompleteCreate { entity },
                        )
                    }
                    Err(err) => {
                        self.reject(operation, token, err);
                        None
                    }
                }
            }

            ResourceIntent::Update { id, patch } => {
                self.store.dispatch(ResourceTransition::BeginUpdate {
                    id: id.clone(),
                    patch: patch.clone(),
                });
                match self.gateway.update(&id, &patch).await {
                    Ok(entity) => {
                        tracing::info!(kind = R::KIND.label(), id = %id, "Updated");
                        self.settle_then_refresh(
                            operation,
                            token,
                            ResourceTransition::CompleteUpdate { entity },
                        )
                    }
                    Err(err) => {
                        self.reject(operation, token, err);
                        None
                    }
                }
            }

            ResourceIntent::Delete { id } => {
                self.store
                    .dispatch(ResourceTransition::BeginDelete { id: id.clone() });
                match self.gateway.delete(&id).await {
                    Ok(()) => {
                        tracing::info!(kind = R::KIND.label(), id = %id, "Deleted");
                        self.settle_then_refresh(
                            operation,
                            token,
                            ResourceTransition::CompleteDelete { id },
                        )
                    }
                    Err(err) => {
                        self.reject(operation, token, err);
                        None
                    }
                }
            }

            ResourceIntent::FetchOne { id } => {
                self.store
                    .dispatch(ResourceTransition::BeginFetchOne { id: id.clone() });
                match self.gateway.get_one(&id).await {
                    Ok(entity) => {
                        self.settle(
                            operation,
                            token,
                            ResourceTransition::CompleteFetchOne { entity },
                        );
                    }
                    Err(err) => self.reject(operation, token, err),
                }
                None
            }
        }
    }

    /// Run an intent and every follow-up it produces.
    pub async fn run(&self, intent: ResourceIntent<R>) {
        let mut next = Some(intent);
        while let Some(intent) = next {
            next = self.execute(intent).await;
        }
    }

    /// Run an intent on its own task.
    pub fn dispatch(&self, intent: ResourceIntent<R>) -> JoinHandle<()> {
        let runner = self.clone();
        tokio::spawn(async move { runner.run(intent).await })
    }

    /// Dispatch every intent received on `rx` until the channel closes.
    pub fn spawn_listener(&self, mut rx: mpsc::Receiver<ResourceIntent<R>>) -> JoinHandle<()> {
        let runner = self.clone();
        tokio::spawn(async move {
            while let Some(intent) = rx.recv().await {
                runner.dispatch(intent);
            }
            tracing::debug!(kind = R::KIND.label(), "Intent channel closed");
        })
    }

    /// Apply a terminal transition unless the ordering policy discards it.
    fn settle(&self, operation: Operation, token: u64, transition: ResourceTransition<R>) -> bool {
        if self.policy == OrderingPolicy::LatestIssued && !self.sequencer.is_latest(operation, token) {
            tracing::debug!(
                kind = R::KIND.label(),
                operation = operation.as_str(),
                token,
                "Discarding superseded response"
            );
            return false;
        }
        self.store.dispatch(transition);
        true
    }

    fn settle_then_refresh(
        &self,
        operation: Operation,
        token: u64,
        transition: ResourceTransition<R>,
    ) -> Option<ResourceIntent<R>> {
        if !self.settle(operation, token, transition) {
            return None;
        }
        let criteria = self.store.select(|state| state.filter.clone());
        Some(ResourceIntent::List { criteria })
    }

    fn reject(&self, operation: Operation, token: u64, err: GatewayError) {
        let message = err.message_or(&R::KIND.fallback_message(operation));
        tracing::warn!(
            kind = R::KIND.label(),
            operation = operation.as_str(),
            error_type = err.error_type(),
            error = %err,
            "Intent failed"
        );
        if let Some(handler) = &self.rejections {
            handler.on_rejection(&err);
        }
        self.settle(operation, token, ResourceTransition::failed(operation, message));
    }
}
