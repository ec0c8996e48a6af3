use std::collections::HashSet;
use std::marker::PhantomData;

use chrono::Utc;

use super::state::ResourceState;
use super::transition::ResourceTransition;
use super::{Operation, Resource};
use crate::store::Reducer;

/// Pure reducer for any resource kind.
pub struct ResourceReducer<R>(PhantomData<fn() -> R>);

impl<R: Resource> Reducer for ResourceReducer<R> {
    type State = ResourceState<R>;
    type Transition = ResourceTransition<R>;

    fn reduce(state: Self::State, transition: Self::Transition) -> Self::State {
        match transition {
            ResourceTransition::BeginList { .. } => begin(state, Operation::List),
            ResourceTransition::CompleteList {
                items,
                total,
                page,
                page_size,
            } => complete_list(state, items, total, page, page_size),

            ResourceTransition::BeginCreate { .. } => begin(state, Operation::Create),
            ResourceTransition::CompleteCreate { entity } => complete_create(state, entity),

            ResourceTransition::BeginUpdate { .. } => begin(state, Operation::Update),
            ResourceTransition::CompleteUpdate { entity } => complete_update(state, entity),

            ResourceTransition::BeginDelete { .. } => begin(state, Operation::Delete),
            ResourceTransition::CompleteDelete { id } => complete_delete(state, &id),

            ResourceTransition::BeginFetchOne { .. } => begin(state, Operation::FetchOne),
            ResourceTransition::CompleteFetchOne { entity } => {
                let mut state = settle(state, Operation::FetchOne);
                state.focused = Some(entity);
                state
            }

            ResourceTransition::FailList { message } => fail(state, Operation::List, message),
            ResourceTransition::FailCreate { message } => fail(state, Operation::Create, message),
            ResourceTransition::FailUpdate { message } => fail(state, Operation::Update, message),
            ResourceTransition::FailDelete { message } => fail(state, Operation::Delete, message),
            ResourceTransition::FailFetchOne { message } => {
                fail(state, Operation::FetchOne, message)
            }

            ResourceTransition::SetFilter { criteria } => {
                let mut state = state;
                state.filter = criteria;
                state.pagination.page = 1;
                state
            }
            ResourceTransition::ClearFilter => {
                let mut state = state;
                state.filter = R::Filter::default();
                state.pagination.page = 1;
                state
            }
            ResourceTransition::SetPage { page } => {
                let mut state = state;
                state.pagination.page = page;
                state
            }
            ResourceTransition::SetPageSize { page_size } => {
                let mut state = state;
                state.pagination.page_size = page_size;
                state.pagination.page = 1;
                state
            }
            ResourceTransition::ClearErrors => {
                let mut state = state;
                state.last_error = None;
                state.errors = Default::default();
                state
            }
            ResourceTransition::ClearSuccess => {
                let mut state = state;
                state.success_message = None;
                state
            }
            ResourceTransition::Reset => state.initial(),
        }
    }
}

fn begin<R: Resource>(mut state: ResourceState<R>, operation: Operation) -> ResourceState<R> {
    state.pending.set(operation, true);
    state.errors.set(operation, None);
    state.last_error = None;
    if R::KIND.success_message(operation).is_some() {
        state.success_message = None;
    }
    state
}

/// Clear the pending flag and error slot after a successful terminal.
fn settle<R: Resource>(mut state: ResourceState<R>, operation: Operation) -> ResourceState<R> {
    state.pending.set(operation, false);
    state.errors.set(operation, None);
    if let Some(message) = R::KIND.success_message(operation) {
        state.success_message = Some(message);
    }
    state
}

fn fail<R: Resource>(
    mut state: ResourceState<R>,
    operation: Operation,
    message: String,
) -> ResourceState<R> {
    state.pending.set(operation, false);
    state.errors.set(operation, Some(message.clone()));
    state.last_error = Some(message);
    state
}

fn complete_list<R: Resource>(
    state: ResourceState<R>,
    items: Vec<R>,
    total: u64,
    page: u32,
    page_size: u32,
) -> ResourceState<R> {
    let mut state = settle(state, Operation::List);
    let mut seen = HashSet::with_capacity(items.len());
    state.items = items
        .into_iter()
        .filter(|item| seen.insert(item.id().to_string()))
        .collect();
    state.pagination.total = total;
    state.pagination.page = page;
    state.pagination.page_size = page_size;
    state.last_updated = Some(Utc::now());
    state
}

fn complete_create<R: Resource>(state: ResourceState<R>, entity: R) -> ResourceState<R> {
    let mut state = settle(state, Operation::Create);
    match state.position(entity.id()) {
        Some(index) => {
            state.items.remove(index);
        }
        None => state.pagination.total += 1,
    }
    state.items.insert(0, entity);
    state
}

fn complete_update<R: Resource>(state: ResourceState<R>, entity: R) -> ResourceState<R> {
    let mut state = settle(state, Operation::Update);
    if state
        .focused
        .as_ref()
        .is_some_and(|focused| focused.id() == entity.id())
    {
        state.focused = Some(entity.clone());
    }
    // An id that is no longer listed stays absent.
    if let Some(index) = state.position(entity.id()) {
        state.items[index] = entity;
    }
    state
}

fn complete_delete<R: Resource>(state: ResourceState<R>, id: &str) -> ResourceState<R> {
    let mut state = settle(state, Operation::Delete);
    if let Some(index) = state.position(id) {
        state.items.remove(index);
    }
    state.pagination.total = state.pagination.total.saturating_sub(1);
    if state.focused.as_ref().is_some_and(|focused| focused.id() == id) {
        state.focused = None;
    }
    state
}
