//! Selectors shared by every resource kind.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::resource::{Operation, Pagination, Resource, ResourceState};

pub fn items<R: Resource>(state: &ResourceState<R>) -> &[R] {
    &state.items
}

pub fn focused<R: Resource>(state: &ResourceState<R>) -> Option<&R> {
    state.focused.as_ref()
}

pub fn find_by_id<'a, R: Resource>(state: &'a ResourceState<R>, id: &str) -> Option<&'a R> {
    state.items.iter().find(|item| item.id() == id)
}

pub fn is_empty<R: Resource>(state: &ResourceState<R>) -> bool {
    state.items.is_empty()
}

/// Sum of `amount` over the items matching `predicate`.
pub fn total_by<R, P, A>(items: &[R], predicate: P, amount: A) -> Decimal
where
    P: Fn(&R) -> bool,
    A: Fn(&R) -> Decimal,
{
    items
        .iter()
        .filter(|item| predicate(item))
        .map(amount)
        .sum()
}

/// Group items by `key`, keeping list order inside each group.
pub fn group_by<R, K, F>(items: &[R], key: F) -> BTreeMap<K, Vec<R>>
where
    R: Clone,
    K: Ord,
    F: Fn(&R) -> K,
{
    let mut grouped: BTreeMap<K, Vec<R>> = BTreeMap::new();
    for item in items {
        grouped.entry(key(item)).or_default().push(item.clone());
    }
    grouped
}

pub fn pagination<R: Resource>(state: &ResourceState<R>) -> &Pagination {
    &state.pagination
}

pub fn total_pages<R: Resource>(state: &ResourceState<R>) -> u64 {
    state.total_pages()
}

pub fn filter<R: Resource>(state: &ResourceState<R>) -> &R::Filter {
    &state.filter
}

pub fn is_pending<R: Resource>(state: &ResourceState<R>, operation: Operation) -> bool {
    state.pending.get(operation)
}

pub fn is_loading<R: Resource>(state: &ResourceState<R>) -> bool {
    state.pending.any()
}

pub fn error<R: Resource>(state: &ResourceState<R>) -> Option<&str> {
    state.last_error.as_deref()
}

pub fn operation_error<R: Resource>(state: &ResourceState<R>, operation: Operation) -> Option<&str> {
    state.errors.get(operation)
}

pub fn success_message<R: Resource>(state: &ResourceState<R>) -> Option<&str> {
    state.success_message.as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_by_sums_matching() {
        let values = [(1, Decimal::from(10)), (2, Decimal::from(5)), (1, Decimal::from(7))];
        let total = total_by(&values, |(k, _)| *k == 1, |(_, v)| *v);
        assert_eq!(total, Decimal::from(17));
        assert_eq!(total_by(&values, |_| false, |(_, v)| *v), Decimal::ZERO);
    }

    #[test]
    fn group_by_keeps_order_within_groups() {
        let words = ["apple", "bean", "avocado", "beet"];
        let grouped = group_by(&words, |w| w.chars().next());
        assert_eq!(grouped[&Some('a')], vec!["apple", "avocado"]);
        assert_eq!(grouped[&Some('b')], vec!["bean", "beet"]);
    }
}
