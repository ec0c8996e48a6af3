//! Derived views over store snapshots.
//!
//! Every selector is a pure function of one or more state snapshots.
//! [`Memo`] caches a projection per snapshot: the same input `Arc`s give
//! back the same output `Arc`, any new snapshot recomputes.

pub mod account;
pub mod auth;
pub mod category;
pub mod report;
pub mod resource;
pub mod transaction;

use std::sync::Arc;

use parking_lot::Mutex;

/// Input of a memoized selector, compared by pointer identity.
pub trait MemoKey: Clone {
    fn same(&self, other: &Self) -> bool;
}

impl<A> MemoKey for Arc<A> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<A, B> MemoKey for (Arc<A>, Arc<B>) {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) && Arc::ptr_eq(&self.1, &other.1)
    }
}

impl<A, B, C> MemoKey for (Arc<A>, Arc<B>, Arc<C>) {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            && Arc::ptr_eq(&self.1, &other.1)
            && Arc::ptr_eq(&self.2, &other.2)
    }
}

/// Single-entry cache for a projection of state snapshots.
///
/// The cached key is held, so a snapshot cannot be freed and its address
/// reused while it is still cached.
pub struct Memo<K, T> {
    project: Box<dyn Fn(&K) -> T + Send + Sync>,
    cache: Mutex<Option<(K, Arc<T>)>>,
}

impl<K: MemoKey, T> Memo<K, T> {
    pub fn new(project: impl Fn(&K) -> T + Send + Sync + 'static) -> Self {
        Self {
            project: Box::new(project),
            cache: Mutex::new(None),
        }
    }

    pub fn get(&self, key: &K) -> Arc<T> {
        let mut cache = self.cache.lock();
        if let Some((cached, value)) = cache.as_ref() {
            if cached.same(key) {
                return Arc::clone(value);
            }
        }
        let value = Arc::new((self.project)(key));
        *cache = Some((key.clone(), Arc::clone(&value)));
        value
    }

    /// Drop the cached value.
    pub fn clear(&self) {
        *self.cache.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn same_snapshot_returns_same_output() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let memo = Memo::new(move |v: &Arc<Vec<i32>>| {
            counter.fetch_add(1, Ordering::SeqCst);
            v.iter().sum::<i32>()
        });

        let snapshot = Arc::new(vec![1, 2, 3]);
        let first = memo.get(&snapshot);
        let second = memo.get(&snapshot);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, 6);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn equal_but_new_snapshot_recomputes() {
        let memo = Memo::new(|v: &Arc<Vec<i32>>| v.len());
        let a = memo.get(&Arc::new(vec![1]));
        let b = memo.get(&Arc::new(vec![1]));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn tuple_keys_track_every_input() {
        let memo = Memo::new(|(a, b): &(Arc<i32>, Arc<i32>)| **a + **b);
        let a = Arc::new(1);
        let b = Arc::new(2);
        let first = memo.get(&(Arc::clone(&a), Arc::clone(&b)));
        let again = memo.get(&(Arc::clone(&a), Arc::clone(&b)));
        assert!(Arc::ptr_eq(&first, &again));

        let changed = memo.get(&(a, Arc::new(5)));
        assert_eq!(*changed, 6);
    }

    #[test]
    fn clear_forces_recompute() {
        let memo = Memo::new(|v: &Arc<u8>| **v);
        let key = Arc::new(7);
        let first = memo.get(&key);
        memo.clear();
        assert!(!Arc::ptr_eq(&first, &memo.get(&key)));
    }
}
