//! Client-side state containers.
//!
//! Each store owns an immutable [`Snapshot`] behind an `Arc` and publishes
//! it through a `tokio::sync::watch` channel. Actions never mutate a
//! snapshot in place: they build the next one and swap it in, so a reader
//! holding an old snapshot keeps a consistent view.
//!
//! Writes are not optimistic. The collection only changes once the server
//! has answered, so a failed call leaves the items untouched and records
//! the error instead.

mod event;
mod persona;

pub use event::EventStore;
pub use persona::PersonaStore;

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Snapshot {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Shared cell holding the current snapshot.
pub(crate) struct StateCell<T> {
    tx: watch::Sender<Arc<Snapshot<T>>>,
}

impl<T: Clone> StateCell<T> {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Snapshot::default()));
        StateCell { tx }
    }

    pub(crate) fn snapshot(&self) -> Arc<Snapshot<T>> {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Snapshot<T>>> {
        self.tx.subscribe()
    }

    /// Replace the snapshot with `next(current)`.
    fn replace(&self, next: impl FnOnce(&Snapshot<T>) -> Snapshot<T>) {
        self.tx.send_modify(|current| *current = Arc::new(next(current)));
    }

    pub(crate) fn begin(&self) {
        self.replace(|s| Snapshot {
            items: s.items.clone(),
            loading: true,
            error: None,
        });
    }

    pub(crate) fn fail(&self, error: impl ToString) {
        let error = error.to_string();
        tracing::debug!(%error, "store action failed");
        self.replace(|s| Snapshot {
            items: s.items.clone(),
            loading: false,
            error: Some(error),
        });
    }

    /// Settle with a new item list derived from the current one.
    pub(crate) fn succeed(&self, items: impl FnOnce(&[T]) -> Vec<T>) {
        self.replace(|s| Snapshot {
            items: items(&s.items),
            loading: false,
            error: None,
        });
    }
}

/// `items` with `item` in place of whatever `matches`, or appended.
pub(crate) fn upsert<T: Clone>(items: &[T], item: T, matches: impl Fn(&T) -> bool) -> Vec<T> {
    let mut next: Vec<T> = items.to_vec();
    match next.iter_mut().find(|existing| matches(existing)) {
        Some(existing) => *existing = item,
        None => next.push(item),
    }
    next
}
