// ── Bounded sample history ──

use std::sync::{PoisonError, RwLock};

/// Fixed-capacity circular buffer holding samples in append order, the
/// oldest overwritten on overflow.
///
/// Single writer (the owning poller), many readers (snapshot callers).
/// The ring carries its own lock so snapshot copies never serialize on
/// the poller's lock.
pub struct Ring<T> {
    inner: RwLock<RingInner<T>>,
}

struct RingInner<T> {
    items: Vec<T>,
    head: usize,
    cap: usize,
}

impl<T> Ring<T> {
    pub fn new(capacity: usize) -> Self {
        let cap = capacity.max(1);
        Self {
            inner: RwLock::new(RingInner {
                items: Vec::with_capacity(cap),
                head: 0,
                cap,
            }),
        }
    }

    /// Append a sample, overwriting the oldest when full. O(1).
    pub fn add(&self, item: T) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.items.len() < inner.cap {
            inner.items.push(item);
        } else {
            let head = inner.head;
            inner.items[head] = item;
        }
        inner.head = (inner.head + 1) % inner.cap;
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity the ring was created with.
    pub fn capacity(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cap
    }
}

impl<T: Clone> Ring<T> {
    /// Independent copy of the contents, oldest to newest.
    pub fn all(&self) -> Vec<T> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if inner.items.len() < inner.cap {
            return inner.items.clone();
        }
        let mut out = Vec::with_capacity(inner.cap);
        for i in 0..inner.cap {
            out.push(inner.items[(inner.head + i) % inner.cap].clone());
        }
        out
    }

    /// The most recently added sample, if any.
    pub fn last(&self) -> Option<T> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if inner.items.is_empty() {
            return None;
        }
        let idx = (inner.head + inner.cap - 1) % inner.cap;
        Some(inner.items[idx].clone())
    }
}
