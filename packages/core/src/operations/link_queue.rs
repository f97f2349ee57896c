//! Per-field serialization of link operations
//!
//! `LinkingService` performs a plain read-modify-write with no compare-and-swap,
//! so two overlapping calls on the same parent field can lose one update (the
//! last write wins). This module provides a wrapper that serializes calls per
//! (parent, field) key, so callers that need ordering get it without the core
//! taking any locks.
//!
//! Calls on different keys still run concurrently.
//!
//! # Example
//!
//! ```rust,no_run
//! use doclink_core::db::MemoryStore;
//! use doclink_core::models::{DocumentId, FieldName};
//! use doclink_core::operations::LinkQueue;
//! use doclink_core::services::LinkingService;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), doclink_core::services::LinkingError> {
//! let service = Arc::new(LinkingService::new(Arc::new(MemoryStore::new())));
//! let queue = Arc::new(LinkQueue::new(service));
//!
//! let children = FieldName::from("children");
//! let parent = DocumentId::from("P1");
//! let (child_a, child_b) = (DocumentId::from("A"), DocumentId::from("B"));
//! let (a, b) = tokio::join!(
//!     queue.assign(&child_a, &children, &parent),
//!     queue.assign(&child_b, &children, &parent),
//! );
//! a?;
//! b?;
//! # Ok(())
//! # }
//! ```

use crate::db::FieldStore;
use crate::models::{Document, DocumentId, FieldName};
use crate::services::{LinkRequest, LinkingError, LinkingService};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::Mutex;

type FieldKey = (DocumentId, FieldName);
type LockMap = HashMap<FieldKey, Arc<Mutex<()>>>;

/// Queue that runs at most one link operation per (parent, field) at a time
///
/// Adds no retries and no timeouts; errors come back exactly as
/// `LinkingService` reports them.
pub struct LinkQueue<S: FieldStore + ?Sized> {
    /// Underlying LinkingService instance
    service: Arc<LinkingService<S>>,

    /// One lock per key with an operation in flight or waiting
    ///
    /// Never held across an await, so a std mutex is enough and lets the
    /// entry be released from `Drop`.
    locks: StdMutex<LockMap>,
}

/// Handle on a key's lock; removes the map entry when the last user drops it
///
/// Runs on completion and on cancellation alike (e.g. the caller's future
/// dropped by `tokio::time::timeout`).
struct KeyLease<'a> {
    locks: &'a StdMutex<LockMap>,
    key: FieldKey,
    lock: Arc<Mutex<()>>,
}

impl Drop for KeyLease<'_> {
    fn drop(&mut self) {
        let mut locks = lock_map(self.locks);
        // Map entry + this lease; any other holder or waiter would add one
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}

/// The map stays consistent even if a holder panicked, so poisoning is ignored
fn lock_map(locks: &StdMutex<LockMap>) -> MutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: FieldStore + ?Sized> LinkQueue<S> {
    /// Create a new LinkQueue wrapping the given LinkingService
    pub fn new(service: Arc<LinkingService<S>>) -> Self {
        Self {
            service,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    pub fn service(&self) -> &Arc<LinkingService<S>> {
        &self.service
    }

    /// Serialized [`LinkingService::assign`]
    pub async fn assign<C, P>(
        &self,
        child: &C,
        field: &FieldName,
        parent: &P,
    ) -> Result<(), LinkingError>
    where
        C: Document + ?Sized,
        P: Document + ?Sized,
    {
        self.execute(LinkRequest::assign(child, field, parent)).await
    }

    /// Serialized [`LinkingService::unassign`]
    pub async fn unassign<C, P>(
        &self,
        child: &C,
        field: &FieldName,
        parent: &P,
    ) -> Result<(), LinkingError>
    where
        C: Document + ?Sized,
        P: Document + ?Sized,
    {
        self.execute(LinkRequest::unassign(child, field, parent))
            .await
    }

    /// Run a request once every earlier request on the same key has finished
    ///
    /// Waiters on one key are served in FIFO order (tokio `Mutex` is fair).
    /// Dropping the returned future releases the key; a write already handed
    /// to the store may still land.
    pub async fn execute(&self, request: LinkRequest) -> Result<(), LinkingError> {
        let lease = self.lease((request.parent.clone(), request.field.clone()));
        let _guard = lease.lock.lock().await;
        self.service.execute(&request).await
    }

    /// Number of keys currently holding a lock entry
    pub fn active_keys(&self) -> usize {
        lock_map(&self.locks).len()
    }

    fn lease(&self, key: FieldKey) -> KeyLease<'_> {
        let lock = lock_map(&self.locks)
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        KeyLease {
            locks: &self.locks,
            key,
            lock,
        }
    }
}
