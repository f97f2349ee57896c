//! Linking Service
//!
//! Public entry points for establishing or severing a parent → child
//! relationship. A relationship is the child's id stored in an array field
//! (the Link Array) on the parent document.
//!
//! # Operations
//!
//! - `assign` - Append the child's id to the parent's Link Array
//! - `unassign` - Remove every occurrence of the child's id
//! - `links` - Read the current Link Array
//!
//! Each call performs one store read and, if the read succeeds, one store
//! write. The service keeps no state between calls apart from the event
//! channel.
//!
//! # Completion Delivery
//!
//! The result of a call reaches the caller exactly once, in one of three
//! forms:
//!
//! - awaiting `assign`/`unassign` directly
//! - `dispatch`, which returns a `oneshot::Receiver`
//! - `assign_with`/`unassign_with`, which invoke a callback from a spawned
//!   task; drop the returned handle for fire-and-forget
//!
//! # Examples
//!
//! ```rust,no_run
//! use doclink_core::db::MemoryStore;
//! use doclink_core::models::{DocumentId, FieldName};
//! use doclink_core::services::LinkingService;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), doclink_core::services::LinkingError> {
//! let store = Arc::new(MemoryStore::new());
//! let service = LinkingService::new(store);
//!
//! let parent = DocumentId::from("P1");
//! let children = FieldName::from("children");
//! service.assign(&DocumentId::from("C"), &children, &parent).await?;
//! service.unassign(&DocumentId::from("A"), &children, &parent).await?;
//! # Ok(())
//! # }
//! ```

use super::array_mutator::{ArrayMutator, ArrayOperation};
use super::error::LinkingError;
use crate::config::{ConfigError, LinkingConfig};
use crate::db::{FieldStore, LinkChange, LinkEvent};
use crate::models::{Document, DocumentId, FieldName};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

/// A single link mutation, detached from any borrowed documents
///
/// Used where the call outlives the caller's borrows (`dispatch`, spawned
/// callbacks, `LinkQueue`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub child: DocumentId,
    pub field: FieldName,
    pub parent: DocumentId,
    pub operation: ArrayOperation,
}

impl LinkRequest {
    /// Request to append `child` to `field` on `parent`
    pub fn assign<C, P>(child: &C, field: &FieldName, parent: &P) -> Self
    where
        C: Document + ?Sized,
        P: Document + ?Sized,
    {
        Self {
            child: child.id().clone(),
            field: field.clone(),
            parent: parent.id().clone(),
            operation: ArrayOperation::Insert,
        }
    }

    /// Request to remove `child` from `field` on `parent`
    pub fn unassign<C, P>(child: &C, field: &FieldName, parent: &P) -> Self
    where
        C: Document + ?Sized,
        P: Document + ?Sized,
    {
        Self {
            child: child.id().clone(),
            field: field.clone(),
            parent: parent.id().clone(),
            operation: ArrayOperation::Remove,
        }
    }
}

/// Service for linking child documents into parents' Link Arrays
///
/// Generic over the injected store so tests can substitute `MemoryStore` and
/// applications can pass `Arc<dyn FieldStore>`.
pub struct LinkingService<S: FieldStore + ?Sized> {
    mutator: ArrayMutator<S>,

    /// Broadcast channel for link events
    event_tx: broadcast::Sender<LinkEvent>,

    emit_events: bool,
}

// Manual Clone implementation because S doesn't need to be Clone
impl<S: FieldStore + ?Sized> Clone for LinkingService<S> {
    fn clone(&self) -> Self {
        Self {
            mutator: self.mutator.clone(),
            event_tx: self.event_tx.clone(),
            emit_events: self.emit_events,
        }
    }
}

impl<S: FieldStore + ?Sized> LinkingService<S> {
    /// Create a LinkingService with the default configuration
    pub fn new(store: Arc<S>) -> Self {
        Self::build(store, &LinkingConfig::default())
    }

    /// Create a LinkingService with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the configuration fails validation.
    pub fn with_config(store: Arc<S>, config: LinkingConfig) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(Self::build(store, &config))
    }

    fn build(store: Arc<S>, config: &LinkingConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity);
        Self {
            mutator: ArrayMutator::new(store),
            event_tx,
            emit_events: config.emit_events,
        }
    }

    /// Get access to the injected store
    pub fn store(&self) -> &Arc<S> {
        self.mutator.store()
    }

    /// Subscribe to link events
    ///
    /// The receiver sees one `LinkEvent` per persisted `assign`/`unassign`.
    /// Failed calls emit nothing.
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<LinkEvent> {
        self.event_tx.subscribe()
    }

    /// Ignores send errors; having no subscribers is normal
    fn emit_event(&self, event: LinkEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Link `child` into the Link Array at `field` on `parent`
    ///
    /// Appends the child's id without checking for an existing entry, so two
    /// calls with the same child leave two entries.
    ///
    /// # Errors
    ///
    /// - `LinkingError::MissingArray` - The field could not be read as an
    ///   array; nothing was written
    /// - `LinkingError::StoreWriteFailure` - The write failed; the stored
    ///   array is unchanged
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
        self.run(child.id(), field, parent.id(), ArrayOperation::Insert)
            .await
    }

    /// Unlink `child` from the Link Array at `field` on `parent`
    ///
    /// Removes every occurrence of the child's id. Unlinking a child that is
    /// not present succeeds and still writes the (unchanged) array back.
    ///
    /// # Errors
    ///
    /// Same as [`LinkingService::assign`].
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
        self.run(child.id(), field, parent.id(), ArrayOperation::Remove)
            .await
    }

    /// Read the Link Array at `field` on `parent`
    ///
    /// Uses the same classification as the mutation path: any read failure is
    /// `MissingArray`.
    pub async fn links<P>(
        &self,
        field: &FieldName,
        parent: &P,
    ) -> Result<Vec<DocumentId>, LinkingError>
    where
        P: Document + ?Sized,
    {
        self.mutator.read(parent.id(), field).await
    }

    /// Execute a detached request
    pub async fn execute(&self, request: &LinkRequest) -> Result<(), LinkingError> {
        self.run(
            &request.child,
            &request.field,
            &request.parent,
            request.operation,
        )
        .await
    }

    async fn run(
        &self,
        child: &DocumentId,
        field: &FieldName,
        parent: &DocumentId,
        operation: ArrayOperation,
    ) -> Result<(), LinkingError> {
        tracing::debug!(
            "Linking {:?}: child '{}' at field '{}' on {}",
            operation,
            child,
            field,
            parent
        );

        self.mutator.mutate(parent, field, child, operation).await?;

        tracing::debug!(
            "Persisted {:?} of '{}' at field '{}' on {}",
            operation,
            child,
            field,
            parent
        );

        if self.emit_events {
            let change = LinkChange::new(parent.clone(), field.clone(), child.clone());
            self.emit_event(match operation {
                ArrayOperation::Insert => LinkEvent::Assigned(change),
                ArrayOperation::Remove => LinkEvent::Unassigned(change),
            });
        }

        Ok(())
    }
}

impl<S: FieldStore + ?Sized + 'static> LinkingService<S> {
    /// Run a request on a spawned task and deliver its result over a channel
    ///
    /// Exactly one value is sent. Dropping the receiver does not cancel the
    /// call; the read and write still run to completion.
    pub fn dispatch(&self, request: LinkRequest) -> oneshot::Receiver<Result<(), LinkingError>> {
        let (tx, rx) = oneshot::channel();
        let service = self.clone();

        tokio::spawn(async move {
            let result = service.execute(&request).await;
            let _ = tx.send(result);
        });

        rx
    }

    /// Callback form of [`LinkingService::assign`]
    ///
    /// `on_complete` runs exactly once on the spawned task with `None` on
    /// success or the error otherwise.
    pub fn assign_with<C, P, F>(
        &self,
        child: &C,
        field: &FieldName,
        parent: &P,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        C: Document + ?Sized,
        P: Document + ?Sized,
        F: FnOnce(Option<LinkingError>) + Send + 'static,
    {
        self.spawn_with(LinkRequest::assign(child, field, parent), on_complete)
    }

    /// Callback form of [`LinkingService::unassign`]
    pub fn unassign_with<C, P, F>(
        &self,
        child: &C,
        field: &FieldName,
        parent: &P,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        C: Document + ?Sized,
        P: Document + ?Sized,
        F: FnOnce(Option<LinkingError>) + Send + 'static,
    {
        self.spawn_with(LinkRequest::unassign(child, field, parent), on_complete)
    }

    fn spawn_with<F>(&self, request: LinkRequest, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<LinkingError>) + Send + 'static,
    {
        let service = self.clone();
        tokio::spawn(async move {
            let result = service.execute(&request).await;
            on_complete(result.err());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use serde_json::{json, Map};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn setup(children: serde_json::Value) -> (Arc<MemoryStore>, LinkingService<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let mut fields = Map::new();
        fields.insert("children".to_string(), children);
        store.insert_document(DocumentId::from("P1"), fields).await;
        let service = LinkingService::new(store.clone());
        (store, service)
    }

    fn children() -> FieldName {
        FieldName::from("children")
    }

    #[tokio::test]
    async fn test_assign_emits_event_after_write() {
        let (store, service) = setup(json!([])).await;
        let mut rx = service.subscribe_to_events();

        service
            .assign(&DocumentId::from("C"), &children(), &DocumentId::from("P1"))
            .await
            .unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event_type(), "link:assigned");
        assert_eq!(event.change().child_id, DocumentId::from("C"));
        assert_eq!(event.change().parent_id, DocumentId::from("P1"));
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_failed_calls_emit_nothing() {
        let (store, service) = setup(json!(["A"])).await;
        let mut rx = service.subscribe_to_events();

        let missing = service
            .assign(
                &DocumentId::from("C"),
                &FieldName::from("members"),
                &DocumentId::from("P1"),
            )
            .await;
        assert!(missing.unwrap_err().is_missing_array());

        store.fail_writes(true);
        let write_failed = service
            .unassign(&DocumentId::from("A"), &children(), &DocumentId::from("P1"))
            .await;
        assert!(write_failed.unwrap_err().is_write_failure());

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_events_can_be_disabled() {
        let store = Arc::new(MemoryStore::new());
        let mut fields = Map::new();
        fields.insert("children".to_string(), json!([]));
        store.insert_document(DocumentId::from("P1"), fields).await;

        let config = LinkingConfig {
            emit_events: false,
            ..Default::default()
        };
        let service = LinkingService::with_config(store, config).unwrap();
        let mut rx = service.subscribe_to_events();

        service
            .assign(&DocumentId::from("C"), &children(), &DocumentId::from("P1"))
            .await
            .unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LinkingConfig {
            event_channel_capacity: 0,
            ..Default::default()
        };
        let result = LinkingService::with_config(Arc::new(MemoryStore::new()), config);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_dispatch_delivers_result_once() {
        let (_store, service) = setup(json!(["A"])).await;

        let rx = service.dispatch(LinkRequest::assign(
            &DocumentId::from("B"),
            &children(),
            &DocumentId::from("P1"),
        ));
        assert!(rx.await.unwrap().is_ok());

        let rx = service.dispatch(LinkRequest::unassign(
            &DocumentId::from("B"),
            &FieldName::from("missing"),
            &DocumentId::from("P1"),
        ));
        assert!(rx.await.unwrap().unwrap_err().is_missing_array());

        assert_eq!(
            service
                .links(&children(), &DocumentId::from("P1"))
                .await
                .unwrap(),
            vec![DocumentId::from("A"), DocumentId::from("B")]
        );
    }

    #[tokio::test]
    async fn test_callback_invoked_exactly_once_on_every_path() {
        let (store, service) = setup(json!(["A"])).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));

        let counter = |calls: Arc<AtomicUsize>, errors: Arc<AtomicUsize>| {
            move |err: Option<LinkingError>| {
                calls.fetch_add(1, Ordering::SeqCst);
                if err.is_some() {
                    errors.fetch_add(1, Ordering::SeqCst);
                }
            }
        };

        // success
        service
            .assign_with(
                &DocumentId::from("B"),
                &children(),
                &DocumentId::from("P1"),
                counter(calls.clone(), errors.clone()),
            )
            .await
            .unwrap();

        // missing array
        service
            .unassign_with(
                &DocumentId::from("B"),
                &children(),
                &DocumentId::from("P2"),
                counter(calls.clone(), errors.clone()),
            )
            .await
            .unwrap();

        // write failure
        store.fail_writes(true);
        service
            .unassign_with(
                &DocumentId::from("A"),
                &children(),
                &DocumentId::from("P1"),
                counter(calls.clone(), errors.clone()),
            )
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(errors.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_link_request_serialization() {
        let request = LinkRequest::unassign(
            &DocumentId::from("C"),
            &children(),
            &DocumentId::from("P1"),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "child": "C",
                "field": "children",
                "parent": "P1",
                "operation": "remove"
            })
        );
    }
}
