//! In-Memory Field Store
//!
//! `MemoryStore` keeps documents as JSON objects in a `HashMap` behind a tokio
//! `RwLock`. Fields hold raw `serde_json::Value`s so callers can seed the
//! store with values of any shape (including ones that are not arrays) and
//! observe how the linking layer classifies them.
//!
//! Besides the `FieldStore` implementation it exposes:
//!
//! - Read and write counters, to assert which store calls a protocol made
//! - Write fault injection (`fail_writes`)
//! - Optional per-call latency, to widen the window between a read and a write

use super::{FieldStore, StoreError};
use crate::models::{DocumentId, FieldName};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

const ARRAY_OF_IDS: &str = "an array of document ids";

/// Document store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Map: document id → field name → raw value
    documents: RwLock<HashMap<DocumentId, Map<String, Value>>>,

    reads: AtomicUsize,
    writes: AtomicUsize,

    /// When set, every `write_field` fails with `StoreError::Backend`
    fail_writes: AtomicBool,

    /// Delay applied before each read and write
    latency: Option<Duration>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that sleeps for `latency` before each read and write
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Insert (or replace) a document with the given fields
    pub async fn insert_document(&self, id: DocumentId, fields: Map<String, Value>) {
        self.documents.write().await.insert(id, fields);
    }

    /// Create an empty document under a freshly generated id
    pub async fn create_document(&self) -> DocumentId {
        let id = DocumentId::generate();
        self.insert_document(id.clone(), Map::new()).await;
        id
    }

    /// Set a raw field value on an existing document
    pub async fn set_field(
        &self,
        id: &DocumentId,
        field: &FieldName,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(id)
            .ok_or_else(|| StoreError::document_not_found(id.clone()))?;
        document.insert(field.as_str().to_string(), value);
        Ok(())
    }

    /// Remove a field from a document, returning its previous value
    pub async fn remove_field(&self, id: &DocumentId, field: &FieldName) -> Option<Value> {
        let mut documents = self.documents.write().await;
        documents
            .get_mut(id)
            .and_then(|document| document.remove(field.as_str()))
    }

    /// Get the raw value of a field, bypassing the counters
    pub async fn get_field(&self, id: &DocumentId, field: &FieldName) -> Option<Value> {
        let documents = self.documents.read().await;
        documents
            .get(id)
            .and_then(|document| document.get(field.as_str()))
            .cloned()
    }

    /// Number of `read_field` calls made so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `write_field` calls made so far (failed writes included)
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl FieldStore for MemoryStore {
    async fn read_field(
        &self,
        document_id: &DocumentId,
        field: &FieldName,
    ) -> Result<Vec<DocumentId>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let documents = self.documents.read().await;
        let document = documents
            .get(document_id)
            .ok_or_else(|| StoreError::document_not_found(document_id.clone()))?;
        let value = document
            .get(field.as_str())
            .ok_or_else(|| StoreError::field_not_found(document_id.clone(), field.clone()))?;

        // Null and non-array values are a shape error, never an empty array
        serde_json::from_value(value.clone()).map_err(|_| {
            StoreError::type_mismatch(document_id.clone(), field.clone(), ARRAY_OF_IDS)
        })
    }

    async fn write_field(
        &self,
        document_id: &DocumentId,
        field: &FieldName,
        value: Vec<DocumentId>,
    ) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::backend(format!(
                "write rejected for field '{}' on document {}",
                field, document_id
            )));
        }

        let value = serde_json::to_value(value).map_err(|e| StoreError::Backend(e.into()))?;

        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(document_id)
            .ok_or_else(|| StoreError::document_not_found(document_id.clone()))?;
        document.insert(field.as_str().to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store_with_parent(children: Value) -> (MemoryStore, DocumentId, FieldName) {
        let store = MemoryStore::new();
        let parent = DocumentId::from("P1");
        let field = FieldName::from("children");
        let mut fields = Map::new();
        fields.insert(field.as_str().to_string(), children);
        store.insert_document(parent.clone(), fields).await;
        (store, parent, field)
    }

    #[tokio::test]
    async fn test_read_field_decodes_array() {
        let (store, parent, field) = store_with_parent(json!(["A", "B"])).await;

        let children = store.read_field(&parent, &field).await.unwrap();
        assert_eq!(children, vec![DocumentId::from("A"), DocumentId::from("B")]);
        assert_eq!(store.reads(), 1);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_read_field_missing_document() {
        let store = MemoryStore::new();
        let result = store
            .read_field(&DocumentId::from("nope"), &FieldName::from("children"))
            .await;
        assert!(matches!(result, Err(StoreError::DocumentNotFound { .. })));
    }

    #[tokio::test]
    async fn test_read_field_missing_field() {
        let (store, parent, _) = store_with_parent(json!([])).await;
        let result = store.read_field(&parent, &FieldName::from("members")).await;
        assert!(matches!(result, Err(StoreError::FieldNotFound { .. })));
    }

    #[tokio::test]
    async fn test_read_field_wrong_shape() {
        for value in [json!("A"), json!(null), json!({"A": true}), json!([1, 2])] {
            let (store, parent, field) = store_with_parent(value.clone()).await;
            let result = store.read_field(&parent, &field).await;
            assert!(
                matches!(result, Err(StoreError::TypeMismatch { .. })),
                "expected type mismatch for {}",
                value
            );
        }
    }

    #[tokio::test]
    async fn test_write_field_replaces_value() {
        let (store, parent, field) = store_with_parent(json!(["A"])).await;

        store
            .write_field(&parent, &field, vec![DocumentId::from("B")])
            .await
            .unwrap();

        assert_eq!(store.get_field(&parent, &field).await, Some(json!(["B"])));
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_write_field_never_creates_documents() {
        let store = MemoryStore::new();
        let result = store
            .write_field(&DocumentId::from("ghost"), &FieldName::from("children"), vec![])
            .await;
        assert!(matches!(result, Err(StoreError::DocumentNotFound { .. })));
        assert!(store
            .get_field(&DocumentId::from("ghost"), &FieldName::from("children"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_fail_writes_leaves_value_untouched() {
        let (store, parent, field) = store_with_parent(json!(["A"])).await;
        store.fail_writes(true);

        let result = store.write_field(&parent, &field, vec![]).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
        assert_eq!(store.get_field(&parent, &field).await, Some(json!(["A"])));

        store.fail_writes(false);
        assert!(store.write_field(&parent, &field, vec![]).await.is_ok());
        assert_eq!(store.get_field(&parent, &field).await, Some(json!([])));
    }

    #[tokio::test]
    async fn test_create_and_remove_field() {
        let store = MemoryStore::new();
        let id = store.create_document().await;
        let field = FieldName::from("children");

        store.set_field(&id, &field, json!([])).await.unwrap();
        assert_eq!(store.remove_field(&id, &field).await, Some(json!([])));
        assert!(store.get_field(&id, &field).await.is_none());
    }
}
