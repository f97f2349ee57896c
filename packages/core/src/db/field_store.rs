//! FieldStore Trait - Document Store Abstraction
//!
//! This module defines the `FieldStore` trait, the only boundary between the
//! linking services and the external document store. Implementations wrap a
//! real store client; `MemoryStore` is the in-process implementation used in
//! tests.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: Both methods are async to support network backends
//! 2. **Single-Field Atomicity**: Each read and each write is atomic on its own.
//!    Nothing spans a read and a later write, and no multi-field transaction
//!    is assumed
//! 3. **Typed Arrays**: The trait speaks in `Vec<DocumentId>`; decoding the raw
//!    stored value (and reporting a wrong shape) is the implementation's job
//! 4. **No Retries**: Backoff and timeouts belong to the store client
//!
//! # Examples
//!
//! ```rust,no_run
//! use doclink_core::db::{FieldStore, MemoryStore};
//! use doclink_core::models::{DocumentId, FieldName};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), doclink_core::db::StoreError> {
//! let store: Arc<dyn FieldStore> = Arc::new(MemoryStore::new());
//! let children = store
//!     .read_field(&DocumentId::from("P1"), &FieldName::from("children"))
//!     .await?;
//! println!("{} children", children.len());
//! # Ok(())
//! # }
//! ```

use super::StoreError;
use crate::models::{DocumentId, FieldName};
use async_trait::async_trait;

/// Point read/write access to array fields of documents
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single store can be shared by
/// every linking task through an `Arc`.
#[async_trait]
pub trait FieldStore: Send + Sync {
    /// Read a field as an ordered sequence of document identifiers
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The document does not exist
    /// - The field is absent on the document
    /// - The stored value is not an array of identifiers
    /// - The backend fails
    async fn read_field(
        &self,
        document_id: &DocumentId,
        field: &FieldName,
    ) -> Result<Vec<DocumentId>, StoreError>;

    /// Replace a field's value with the given sequence
    ///
    /// Overwrites the whole field (last write wins).
    ///
    /// # Errors
    ///
    /// Returns error if the document does not exist or the backend fails.
    async fn write_field(
        &self,
        document_id: &DocumentId,
        field: &FieldName,
        value: Vec<DocumentId>,
    ) -> Result<(), StoreError>;
}
