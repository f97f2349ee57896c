//! Store Error Types
//!
//! This module defines error types for field-level store operations, giving
//! callers a clear distinction between missing documents, missing fields,
//! wrongly-shaped values, and backend failures.

use crate::models::{DocumentId, FieldName};
use thiserror::Error;

/// Field store operation errors
///
/// Covers every failure a `FieldStore` can report for a point read or point
/// write. The linking layer classifies these further into `LinkingError`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed document does not exist
    #[error("Document not found: {id}")]
    DocumentNotFound { id: DocumentId },

    /// The document exists but has no value under the field
    #[error("Field '{field}' not found on document {id}")]
    FieldNotFound { id: DocumentId, field: FieldName },

    /// The stored value cannot be decoded as the requested shape
    #[error("Field '{field}' on document {id} is not {expected}")]
    TypeMismatch {
        id: DocumentId,
        field: FieldName,
        expected: String,
    },

    /// Opaque failure reported by the underlying backend
    #[error("Store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    /// Create a document not found error
    pub fn document_not_found(id: DocumentId) -> Self {
        Self::DocumentNotFound { id }
    }

    /// Create a field not found error
    pub fn field_not_found(id: DocumentId, field: FieldName) -> Self {
        Self::FieldNotFound { id, field }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(id: DocumentId, field: FieldName, expected: impl Into<String>) -> Self {
        Self::TypeMismatch {
            id,
            field,
            expected: expected.into(),
        }
    }

    /// Create a backend error from a plain message
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(anyhow::anyhow!(msg.into()))
    }
}
