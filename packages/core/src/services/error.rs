//! Linking Error Types
//!
//! This module defines the error taxonomy of the linking protocol. Every
//! `assign`/`unassign` call ends in exactly one of: success, `MissingArray`
//! (read phase), or `StoreWriteFailure` (write phase).

use crate::db::StoreError;
use crate::models::{DocumentId, FieldName};
use thiserror::Error;

/// Linking operation errors
///
/// Both variants are terminal for the call and leave the stored Link Array
/// exactly as it was before the call.
#[derive(Error, Debug)]
pub enum LinkingError {
    /// The parent's field could not be read as an array of ids
    ///
    /// Raised for a missing document, a missing field, a value of the wrong
    /// shape, or a failed read. No write is attempted.
    #[error("No link array at field '{field}' on document {parent}: {source}")]
    MissingArray {
        parent: DocumentId,
        field: FieldName,
        source: StoreError,
    },

    /// The store rejected the write of the mutated array
    ///
    /// Carries the store error unchanged; its message is shown verbatim.
    #[error(transparent)]
    StoreWriteFailure(StoreError),
}

impl LinkingError {
    /// Create a missing array error
    pub fn missing_array(parent: DocumentId, field: FieldName, source: StoreError) -> Self {
        Self::MissingArray {
            parent,
            field,
            source,
        }
    }

    /// Create a store write failure error
    pub fn store_write_failure(source: StoreError) -> Self {
        Self::StoreWriteFailure(source)
    }

    pub fn is_missing_array(&self) -> bool {
        matches!(self, Self::MissingArray { .. })
    }

    pub fn is_write_failure(&self) -> bool {
        matches!(self, Self::StoreWriteFailure(_))
    }

    /// The store error behind this linking error
    pub fn store_error(&self) -> &StoreError {
        match self {
            Self::MissingArray { source, .. } => source,
            Self::StoreWriteFailure(source) => source,
        }
    }
}
