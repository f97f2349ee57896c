//! Data Models
//!
//! This module contains the identity types shared by the store and the
//! linking services:
//!
//! - `DocumentId` - Opaque document identifier, the Link Array element type
//! - `FieldName` - Case-sensitive field name on a document
//! - `Document` - Capability trait exposing a document's identifier
//!
//! A Link Array is simply `Vec<DocumentId>` stored under a `FieldName` on the
//! parent document.

mod document;

pub use document::{Document, DocumentId, FieldName};
