//! Document Identity Types
//!
//! This module defines the identity layer shared by the store and the linking
//! services:
//!
//! - `DocumentId` - Opaque identifier of a document in the store
//! - `FieldName` - Case-sensitive name of a field on a document
//! - `Document` - Capability trait for anything that can hand out its id
//!
//! Both newtypes serialize as plain strings, so a Link Array round-trips as a
//! JSON array of strings.
//!
//! # Examples
//!
//! ```rust
//! use doclink_core::models::{Document, DocumentId, FieldName};
//!
//! struct Post {
//!     id: DocumentId,
//! }
//!
//! impl Document for Post {
//!     fn id(&self) -> &DocumentId {
//!         &self.id
//!     }
//! }
//!
//! let post = Post { id: DocumentId::from("post-1") };
//! assert_eq!(post.id().as_str(), "post-1");
//! assert_eq!(FieldName::from("comments").as_str(), "comments");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a document in the store
///
/// Comparable for equality and used as the element type of every Link Array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Create an identifier from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier (UUID v4)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name of a field on a document
///
/// Case-sensitive; the store decides what names are valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for FieldName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Capability shared by every parent and child passed to the linking service
///
/// The linking layer only ever needs the identifier; implement this for your
/// own model types instead of converting them to ids at every call site.
pub trait Document {
    /// Identifier of this document in the store
    fn id(&self) -> &DocumentId;
}

impl Document for DocumentId {
    fn id(&self) -> &DocumentId {
        self
    }
}

impl<T: Document + ?Sized> Document for &T {
    fn id(&self) -> &DocumentId {
        (**self).id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_serializes_as_plain_string() {
        let ids = vec![DocumentId::from("A"), DocumentId::from("B")];
        let json = serde_json::to_value(&ids).unwrap();
        assert_eq!(json, serde_json::json!(["A", "B"]));

        let parsed: Vec<DocumentId> = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, ids);
    }

    #[test]
    fn test_field_name_is_case_sensitive() {
        assert_ne!(FieldName::from("children"), FieldName::from("Children"));
        assert_eq!(FieldName::new(String::from("children")), FieldName::from("children"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_document_id_is_its_own_document() {
        let id = DocumentId::from("doc-1");
        assert_eq!(Document::id(&id), &id);
        assert_eq!(Document::id(&&id), &id);
    }
}
