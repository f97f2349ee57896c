//! Array Mutator
//!
//! Executes the read-modify-write sequence against a `FieldStore`:
//!
//! 1. Read the Link Array from the parent's field
//! 2. Any read failure becomes `LinkingError::MissingArray`; nothing is written
//!    and no empty array is substituted
//! 3. Apply the mutation to the in-memory copy (synchronous)
//! 4. Write the whole array back to the same field
//! 5. Report the write outcome, surfacing store errors as
//!    `LinkingError::StoreWriteFailure`
//!
//! # Concurrency
//!
//! There is no compare-and-swap between steps 1 and 4. Two overlapping calls
//! on the same (parent, field) can interleave and the last write wins. Use
//! `LinkQueue` when callers need per-field serialization.

use super::error::LinkingError;
use crate::db::FieldStore;
use crate::models::{DocumentId, FieldName};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Mutation applied to a Link Array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayOperation {
    /// Append the id unconditionally; duplicates are kept
    Insert,
    /// Remove every occurrence of the id; absence is not an error
    Remove,
}

impl ArrayOperation {
    /// Apply this operation to `array` in place
    ///
    /// Returns the number of elements added (insert) or removed (remove).
    ///
    /// # Examples
    ///
    /// ```
    /// use doclink_core::models::DocumentId;
    /// use doclink_core::services::ArrayOperation;
    ///
    /// let a = DocumentId::from("A");
    /// let mut array = vec![a.clone(), DocumentId::from("B"), a.clone()];
    ///
    /// assert_eq!(ArrayOperation::Remove.apply(&mut array, &a), 2);
    /// assert_eq!(array, vec![DocumentId::from("B")]);
    ///
    /// assert_eq!(ArrayOperation::Insert.apply(&mut array, &a), 1);
    /// assert_eq!(ArrayOperation::Insert.apply(&mut array, &a), 1);
    /// assert_eq!(array.len(), 3);
    /// ```
    pub fn apply(&self, array: &mut Vec<DocumentId>, target: &DocumentId) -> usize {
        match self {
            ArrayOperation::Insert => {
                array.push(target.clone());
                1
            }
            ArrayOperation::Remove => {
                let before = array.len();
                array.retain(|id| id != target);
                before - array.len()
            }
        }
    }
}

/// Read-modify-write executor for Link Arrays
///
/// Holds the injected store; carries no other state between calls.
pub struct ArrayMutator<S: FieldStore + ?Sized> {
    store: Arc<S>,
}

impl<S: FieldStore + ?Sized> Clone for ArrayMutator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: FieldStore + ?Sized> ArrayMutator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Read a Link Array, classifying every read failure as `MissingArray`
    pub async fn read(
        &self,
        parent: &DocumentId,
        field: &FieldName,
    ) -> Result<Vec<DocumentId>, LinkingError> {
        self.store
            .read_field(parent, field)
            .await
            .map_err(|source| LinkingError::missing_array(parent.clone(), field.clone(), source))
    }

    /// Run one read-modify-write cycle
    ///
    /// # Returns
    ///
    /// - `Ok(())` - The mutated array was written
    /// - `Err(LinkingError::MissingArray)` - The read failed; no write issued
    /// - `Err(LinkingError::StoreWriteFailure)` - The write failed; stored
    ///   array unchanged
    pub async fn mutate(
        &self,
        parent: &DocumentId,
        field: &FieldName,
        target: &DocumentId,
        operation: ArrayOperation,
    ) -> Result<(), LinkingError> {
        let mut array = self.read(parent, field).await?;

        let changed = operation.apply(&mut array, target);
        tracing::trace!(
            "{:?} of '{}' on {}.{} changed {} element(s), {} remain",
            operation,
            target,
            parent,
            field,
            changed,
            array.len()
        );

        self.store
            .write_field(parent, field, array)
            .await
            .map_err(LinkingError::store_write_failure)
    }
}
