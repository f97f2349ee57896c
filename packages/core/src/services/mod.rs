//! Linking Services
//!
//! This module contains the linking protocol:
//!
//! - `LinkingService` - Public `assign`/`unassign` entry points and completion
//!   delivery (await, channel, callback)
//! - `ArrayMutator` - Read-modify-write of a Link Array with error
//!   classification
//! - `LinkingError` - Outcome taxonomy (`MissingArray`, `StoreWriteFailure`)
//!
//! Services reach the store only through the injected `FieldStore`.

pub mod array_mutator;
pub mod error;
pub mod linking_service;

pub use array_mutator::{ArrayMutator, ArrayOperation};
pub use error::LinkingError;
pub use linking_service::{LinkRequest, LinkingService};
