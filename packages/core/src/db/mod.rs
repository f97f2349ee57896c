//! Store Layer
//!
//! This module holds everything on the store side of the linking protocol:
//!
//! - `FieldStore` - Point read/write of array fields, the only boundary to the
//!   external document store
//! - `StoreError` - Failures a store can report
//! - `MemoryStore` - In-process implementation for tests and local use
//! - `LinkEvent` - Notifications emitted after a link change is persisted
//!
//! The real store client (remote, network-backed) lives outside this crate and
//! plugs in by implementing `FieldStore`.

mod error;
pub mod events;
mod field_store;
mod memory_store;

pub use error::StoreError;
pub use events::{LinkChange, LinkEvent};
pub use field_store::FieldStore;
pub use memory_store::MemoryStore;
