//! doclink Core Linking Layer
//!
//! This crate maintains one-to-many relationships between documents in an
//! external document store. A parent document holds the identifiers of its
//! children in an array field (the Link Array); linking a child appends its
//! id, unlinking removes every occurrence.
//!
//! # Architecture
//!
//! - **Stateless Protocol**: Each call is one read, an in-memory mutation, and
//!   one write of the whole field
//! - **Injected Store**: The store client is passed in as a `FieldStore`,
//!   never reached through a global
//! - **No Silent Repair**: A missing or malformed Link Array is reported as
//!   `MissingArray` and is never initialized by this crate
//! - **Last Write Wins**: No compare-and-swap between read and write; use
//!   `LinkQueue` to serialize calls per field
//!
//! # Modules
//!
//! - [`models`] - Identity types (`DocumentId`, `FieldName`, `Document`)
//! - [`db`] - Store abstraction, in-memory store, link events
//! - [`services`] - `LinkingService` and `ArrayMutator`
//! - [`operations`] - Caller-side serialization (`LinkQueue`)
//! - [`config`] - Service configuration

pub mod config;
pub mod db;
pub mod models;
pub mod operations;
pub mod services;

// Re-export commonly used types
pub use config::LinkingConfig;
pub use models::*;
pub use services::*;
