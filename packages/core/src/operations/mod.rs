//! Link Operations
//!
//! Caller-side helpers layered on top of `LinkingService`. The service itself
//! takes no locks; the helpers here add ordering for callers that need it.
//!
//! - `LinkQueue` - Serializes link operations per (parent, field)

pub mod link_queue;

pub use link_queue::LinkQueue;
