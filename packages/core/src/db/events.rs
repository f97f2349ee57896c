//! Link Events
//!
//! This module defines the events emitted by `LinkingService` after a link
//! change has been persisted. Other parts of an application (UI refresh,
//! notification fan-out, caches) subscribe to them instead of polling the
//! store.
//!
//! # Architecture
//!
//! Events are emitted using tokio's broadcast channel, allowing multiple
//! subscribers to receive them asynchronously.
//!
//! # Event Flow
//!
//! 1. `LinkingService` reads the Link Array, mutates it, and writes it back
//! 2. Only when the write succeeds, a `LinkEvent` is sent on the channel
//! 3. Every subscriber receives the event; failed calls emit nothing

use crate::models::{DocumentId, FieldName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted change to one parent's Link Array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkChange {
    pub parent_id: DocumentId,
    pub field: FieldName,
    pub child_id: DocumentId,
    pub occurred_at: DateTime<Utc>,
}

impl LinkChange {
    pub fn new(parent_id: DocumentId, field: FieldName, child_id: DocumentId) -> Self {
        Self {
            parent_id,
            field,
            child_id,
            occurred_at: Utc::now(),
        }
    }
}

/// Events emitted by `LinkingService`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LinkEvent {
    /// A child id was appended to a parent's Link Array
    #[serde(rename = "assigned")]
    Assigned(LinkChange),

    /// Every occurrence of a child id was removed from a parent's Link Array
    #[serde(rename = "unassigned")]
    Unassigned(LinkChange),
}

impl LinkEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            LinkEvent::Assigned(_) => "link:assigned",
            LinkEvent::Unassigned(_) => "link:unassigned",
        }
    }

    /// The change carried by this event
    pub fn change(&self) -> &LinkChange {
        match self {
            LinkEvent::Assigned(change) | LinkEvent::Unassigned(change) => change,
        }
    }
}
