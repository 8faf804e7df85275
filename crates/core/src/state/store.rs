//! Persistent state traits: the property store and the pending-card queue.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::ticket::TicketedRow;

/// Error type for state operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Stored data could not be decoded.
    #[error("Corrupt state: {0}")]
    Corrupt(String),
}

/// A ticketed row whose card has not been produced yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCard {
    pub ticket: TicketedRow,
    pub enqueued_at: DateTime<Utc>,
    /// Failed generation attempts so far.
    pub attempts: u32,
    pub last_error: Option<String>,
}

/// Named string properties persisted across invocations.
pub trait PropertyStore: Send + Sync {
    /// Get a property, `None` when never set.
    fn get_property(&self, key: &str) -> Result<Option<String>, StateError>;

    /// Set (or replace) a property.
    fn set_property(&self, key: &str, value: &str) -> Result<(), StateError>;
}

/// Queue of rows that were ticketed but still need a card.
pub trait CardQueue: Send + Sync {
    /// Add a ticketed row. Enqueueing the same ticket twice is a no-op.
    fn enqueue(&self, row: &TicketedRow) -> Result<(), StateError>;

    /// Pending cards in enqueue order.
    fn pending(&self) -> Result<Vec<PendingCard>, StateError>;

    /// Remove a card from the queue. Returns whether it was queued.
    fn complete(&self, ticket_id: &str) -> Result<bool, StateError>;

    /// Record a failed attempt, keeping the card queued.
    fn record_failure(&self, ticket_id: &str, error: &str) -> Result<(), StateError>;
}
