//! Persistent state: the ticket counter property and the pending-card queue.

mod sqlite;
mod store;

pub use sqlite::SqliteStateStore;
pub use store::{CardQueue, PendingCard, PropertyStore, StateError};
