//! Ticket numbering for sheet rows.

mod assigner;
mod timestamp;
mod types;

pub use assigner::{AssignerConfig, TicketAssigner, TicketError};
pub use timestamp::submission_date;
pub use types::{ScanReport, TicketId, TicketedRow};
