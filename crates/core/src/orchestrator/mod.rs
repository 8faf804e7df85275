//! Ticket runner: one scheduled invocation.
//!
//! - **Numbering**: new rows get a ticket and a queued card
//! - **Cards**: queued cards are generated; failures stay queued for the next run

mod config;
mod runner;
mod types;

pub use config::RunnerConfig;
pub use runner::TicketRunner;
pub use types::{CreatedCard, RunReport, RunnerError};
