//! Types for the ticket runner.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::card::CardError;
use crate::dataset::DatasetError;
use crate::document::DocumentError;
use crate::state::StateError;
use crate::ticket::{ScanReport, TicketError, TicketId};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Numbering scan failed.
    #[error("Ticket scan failed: {0}")]
    Ticket(#[from] TicketError),

    /// Card stage hit a configuration error (template or folder unreachable).
    #[error("Card generation failed: {0}")]
    Card(#[from] CardError),

    /// Template or folder check failed.
    #[error("Document store not ready: {0}")]
    Document(#[from] DocumentError),

    #[error("State store error: {0}")]
    State(#[from] StateError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

/// A card produced during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedCard {
    pub row_number: usize,
    pub ticket_id: TicketId,
    pub document_name: String,
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    /// Run date in the configured timezone, `YYYY-MM-DD`.
    pub run_date: String,
    pub scan: ScanReport,
    pub cards_created: Vec<CreatedCard>,
    /// Cards that failed this run and stay queued.
    pub cards_failed: usize,
    /// Queue entries dropped because the row no longer holds their ticket.
    pub cards_discarded: usize,
    /// Queue length after the run.
    pub still_pending: usize,
}
