//! Ticket runner implementation.
//!
//! One invocation does two stages in order:
//! - Numbering: the assigner tickets new rows and queues them
//! - Cards: every queued row gets its card; failures stay queued for the next run

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::card::{CardGenerator, CardTemplate};
use crate::clock::{format_date, Clock};
use crate::dataset::{CellValue, Dataset, DatasetError};
use crate::document::DocumentStore;
use crate::state::{CardQueue, PendingCard, PropertyStore};
use crate::ticket::TicketAssigner;

use super::config::RunnerConfig;
use super::types::{CreatedCard, RunReport, RunnerError};

/// Runs the numbering scan and drains the pending-card queue.
pub struct TicketRunner {
    config: RunnerConfig,
    dataset: Arc<dyn Dataset>,
    queue: Arc<dyn CardQueue>,
    documents: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    assigner: TicketAssigner,
    generator: CardGenerator,
}

impl TicketRunner {
    pub fn new(
        config: RunnerConfig,
        dataset: Arc<dyn Dataset>,
        properties: Arc<dyn PropertyStore>,
        queue: Arc<dyn CardQueue>,
        documents: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let assigner = TicketAssigner::new(
            Arc::clone(&dataset),
            properties,
            Arc::clone(&queue),
            config.assigner.clone(),
        );
        let generator = CardGenerator::new(
            Arc::clone(&dataset),
            Arc::clone(&documents),
            config.template.clone(),
        );
        Self {
            config,
            dataset,
            queue,
            documents,
            clock,
            assigner,
            generator,
        }
    }

    pub fn template(&self) -> &CardTemplate {
        &self.config.template
    }

    /// The card generator, for producing a single card on demand.
    pub fn generator(&self) -> &CardGenerator {
        &self.generator
    }

    /// Check that the template and destination folder are reachable.
    pub fn validate(&self) -> Result<(), RunnerError> {
        let template = &self.config.template;
        self.documents
            .validate(&template.template_id, &template.folder_id)?;
        info!(
            "Document store '{}' ready (template '{}', folder '{}')",
            self.documents.name(),
            template.template_id,
            template.folder_id
        );
        Ok(())
    }

    /// Run one invocation: numbering, then cards.
    ///
    /// A card that fails for a row-level reason stays queued and the run
    /// continues. A missing template or folder stops the run with an error.
    pub fn run(&self) -> Result<RunReport, RunnerError> {
        let started_at = self.clock.now();
        let run_date = format_date(started_at, self.config.assigner.offset);
        info!("Ticket run started for {}", run_date);

        let scan = self.assigner.run()?;

        let mut report = RunReport {
            started_at,
            run_date,
            scan,
            cards_created: Vec::new(),
            cards_failed: 0,
            cards_discarded: 0,
            still_pending: 0,
        };

        if self.config.generate_cards {
            self.drain_queue(&mut report)?;
        } else {
            info!("Card generation disabled, leaving cards queued");
        }

        report.still_pending = self.queue.pending()?.len();

        info!(
            "Ticket run finished: {} ticketed, {} cards created, {} failed, {} discarded, {} pending",
            report.scan.ticketed.len(),
            report.cards_created.len(),
            report.cards_failed,
            report.cards_discarded,
            report.still_pending
        );

        Ok(report)
    }

    fn drain_queue(&self, report: &mut RunReport) -> Result<(), RunnerError> {
        let pending = self.queue.pending()?;
        if pending.is_empty() {
            return Ok(());
        }

        let header = self.generator.read_header()?;

        for card in pending {
            let ticket_id = card.ticket.ticket_id.to_string();
            let row_number = card.ticket.row_number;

            if !self.row_holds_ticket(&card)? {
                warn!(
                    "Row {} no longer holds ticket {}, dropping its queued card",
                    row_number, ticket_id
                );
                self.queue.complete(&ticket_id)?;
                report.cards_discarded += 1;
                continue;
            }

            match self.generator.generate_with_header(&header, row_number) {
                Ok(generated) => {
                    self.queue.complete(&ticket_id)?;
                    report.cards_created.push(CreatedCard {
                        row_number,
                        ticket_id: card.ticket.ticket_id,
                        document_name: generated.document.name,
                    });
                }
                Err(e) => {
                    self.queue.record_failure(&ticket_id, &e.to_string())?;
                    report.cards_failed += 1;
                    if e.is_fatal() {
                        error!("Stopping card generation at ticket {}: {}", ticket_id, e);
                        return Err(e.into());
                    }
                    warn!(
                        "Card for ticket {} at row {} failed (attempt {}): {}",
                        ticket_id,
                        row_number,
                        card.attempts + 1,
                        e
                    );
                }
            }
        }

        Ok(())
    }

    fn row_holds_ticket(&self, card: &PendingCard) -> Result<bool, RunnerError> {
        let cell = match self
            .dataset
            .read_cell(card.ticket.row_number, self.config.assigner.ticket_column)
        {
            Ok(cell) => cell,
            Err(DatasetError::OutOfRange { .. }) => CellValue::Empty,
            Err(e) => return Err(e.into()),
        };
        Ok(cell.to_string().trim() == card.ticket.ticket_id.to_string())
    }
}
