//! Ticket assignment scan.
//!
//! Walks the sheet once, gives every eligible row the next ticket number and
//! queues the row for its card. The counter and the queue entry are persisted
//! before each cell write, so an interrupted scan can leave a gap in the
//! numbering (or a queue entry the runner later drops) but never hands the
//! same number out twice or leaves a ticketed row without a queued card.

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::timestamp::submission_date;
use super::types::{ScanReport, TicketId, TicketedRow};
use crate::clock::parse_utc_offset;
use crate::config::{Config, ConfigError};
use crate::dataset::{CellValue, Dataset, DatasetError, Row};
use crate::state::{CardQueue, PropertyStore, StateError};

/// Errors that stop a scan.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    State(#[from] StateError),

    /// The counter cannot advance past its stored value.
    #[error("Ticket counter {counter} cannot be incremented")]
    CounterExhausted { counter: u64 },
}

/// Settings for the assignment scan.
#[derive(Debug, Clone)]
pub struct AssignerConfig {
    /// 1-based ticket column.
    pub ticket_column: usize,
    /// 1-based timestamp column.
    pub timestamp_column: usize,
    /// Property key of the stored counter.
    pub counter_key: String,
    /// Continue after the highest ticket already in the sheet.
    pub reconcile_counter: bool,
    /// Offset used to read month/day from zoned timestamps.
    pub offset: FixedOffset,
}

impl Default for AssignerConfig {
    fn default() -> Self {
        Self {
            ticket_column: 1,
            timestamp_column: 2,
            counter_key: "lastTicketNumber".to_string(),
            reconcile_counter: true,
            offset: Utc.fix(),
        }
    }
}

impl AssignerConfig {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let offset = parse_utc_offset(&config.clock.timezone).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "clock.timezone '{}' is not a UTC offset",
                config.clock.timezone
            ))
        })?;
        Ok(Self {
            ticket_column: config.dataset.ticket_column,
            timestamp_column: config.dataset.timestamp_column,
            counter_key: config.state.counter_key.clone(),
            reconcile_counter: config.ticketing.reconcile_counter,
            offset,
        })
    }
}

/// Assigns ticket numbers to new rows.
pub struct TicketAssigner {
    dataset: Arc<dyn Dataset>,
    properties: Arc<dyn PropertyStore>,
    queue: Arc<dyn CardQueue>,
    config: AssignerConfig,
}

impl TicketAssigner {
    pub fn new(
        dataset: Arc<dyn Dataset>,
        properties: Arc<dyn PropertyStore>,
        queue: Arc<dyn CardQueue>,
        config: AssignerConfig,
    ) -> Self {
        Self {
            dataset,
            properties,
            queue,
            config,
        }
    }

    /// Stored counter; absent or unparsable reads as 0.
    pub fn load_counter(&self) -> Result<u64, TicketError> {
        let key = &self.config.counter_key;
        let counter = match self.properties.get_property(key)? {
            None => 0,
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!("Ignoring unparsable {} value '{}', starting from 0", key, raw);
                0
            }),
        };
        Ok(counter)
    }

    /// Run one scan over the sheet.
    pub fn run(&self) -> Result<ScanReport, TicketError> {
        let ticket_column = self.config.ticket_column;
        let timestamp_column = self.config.timestamp_column;

        let stored = self.load_counter()?;
        let rows = self.dataset.read_all()?;

        let mut counter = stored;
        if self.config.reconcile_counter {
            let highest = highest_ticket_number(&rows, ticket_column);
            if highest > counter {
                warn!(
                    "Stored counter {} is behind ticket {} found in the sheet, continuing from the sheet",
                    counter, highest
                );
                counter = highest;
            }
        }

        let mut report = ScanReport {
            counter_before: stored,
            counter_after: stored,
            ..ScanReport::default()
        };

        for (idx, row) in rows.iter().enumerate().skip(1) {
            let row_number = idx + 1;

            if row.cell(ticket_column).is_present() {
                report.already_ticketed += 1;
                continue;
            }

            let timestamp = row.cell(timestamp_column);
            if !timestamp.is_present() {
                debug!("Row {} has no timestamp yet", row_number);
                report.awaiting_timestamp += 1;
                continue;
            }

            let Some(date) = submission_date(timestamp, self.config.offset) else {
                warn!(
                    "Row {} timestamp '{}' is not a date, leaving it unticketed",
                    row_number, timestamp
                );
                report.unreadable_timestamp += 1;
                continue;
            };

            counter = counter
                .checked_add(1)
                .ok_or(TicketError::CounterExhausted { counter })?;
            let ticket_id = TicketId::new(counter, date);
            let ticketed = TicketedRow {
                row_number,
                ticket_id,
            };

            // counter, queue entry, then cell: a written ticket always has its card queued
            self.properties
                .set_property(&self.config.counter_key, &counter.to_string())?;
            report.counter_after = counter;

            self.queue.enqueue(&ticketed)?;

            self.dataset.write_cell(
                row_number,
                ticket_column,
                CellValue::Text(ticket_id.to_string()),
            )?;

            debug!("Assigned ticket {} to row {}", ticket_id, row_number);
            report.ticketed.push(ticketed);
        }

        info!(
            "Ticket scan finished: {} assigned, {} already ticketed, {} awaiting timestamp, {} unreadable (counter {} -> {})",
            report.ticketed.len(),
            report.already_ticketed,
            report.awaiting_timestamp,
            report.unreadable_timestamp,
            report.counter_before,
            report.counter_after
        );

        Ok(report)
    }
}

/// Highest ticket number present in the ticket column (0 when none parse).
fn highest_ticket_number(rows: &[Row], ticket_column: usize) -> u64 {
    rows.iter()
        .skip(1)
        .filter_map(|row| match row.cell(ticket_column) {
            CellValue::Text(raw) => TicketId::parse(raw).map(|id| id.number()),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::state::{PendingCard, SqliteStateStore};
    use crate::testing::{fixtures, MemoryDataset};

    /// Card queue whose first `enqueue` fails.
    struct FlakyQueue {
        inner: Arc<SqliteStateStore>,
        failed: AtomicBool,
    }

    impl CardQueue for FlakyQueue {
        fn enqueue(&self, row: &TicketedRow) -> Result<(), StateError> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(StateError::Database("disk I/O error".to_string()));
            }
            self.inner.enqueue(row)
        }

        fn pending(&self) -> Result<Vec<PendingCard>, StateError> {
            self.inner.pending()
        }

        fn complete(&self, ticket_id: &str) -> Result<bool, StateError> {
            self.inner.complete(ticket_id)
        }

        fn record_failure(&self, ticket_id: &str, error: &str) -> Result<(), StateError> {
            self.inner.record_failure(ticket_id, error)
        }
    }

    struct Harness {
        dataset: Arc<MemoryDataset>,
        state: Arc<SqliteStateStore>,
        assigner: TicketAssigner,
    }

    fn harness(rows: Vec<Vec<CellValue>>, config: AssignerConfig) -> Harness {
        let dataset = Arc::new(MemoryDataset::from_rows(rows));
        let state = Arc::new(SqliteStateStore::in_memory().unwrap());
        let assigner = TicketAssigner::new(dataset.clone(), state.clone(), state.clone(), config);
        Harness {
            dataset,
            state,
            assigner,
        }
    }

    fn counter(h: &Harness) -> Option<String> {
        h.state.get_property("lastTicketNumber").unwrap()
    }

    fn ticket_cell(h: &Harness, row: usize) -> CellValue {
        h.dataset.read_cell(row, 1).unwrap()
    }

    #[test]
    fn test_first_ticket_from_zero() {
        let h = harness(
            vec![
                fixtures::header_row(),
                fixtures::response_row("", "2024-03-07"),
            ],
            AssignerConfig::default(),
        );

        let report = h.assigner.run().unwrap();

        assert_eq!(report.counter_before, 0);
        assert_eq!(report.counter_after, 1);
        assert_eq!(report.ticketed.len(), 1);
        assert_eq!(report.ticketed[0].row_number, 2);
        assert_eq!(ticket_cell(&h, 2), CellValue::Text("00001-0307".to_string()));
        assert_eq!(counter(&h).as_deref(), Some("1"));

        let pending = h.state.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].ticket.ticket_id.to_string(), "00001-0307");
    }

    #[test]
    fn test_prefilled_ticket_is_left_alone() {
        let h = harness(
            vec![
                fixtures::header_row(),
                fixtures::response_row("00010-0101", "2024-03-07"),
            ],
            AssignerConfig::default(),
        );

        let report = h.assigner.run().unwrap();

        assert!(report.ticketed.is_empty());
        assert_eq!(report.already_ticketed, 1);
        assert_eq!(report.counter_after, 0);
        assert_eq!(ticket_cell(&h, 2), CellValue::Text("00010-0101".to_string()));
        assert_eq!(counter(&h), None);
        assert!(h.state.pending().unwrap().is_empty());
    }

    #[test]
    fn test_numbers_increase_in_sheet_order() {
        let h = harness(
            vec![
                fixtures::header_row(),
                fixtures::response_row("", "2024-03-07"),
                fixtures::response_row("", ""),
                fixtures::response_row("", "12/25/2024 08:00:00"),
                fixtures::response_row("", "2025-01-02T09:30:00"),
            ],
            AssignerConfig::default(),
        );

        let report = h.assigner.run().unwrap();

        let ids: Vec<String> = report
            .ticketed
            .iter()
            .map(|t| t.ticket_id.to_string())
            .collect();
        assert_eq!(ids, vec!["00001-0307", "00002-1225", "00003-0102"]);
        let rows: Vec<usize> = report.ticketed.iter().map(|t| t.row_number).collect();
        assert_eq!(rows, vec![2, 4, 5]);
        assert!(report
            .ticketed
            .windows(2)
            .all(|w| w[0].ticket_id.number() < w[1].ticket_id.number()));
        assert_eq!(report.awaiting_timestamp, 1);
        assert_eq!(ticket_cell(&h, 3), CellValue::Empty);
        assert_eq!(counter(&h).as_deref(), Some("3"));
    }

    #[test]
    fn test_second_scan_changes_nothing() {
        let h = harness(
            vec![
                fixtures::header_row(),
                fixtures::response_row("", "2024-03-07"),
                fixtures::response_row("", "2024-03-08"),
            ],
            AssignerConfig::default(),
        );

        h.assigner.run().unwrap();
        let snapshot = h.dataset.snapshot();
        let writes = h.dataset.write_count();

        let second = h.assigner.run().unwrap();

        assert!(second.ticketed.is_empty());
        assert_eq!(second.already_ticketed, 2);
        assert_eq!(second.counter_before, 2);
        assert_eq!(second.counter_after, 2);
        assert_eq!(h.dataset.snapshot(), snapshot);
        assert_eq!(h.dataset.write_count(), writes);
        assert_eq!(counter(&h).as_deref(), Some("2"));
    }

    #[test]
    fn test_row_gains_timestamp_later() {
        let h = harness(
            vec![
                fixtures::header_row(),
                fixtures::response_row("", ""),
            ],
            AssignerConfig::default(),
        );

        assert!(h.assigner.run().unwrap().ticketed.is_empty());

        h.dataset
            .write_cell(2, 2, CellValue::from_raw("2024-11-30 16:00:00"))
            .unwrap();
        let report = h.assigner.run().unwrap();
        assert_eq!(report.ticketed[0].ticket_id.to_string(), "00001-1130");
    }

    #[test]
    fn test_unparsable_counter_starts_at_zero() {
        let h = harness(
            vec![
                fixtures::header_row(),
                fixtures::response_row("", "2024-03-07"),
            ],
            AssignerConfig::default(),
        );
        h.state.set_property("lastTicketNumber", "not-a-number").unwrap();

        let report = h.assigner.run().unwrap();
        assert_eq!(report.counter_before, 0);
        assert_eq!(report.ticketed[0].ticket_id.to_string(), "00001-0307");
    }

    #[test]
    fn test_counter_continues_from_store() {
        let h = harness(
            vec![
                fixtures::header_row(),
                fixtures::response_row("", "2024-03-07"),
            ],
            AssignerConfig::default(),
        );
        h.state.set_property("lastTicketNumber", "41").unwrap();

        let report = h.assigner.run().unwrap();
        assert_eq!(report.ticketed[0].ticket_id.to_string(), "00042-0307");
        assert_eq!(counter(&h).as_deref(), Some("42"));
    }

    #[test]
    fn test_reconcile_with_sheet() {
        let rows = vec![
            fixtures::header_row(),
            fixtures::response_row("00041-0101", "2024-01-01"),
            fixtures::response_row("", "2024-03-07"),
        ];

        let h = harness(rows.clone(), AssignerConfig::default());
        let report = h.assigner.run().unwrap();
        assert_eq!(report.ticketed[0].ticket_id.to_string(), "00042-0307");
        assert_eq!(counter(&h).as_deref(), Some("42"));

        let config = AssignerConfig {
            reconcile_counter: false,
            ..AssignerConfig::default()
        };
        let h = harness(rows, config);
        let report = h.assigner.run().unwrap();
        assert_eq!(report.ticketed[0].ticket_id.to_string(), "00001-0307");
    }

    #[test]
    fn test_unreadable_timestamp_is_skipped() {
        let h = harness(
            vec![
                fixtures::header_row(),
                fixtures::response_row("", "sometime in march"),
                fixtures::response_row("", "2024-03-07"),
            ],
            AssignerConfig::default(),
        );

        let report = h.assigner.run().unwrap();
        assert_eq!(report.unreadable_timestamp, 1);
        assert_eq!(report.ticketed.len(), 1);
        assert_eq!(report.ticketed[0].row_number, 3);
        assert_eq!(ticket_cell(&h, 2), CellValue::Empty);
    }

    #[test]
    fn test_interrupted_scan_never_reuses_a_number() {
        let h = harness(
            vec![
                fixtures::header_row(),
                fixtures::response_row("", "2024-03-07"),
                fixtures::response_row("", "2024-03-08"),
                fixtures::response_row("", "2024-03-09"),
            ],
            AssignerConfig {
                reconcile_counter: false,
                ..AssignerConfig::default()
            },
        );

        h.dataset.fail_writes_after(1);
        let err = h.assigner.run().unwrap_err();
        assert!(matches!(err, TicketError::Dataset(_)));
        // row 2 landed, the counter already covers the failed row 3
        assert_eq!(ticket_cell(&h, 2), CellValue::Text("00001-0307".to_string()));
        assert_eq!(counter(&h).as_deref(), Some("2"));
        // row 3's card was queued before its cell write failed
        let queued: Vec<String> = h
            .state
            .pending()
            .unwrap()
            .iter()
            .map(|p| p.ticket.ticket_id.to_string())
            .collect();
        assert_eq!(queued, vec!["00001-0307", "00002-0308"]);

        h.dataset.clear_write_failure();
        let report = h.assigner.run().unwrap();
        let ids: Vec<String> = report
            .ticketed
            .iter()
            .map(|t| t.ticket_id.to_string())
            .collect();
        assert_eq!(ids, vec!["00003-0308", "00004-0309"]);
    }

    #[test]
    fn test_custom_columns_and_offset() {
        let rows = vec![
            vec![
                CellValue::from_raw("Timestamp"),
                CellValue::from_raw("Name"),
                CellValue::from_raw("Ticket"),
            ],
            vec![
                CellValue::from_raw("2024-03-06T20:30:00Z"),
                CellValue::from_raw("Reyes"),
                CellValue::Empty,
            ],
        ];
        let config = AssignerConfig {
            ticket_column: 3,
            timestamp_column: 1,
            offset: FixedOffset::east_opt(8 * 3600).unwrap(),
            ..AssignerConfig::default()
        };
        let h = harness(rows, config);

        h.assigner.run().unwrap();
        assert_eq!(
            h.dataset.read_cell(2, 3).unwrap(),
            CellValue::Text("00001-0307".to_string())
        );
    }

    #[test]
    fn test_assigned_ids_match_format() {
        let h = harness(
            vec![
                fixtures::header_row(),
                fixtures::response_row("", "1/5/2024 7:00:00"),
                fixtures::response_row("", "2024-10-31"),
            ],
            AssignerConfig::default(),
        );
        let report = h.assigner.run().unwrap();
        let re = regex_lite::Regex::new(r"^\d{5}-\d{4}$").unwrap();
        for (ticketed, expected) in report.ticketed.iter().zip(["0105", "1031"]) {
            let id = ticketed.ticket_id.to_string();
            assert!(re.is_match(&id), "{} does not match", id);
            assert!(id.ends_with(expected));
        }
    }

    #[test]
    fn test_failed_enqueue_leaves_row_unticketed() {
        let dataset = Arc::new(MemoryDataset::from_rows(vec![
            fixtures::header_row(),
            fixtures::response_row("", "2024-03-07"),
        ]));
        let state = Arc::new(SqliteStateStore::in_memory().unwrap());
        let queue = Arc::new(FlakyQueue {
            inner: state.clone(),
            failed: AtomicBool::new(false),
        });
        let assigner = TicketAssigner::new(
            dataset.clone(),
            state.clone(),
            queue,
            AssignerConfig {
                reconcile_counter: false,
                ..AssignerConfig::default()
            },
        );

        let err = assigner.run().unwrap_err();
        assert!(matches!(err, TicketError::State(_)));
        assert_eq!(dataset.read_cell(2, 1).unwrap(), CellValue::Empty);
        assert_eq!(dataset.write_count(), 0);
        // the number is burnt, not reused
        assert_eq!(
            state.get_property("lastTicketNumber").unwrap().as_deref(),
            Some("1")
        );

        let report = assigner.run().unwrap();
        assert_eq!(report.ticketed.len(), 1);
        assert_eq!(report.ticketed[0].ticket_id.to_string(), "00002-0307");
        assert_eq!(
            dataset.read_cell(2, 1).unwrap(),
            CellValue::Text("00002-0307".to_string())
        );
        let pending = state.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].ticket.ticket_id.to_string(), "00002-0307");
    }

    #[test]
    fn test_exhausted_counter_is_an_error() {
        let h = harness(
            vec![
                fixtures::header_row(),
                fixtures::response_row("", "2024-03-07"),
            ],
            AssignerConfig::default(),
        );
        h.state
            .set_property("lastTicketNumber", &u64::MAX.to_string())
            .unwrap();

        let err = h.assigner.run().unwrap_err();
        assert!(matches!(
            err,
            TicketError::CounterExhausted { counter: u64::MAX }
        ));
        assert_eq!(ticket_cell(&h, 2), CellValue::Empty);
        assert!(h.state.pending().unwrap().is_empty());
    }
}
