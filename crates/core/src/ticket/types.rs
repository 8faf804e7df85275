//! Ticket identifier and scan result types.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

static TICKET_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{5,})-(\d{2})(\d{2})$").expect("valid ticket id regex"));

/// Ticket identifier: `NNNNN-MMDD`.
///
/// The number is zero-padded to five digits (larger numbers keep all their
/// digits); month and day come from the row's submission timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketId {
    number: u64,
    month: u32,
    day: u32,
}

impl TicketId {
    /// Identifier for `number`, date-coded from `date`.
    pub fn new(number: u64, date: NaiveDate) -> Self {
        Self {
            number,
            month: date.month(),
            day: date.day(),
        }
    }

    /// Parse a `NNNNN-MMDD` string.
    pub fn parse(value: &str) -> Option<Self> {
        let caps = TICKET_ID_RE.captures(value.trim())?;
        let number = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        Some(Self { number, month, day })
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// The `MMDD` suffix.
    pub fn date_code(&self) -> String {
        format!("{:02}{:02}", self.month, self.day)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}-{:02}{:02}", self.number, self.month, self.day)
    }
}

impl Serialize for TicketId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TicketId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TicketId::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid ticket id: {}", raw)))
    }
}

/// A row that was just given a ticket and still needs its card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketedRow {
    /// 1-based sheet row.
    pub row_number: usize,
    pub ticket_id: TicketId,
}

/// Outcome of one numbering scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Counter value read at the start of the scan.
    pub counter_before: u64,
    /// Counter value after the scan (unchanged when nothing was ticketed).
    pub counter_after: u64,
    /// Rows ticketed by this scan, in sheet order.
    pub ticketed: Vec<TicketedRow>,
    /// Rows skipped because they already carry a ticket.
    pub already_ticketed: usize,
    /// Rows skipped because the timestamp cell is empty.
    pub awaiting_timestamp: usize,
    /// Rows skipped because the timestamp could not be read as a date.
    pub unreadable_timestamp: usize,
}
