//! Testing utilities and in-memory implementations of the collaborator traits.
//!
//! Lets the ticket and card stages run without a real sheet, database or
//! document folder.
//!
//! # Example
//!
//! ```rust,ignore
//! use ticketcard_core::testing::{fixtures, MemoryDataset, MockDocumentStore};
//!
//! let dataset = MemoryDataset::from_rows(vec![
//!     fixtures::header_row(),
//!     fixtures::response_row("", "2024-03-07"),
//! ]);
//! let documents = MockDocumentStore::with_template(fixtures::CARD_TEMPLATE);
//! ```

mod memory_dataset;
mod mock_document_store;

use chrono::{DateTime, TimeZone, Utc};

use crate::clock::Clock;

pub use memory_dataset::MemoryDataset;
pub use mock_document_store::{MockDocumentStore, RecordedDocument};

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Clock at the given UTC date and time.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::dataset::CellValue;

    /// Template identifier registered by `MockDocumentStore::with_template`.
    pub const TEMPLATE_ID: &str = "card-template.txt";

    /// Folder identifier registered by `MockDocumentStore::with_template`.
    pub const FOLDER_ID: &str = "cards";

    /// Card template using every placeholder; `{{AccountNumber}}` appears twice.
    pub const CARD_TEMPLATE: &str = "\
Account: {{AccountNumber}} / OR: {{ORNumber}}
Name: {{LastName}}, {{FirstName}} {{MiddleName}}
ID: {{IDNumber}}
College: {{College}}
Degree: {{Degree}}
Package: {{Package}} at {{PackagePrice}}
Term: {{TermOfPayment}}
Ref {{AccountNumber}}
";

    /// Sheet headers in form order.
    pub const HEADERS: [&str; 13] = [
        "Ticket",
        "Timestamp",
        "Account Number",
        "OR Number",
        "Last Name",
        "First Name",
        "Middle Name",
        "Full ID Number",
        "College",
        "Degree Code",
        "Alternate Degree Code",
        "Chosen Package",
        "Term of Payment",
    ];

    /// Header row matching `HEADERS`.
    pub fn header_row() -> Vec<CellValue> {
        HEADERS.iter().map(|h| CellValue::from_raw(h)).collect()
    }

    /// A form response for account 1001, last name "dela cruz".
    pub fn response_row(ticket: &str, timestamp: &str) -> Vec<CellValue> {
        student_row(ticket, timestamp, "1001", "dela cruz")
    }

    /// A form response with the given account number and last name.
    pub fn student_row(
        ticket: &str,
        timestamp: &str,
        account_number: &str,
        last_name: &str,
    ) -> Vec<CellValue> {
        [
            ticket,
            timestamp,
            account_number,
            "or-5521",
            last_name,
            "ana",
            "santos",
            "2021-00001",
            "cba",
            "bsa",
            "",
            "Package C (A+B)",
            "installment",
        ]
        .iter()
        .map(|v| CellValue::from_raw(v))
        .collect()
    }
}
