//! Card field resolution from a sheet row.

use serde::Serialize;

use super::pricing::package_price;
use crate::dataset::{HeaderMap, Row};

/// Stand-in for a missing or blank field.
pub const UNKNOWN: &str = "UNKNOWN";

/// Degree code answer that defers to the alternate degree column.
pub const DEGREE_NOT_LISTED: &str = "MY DEGREE CODE ISN'T IN THE LIST";

/// Columns read for a card, by header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    AccountNumber,
    OrNumber,
    LastName,
    FirstName,
    MiddleName,
    IdNumber,
    College,
    DegreeCode,
    AlternateDegreeCode,
    ChosenPackage,
    TermOfPayment,
}

impl CardField {
    pub const ALL: [CardField; 11] = [
        CardField::AccountNumber,
        CardField::OrNumber,
        CardField::LastName,
        CardField::FirstName,
        CardField::MiddleName,
        CardField::IdNumber,
        CardField::College,
        CardField::DegreeCode,
        CardField::AlternateDegreeCode,
        CardField::ChosenPackage,
        CardField::TermOfPayment,
    ];

    /// Sheet header this field is read from.
    pub fn header(self) -> &'static str {
        match self {
            CardField::AccountNumber => "Account Number",
            CardField::OrNumber => "OR Number",
            CardField::LastName => "Last Name",
            CardField::FirstName => "First Name",
            CardField::MiddleName => "Middle Name",
            CardField::IdNumber => "Full ID Number",
            CardField::College => "College",
            CardField::DegreeCode => "Degree Code",
            CardField::AlternateDegreeCode => "Alternate Degree Code",
            CardField::ChosenPackage => "Chosen Package",
            CardField::TermOfPayment => "Term of Payment",
        }
    }

    /// Uppercased cell value, or `UNKNOWN` when the column or value is missing.
    pub fn resolve(self, header: &HeaderMap, row: &Row) -> String {
        header
            .lookup(row, self.header())
            .filter(|cell| cell.is_present())
            .map(|cell| cell.to_string().to_uppercase())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}

/// Values substituted into a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardFields {
    pub account_number: String,
    pub or_number: String,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub id_number: String,
    pub college: String,
    pub degree: String,
    pub package: String,
    pub term_of_payment: String,
    pub package_price: String,
}

impl CardFields {
    /// Resolve every field for `row`.
    pub fn resolve(header: &HeaderMap, row: &Row) -> Self {
        let get = |field: CardField| field.resolve(header, row);

        let mut degree = get(CardField::DegreeCode);
        if degree == DEGREE_NOT_LISTED && header.contains(CardField::AlternateDegreeCode.header()) {
            degree = get(CardField::AlternateDegreeCode);
        }

        let package = get(CardField::ChosenPackage);
        let package_price = package_price(&package).to_string();

        Self {
            account_number: get(CardField::AccountNumber),
            or_number: get(CardField::OrNumber),
            last_name: get(CardField::LastName),
            first_name: get(CardField::FirstName),
            middle_name: get(CardField::MiddleName),
            id_number: get(CardField::IdNumber),
            college: get(CardField::College),
            degree,
            package,
            term_of_payment: get(CardField::TermOfPayment),
            package_price,
        }
    }

    /// Name of the generated document: `AccountNumber - IDNumber - LastName`.
    pub fn document_name(&self) -> String {
        format!(
            "{} - {} - {}",
            self.account_number, self.id_number, self.last_name
        )
    }

    /// Template tokens and their replacements.
    pub fn placeholders(&self) -> [(&'static str, &str); 11] {
        [
            ("{{AccountNumber}}", self.account_number.as_str()),
            ("{{ORNumber}}", self.or_number.as_str()),
            ("{{LastName}}", self.last_name.as_str()),
            ("{{FirstName}}", self.first_name.as_str()),
            ("{{MiddleName}}", self.middle_name.as_str()),
            ("{{IDNumber}}", self.id_number.as_str()),
            ("{{College}}", self.college.as_str()),
            ("{{Degree}}", self.degree.as_str()),
            ("{{Package}}", self.package.as_str()),
            ("{{TermOfPayment}}", self.term_of_payment.as_str()),
            ("{{PackagePrice}}", self.package_price.as_str()),
        ]
    }
}
