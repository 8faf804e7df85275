//! Submission timestamp interpretation.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};

use crate::dataset::CellValue;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Largest serial accepted (9999-12-31).
const MAX_SERIAL_DAYS: f64 = 2_958_465.0;

/// Calendar date of a submission timestamp, as seen in `offset`.
///
/// Values without an offset are taken as already local to the sheet.
pub fn submission_date(cell: &CellValue, offset: FixedOffset) -> Option<NaiveDate> {
    match cell {
        CellValue::Empty | CellValue::Boolean(_) => None,
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Number(serial) => serial_date(*serial),
        CellValue::Text(raw) => parse_text(raw.trim(), offset),
    }
}

/// Spreadsheet serial date: days since 1899-12-30, fraction is time of day.
fn serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL_DAYS {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn parse_text(raw: &str, offset: FixedOffset) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&offset).date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}
