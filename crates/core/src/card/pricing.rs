//! Package price table.

use super::fields::UNKNOWN;

/// Packages offered on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Package {
    Business,
    Creative,
    Combined,
    Scholars,
}

impl Package {
    pub const ALL: [Package; 4] = [
        Package::Business,
        Package::Creative,
        Package::Combined,
        Package::Scholars,
    ];

    /// Label as it appears on the form, uppercased.
    pub fn label(self) -> &'static str {
        match self {
            Package::Business => "PACKAGE A (BUSINESS)",
            Package::Creative => "PACKAGE B (CREATIVE)",
            Package::Combined => "PACKAGE C (A+B)",
            Package::Scholars => "PACKAGE D (SCHOLARS)",
        }
    }

    pub fn price(self) -> &'static str {
        match self {
            Package::Business => "P5,000",
            Package::Creative => "P5,150",
            Package::Combined => "P5,300",
            Package::Scholars => "P4,800",
        }
    }

    /// Exact match against an uppercased label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }
}

/// Display price for a resolved package label; `UNKNOWN` for anything else.
pub fn package_price(label: &str) -> &'static str {
    Package::from_label(label).map_or(UNKNOWN, Package::price)
}
