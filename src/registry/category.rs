//! The closed set of capability categories

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability category
///
/// Variants are declared in the lexical order of their wire names so the derived
/// `Ord` sorts the same way the names do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ClientManagement,
    DataExport,
    DataImport,
    ExpenseManagement,
    InvoiceManagement,
    PaymentProcessing,
    Reporting,
    TimeTracking,
}

impl Category {
    /// Every category, sorted by name
    pub const ALL: [Category; 8] = [
        Category::ClientManagement,
        Category::DataExport,
        Category::DataImport,
        Category::ExpenseManagement,
        Category::InvoiceManagement,
        Category::PaymentProcessing,
        Category::Reporting,
        Category::TimeTracking,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ClientManagement => "client_management",
            Category::DataExport => "data_export",
            Category::DataImport => "data_import",
            Category::ExpenseManagement => "expense_management",
            Category::InvoiceManagement => "invoice_management",
            Category::PaymentProcessing => "payment_processing",
            Category::Reporting => "reporting",
            Category::TimeTracking => "time_tracking",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::ClientManagement => "Client Management",
            Category::DataExport => "Data Export",
            Category::DataImport => "Data Import",
            Category::ExpenseManagement => "Expense Management",
            Category::InvoiceManagement => "Invoice Management",
            Category::PaymentProcessing => "Payment Processing",
            Category::Reporting => "Reporting",
            Category::TimeTracking => "Time Tracking",
        }
    }

    /// Whether a string names one of the known categories
    pub fn is_known(name: &str) -> bool {
        Self::ALL.iter().any(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CatalogError::unknown_category(s))
    }
}
