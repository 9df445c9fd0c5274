//! Static category metadata

use crate::registry::Category;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

/// Descriptive metadata for a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryMetadata {
    pub category: Category,
    pub display_name: String,
    pub description: String,
    /// Search keywords
    pub keywords: Vec<String>,
    /// Typical tasks, as short phrases
    pub use_cases: Vec<String>,
    /// Things that should exist before using the category
    pub prerequisites: Vec<String>,
    pub related: Vec<Category>,
    /// Lower is more important
    pub priority: u32,
}

fn entry(
    category: Category,
    description: &str,
    keywords: &[&str],
    use_cases: &[&str],
    prerequisites: &[&str],
    related: &[Category],
    priority: u32,
) -> CategoryMetadata {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    CategoryMetadata {
        category,
        display_name: category.display_name().to_string(),
        description: description.to_string(),
        keywords: owned(keywords),
        use_cases: owned(use_cases),
        prerequisites: owned(prerequisites),
        related: related.to_vec(),
        priority,
    }
}

static BUILTIN: Lazy<BTreeMap<Category, CategoryMetadata>> = Lazy::new(|| {
    use Category::*;
    [
        entry(
            InvoiceManagement,
            "Create, send and track invoices through their lifecycle",
            &["invoice", "bill", "billing", "line item", "due date"],
            &["Bill a client for completed work", "Send an invoice by email", "Void an incorrect invoice"],
            &["At least one client record"],
            &[ClientManagement, PaymentProcessing, TimeTracking],
            1,
        ),
        entry(
            ClientManagement,
            "Maintain client records and contact details",
            &["client", "customer", "contact", "company"],
            &["Onboard a new client", "Update a client's billing address", "Look up a client"],
            &[],
            &[InvoiceManagement, TimeTracking],
            2,
        ),
        entry(
            PaymentProcessing,
            "Record incoming payments and issue refunds",
            &["payment", "pay", "refund", "receipt", "settle"],
            &["Record a payment against an invoice", "Refund an overpayment"],
            &["An issued invoice"],
            &[InvoiceManagement, Reporting],
            3,
        ),
        entry(
            TimeTracking,
            "Track billable hours with timers and manual entries",
            &["time", "hours", "timer", "timesheet", "billable"],
            &["Start a timer for a task", "Log hours worked for a client"],
            &["A client to bill the time against"],
            &[InvoiceManagement, ClientManagement],
            4,
        ),
        entry(
            ExpenseManagement,
            "Capture and categorize business expenses",
            &["expense", "cost", "spend", "receipt", "reimbursement"],
            &["Log a business expense", "Categorize expenses for tax time"],
            &[],
            &[Reporting, PaymentProcessing],
            5,
        ),
        entry(
            Reporting,
            "Financial reports and summaries across invoices, payments and expenses",
            &["report", "revenue", "profit", "aging", "summary", "analytics"],
            &["Review monthly revenue", "Find overdue invoices", "Prepare a profit and loss statement"],
            &["Recorded invoices, payments or expenses"],
            &[InvoiceManagement, ExpenseManagement, DataExport],
            6,
        ),
        entry(
            DataImport,
            "Bring existing records in from CSV files and other systems",
            &["import", "csv", "upload", "migrate", "migration"],
            &["Migrate clients from a spreadsheet", "Import historical invoices"],
            &["A CSV file with a header row"],
            &[DataExport, ClientManagement],
            7,
        ),
        entry(
            DataExport,
            "Export records for backup, accounting or analysis",
            &["export", "csv", "json", "backup", "download"],
            &["Back up all invoices", "Hand the ledger to an accountant"],
            &[],
            &[DataImport, Reporting],
            8,
        ),
    ]
    .into_iter()
    .map(|m| (m.category, m))
    .collect()
});

/// Metadata for every category, keyed by category
pub fn builtin() -> BTreeMap<Category, CategoryMetadata> {
    BUILTIN.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_metadata() {
        let all = builtin();
        assert_eq!(all.len(), Category::ALL.len());
        for category in Category::ALL {
            let metadata = &all[&category];
            assert!(!metadata.keywords.is_empty());
            assert!(!metadata.use_cases.is_empty());
            assert!(!metadata.related.contains(&category));
        }
    }

    #[test]
    fn test_priorities_are_distinct() {
        let mut priorities: Vec<u32> = builtin().values().map(|m| m.priority).collect();
        priorities.sort();
        priorities.dedup();
        assert_eq!(priorities.len(), Category::ALL.len());
    }
}
