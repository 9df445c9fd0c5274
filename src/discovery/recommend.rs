//! Workflow detection for free-text recommendations
//!
//! Text is mapped to the first workflow whose keywords it contains. Each workflow
//! carries a fixed list of suggested capabilities.

use serde::Serialize;
use std::fmt;

/// Workflow buckets, checked in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    DataImport,
    DataExport,
    Invoicing,
    ClientOnboarding,
    TimeBilling,
    ExpenseTracking,
    PaymentCollection,
    FinancialReporting,
    GettingStarted,
}

struct WorkflowBucket {
    workflow: Workflow,
    keywords: &'static [&'static str],
    tools: &'static [&'static str],
}

const BUCKETS: &[WorkflowBucket] = &[
    WorkflowBucket {
        workflow: Workflow::DataImport,
        keywords: &["import", "migrate", "migration", "upload", "csv"],
        tools: &["import_clients_csv", "import_invoices_csv", "import_expenses_csv", "client_list", "invoice_list"],
    },
    WorkflowBucket {
        workflow: Workflow::DataExport,
        keywords: &["export", "backup", "download"],
        tools: &["export_invoices_csv", "export_clients_csv", "export_ledger_json", "report_revenue"],
    },
    WorkflowBucket {
        workflow: Workflow::Invoicing,
        keywords: &["invoice", "bill", "billing"],
        tools: &["invoice_create", "invoice_send", "client_list", "payment_record", "report_aging"],
    },
    WorkflowBucket {
        workflow: Workflow::ClientOnboarding,
        keywords: &["client", "customer", "onboard"],
        tools: &["client_create", "client_list", "client_update", "invoice_create"],
    },
    WorkflowBucket {
        workflow: Workflow::TimeBilling,
        keywords: &["time", "hour", "timer", "timesheet"],
        tools: &["timer_start", "timer_stop", "time_entry_create", "time_report", "invoice_create"],
    },
    WorkflowBucket {
        workflow: Workflow::ExpenseTracking,
        keywords: &["expense", "receipt", "spend"],
        tools: &["expense_create", "expense_categorize", "expense_list", "report_profit_loss"],
    },
    WorkflowBucket {
        workflow: Workflow::PaymentCollection,
        keywords: &["payment", "pay", "refund", "overdue"],
        tools: &["payment_record", "payment_list", "payment_refund", "report_aging"],
    },
    WorkflowBucket {
        workflow: Workflow::FinancialReporting,
        keywords: &["report", "revenue", "profit", "summary", "analytics"],
        tools: &["report_revenue", "report_profit_loss", "report_aging", "export_ledger_json"],
    },
];

const GETTING_STARTED: &[&str] = &[
    "client_create",
    "invoice_create",
    "time_entry_create",
    "expense_create",
    "report_revenue",
];

impl Workflow {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Workflow::DataImport => "data_import",
            Workflow::DataExport => "data_export",
            Workflow::Invoicing => "invoicing",
            Workflow::ClientOnboarding => "client_onboarding",
            Workflow::TimeBilling => "time_billing",
            Workflow::ExpenseTracking => "expense_tracking",
            Workflow::PaymentCollection => "payment_collection",
            Workflow::FinancialReporting => "financial_reporting",
            Workflow::GettingStarted => "getting_started",
        }
    }

    /// Fixed capability suggestions for the workflow
    pub fn tools(&self) -> &'static [&'static str] {
        BUCKETS
            .iter()
            .find(|b| b.workflow == *self)
            .map(|b| b.tools)
            .unwrap_or(GETTING_STARTED)
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the workflow for free text; falls back to `GettingStarted`
pub fn detect_workflow(text: &str) -> Workflow {
    let text = text.to_lowercase();
    BUCKETS
        .iter()
        .find(|bucket| bucket.keywords.iter().any(|k| text.contains(k)))
        .map(|bucket| bucket.workflow)
        .unwrap_or(Workflow::GettingStarted)
}
