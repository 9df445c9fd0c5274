//! Integration tests for the category manager

use std::sync::Arc;
use toolcatalog::categories::{CategoryFilter, CategoryManager, CategorySort};
use toolcatalog::config::CategoryConfig;
use toolcatalog::registry::Registry;
use toolcatalog::{Capability, CatalogError, Category, InputValidator, InvocationBinding, OperationContext};

fn manager_with(tools: &[(&str, Category)]) -> CategoryManager {
    let ctx = OperationContext::background();
    let registry = Arc::new(Registry::with_defaults(Arc::new(InputValidator::new())).unwrap());
    for (name, category) in tools {
        registry
            .register(
                &ctx,
                Capability::new(
                    *name,
                    format!("Run {}", name),
                    *category,
                    InvocationBinding::new("ledger", vec![]),
                ),
            )
            .unwrap();
    }
    CategoryManager::new(registry, CategoryConfig::default())
}

const TOOLS: &[(&str, Category)] = &[
    ("invoice_create", Category::InvoiceManagement),
    ("invoice_list", Category::InvoiceManagement),
    ("invoice_send", Category::InvoiceManagement),
    ("invoice_void", Category::InvoiceManagement),
    ("export_clients_csv", Category::DataExport),
    ("export_ledger_json", Category::DataExport),
    ("report_revenue", Category::Reporting),
];

#[cfg(test)]
mod metadata_tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_metadata() {
        let manager = manager_with(&[]);
        let ctx = OperationContext::background();
        let metadata = manager.get_metadata(&ctx, "invoice_management").unwrap().unwrap();
        assert_eq!(metadata.display_name, "Invoice Management");
        assert_eq!(metadata.priority, 1);
        assert!(manager.get_metadata(&ctx, "payroll").unwrap().is_none());
        assert!(manager.get_metadata(&ctx, "").unwrap().is_none());
    }

    #[test]
    fn test_metadata_is_a_copy() {
        let manager = manager_with(&[]);
        let ctx = OperationContext::background();
        let mut metadata = manager.get_metadata(&ctx, "reporting").unwrap().unwrap();
        metadata.keywords.clear();
        assert!(!manager
            .get_metadata(&ctx, "reporting")
            .unwrap()
            .unwrap()
            .keywords
            .is_empty());
    }

    #[test]
    fn test_cancelled_metadata_lookup() {
        let manager = manager_with(&[]);
        let ctx = OperationContext::background();
        ctx.cancel();
        assert!(manager.get_metadata(&ctx, "reporting").unwrap_err().is_cancellation());
    }
}

#[cfg(test)]
mod discover_tests {
    use super::*;

    #[test]
    fn test_empty_categories_excluded_by_default() {
        let manager = manager_with(TOOLS);
        let ctx = OperationContext::background();
        let infos = manager.discover(&ctx, &CategoryFilter::default()).unwrap();
        let categories: Vec<Category> = infos.iter().map(|i| i.metadata.category).collect();
        assert_eq!(categories.len(), 3);
        assert!(categories.contains(&Category::InvoiceManagement));
        assert!(!categories.contains(&Category::TimeTracking));

        let all = manager
            .discover(
                &ctx,
                &CategoryFilter {
                    include_empty: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(all.len(), Category::ALL.len());
    }

    #[test]
    fn test_tool_counts_and_popular_tools() {
        let manager = manager_with(TOOLS);
        let ctx = OperationContext::background();
        let infos = manager
            .discover(
                &ctx,
                &CategoryFilter {
                    sort_by: CategorySort::ToolCount,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(infos[0].metadata.category, Category::InvoiceManagement);
        assert_eq!(infos[0].tool_count, 4);
        assert_eq!(
            infos[0].popular_tools,
            vec!["invoice_create", "invoice_list", "invoice_send"]
        );
        assert_eq!(infos[1].metadata.category, Category::DataExport);
    }

    #[test]
    fn test_keyword_filter() {
        let manager = manager_with(TOOLS);
        let ctx = OperationContext::background();
        let infos = manager.discover(&ctx, &CategoryFilter::keyword("BACKUP")).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].metadata.category, Category::DataExport);
    }

    #[test]
    fn test_use_case_filter() {
        let manager = manager_with(TOOLS);
        let ctx = OperationContext::background();
        let filter = CategoryFilter {
            use_case: "overdue".to_string(),
            ..Default::default()
        };
        let infos = manager.discover(&ctx, &filter).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].metadata.category, Category::Reporting);
    }

    #[test]
    fn test_priority_and_name_sorting() {
        let manager = manager_with(TOOLS);
        let ctx = OperationContext::background();
        let by_priority: Vec<Category> = manager
            .discover(
                &ctx,
                &CategoryFilter {
                    sort_by: CategorySort::Priority,
                    include_empty: true,
                    ..Default::default()
                },
            )
            .unwrap()
            .into_iter()
            .map(|i| i.metadata.category)
            .collect();
        assert_eq!(by_priority[0], Category::InvoiceManagement);
        assert_eq!(by_priority[7], Category::DataExport);

        let by_name: Vec<Category> = manager
            .discover(
                &ctx,
                &CategoryFilter {
                    sort_by: CategorySort::Name,
                    include_empty: true,
                    max_results: 2,
                    ..Default::default()
                },
            )
            .unwrap()
            .into_iter()
            .map(|i| i.metadata.category)
            .collect();
        assert_eq!(by_name, vec![Category::ClientManagement, Category::DataExport]);
    }
}

#[cfg(test)]
mod recommend_tests {
    use super::*;

    #[test]
    fn test_query_scoring() {
        let manager = manager_with(TOOLS);
        let ctx = OperationContext::background();
        let ranked = manager.recommend(&ctx, "invoice", 0).unwrap();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].category, Category::InvoiceManagement);
        assert_eq!(ranked[0].tool_count, 4);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_empty_query_ranks_by_priority() {
        let manager = manager_with(&[]);
        let ctx = OperationContext::background();
        let ranked = manager.recommend(&ctx, "", 8).unwrap();
        let categories: Vec<Category> = ranked.iter().map(|r| r.category).collect();
        assert_eq!(categories[0], Category::InvoiceManagement);
        assert_eq!(categories[1], Category::ClientManagement);
        assert_eq!(ranked[0].score, 9);
    }
}

#[cfg(test)]
mod describe_tests {
    use super::*;

    #[test]
    fn test_describe_with_tools() {
        let manager = manager_with(TOOLS);
        let ctx = OperationContext::background();
        let text = manager.describe(&ctx, "invoice_management", true).unwrap();
        assert!(text.starts_with("Invoice Management: "));
        assert!(text.contains("Use cases:\n- Bill a client for completed work"));
        assert!(text.contains("Prerequisites:\n- At least one client record"));
        assert!(text.contains("- invoice_create: Run invoice_create"));
        assert!(!text.contains("invoice_void: "));
        assert!(text.contains("...and 1 more"));
        assert!(text.ends_with("Related categories: Client Management, Payment Processing, Time Tracking"));
    }

    #[test]
    fn test_describe_without_tools() {
        let manager = manager_with(TOOLS);
        let ctx = OperationContext::background();
        let text = manager.describe(&ctx, "data_export", false).unwrap();
        assert!(!text.contains("Example tools"));
        assert!(!text.contains("Prerequisites"));
    }

    #[test]
    fn test_describe_unknown_category() {
        let manager = manager_with(&[]);
        let ctx = OperationContext::background();
        let err = manager.describe(&ctx, "payroll", true).unwrap_err();
        assert!(matches!(err, CatalogError::MetadataMissing { ref category } if category == "payroll"));
    }

    #[test]
    fn test_cancelled_describe() {
        let manager = manager_with(&[]);
        let ctx = OperationContext::background();
        ctx.cancel();
        assert!(manager.describe(&ctx, "reporting", true).unwrap_err().is_cancellation());
        assert!(manager.discover(&ctx, &CategoryFilter::default()).unwrap_err().is_cancellation());
    }
}
