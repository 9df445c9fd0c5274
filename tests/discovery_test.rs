//! Integration tests for the discovery engine

use std::sync::Arc;
use toolcatalog::config::DiscoveryConfig;
use toolcatalog::discovery::{detect_workflow, DiscoveryEngine, SearchCriteria, SortBy, SortOrder, Workflow};
use toolcatalog::registry::Registry;
use toolcatalog::{Capability, Category, InputValidator, InvocationBinding, OperationContext};

fn registry_with(tools: &[(&str, &str, Category)]) -> Arc<Registry> {
    let ctx = OperationContext::background();
    let registry = Arc::new(Registry::with_defaults(Arc::new(InputValidator::new())).unwrap());
    for (name, description, category) in tools {
        registry
            .register(
                &ctx,
                Capability::new(*name, *description, *category, InvocationBinding::new("ledger", vec![])),
            )
            .unwrap();
    }
    registry
}

fn engine_with(tools: &[(&str, &str, Category)]) -> DiscoveryEngine {
    let ctx = OperationContext::background();
    DiscoveryEngine::new(&ctx, registry_with(tools), DiscoveryConfig::default()).unwrap()
}

const CATALOGUE: &[(&str, &str, Category)] = &[
    ("invoice_create", "Create a new invoice for a client", Category::InvoiceManagement),
    ("invoice_send", "Email an invoice to the client", Category::InvoiceManagement),
    ("client_create", "Create a client record", Category::ClientManagement),
    ("import_clients_csv", "Import clients from CSV", Category::DataImport),
    ("import_invoices_csv", "Import invoices from CSV", Category::DataImport),
    ("import_expenses_csv", "Import expenses from CSV", Category::DataImport),
    ("report_revenue", "Revenue by month", Category::Reporting),
];

#[cfg(test)]
mod search_tests {
    use super::*;

    #[test]
    fn test_invoice_query_finds_invoice_create() {
        let engine = engine_with(&[(
            "invoice_create",
            "Create a new invoice for a client",
            Category::InvoiceManagement,
        )]);
        let ctx = OperationContext::background();
        let results = engine.search(&ctx, &SearchCriteria::query("invoice")).unwrap();
        let hit = results
            .iter()
            .find(|r| r.tool.name == "invoice_create")
            .expect("invoice_create should match");
        assert!(hit.relevance_score > 0.0);
        assert!(!hit.category_match);
        assert!(hit.matched_fields.contains(&"name".to_string()));
    }

    #[test]
    fn test_category_only_search() {
        let engine = engine_with(CATALOGUE);
        let ctx = OperationContext::background();
        let results = engine
            .search(&ctx, &SearchCriteria::in_categories([Category::DataImport]))
            .unwrap();
        assert_eq!(results.len(), 3);
        for result in &results {
            assert!(result.category_match);
            assert_eq!(result.tool.category, Category::DataImport);
            assert!((result.relevance_score - 0.8).abs() < 1e-9);
        }
    }

    #[test]
    fn test_no_query_no_category_returns_everything() {
        let engine = engine_with(CATALOGUE);
        let ctx = OperationContext::background();
        let results = engine.search(&ctx, &SearchCriteria::default()).unwrap();
        assert_eq!(results.len(), CATALOGUE.len());
        assert!(results.iter().all(|r| r.match_context == "All tools"));
        // equal relevance falls back to name order
        assert_eq!(results[0].tool.name, "client_create");
    }

    #[test]
    fn test_query_with_category_filter() {
        let engine = engine_with(CATALOGUE);
        let ctx = OperationContext::background();
        let criteria = SearchCriteria::query("invoice").with_categories([Category::DataImport]);
        let results = engine.search(&ctx, &criteria).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.tool.name.as_str()).collect();
        assert_eq!(names, vec!["import_invoices_csv"]);
    }

    #[test]
    fn test_more_matches_never_score_lower() {
        let engine = engine_with(&[
            ("client_invoice_summary", "Summary of client invoices", Category::Reporting),
            ("client_list", "List records", Category::ClientManagement),
        ]);
        let ctx = OperationContext::background();
        let results = engine.search(&ctx, &SearchCriteria::query("client invoice")).unwrap();
        let score = |name: &str| {
            results
                .iter()
                .find(|r| r.tool.name == name)
                .map(|r| r.relevance_score)
                .unwrap()
        };
        assert!(score("client_invoice_summary") >= score("client_list"));
        assert_eq!(results[0].tool.name, "client_invoice_summary");
    }

    #[test]
    fn test_exact_name_outranks_fuzzy_only_matches() {
        let engine = engine_with(&[
            ("invoice", "Single record", Category::InvoiceManagement),
            ("invoices_invoicing", "Batch documents", Category::InvoiceManagement),
        ]);
        let ctx = OperationContext::background();
        let results = engine.search(&ctx, &SearchCriteria::query("invoice")).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tool.name, "invoice");
        assert!(results[0].match_context.starts_with("Matched 'invoice'"));
        assert!(results[1].match_context.starts_with("Similar to"));
        assert!(results[0].relevance_score > results[1].relevance_score);

        // ordering holds without relying on the name tiebreak
        let reversed = engine
            .search(
                &ctx,
                &SearchCriteria::query("invoice").sorted_by(SortBy::Relevance, Some(SortOrder::Asc)),
            )
            .unwrap();
        assert_eq!(reversed[0].tool.name, "invoices_invoicing");
    }

    #[test]
    fn test_identical_searches_are_deterministic() {
        let engine = engine_with(CATALOGUE);
        let ctx = OperationContext::background();
        let criteria = SearchCriteria::query("import client invoice csv");
        let first: Vec<(String, f64)> = engine
            .search(&ctx, &criteria)
            .unwrap()
            .into_iter()
            .map(|r| (r.tool.name.clone(), r.relevance_score))
            .collect();
        for _ in 0..5 {
            let again: Vec<(String, f64)> = engine
                .search(&ctx, &criteria)
                .unwrap()
                .into_iter()
                .map(|r| (r.tool.name.clone(), r.relevance_score))
                .collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_min_relevance_and_max_results() {
        let engine = engine_with(CATALOGUE);
        let ctx = OperationContext::background();

        let all = engine.search(&ctx, &SearchCriteria::query("import")).unwrap();
        assert!(all.len() >= 3);

        let capped = engine
            .search(&ctx, &SearchCriteria::query("import").with_max_results(2))
            .unwrap();
        assert_eq!(capped.len(), 2);

        let none = engine
            .search(&ctx, &SearchCriteria::query("import").with_min_relevance(5.0))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_sort_orders() {
        let engine = engine_with(CATALOGUE);
        let ctx = OperationContext::background();

        let by_category = engine
            .search(&ctx, &SearchCriteria::default().sorted_by(SortBy::Category, None))
            .unwrap();
        let categories: Vec<Category> = by_category.iter().map(|r| r.tool.category).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);

        let by_name_desc = engine
            .search(&ctx, &SearchCriteria::default().sorted_by(SortBy::Name, Some(SortOrder::Desc)))
            .unwrap();
        assert_eq!(by_name_desc[0].tool.name, "report_revenue");

        let by_relevance_asc = engine
            .search(
                &ctx,
                &SearchCriteria::query("invoice").sorted_by(SortBy::Relevance, Some(SortOrder::Asc)),
            )
            .unwrap();
        let scores: Vec<f64> = by_relevance_asc.iter().map(|r| r.relevance_score).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_short_query_tokens_match_nothing() {
        let engine = engine_with(CATALOGUE);
        let ctx = OperationContext::background();
        assert!(engine.search(&ctx, &SearchCriteria::query("a to")).unwrap().is_empty());
    }
}

#[cfg(test)]
mod snapshot_tests {
    use super::*;

    #[test]
    fn test_registrations_after_build_need_rebuild() {
        let ctx = OperationContext::background();
        let registry = registry_with(&[("client_create", "Create a client", Category::ClientManagement)]);
        let engine = DiscoveryEngine::new(&ctx, Arc::clone(&registry), DiscoveryConfig::default()).unwrap();

        registry
            .register(
                &ctx,
                Capability::new(
                    "payment_record",
                    "Record a payment",
                    Category::PaymentProcessing,
                    InvocationBinding::new("ledger", vec![]),
                ),
            )
            .unwrap();

        assert!(engine.search(&ctx, &SearchCriteria::query("payment")).unwrap().is_empty());
        assert_eq!(engine.index().len(), 1);

        engine.rebuild(&ctx).unwrap();
        let results = engine.search(&ctx, &SearchCriteria::query("payment")).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tool.name, "payment_record");

        engine.rebuild(&ctx).unwrap();
        assert_eq!(engine.index().len(), 2);
    }

    #[test]
    fn test_cancelled_search() {
        let engine = engine_with(CATALOGUE);
        let ctx = OperationContext::background();
        ctx.cancel();
        assert!(engine.search(&ctx, &SearchCriteria::query("invoice")).unwrap_err().is_cancellation());
        assert!(engine.rebuild(&ctx).unwrap_err().is_cancellation());
        assert!(engine.recommend(&ctx, "invoice", 0).unwrap_err().is_cancellation());
    }
}

#[cfg(test)]
mod category_discovery_tests {
    use super::*;

    #[test]
    fn test_all_categories_overview() {
        let engine = engine_with(&[
            ("invoice_create", "Create an invoice", Category::InvoiceManagement),
            ("invoice_send", "Send an invoice", Category::InvoiceManagement),
            ("invoice_void", "Void an invoice", Category::InvoiceManagement),
            ("client_create", "Create a client", Category::ClientManagement),
            ("client_list", "List clients", Category::ClientManagement),
            ("client_update", "Update a client", Category::ClientManagement),
        ]);
        let ctx = OperationContext::background();
        let overview = engine.discover_by_category(&ctx, None).unwrap();
        assert_eq!(overview.tool_count, 6);
        assert_eq!(overview.tools.len(), 6);
        assert_eq!(overview.related_categories, Category::ALL.to_vec());
        assert!(overview.recommended_tools.len() <= 5);
        assert_eq!(overview.recommended_tools.len(), 5);

        let by_name = engine.discover_by_category_name(&ctx, "").unwrap();
        assert_eq!(by_name.tool_count, 6);
    }

    #[test]
    fn test_single_category_overview() {
        let engine = engine_with(CATALOGUE);
        let ctx = OperationContext::background();
        let overview = engine.discover_by_category_name(&ctx, "data_import").unwrap();
        assert_eq!(overview.category, "data_import");
        assert_eq!(overview.tool_count, 3);
        assert_eq!(overview.related_categories.len(), Category::ALL.len() - 1);
        assert!(!overview.related_categories.contains(&Category::DataImport));
        assert_eq!(
            overview.recommended_tools,
            vec!["import_clients_csv", "import_expenses_csv", "import_invoices_csv"]
        );
    }
}

#[cfg(test)]
mod recommend_tests {
    use super::*;

    #[test]
    fn test_workflow_buckets() {
        assert_eq!(detect_workflow("Please invoice Acme for March"), Workflow::Invoicing);
        assert_eq!(detect_workflow("log my HOURS"), Workflow::TimeBilling);
        assert_eq!(detect_workflow("something unrelated"), Workflow::GettingStarted);
    }

    #[test]
    fn test_recommend_is_fixed_per_bucket() {
        let engine = engine_with(&[]);
        let ctx = OperationContext::background();
        let tools = engine.recommend(&ctx, "I need to invoice a client", 0).unwrap();
        assert_eq!(tools.len(), 5);
        assert_eq!(tools[0], "invoice_create");
        assert_eq!(engine.recommend(&ctx, "refund a payment", 1).unwrap(), vec!["payment_record"]);
    }
}
