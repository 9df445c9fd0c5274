//! Discovery engine: relevance-ranked search over a registry snapshot

use crate::config::DiscoveryConfig;
use crate::context::OperationContext;
use crate::discovery::index::{IndexEntry, SearchIndex};
use crate::discovery::recommend::detect_workflow;
use crate::discovery::tokenize::{fuzzy_match, tokenize};
use crate::discovery::types::{CategoryDiscovery, SearchCriteria, SearchResult, SortBy, SortOrder};
use crate::error::Result;
use crate::registry::{Capability, Category, Registry};
use arc_swap::ArcSwap;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Discovery engine
///
/// Searches run against the index captured at construction or at the last
/// `rebuild`. Registrations made after that are not visible until the next rebuild.
pub struct DiscoveryEngine {
    registry: Arc<Registry>,
    config: DiscoveryConfig,
    index: ArcSwap<SearchIndex>,
}

impl std::fmt::Debug for DiscoveryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryEngine")
            .field("indexed_tools", &self.index.load().len())
            .finish()
    }
}

#[derive(Clone, Copy)]
enum MatchKind {
    Exact,
    Fuzzy,
}

impl DiscoveryEngine {
    /// Build an engine over the registry's current contents
    pub fn new(ctx: &OperationContext, registry: Arc<Registry>, config: DiscoveryConfig) -> Result<Self> {
        ctx.check()?;
        Self::from_registry(registry, config)
    }

    pub(crate) fn from_registry(registry: Arc<Registry>, config: DiscoveryConfig) -> Result<Self> {
        config.validate()?;
        let index = Self::build_index(&registry, &config);
        Ok(Self {
            registry,
            config,
            index: ArcSwap::from_pointee(index),
        })
    }

    fn build_index(registry: &Registry, config: &DiscoveryConfig) -> SearchIndex {
        let index = SearchIndex::build(registry.snapshot(None), config);
        info!(
            tools = index.len(),
            tokens = index.tokens().len(),
            "Built discovery index"
        );
        index
    }

    /// Re-snapshot the registry and swap in a fresh index
    pub fn rebuild(&self, ctx: &OperationContext) -> Result<()> {
        ctx.check()?;
        self.reindex();
        Ok(())
    }

    fn reindex(&self) {
        let index = Self::build_index(&self.registry, &self.config);
        self.index.store(Arc::new(index));
    }

    /// The index searches currently run against
    pub fn index(&self) -> Arc<SearchIndex> {
        self.index.load_full()
    }

    /// Search the index
    pub fn search(&self, ctx: &OperationContext, criteria: &SearchCriteria) -> Result<Vec<SearchResult>> {
        ctx.check()?;
        let index = self.index.load();
        let scoring = &self.config.scoring;
        let query = criteria.query.trim();

        let mut results: Vec<SearchResult> = if query.is_empty() && !criteria.categories.is_empty() {
            let categories: BTreeSet<Category> = criteria.categories.iter().copied().collect();
            categories
                .into_iter()
                .flat_map(|category| index.in_category(category).iter())
                .map(|tool| SearchResult {
                    tool: Arc::clone(tool),
                    relevance_score: scoring.category_relevance,
                    match_context: format!("Category: {}", tool.category.display_name()),
                    matched_fields: vec!["category".to_string()],
                    category_match: true,
                })
                .collect()
        } else if query.is_empty() {
            index
                .all()
                .map(|tool| SearchResult {
                    tool: Arc::clone(tool),
                    relevance_score: scoring.base_relevance,
                    match_context: "All tools".to_string(),
                    matched_fields: Vec::new(),
                    category_match: false,
                })
                .collect()
        } else {
            self.text_matches(&index, query)
        };

        results.retain(|r| r.relevance_score >= criteria.min_relevance_score);
        if !criteria.categories.is_empty() {
            results.retain(|r| r.category_match || criteria.categories.contains(&r.tool.category));
        }

        let order = criteria.sort_order.unwrap_or_else(|| criteria.sort_by.default_order());
        results.sort_by(|a, b| compare(a, b, criteria.sort_by, order));

        if criteria.max_results > 0 {
            results.truncate(criteria.max_results);
        }

        debug!(query = %query, results = results.len(), "Search completed");
        Ok(results)
    }

    fn text_matches(&self, index: &SearchIndex, query: &str) -> Vec<SearchResult> {
        let mut merged: HashMap<String, SearchResult> = HashMap::new();

        for query_token in tokenize(query, self.config.min_token_length) {
            for entry in index.postings(&query_token) {
                self.merge(&mut merged, entry, &query_token, MatchKind::Exact);
            }
            // an exact hit also matches fuzzily against itself
            for token in index.tokens() {
                if !fuzzy_match(
                    &query_token,
                    token,
                    self.config.fuzzy_prefix_length,
                    self.config.fuzzy_min_length,
                ) {
                    continue;
                }
                for entry in index.postings(token) {
                    self.merge(&mut merged, entry, token, MatchKind::Fuzzy);
                }
            }
        }

        merged.into_values().collect()
    }

    fn merge(&self, merged: &mut HashMap<String, SearchResult>, entry: &IndexEntry, token: &str, kind: MatchKind) {
        let scoring = &self.config.scoring;
        let (first, repeat) = match kind {
            MatchKind::Exact => (scoring.exact_first_boost, scoring.exact_repeat_boost),
            MatchKind::Fuzzy => (scoring.fuzzy_first_boost, scoring.fuzzy_repeat_boost),
        };

        if let Some(result) = merged.get_mut(&entry.tool.name) {
            result.relevance_score += repeat;
            for field in &entry.fields {
                if !result.matched_fields.iter().any(|f| f == field) {
                    result.matched_fields.push(field.to_string());
                }
            }
            return;
        }

        let fields = entry.fields.join(", ");
        let match_context = match kind {
            MatchKind::Exact => format!("Matched '{}' in {}", token, fields),
            MatchKind::Fuzzy => format!("Similar to '{}' in {}", token, fields),
        };
        merged.insert(
            entry.tool.name.clone(),
            SearchResult {
                tool: Arc::clone(&entry.tool),
                relevance_score: entry.relevance + first,
                match_context,
                matched_fields: entry.fields.iter().map(|f| f.to_string()).collect(),
                category_match: false,
            },
        );
    }

    /// Overview of one category, or of every category when `None`
    pub fn discover_by_category(
        &self,
        ctx: &OperationContext,
        category: Option<Category>,
    ) -> Result<CategoryDiscovery> {
        ctx.check()?;
        Ok(self.overview(category))
    }

    /// Overview by category name: `""` covers every category, unknown names cover nothing
    pub fn discover_by_category_name(&self, ctx: &OperationContext, category: &str) -> Result<CategoryDiscovery> {
        ctx.check()?;
        if category.is_empty() {
            return Ok(self.overview(None));
        }
        match Category::from_str(category) {
            Ok(category) => Ok(self.overview(Some(category))),
            Err(_) => Ok(CategoryDiscovery {
                category: category.to_string(),
                tool_count: 0,
                tools: Vec::new(),
                related_categories: Category::ALL.to_vec(),
                recommended_tools: Vec::new(),
            }),
        }
    }

    fn overview(&self, category: Option<Category>) -> CategoryDiscovery {
        let index = self.index.load();
        match category {
            None => {
                let tools: Vec<_> = index.all().cloned().collect();
                CategoryDiscovery {
                    category: String::new(),
                    tool_count: tools.len(),
                    recommended_tools: first_names(&tools, self.config.discover_all_recommended),
                    tools,
                    related_categories: Category::ALL.to_vec(),
                }
            }
            Some(category) => {
                let tools = index.in_category(category).to_vec();
                CategoryDiscovery {
                    category: category.as_str().to_string(),
                    tool_count: tools.len(),
                    recommended_tools: first_names(&tools, self.config.discover_category_recommended),
                    tools,
                    related_categories: Category::ALL.iter().copied().filter(|c| *c != category).collect(),
                }
            }
        }
    }

    /// Fixed suggestions for the workflow the text describes; `limit == 0` uses the default
    pub fn recommend(&self, ctx: &OperationContext, text: &str, limit: usize) -> Result<Vec<String>> {
        ctx.check()?;
        let limit = if limit == 0 {
            self.config.recommend_default_limit
        } else {
            limit
        };
        let workflow = detect_workflow(text);
        debug!(workflow = %workflow, "Detected workflow");
        Ok(workflow
            .tools()
            .iter()
            .take(limit)
            .map(|name| name.to_string())
            .collect())
    }
}

fn first_names(tools: &[Arc<Capability>], n: usize) -> Vec<String> {
    tools.iter().take(n).map(|t| t.name.clone()).collect()
}

fn compare(a: &SearchResult, b: &SearchResult, sort_by: SortBy, order: SortOrder) -> Ordering {
    let primary = match sort_by {
        SortBy::Relevance => a.relevance_score.total_cmp(&b.relevance_score),
        SortBy::Name => a.tool.name.cmp(&b.tool.name),
        SortBy::Category => a.tool.category.cmp(&b.tool.category),
    };
    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    primary.then_with(|| a.tool.name.cmp(&b.tool.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InvocationBinding;
    use crate::validation::InputValidator;

    fn engine(tools: &[(&str, &str, Category)]) -> DiscoveryEngine {
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
        DiscoveryEngine::new(&ctx, registry, DiscoveryConfig::default()).unwrap()
    }

    #[test]
    fn test_exact_then_fuzzy_boosts() {
        let engine = engine(&[
            ("invoice_create", "Create a new invoice", Category::InvoiceManagement),
            ("invoices_export", "Export documents", Category::DataExport),
        ]);
        let ctx = OperationContext::background();
        let results = engine.search(&ctx, &SearchCriteria::query("invoice")).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tool.name, "invoice_create");
        // 0.5 + 0.3 exact, then + 0.1 for the fuzzy self match
        assert!((results[0].relevance_score - 0.9).abs() < 1e-9);
        assert_eq!(results[0].match_context, "Matched 'invoice' in name, description");
        // fuzzy 0.5 + 0.2
        assert!((results[1].relevance_score - 0.7).abs() < 1e-9);
        assert!(results[1].match_context.starts_with("Similar to 'invoices'"));
    }

    #[test]
    fn test_repeat_matches_accumulate() {
        let engine = engine(&[("client_invoice", "Client invoice view", Category::ClientManagement)]);
        let ctx = OperationContext::background();
        let results = engine.search(&ctx, &SearchCriteria::query("client invoice")).unwrap();
        // 0.5 + 0.3 (first exact) + 0.2 (second exact) + 0.1 per fuzzy self match
        assert!((results[0].relevance_score - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_deadline_only_gates_entry() {
        let engine = engine(&[("alpha_report", "Alpha", Category::Reporting)]);
        let ctx = OperationContext::background().with_timeout(std::time::Duration::from_millis(20));
        assert!(ctx.check().is_ok());
        engine
            .registry
            .register(
                &OperationContext::background(),
                Capability::new("beta_report", "Beta", Category::Reporting, InvocationBinding::new("ledger", vec![])),
            )
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(40));

        // past the entry check, the index build no longer consults the context
        engine.reindex();
        assert_eq!(engine.index().len(), 2);
        assert!(engine.rebuild(&ctx).unwrap_err().is_cancellation());
    }

    #[test]
    fn test_sort_by_name_desc() {
        let engine = engine(&[
            ("alpha_report", "Alpha", Category::Reporting),
            ("beta_report", "Beta", Category::Reporting),
        ]);
        let ctx = OperationContext::background();
        let criteria = SearchCriteria::default().sorted_by(SortBy::Name, Some(SortOrder::Desc));
        let results = engine.search(&ctx, &criteria).unwrap();
        assert_eq!(results[0].tool.name, "beta_report");
        assert_eq!(results[0].match_context, "All tools");
    }

    #[test]
    fn test_unknown_category_name_discovers_nothing() {
        let engine = engine(&[("alpha_report", "Alpha", Category::Reporting)]);
        let ctx = OperationContext::background();
        let overview = engine.discover_by_category_name(&ctx, "payroll").unwrap();
        assert_eq!(overview.tool_count, 0);
        assert!(overview.recommended_tools.is_empty());
    }

    #[test]
    fn test_recommend_limit() {
        let engine = engine(&[]);
        let ctx = OperationContext::background();
        assert_eq!(engine.recommend(&ctx, "invoice", 0).unwrap().len(), 5);
        assert_eq!(engine.recommend(&ctx, "invoice", 2).unwrap(), vec!["invoice_create", "invoice_send"]);
    }
}
