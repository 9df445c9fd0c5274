//! Category manager: browsing, ranking and describing categories

use crate::categories::describe;
use crate::categories::metadata::{self, CategoryMetadata};
use crate::config::CategoryConfig;
use crate::context::OperationContext;
use crate::error::{CatalogError, Result};
use crate::registry::{Category, Registry};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Ordering for category discovery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySort {
    /// Computed relevance, highest first
    #[default]
    Relevance,
    /// Priority, most important first
    Priority,
    /// Tool count, largest first
    ToolCount,
    /// Name, ascending
    Name,
}

/// Category discovery filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryFilter {
    /// Case-insensitive text matched against name, description, keywords and use cases
    pub keyword: String,
    /// Case-insensitive text matched against use cases only
    pub use_case: String,
    /// Keep categories with no registered tools
    pub include_empty: bool,
    pub sort_by: CategorySort,
    /// Result cap; 0 uses the configured default
    pub max_results: usize,
}

impl CategoryFilter {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Default::default()
        }
    }
}

/// A category with live registry information
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub metadata: CategoryMetadata,
    pub tool_count: usize,
    /// First tools in name order
    pub popular_tools: Vec<String>,
    pub relevance: i64,
}

/// A scored category recommendation
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRecommendation {
    pub category: Category,
    pub display_name: String,
    pub score: i64,
    pub tool_count: usize,
}

/// Category manager
#[derive(Debug)]
pub struct CategoryManager {
    registry: Arc<Registry>,
    config: CategoryConfig,
    metadata: BTreeMap<Category, CategoryMetadata>,
}

impl CategoryManager {
    /// Create a manager seeded with the built-in metadata
    pub fn new(registry: Arc<Registry>, config: CategoryConfig) -> Self {
        Self {
            registry,
            config,
            metadata: metadata::builtin(),
        }
    }

    /// Metadata for a category name; `None` when the name is unknown
    pub fn get_metadata(&self, ctx: &OperationContext, category: &str) -> Result<Option<CategoryMetadata>> {
        ctx.check()?;
        Ok(Category::from_str(category)
            .ok()
            .and_then(|c| self.metadata.get(&c))
            .cloned())
    }

    /// Filtered, sorted categories with tool counts
    pub fn discover(&self, ctx: &OperationContext, filter: &CategoryFilter) -> Result<Vec<CategoryInfo>> {
        ctx.check()?;
        let keyword = filter.keyword.trim().to_lowercase();
        let use_case = filter.use_case.trim().to_lowercase();
        let tools = self.registry.snapshot(None);

        let mut infos: Vec<CategoryInfo> = self
            .metadata
            .values()
            .filter(|m| keyword.is_empty() || matches_keyword(m, &keyword))
            .filter(|m| use_case.is_empty() || m.use_cases.iter().any(|u| u.to_lowercase().contains(&use_case)))
            .map(|m| {
                let in_category: Vec<&str> = tools
                    .iter()
                    .filter(|t| t.category == m.category)
                    .map(|t| t.name.as_str())
                    .collect();
                CategoryInfo {
                    metadata: m.clone(),
                    tool_count: in_category.len(),
                    popular_tools: in_category
                        .iter()
                        .take(self.config.popular_tools)
                        .map(|s| s.to_string())
                        .collect(),
                    relevance: score(m, &keyword),
                }
            })
            .filter(|info| filter.include_empty || info.tool_count > 0)
            .collect();

        infos.sort_by(|a, b| {
            let primary = match filter.sort_by {
                CategorySort::Relevance => b.relevance.cmp(&a.relevance),
                CategorySort::Priority => a.metadata.priority.cmp(&b.metadata.priority),
                CategorySort::ToolCount => b.tool_count.cmp(&a.tool_count),
                CategorySort::Name => Ordering::Equal,
            };
            primary.then_with(|| a.metadata.category.cmp(&b.metadata.category))
        });

        let max = if filter.max_results == 0 {
            self.config.default_max_results
        } else {
            filter.max_results
        };
        infos.truncate(max);

        debug!(keyword = %keyword, results = infos.len(), "Category discovery completed");
        Ok(infos)
    }

    /// Rank every category against free text; `max == 0` uses the configured default
    pub fn recommend(&self, ctx: &OperationContext, query: &str, max: usize) -> Result<Vec<CategoryRecommendation>> {
        ctx.check()?;
        let query = query.trim().to_lowercase();
        let max = if max == 0 { self.config.recommend_default } else { max };
        let stats = self.registry.counts();

        let mut ranked: Vec<CategoryRecommendation> = self
            .metadata
            .values()
            .map(|m| CategoryRecommendation {
                category: m.category,
                display_name: m.display_name.clone(),
                score: score(m, &query),
                tool_count: stats.per_category.get(&m.category).copied().unwrap_or(0),
            })
            .collect();

        ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.category.cmp(&b.category)));
        ranked.truncate(max);
        Ok(ranked)
    }

    /// Describe a category in prose
    ///
    /// Fails with `MetadataMissing` when the category has no metadata.
    pub fn describe(&self, ctx: &OperationContext, category: &str, include_tools: bool) -> Result<String> {
        ctx.check()?;
        let metadata = Category::from_str(category)
            .ok()
            .and_then(|c| self.metadata.get(&c))
            .ok_or_else(|| CatalogError::metadata_missing(category))?;

        let tools = if include_tools {
            Some(self.registry.snapshot(Some(metadata.category)))
        } else {
            None
        };

        Ok(describe::render(
            metadata,
            &self.metadata,
            tools.as_deref(),
            self.config.describe_example_tools,
        ))
    }
}

fn matches_keyword(metadata: &CategoryMetadata, keyword: &str) -> bool {
    metadata.category.as_str().contains(keyword)
        || metadata.display_name.to_lowercase().contains(keyword)
        || metadata.description.to_lowercase().contains(keyword)
        || metadata.keywords.iter().any(|k| k.to_lowercase().contains(keyword))
        || metadata.use_cases.iter().any(|u| u.to_lowercase().contains(keyword))
}

/// Text score plus a priority-derived base
fn score(metadata: &CategoryMetadata, query: &str) -> i64 {
    let mut score = 10 - i64::from(metadata.priority);
    if query.is_empty() {
        return score;
    }
    if metadata.display_name.to_lowercase().contains(query) {
        score += 10;
    }
    score += 5 * metadata.keywords.iter().filter(|k| k.to_lowercase().contains(query)).count() as i64;
    if metadata.description.to_lowercase().contains(query) {
        score += 3;
    }
    score += 3 * metadata.use_cases.iter().filter(|u| u.to_lowercase().contains(query)).count() as i64;
    score
}
