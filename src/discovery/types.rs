//! Types for capability discovery
//!
//! Search criteria, ranked results and category overviews returned by the
//! discovery engine.

use crate::registry::{Capability, Category};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Field used to order search results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    Name,
    Category,
}

impl SortBy {
    /// Direction used when the caller gives none
    pub fn default_order(&self) -> SortOrder {
        match self {
            SortBy::Relevance => SortOrder::Desc,
            SortBy::Name | SortBy::Category => SortOrder::Asc,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Search request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    /// Free-text query; empty means no text matching
    pub query: String,
    /// Restrict results to these categories; empty means any
    pub categories: Vec<Category>,
    /// Results scoring below this are dropped
    pub min_relevance_score: f64,
    /// Result cap; 0 means unlimited
    pub max_results: usize,
    /// Ordering field
    pub sort_by: SortBy,
    /// Ordering direction; `None` uses the field's default
    pub sort_order: Option<SortOrder>,
}

impl SearchCriteria {
    /// Criteria for a plain text query
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Criteria for browsing categories
    pub fn in_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            categories: categories.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_min_relevance(mut self, score: f64) -> Self {
        self.min_relevance_score = score;
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn sorted_by(mut self, sort_by: SortBy, order: Option<SortOrder>) -> Self {
        self.sort_by = sort_by;
        self.sort_order = order;
        self
    }
}

/// A ranked search hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// The matched capability
    pub tool: Arc<Capability>,
    /// Relevance score, nominally within [0, 1]
    pub relevance_score: f64,
    /// Why the capability matched
    pub match_context: String,
    /// Fields that matched (`name`, `description`, `help_text`, `category`)
    pub matched_fields: Vec<String>,
    /// Matched through the category filter rather than text
    pub category_match: bool,
}

/// Overview of one category, or of all categories
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDiscovery {
    /// Category name; empty for the all-categories overview
    pub category: String,
    /// Number of capabilities covered
    pub tool_count: usize,
    /// Capabilities covered, in name order
    pub tools: Vec<Arc<Capability>>,
    /// Related categories
    pub related_categories: Vec<Category>,
    /// Names of suggested starting capabilities
    pub recommended_tools: Vec<String>,
}
