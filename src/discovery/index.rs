//! Search index built from a registry snapshot
//!
//! The index is immutable once built. Changes to the registry are picked up only
//! by building a new index.

use crate::config::DiscoveryConfig;
use crate::discovery::tokenize::tokenize;
use crate::registry::{Capability, Category};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Scored full-text posting for one capability under one token
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub tool: Arc<Capability>,
    /// Indexed relevance before query boosts
    pub relevance: f64,
    /// Fields the token occurs in
    pub fields: Vec<&'static str>,
}

/// Read-only search index
#[derive(Debug)]
pub struct SearchIndex {
    name_tokens: HashMap<String, Vec<String>>,
    description_tokens: HashMap<String, Vec<String>>,
    categories: BTreeMap<Category, Vec<Arc<Capability>>>,
    /// Reserved for tag metadata; capabilities carry no tags yet
    tags: HashMap<String, Vec<String>>,
    full_text: HashMap<String, Vec<IndexEntry>>,
    /// Full-text tokens in lexical order
    tokens: Vec<String>,
    tools: BTreeMap<String, Arc<Capability>>,
    built_at: DateTime<Utc>,
}

impl SearchIndex {
    /// Build an index over a snapshot
    pub fn build(snapshot: Vec<Capability>, config: &DiscoveryConfig) -> Self {
        let mut index = SearchIndex {
            name_tokens: HashMap::new(),
            description_tokens: HashMap::new(),
            categories: BTreeMap::new(),
            tags: HashMap::new(),
            full_text: HashMap::new(),
            tokens: Vec::new(),
            tools: BTreeMap::new(),
            built_at: Utc::now(),
        };

        let mut snapshot = snapshot;
        snapshot.sort_by(|a, b| a.name.cmp(&b.name));

        for capability in snapshot {
            let tool = Arc::new(capability);
            let min_len = config.min_token_length;

            let name_tokens = tokenize(&tool.name, min_len);
            let description_tokens = tokenize(&tool.description, min_len);
            for token in &name_tokens {
                index.name_tokens.entry(token.clone()).or_default().push(tool.name.clone());
            }
            for token in &description_tokens {
                index
                    .description_tokens
                    .entry(token.clone())
                    .or_default()
                    .push(tool.name.clone());
            }
            index.categories.entry(tool.category).or_default().push(Arc::clone(&tool));

            let relevance = indexed_relevance(&tool, config);
            let help_tokens = tokenize(&tool.help_text, min_len);
            let combined = format!("{} {} {}", tool.name, tool.description, tool.help_text);
            for token in tokenize(&combined, min_len) {
                let mut fields = Vec::new();
                if name_tokens.contains(&token) {
                    fields.push("name");
                }
                if description_tokens.contains(&token) {
                    fields.push("description");
                }
                if help_tokens.contains(&token) {
                    fields.push("help_text");
                }
                index.full_text.entry(token).or_default().push(IndexEntry {
                    tool: Arc::clone(&tool),
                    relevance,
                    fields,
                });
            }

            index.tools.insert(tool.name.clone(), tool);
        }

        index.tokens = index.full_text.keys().cloned().collect();
        index.tokens.sort();
        index
    }

    /// Full-text postings for a token
    pub fn postings(&self, token: &str) -> &[IndexEntry] {
        self.full_text.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every full-text token, sorted
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Names of capabilities whose name contains the token
    pub fn names_with_token(&self, token: &str) -> &[String] {
        self.name_tokens.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of capabilities whose description contains the token
    pub fn descriptions_with_token(&self, token: &str) -> &[String] {
        self.description_tokens.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of capabilities carrying the tag
    pub fn tagged(&self, tag: &str) -> &[String] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Capabilities in a category, in name order
    pub fn in_category(&self, category: Category) -> &[Arc<Capability>] {
        self.categories.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every indexed capability, in name order
    pub fn all(&self) -> impl Iterator<Item = &Arc<Capability>> {
        self.tools.values()
    }

    /// Number of indexed capabilities
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// When the snapshot was taken
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Base relevance plus documentation-quality bonuses
fn indexed_relevance(tool: &Capability, config: &DiscoveryConfig) -> f64 {
    let scoring = &config.scoring;
    let mut relevance = scoring.base_relevance;
    if !tool.examples.is_empty() {
        relevance += scoring.example_bonus;
    }
    if !tool.help_text.is_empty() {
        relevance += scoring.help_text_bonus;
    }
    if tool.description.chars().count() > scoring.long_description_chars {
        relevance += scoring.long_description_bonus;
    }
    relevance
}
