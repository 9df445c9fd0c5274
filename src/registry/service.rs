//! Capability registry: the system of record for capability definitions
//!
//! One reader-writer lock guards the name index and the category index. Reads run
//! concurrently; `register` is exclusive. Callers always receive owned copies,
//! never references into the store.

use crate::config::RegistryConfig;
use crate::context::OperationContext;
use crate::error::{CatalogError, Result};
use crate::registry::category::Category;
use crate::registry::types::Capability;
use crate::validation::InputValidator;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Capability registry
#[derive(Debug)]
pub struct Registry {
    validator: Arc<InputValidator>,
    config: RegistryConfig,
    state: RwLock<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Capabilities indexed by name
    tools: HashMap<String, Capability>,
    /// Capability names grouped by category
    by_category: BTreeMap<Category, BTreeSet<String>>,
}

/// Point-in-time registry counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Total number of capabilities
    pub tool_count: usize,
    /// Number of categories with at least one capability
    pub category_count: usize,
    /// Capabilities per populated category
    pub per_category: BTreeMap<Category, usize>,
}

impl Registry {
    /// Create an empty registry
    pub fn new(validator: Arc<InputValidator>, config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            validator,
            config,
            state: RwLock::new(RegistryState::default()),
        })
    }

    /// Create an empty registry with default bounds
    pub fn with_defaults(validator: Arc<InputValidator>) -> Result<Self> {
        Self::new(validator, RegistryConfig::default())
    }

    /// The validator used for input checks
    pub fn validator(&self) -> &Arc<InputValidator> {
        &self.validator
    }

    /// Registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a capability
    ///
    /// Fails with `InvalidDefinition` for incomplete or out-of-bounds definitions and
    /// with `DuplicateName` when the name is taken; the original entry is kept.
    pub fn register(&self, ctx: &OperationContext, capability: Capability) -> Result<()> {
        ctx.check()?;
        self.insert(capability)
    }

    /// Register a batch, stopping at the first failure
    pub fn register_all<I>(&self, ctx: &OperationContext, capabilities: I) -> Result<usize>
    where
        I: IntoIterator<Item = Capability>,
    {
        ctx.check()?;
        self.insert_all(capabilities)
    }

    pub(crate) fn insert_all<I>(&self, capabilities: I) -> Result<usize>
    where
        I: IntoIterator<Item = Capability>,
    {
        let mut registered = 0;
        for capability in capabilities {
            self.insert(capability)?;
            registered += 1;
        }
        Ok(registered)
    }

    fn insert(&self, capability: Capability) -> Result<()> {
        capability.validate(&self.config)?;

        if semver::Version::parse(&capability.version).is_err() {
            warn!(
                tool = %capability.name,
                version = %capability.version,
                "Capability version is not a semantic version"
            );
        }

        let mut state = self.write();
        if state.tools.contains_key(&capability.name) {
            return Err(CatalogError::duplicate_name(capability.name));
        }

        let name = capability.name.clone();
        let category = capability.category;
        state
            .by_category
            .entry(category)
            .or_default()
            .insert(name.clone());
        state.tools.insert(name.clone(), capability);

        debug!(tool = %name, category = %category, "Registered capability");
        Ok(())
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, ctx: &OperationContext, name: &str) -> Result<Capability> {
        ctx.check()?;
        self.lookup(name)
    }

    fn lookup(&self, name: &str) -> Result<Capability> {
        let state = self.read();
        match state.tools.get(name) {
            Some(capability) => Ok(capability.clone()),
            None => Err(CatalogError::not_found(
                name,
                suggest_names(&state, name, self.config.suggestion_limit),
            )),
        }
    }

    /// List capabilities sorted by name; `None` lists every category
    pub fn list(&self, ctx: &OperationContext, category: Option<Category>) -> Result<Vec<Capability>> {
        ctx.check()?;
        Ok(self.snapshot(category))
    }

    /// List by category name: `""` lists everything, unknown names list nothing
    pub fn list_by_category_name(&self, ctx: &OperationContext, category: &str) -> Result<Vec<Capability>> {
        ctx.check()?;
        if category.is_empty() {
            return Ok(self.snapshot(None));
        }
        match Category::from_str(category) {
            Ok(category) => Ok(self.snapshot(Some(category))),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Name-ordered copies without an entry check, for callers already past theirs
    pub(crate) fn snapshot(&self, category: Option<Category>) -> Vec<Capability> {
        let state = self.read();
        match category {
            // BTreeSet iteration is already name-ordered
            Some(category) => state
                .by_category
                .get(&category)
                .map(|names| names.iter().filter_map(|n| state.tools.get(n)).cloned().collect())
                .unwrap_or_default(),
            None => {
                let mut all: Vec<Capability> = state.tools.values().cloned().collect();
                all.sort_by(|a, b| a.name.cmp(&b.name));
                all
            }
        }
    }

    /// Validate caller arguments against a capability's input schema
    ///
    /// Unknown capabilities yield `NotFound`; bad arguments yield `InvalidInput`.
    pub fn validate_input(&self, ctx: &OperationContext, name: &str, input: &Value) -> Result<()> {
        ctx.check()?;
        let capability = self.lookup(name)?;
        self.validator
            .validate_value(input, &capability.input_schema)
            .map_err(|error| {
                debug!(tool = %name, field = %error.field, code = %error.code, "Input rejected");
                CatalogError::invalid_input(name, error)
            })
    }

    /// Populated categories, sorted
    pub fn categories(&self, ctx: &OperationContext) -> Result<Vec<Category>> {
        ctx.check()?;
        let state = self.read();
        Ok(state
            .by_category
            .iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(category, _)| *category)
            .collect())
    }

    /// Current counts
    pub fn stats(&self, ctx: &OperationContext) -> Result<RegistryStats> {
        ctx.check()?;
        Ok(self.counts())
    }

    pub(crate) fn counts(&self) -> RegistryStats {
        let state = self.read();
        let per_category: BTreeMap<Category, usize> = state
            .by_category
            .iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(category, names)| (*category, names.len()))
            .collect();
        RegistryStats {
            tool_count: state.tools.len(),
            category_count: per_category.len(),
            per_category,
        }
    }

    /// Log the current contents at info level
    pub fn log_summary(&self) {
        let stats = self.counts();
        info!(
            tools = stats.tool_count,
            categories = stats.category_count,
            "Capability registry ready"
        );
        for (category, count) in &stats.per_category {
            debug!(category = %category, tools = count, "Category population");
        }
    }
}

/// Names containing, or contained in, the query (case-insensitive), in name order
fn suggest_names(state: &RegistryState, query: &str, limit: usize) -> Vec<String> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let mut names: Vec<&String> = state.tools.keys().collect();
    names.sort();
    names
        .into_iter()
        .filter(|name| {
            let lower = name.to_lowercase();
            lower.contains(&query) || query.contains(&lower)
        })
        .take(limit)
        .cloned()
        .collect()
}
