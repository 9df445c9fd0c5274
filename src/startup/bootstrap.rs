//! Catalogue bootstrap
//!
//! Sequencing: validator, registry and bulk registration, discovery index,
//! category manager, then an integrity check of the registered totals. Any
//! failure aborts the whole sequence.

use crate::categories::CategoryManager;
use crate::config::CatalogConfig;
use crate::context::OperationContext;
use crate::discovery::DiscoveryEngine;
use crate::error::{CatalogError, Result};
use crate::registry::{DefinitionGroup, Registry, RegistryLoader, RegistryStats};
use crate::validation::InputValidator;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, Dispatch};

/// A fully initialised catalogue
#[derive(Debug)]
pub struct Catalog {
    config: CatalogConfig,
    validator: Arc<InputValidator>,
    registry: Arc<Registry>,
    discovery: DiscoveryEngine,
    categories: CategoryManager,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn validator(&self) -> &Arc<InputValidator> {
        &self.validator
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn discovery(&self) -> &DiscoveryEngine {
        &self.discovery
    }

    pub fn categories(&self) -> &CategoryManager {
        &self.categories
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.counts()
    }
}

/// Builder for [`Catalog`]
#[derive(Default)]
pub struct CatalogBuilder {
    logger: Option<Dispatch>,
    config: CatalogConfig,
    validator: Option<InputValidator>,
    groups: Vec<DefinitionGroup>,
    expected_tools: Option<usize>,
    expected_categories: Option<usize>,
}

impl CatalogBuilder {
    /// Log sink for construction and for the returned components' setup events
    pub fn logger(mut self, dispatch: Dispatch) -> Self {
        self.logger = Some(dispatch);
        self
    }

    pub fn config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom validator, e.g. one with extra formats
    pub fn validator(mut self, validator: InputValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Add one group of definitions
    pub fn definitions(mut self, group: DefinitionGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn definition_groups<I: IntoIterator<Item = DefinitionGroup>>(mut self, groups: I) -> Self {
        self.groups.extend(groups);
        self
    }

    /// Add every capability file under a path
    pub fn load_path<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.groups.extend(RegistryLoader::load_path(path)?);
        Ok(self)
    }

    /// Expected number of registered tools; overrides the configured value
    pub fn expect_tools(mut self, count: usize) -> Self {
        self.expected_tools = Some(count);
        self
    }

    /// Expected number of populated categories; overrides the configured value
    pub fn expect_categories(mut self, count: usize) -> Self {
        self.expected_categories = Some(count);
        self
    }

    /// Run the bootstrap sequence
    ///
    /// Fails with `Precondition` when no logger was supplied.
    pub fn build(self, ctx: &OperationContext) -> Result<Catalog> {
        let dispatch = self
            .logger
            .clone()
            .ok_or_else(|| CatalogError::precondition("Catalog bootstrap requires a logger"))?;
        tracing::dispatcher::with_default(&dispatch, || {
            let result = self.assemble(ctx);
            if let Err(e) = &result {
                error!(error = %e, "Catalog bootstrap failed");
            }
            result
        })
    }

    fn assemble(self, ctx: &OperationContext) -> Result<Catalog> {
        ctx.check()?;
        self.config.validate()?;

        let supplied_tools: usize = self.groups.iter().map(|g| g.capabilities.len()).sum();
        let supplied_categories = self
            .groups
            .iter()
            .flat_map(|g| g.capabilities.iter().map(|c| c.category))
            .collect::<BTreeSet<_>>()
            .len();
        let expected_tools = self
            .expected_tools
            .or(self.config.integrity.expected_tools)
            .unwrap_or(supplied_tools);
        let expected_categories = self
            .expected_categories
            .or(self.config.integrity.expected_categories)
            .unwrap_or(supplied_categories);

        let validator = Arc::new(self.validator.unwrap_or_default());
        debug!(formats = ?validator.format_names(), "Input validator ready");

        let registry = Arc::new(Registry::new(Arc::clone(&validator), self.config.registry.clone())?);
        for group in self.groups {
            let count = registry.insert_all(group.capabilities)?;
            info!(group = %group.name, tools = count, "Registered capability group");
        }

        let discovery = DiscoveryEngine::from_registry(Arc::clone(&registry), self.config.discovery.clone())?;
        let categories = CategoryManager::new(Arc::clone(&registry), self.config.categories.clone());

        let stats = registry.counts();
        if stats.tool_count != expected_tools {
            return Err(CatalogError::integrity(format!(
                "Registered {} tools, expected {}",
                stats.tool_count, expected_tools
            )));
        }
        if stats.category_count != expected_categories {
            return Err(CatalogError::integrity(format!(
                "Registered tools span {} categories, expected {}",
                stats.category_count, expected_categories
            )));
        }

        registry.log_summary();
        info!("Catalog ready");

        Ok(Catalog {
            config: self.config,
            validator,
            registry,
            discovery,
            categories,
        })
    }
}
