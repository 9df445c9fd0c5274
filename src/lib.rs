//! Tool Catalog - registry and discovery engine for schema-described capabilities
//!
//! This crate keeps a process-local catalogue of named operations, validates caller
//! arguments against each operation's input schema, and answers free-text search,
//! category browsing and recommendation queries for an orchestrating front end.

pub mod categories;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod registry;
pub mod startup;
pub mod validation;

pub use categories::{CategoryFilter, CategoryManager, CategoryMetadata};
pub use config::CatalogConfig;
pub use context::{CancellationReason, OperationContext};
pub use discovery::{DiscoveryEngine, SearchCriteria, SearchResult};
pub use error::{CatalogError, Result};
pub use registry::{Capability, Category, InvocationBinding, Registry, UsageExample};
pub use startup::{Catalog, CatalogBuilder};
pub use validation::{InputValidator, ValidationError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "toolcatalog.yaml";

/// Default capability directory
pub const DEFAULT_CAPABILITIES_DIR: &str = "capabilities";
