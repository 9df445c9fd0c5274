//! Capability registry: definitions, categories and storage

pub mod category;
pub mod loader;
pub mod service;
pub mod types;

pub use category::Category;
pub use loader::{CapabilityDefinition, CapabilityFile, DefinitionGroup, FileMetadata, RegistryLoader};
pub use service::{Registry, RegistryStats};
pub use types::{Capability, InvocationBinding, UsageExample};
