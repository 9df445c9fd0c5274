//! Configuration module for the capability catalogue
//!
//! This module provides configuration types and loading utilities.

mod config;

// Re-export the main configuration types
pub use config::{
    CatalogConfig, CategoryConfig, DiscoveryConfig, IntegrityConfig, LogFormat, LoggingConfig,
    RegistryConfig, ScoringConfig,
};
