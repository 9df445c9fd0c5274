//! Capability discovery
//!
//! Builds a token index from a registry snapshot and answers free-text searches,
//! category overviews and workflow recommendations.

pub mod engine;
pub mod index;
pub mod recommend;
pub mod tokenize;
pub mod types;

pub use engine::DiscoveryEngine;
pub use index::{IndexEntry, SearchIndex};
pub use recommend::{detect_workflow, Workflow};
pub use types::{CategoryDiscovery, SearchCriteria, SearchResult, SortBy, SortOrder};
