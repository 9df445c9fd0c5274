//! Category browsing, recommendation and descriptions

pub mod describe;
pub mod manager;
pub mod metadata;

pub use manager::{CategoryFilter, CategoryInfo, CategoryManager, CategoryRecommendation, CategorySort};
pub use metadata::CategoryMetadata;
