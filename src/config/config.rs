//! Configuration management for the capability catalogue

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Registry bounds
    pub registry: RegistryConfig,
    /// Discovery index and scoring
    pub discovery: DiscoveryConfig,
    /// Category manager limits
    pub categories: CategoryConfig,
    /// Bootstrap integrity expectations
    pub integrity: IntegrityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Smallest accepted capability timeout, in seconds
    pub min_timeout_secs: u64,
    /// Largest accepted capability timeout, in seconds
    pub max_timeout_secs: u64,
    /// Maximum alternatives offered for an unknown name
    pub suggestion_limit: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            min_timeout_secs: 1,
            max_timeout_secs: 600,
            suggestion_limit: 5,
        }
    }
}

impl RegistryConfig {
    /// Inclusive timeout bounds
    pub fn timeout_bounds(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.min_timeout_secs),
            Duration::from_secs(self.max_timeout_secs),
        )
    }

    /// Validate the registry configuration
    pub fn validate(&self) -> Result<()> {
        if self.min_timeout_secs == 0 {
            return Err(CatalogError::config("registry.min_timeout_secs must be positive"));
        }
        if self.min_timeout_secs > self.max_timeout_secs {
            return Err(CatalogError::config(format!(
                "registry.min_timeout_secs ({}) exceeds registry.max_timeout_secs ({})",
                self.min_timeout_secs, self.max_timeout_secs
            )));
        }
        Ok(())
    }
}

/// Relevance weights used by the discovery engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Relevance every indexed capability starts with
    pub base_relevance: f64,
    /// Bonus for having at least one example
    pub example_bonus: f64,
    /// Bonus for non-empty help text
    pub help_text_bonus: f64,
    /// Bonus for a description longer than `long_description_chars`
    pub long_description_bonus: f64,
    pub long_description_chars: usize,
    /// Boost for the first exact token hit on a capability
    pub exact_first_boost: f64,
    /// Boost for later exact token hits on the same capability
    pub exact_repeat_boost: f64,
    /// Boost for the first fuzzy token hit on a capability
    pub fuzzy_first_boost: f64,
    /// Boost for later fuzzy token hits on the same capability
    pub fuzzy_repeat_boost: f64,
    /// Fixed relevance for category-only searches
    pub category_relevance: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_relevance: 0.5,
            example_bonus: 0.1,
            help_text_bonus: 0.1,
            long_description_bonus: 0.1,
            long_description_chars: 50,
            exact_first_boost: 0.3,
            exact_repeat_boost: 0.2,
            fuzzy_first_boost: 0.2,
            fuzzy_repeat_boost: 0.1,
            category_relevance: 0.8,
        }
    }
}

impl ScoringConfig {
    /// Validate the ordering of the weights
    pub fn validate(&self) -> Result<()> {
        if !(self.base_relevance > 0.0 && self.base_relevance <= 1.0) {
            return Err(CatalogError::config("discovery.scoring.base_relevance must be in (0, 1]"));
        }
        let boosts = [
            self.exact_first_boost,
            self.exact_repeat_boost,
            self.fuzzy_first_boost,
            self.fuzzy_repeat_boost,
        ];
        if boosts.iter().any(|b| *b <= 0.0) {
            return Err(CatalogError::config("discovery.scoring boosts must be positive"));
        }
        if self.exact_first_boost < self.fuzzy_first_boost || self.exact_repeat_boost < self.fuzzy_repeat_boost {
            return Err(CatalogError::config(
                "discovery.scoring exact-match boosts must not be smaller than fuzzy-match boosts",
            ));
        }
        Ok(())
    }
}

/// Discovery engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Relevance weights
    pub scoring: ScoringConfig,
    /// Tokens shorter than this are dropped
    pub min_token_length: usize,
    /// Shared prefix length for fuzzy matches
    pub fuzzy_prefix_length: usize,
    /// Both tokens must be at least this long for a prefix match
    pub fuzzy_min_length: usize,
    /// Workflow recommendation limit when the caller passes 0
    pub recommend_default_limit: usize,
    /// Recommended tools for the all-categories overview
    pub discover_all_recommended: usize,
    /// Recommended tools for a single category
    pub discover_category_recommended: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            min_token_length: 3,
            fuzzy_prefix_length: 3,
            fuzzy_min_length: 5,
            recommend_default_limit: 5,
            discover_all_recommended: 5,
            discover_category_recommended: 3,
        }
    }
}

impl DiscoveryConfig {
    /// Validate the discovery configuration
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        if self.min_token_length == 0 {
            return Err(CatalogError::config("discovery.min_token_length must be positive"));
        }
        if self.fuzzy_prefix_length == 0 || self.fuzzy_prefix_length > self.fuzzy_min_length {
            return Err(CatalogError::config(
                "discovery.fuzzy_prefix_length must be positive and not exceed fuzzy_min_length",
            ));
        }
        Ok(())
    }
}

/// Category manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Result cap for category discovery when the filter sets none
    pub default_max_results: usize,
    /// Popular tools attached per category
    pub popular_tools: usize,
    /// Category recommendations when the caller passes 0
    pub recommend_default: usize,
    /// Example tools listed in a category description
    pub describe_example_tools: usize,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            default_max_results: 10,
            popular_tools: 3,
            recommend_default: 3,
            describe_example_tools: 3,
        }
    }
}

/// Expected totals checked after bootstrap registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    pub expected_tools: Option<usize>,
    pub expected_categories: Option<usize>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(CatalogError::config(format!("Unknown log format '{}'", other))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl CatalogConfig {
    /// Load .env files in order of precedence
    fn load_env_files() {
        let env = std::env::var("TOOLCATALOG_ENV").unwrap_or_else(|_| "development".to_string());
        let env_specific_file = format!(".env.{}", env);
        let env_files = [".env", env_specific_file.as_str(), ".env.local"];

        for env_file in env_files {
            match dotenvy::from_filename(env_file) {
                Ok(_) => tracing::info!(file = env_file, "Loaded environment variables"),
                Err(e) if e.not_found() => tracing::debug!(file = env_file, "No env file found, skipping"),
                Err(e) => tracing::warn!(file = env_file, error = %e, "Failed to load env file"),
            }
        }
    }

    /// Load configuration from file with environment overrides
    ///
    /// Precedence: defaults < file < environment. A missing file means defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_env_files();

        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| CatalogError::config(format!("Failed to read config file: {}", e)))?;
            Self::from_yaml(&content)?
        } else {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };

        config.apply_environment_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| CatalogError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply `TOOLCATALOG_*` environment variable overrides
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(level) = get("TOOLCATALOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = get("TOOLCATALOG_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        if let Some(value) = get("TOOLCATALOG_MIN_TIMEOUT_SECS") {
            self.registry.min_timeout_secs = parse_number("TOOLCATALOG_MIN_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("TOOLCATALOG_MAX_TIMEOUT_SECS") {
            self.registry.max_timeout_secs = parse_number("TOOLCATALOG_MAX_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("TOOLCATALOG_EXPECTED_TOOLS") {
            self.integrity.expected_tools = Some(parse_number("TOOLCATALOG_EXPECTED_TOOLS", &value)?);
        }
        if let Some(value) = get("TOOLCATALOG_EXPECTED_CATEGORIES") {
            self.integrity.expected_categories = Some(parse_number("TOOLCATALOG_EXPECTED_CATEGORIES", &value)?);
        }
        Ok(())
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.registry.validate()?;
        self.discovery.validate()?;
        if self.categories.default_max_results == 0 {
            return Err(CatalogError::config("categories.default_max_results must be positive"));
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CatalogError::config(format!("Invalid {} environment variable: {}", key, e)))
}
