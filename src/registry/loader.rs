//! Capability file loader
//!
//! Reads YAML capability files into definition groups. A file carries optional
//! metadata and a `tools` list:
//!
//! ```yaml
//! metadata:
//!   name: invoicing
//!   description: Invoice lifecycle
//! tools:
//!   - name: invoice_create
//!     description: Create a new invoice for a client
//!     category: invoice_management
//!     invocation: { command: ledger, args: [invoice, create] }
//!     timeout_seconds: 30
//! ```

use crate::error::{CatalogError, Result};
use crate::registry::category::Category;
use crate::registry::types::{Capability, InvocationBinding, UsageExample};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use walkdir::WalkDir;

fn default_timeout_seconds() -> u64 {
    30
}

/// Capability file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityFile {
    /// File metadata
    #[serde(default)]
    pub metadata: Option<FileMetadata>,
    /// Tool definitions
    #[serde(default)]
    pub tools: Vec<CapabilityDefinition>,
}

/// File metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Group name
    pub name: Option<String>,
    /// Group description
    pub description: Option<String>,
    /// File version
    pub version: Option<String>,
}

/// Raw definition as written in a capability file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema", alias = "input_schema", default = "crate::registry::types::default_input_schema")]
    pub input_schema: Value,
    #[serde(default)]
    pub examples: Vec<UsageExample>,
    pub category: String,
    pub invocation: InvocationBinding,
    #[serde(default)]
    pub help_text: String,
    #[serde(default = "crate::registry::types::default_version")]
    pub version: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl TryFrom<CapabilityDefinition> for Capability {
    type Error = CatalogError;

    fn try_from(definition: CapabilityDefinition) -> Result<Self> {
        if !Category::is_known(&definition.category) {
            return Err(CatalogError::invalid_definition(
                definition.name,
                format!("Unknown category '{}'", definition.category),
            ));
        }
        let category = Category::from_str(&definition.category)?;
        Ok(Capability {
            name: definition.name,
            description: definition.description,
            input_schema: definition.input_schema,
            examples: definition.examples,
            category,
            invocation: definition.invocation,
            help_text: definition.help_text,
            version: definition.version,
            timeout: Duration::from_secs(definition.timeout_seconds),
        })
    }
}

/// Capabilities from one source, in file order
#[derive(Debug, Clone)]
pub struct DefinitionGroup {
    /// Group name (metadata name or file stem)
    pub name: String,
    /// Definitions
    pub capabilities: Vec<Capability>,
}

/// Loads capability files from disk
pub struct RegistryLoader;

impl RegistryLoader {
    /// Parse one YAML document
    pub fn parse_str(fallback_name: &str, content: &str) -> Result<DefinitionGroup> {
        let file: CapabilityFile = serde_yaml::from_str(content)?;
        let name = file
            .metadata
            .as_ref()
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| fallback_name.to_string());
        let capabilities = file
            .tools
            .into_iter()
            .map(Capability::try_from)
            .collect::<Result<Vec<_>>>()?;
        debug!(group = %name, tools = capabilities.len(), "Parsed capability group");
        Ok(DefinitionGroup { name, capabilities })
    }

    /// Load one capability file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<DefinitionGroup> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::parse_str(&stem, &content).map_err(|e| match e {
            CatalogError::Yaml(inner) => {
                CatalogError::config(format!("Failed to parse {}: {}", path.display(), inner))
            }
            other => other,
        })
    }

    /// Load a file, or every `.yaml`/`.yml` file under a directory in path order
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Vec<DefinitionGroup>> {
        let path = path.as_ref();
        if path.is_file() {
            return Ok(vec![Self::load_file(path)?]);
        }
        if !path.is_dir() {
            return Err(CatalogError::config(format!(
                "Capability path {} does not exist",
                path.display()
            )));
        }

        let mut groups = Vec::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| CatalogError::config(format!("Failed to walk {}: {}", path.display(), e)))?;
            let is_yaml = entry
                .path()
                .extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy().to_lowercase();
                    ext == "yaml" || ext == "yml"
                })
                .unwrap_or(false);
            if entry.file_type().is_file() && is_yaml {
                groups.push(Self::load_file(entry.path())?);
            }
        }

        info!(
            path = %path.display(),
            groups = groups.len(),
            tools = groups.iter().map(|g| g.capabilities.len()).sum::<usize>(),
            "Loaded capability files"
        );
        Ok(groups)
    }
}
