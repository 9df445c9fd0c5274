//! Registry types and structures

use crate::config::RegistryConfig;
use crate::error::{CatalogError, Result};
use crate::registry::category::Category;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

pub(crate) fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

pub(crate) fn default_input_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// External command a capability maps onto; opaque to the catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationBinding {
    /// Executable name
    pub command: String,
    /// Base arguments placed before any caller arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl InvocationBinding {
    /// Create a binding
    pub fn new<S: Into<String>>(command: S, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

/// Worked example of calling a capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageExample {
    /// What the example demonstrates
    pub description: String,
    /// Example arguments
    #[serde(default)]
    pub input: Map<String, Value>,
    /// Expected output, as text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    /// When this example applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
}

impl UsageExample {
    pub fn new<S: Into<String>>(description: S, input: Map<String, Value>) -> Self {
        Self {
            description: description.into(),
            input,
            expected_output: None,
            use_case: None,
        }
    }
}

/// A catalogued, invokable operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Unique identifier
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    /// Usage examples
    #[serde(default)]
    pub examples: Vec<UsageExample>,
    /// Category
    pub category: Category,
    /// How the capability is executed
    pub invocation: InvocationBinding,
    /// Long-form help
    #[serde(default)]
    pub help_text: String,
    /// Semantic version
    pub version: String,
    /// Maximum execution time
    #[serde(rename = "timeout_seconds", with = "duration_secs")]
    pub timeout: Duration,
}

impl Capability {
    /// Create a capability with an empty object schema, version 1.0.0 and a 30s timeout
    pub fn new<N, D>(name: N, description: D, category: Category, invocation: InvocationBinding) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: default_input_schema(),
            examples: Vec::new(),
            category,
            invocation,
            help_text: String::new(),
            version: default_version(),
            timeout: default_timeout(),
        }
    }

    /// Set the input schema
    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Add a usage example
    pub fn example(mut self, example: UsageExample) -> Self {
        self.examples.push(example);
        self
    }

    /// Set the help text
    pub fn help_text<S: Into<String>>(mut self, help: S) -> Self {
        self.help_text = help.into();
        self
    }

    /// Set the version
    pub fn version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = version.into();
        self
    }

    /// Set the timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Required parameter names declared by the schema
    pub fn required_parameters(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Check that the definition is complete and within bounds
    pub fn validate(&self, config: &RegistryConfig) -> Result<()> {
        let invalid = |message: String| CatalogError::invalid_definition(self.name.clone(), message);

        if self.name.trim().is_empty() {
            return Err(CatalogError::invalid_definition("", "Capability name cannot be empty"));
        }

        if self.description.trim().is_empty() {
            return Err(invalid("Description cannot be empty".to_string()));
        }

        let Some(schema) = self.input_schema.as_object() else {
            return Err(invalid("Input schema must be a JSON object".to_string()));
        };
        if schema.is_empty() {
            return Err(invalid("Input schema cannot be empty".to_string()));
        }
        if let Some(declared) = schema.get("type") {
            if declared.as_str() != Some("object") {
                return Err(invalid(format!(
                    "Input schema root type must be \"object\", found {}",
                    declared
                )));
            }
        }

        if self.invocation.command.trim().is_empty() {
            return Err(invalid("Invocation command cannot be empty".to_string()));
        }

        if self.version.trim().is_empty() {
            return Err(invalid("Version cannot be empty".to_string()));
        }

        let (min, max) = config.timeout_bounds();
        if self.timeout < min || self.timeout > max {
            return Err(invalid(format!(
                "Timeout {:?} is outside the allowed range {:?}..={:?}",
                self.timeout, min, max
            )));
        }

        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capability() -> Capability {
        Capability::new(
            "invoice_create",
            "Create a new invoice for a client",
            Category::InvoiceManagement,
            InvocationBinding::new("ledger", vec!["invoice".to_string(), "create".to_string()]),
        )
    }

    #[test]
    fn test_valid_capability() {
        assert!(capability().validate(&RegistryConfig::default()).is_ok());
    }

    #[test]
    fn test_timeout_bounds() {
        let config = RegistryConfig::default();
        assert!(capability().timeout(Duration::ZERO).validate(&config).is_err());
        assert!(capability().timeout(Duration::from_secs(660)).validate(&config).is_err());
        assert!(capability().timeout(Duration::from_secs(1)).validate(&config).is_ok());
        assert!(capability().timeout(Duration::from_secs(600)).validate(&config).is_ok());
    }

    #[test]
    fn test_incomplete_definitions() {
        let config = RegistryConfig::default();

        let mut cap = capability();
        cap.name = "  ".to_string();
        assert!(matches!(cap.validate(&config), Err(CatalogError::InvalidDefinition { .. })));

        let mut cap = capability();
        cap.description.clear();
        assert!(cap.validate(&config).is_err());

        assert!(capability().input_schema(json!({})).validate(&config).is_err());
        assert!(capability().input_schema(json!("object")).validate(&config).is_err());
        assert!(capability().input_schema(json!({"type": "array"})).validate(&config).is_err());
        assert!(capability()
            .input_schema(json!({"properties": {"a": {"type": "string"}}}))
            .validate(&config)
            .is_ok());

        let mut cap = capability();
        cap.invocation.command.clear();
        assert!(cap.validate(&config).is_err());

        assert!(capability().version("").validate(&config).is_err());
    }

    #[test]
    fn test_required_parameters() {
        let cap = capability().input_schema(json!({
            "type": "object",
            "properties": {"client_name": {"type": "string"}},
            "required": ["client_name"]
        }));
        assert_eq!(cap.required_parameters(), vec!["client_name"]);
    }

    #[test]
    fn test_serde_shape() {
        let value = serde_json::to_value(capability()).unwrap();
        assert_eq!(value["timeout_seconds"], json!(30));
        assert_eq!(value["category"], json!("invoice_management"));
        assert!(value.get("inputSchema").is_some());
        let back: Capability = serde_json::from_value(value).unwrap();
        assert_eq!(back, capability());
    }
}
