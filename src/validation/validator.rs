//! JSON-Schema subset validator for capability inputs
//!
//! Supports root `type` (must be `object`), `required`, `properties`,
//! `additionalProperties: false`, and per-property `type`, `format`, `minLength`,
//! `maxLength`, `pattern`, `minimum`, `maximum`, `enum`, `items` and nested objects.
//! Unknown keywords and unknown format names are ignored.
//!
//! The first violation found is returned, except for required fields where every
//! missing or empty field is reported in one error.

use super::error::{build_validation_error, codes, ValidationError};
use super::formats::{format_hint, FormatRegistry};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

const KNOWN_TYPES: [&str; 7] = ["string", "number", "integer", "boolean", "array", "object", "null"];

/// Schema validator with pluggable format checks
///
/// Compiled `pattern` expressions are cached by source text; clones share the cache.
#[derive(Debug, Clone, Default)]
pub struct InputValidator {
    formats: FormatRegistry,
    patterns: Arc<RwLock<HashMap<String, Arc<Regex>>>>,
}

/// Builder for [`InputValidator`]
#[derive(Debug, Default)]
pub struct InputValidatorBuilder {
    formats: FormatRegistry,
}

impl InputValidatorBuilder {
    /// Add a named format validator
    pub fn with_format<S, F>(mut self, name: S, check: F) -> Self
    where
        S: Into<String>,
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.register(name, check);
        self
    }

    /// Finish building
    pub fn build(self) -> InputValidator {
        InputValidator {
            formats: self.formats,
            patterns: Arc::default(),
        }
    }
}

impl InputValidator {
    /// Validator with the built-in formats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the built-in formats and add more
    pub fn builder() -> InputValidatorBuilder {
        InputValidatorBuilder::default()
    }

    /// Names of all registered formats
    pub fn format_names(&self) -> Vec<String> {
        self.formats.names()
    }

    /// Validate an arbitrary JSON value; anything but an object fails
    pub fn validate_value(&self, input: &Value, schema: &Value) -> Result<(), ValidationError> {
        match input {
            Value::Object(map) => self.validate_against_schema(map, schema),
            Value::Null => self.validate_against_schema(&Map::new(), schema),
            other => Err(build_validation_error(
                "",
                format!("Input must be a JSON object, got {}", json_type_name(other)),
                codes::INVALID_INPUT,
                vec!["Wrap the arguments in an object keyed by parameter name".to_string()],
            )),
        }
    }

    /// Validate an argument map against a schema
    pub fn validate_against_schema(
        &self,
        input: &Map<String, Value>,
        schema: &Value,
    ) -> Result<(), ValidationError> {
        self.validate_object(input, schema, "")
    }

    /// Check that every listed field is present and non-empty
    pub fn validate_required(
        &self,
        input: &Map<String, Value>,
        required: &[String],
    ) -> Result<(), ValidationError> {
        check_required(input, required.iter().map(String::as_str), "")
    }

    /// Check a string against a named format; unknown formats pass
    pub fn validate_format(&self, field: &str, value: &str, format: &str) -> Result<(), ValidationError> {
        let Some(check) = self.formats.get(format) else {
            debug!(format = %format, field = %field, "Unknown format, skipping check");
            return Ok(());
        };
        if check(value) {
            Ok(())
        } else {
            Err(build_validation_error(
                field,
                format!("Value '{}' is not a valid {}", value, format),
                codes::INVALID_FORMAT,
                vec![format_hint(format)],
            ))
        }
    }

    fn compiled_pattern(&self, pattern: &str) -> Result<Arc<Regex>, regex::Error> {
        if let Some(regex) = self
            .patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
        {
            return Ok(Arc::clone(regex));
        }
        let regex = Arc::new(Regex::new(pattern)?);
        self.patterns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern.to_string(), Arc::clone(&regex));
        Ok(regex)
    }

    fn validate_object(
        &self,
        input: &Map<String, Value>,
        schema: &Value,
        prefix: &str,
    ) -> Result<(), ValidationError> {
        let Some(schema) = schema.as_object() else {
            return Err(build_validation_error(
                prefix,
                "Schema must be a JSON object",
                codes::INVALID_SCHEMA,
                vec!["Fix the capability definition's input schema".to_string()],
            ));
        };

        if let Some(declared) = schema.get("type") {
            let declares_object = match declared {
                Value::String(name) => name == "object",
                // Nested schemas may be nullable objects
                Value::Array(names) => !prefix.is_empty() && names.iter().any(|n| n.as_str() == Some("object")),
                _ => false,
            };
            if !declares_object {
                return Err(build_validation_error(
                    prefix,
                    format!("Schema type must be \"object\", found {}", declared),
                    codes::INVALID_SCHEMA_TYPE,
                    vec!["Declare \"type\": \"object\" at the schema root".to_string()],
                ));
            }
        }

        if let Some(Value::Array(required)) = schema.get("required") {
            check_required(input, required.iter().filter_map(Value::as_str), prefix)?;
        }

        let properties = schema.get("properties").and_then(Value::as_object);
        if let Some(properties) = properties {
            for (key, property_schema) in properties {
                if let Some(value) = input.get(key) {
                    self.validate_property(&join_path(prefix, key), value, property_schema)?;
                }
            }
        }

        if schema.get("additionalProperties") == Some(&Value::Bool(false)) {
            for key in input.keys() {
                let declared = properties.is_some_and(|p| p.contains_key(key));
                if !declared {
                    let mut suggestions = vec![format!("Remove '{}' from the input", key)];
                    if let Some(properties) = properties {
                        let allowed: Vec<&str> = properties.keys().map(String::as_str).collect();
                        suggestions.push(format!("Allowed properties: {}", allowed.join(", ")));
                    }
                    return Err(build_validation_error(
                        join_path(prefix, key),
                        format!("Unexpected property '{}'", key),
                        codes::UNEXPECTED_PROPERTY,
                        suggestions,
                    ));
                }
            }
        }

        Ok(())
    }

    fn validate_property(&self, path: &str, value: &Value, schema: &Value) -> Result<(), ValidationError> {
        let Some(schema) = schema.as_object() else {
            return Ok(());
        };

        let declared_types = declared_types(schema.get("type"));
        if !declared_types.is_empty() && !declared_types.iter().any(|t| type_matches(t, value)) {
            return Err(build_validation_error(
                path,
                format!(
                    "Expected {}, got {}",
                    declared_types.join(" or "),
                    json_type_name(value)
                ),
                codes::TYPE_MISMATCH,
                vec![format!("Provide a {} value for '{}'", declared_types.join(" or "), path)],
            ));
        }

        if let Value::String(text) = value {
            if let Some(format) = schema.get("format").and_then(Value::as_str) {
                self.validate_format(path, text, format)?;
            }
            check_string_constraints(path, text, schema, |pattern| self.compiled_pattern(pattern))?;
        }

        if let Some(number) = value.as_f64() {
            check_numeric_constraints(path, number, schema)?;
        }

        if let Some(Value::Array(options)) = schema.get("enum") {
            if !options.contains(value) {
                let listed: Vec<String> = options.iter().map(Value::to_string).collect();
                return Err(build_validation_error(
                    path,
                    format!("Value {} is not one of the allowed values", value),
                    codes::ENUM_MISMATCH,
                    vec![format!("Use one of: {}", listed.join(", "))],
                ));
            }
        }

        match value {
            Value::Object(nested) if declared_types.iter().any(|t| *t == "object") => {
                self.validate_object(nested, &Value::Object(schema.clone()), path)?;
            }
            Value::Array(elements) => {
                if let Some(items) = schema.get("items").filter(|i| i.is_object()) {
                    for (index, element) in elements.iter().enumerate() {
                        self.validate_property(&format!("{}[{}]", path, index), element, items)?;
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }
}

/// True when a value counts as "not provided" for required-field purposes
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn check_required<'a>(
    input: &Map<String, Value>,
    required: impl Iterator<Item = &'a str>,
    prefix: &str,
) -> Result<(), ValidationError> {
    let mut missing = Vec::new();
    let mut empty = Vec::new();
    for field in required {
        match input.get(field) {
            None => missing.push(join_path(prefix, field)),
            Some(value) if is_empty_value(value) => empty.push(join_path(prefix, field)),
            Some(_) => {}
        }
    }
    if missing.is_empty() && empty.is_empty() {
        return Ok(());
    }

    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("Missing required field(s): {}", missing.join(", ")));
    }
    if !empty.is_empty() {
        parts.push(format!("Required field(s) must not be empty: {}", empty.join(", ")));
    }

    let mut suggestions: Vec<String> = missing
        .iter()
        .map(|f| format!("Provide a value for '{}'", f))
        .collect();
    suggestions.extend(empty.iter().map(|f| format!("Provide a non-empty value for '{}'", f)));

    let field = match (missing.as_slice(), empty.as_slice()) {
        ([only], []) | ([], [only]) => only.clone(),
        _ => prefix.to_string(),
    };
    let code = if missing.is_empty() {
        codes::EMPTY_REQUIRED
    } else {
        codes::MISSING_REQUIRED
    };

    Err(build_validation_error(field, parts.join("; "), code, suggestions))
}

fn check_string_constraints<F>(
    path: &str,
    text: &str,
    schema: &Map<String, Value>,
    compile: F,
) -> Result<(), ValidationError>
where
    F: Fn(&str) -> Result<Arc<Regex>, regex::Error>,
{
    let length = text.chars().count() as u64;
    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        if length < min {
            return Err(build_validation_error(
                path,
                format!("Must be at least {} characters, got {}", min, length),
                codes::MIN_LENGTH,
                vec![format!("Lengthen '{}' to {} or more characters", path, min)],
            ));
        }
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        if length > max {
            return Err(build_validation_error(
                path,
                format!("Must be at most {} characters, got {}", max, length),
                codes::MAX_LENGTH,
                vec![format!("Shorten '{}' to {} characters or fewer", path, max)],
            ));
        }
    }
    if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
        let regex = compile(pattern).map_err(|e| {
            build_validation_error(
                path,
                format!("Schema pattern '{}' is not a valid regular expression: {}", pattern, e),
                codes::INVALID_PATTERN,
                vec!["Fix the pattern in the capability definition".to_string()],
            )
        })?;
        if !regex.is_match(text) {
            return Err(build_validation_error(
                path,
                format!("Value '{}' does not match pattern '{}'", text, pattern),
                codes::PATTERN_MISMATCH,
                vec![format!("Provide a value matching {}", pattern)],
            ));
        }
    }
    Ok(())
}

fn check_numeric_constraints(
    path: &str,
    number: f64,
    schema: &Map<String, Value>,
) -> Result<(), ValidationError> {
    if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
        if number < min {
            return Err(build_validation_error(
                path,
                format!("Must be >= {}, got {}", min, number),
                codes::MINIMUM,
                vec![format!("Use a value of at least {} for '{}'", min, path)],
            ));
        }
    }
    if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
        if number > max {
            return Err(build_validation_error(
                path,
                format!("Must be <= {}, got {}", max, number),
                codes::MAXIMUM,
                vec![format!("Use a value of at most {} for '{}'", max, path)],
            ));
        }
    }
    Ok(())
}

fn declared_types(declared: Option<&Value>) -> Vec<&str> {
    let names: Vec<&str> = match declared {
        Some(Value::String(name)) => vec![name.as_str()],
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    // A type we do not understand imposes no constraint
    if names.iter().any(|n| !KNOWN_TYPES.contains(n)) {
        return Vec::new();
    }
    names
}

fn type_matches(declared: &str, value: &Value) -> bool {
    match declared {
        "number" | "integer" => value.is_number(),
        other => json_type_name(value) == other,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}
