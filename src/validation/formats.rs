//! Named string format validators (`"format": "email"` and friends)

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A format check: returns true when the value conforms
pub type FormatFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

/// Registry of format validators keyed by format name
#[derive(Clone)]
pub struct FormatRegistry {
    validators: HashMap<String, FormatFn>,
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.names())
            .finish()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl FormatRegistry {
    /// Registry with no formats at all
    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// Registry with date, date-time, email, uuid and uri
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("date", is_date);
        registry.register("date-time", is_date_time);
        registry.register("email", is_email);
        registry.register("uuid", is_uuid);
        registry.register("uri", is_uri);
        registry
    }

    /// Register (or replace) a named format
    pub fn register<S, F>(&mut self, name: S, check: F)
    where
        S: Into<String>,
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.validators.insert(name.into(), Arc::new(check));
    }

    /// Look up a format
    pub fn get(&self, name: &str) -> Option<&FormatFn> {
        self.validators.get(name)
    }

    /// Sorted format names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.validators.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Hint shown when a value does not match `format`
pub fn format_hint(format: &str) -> String {
    match format {
        "date" => "Use YYYY-MM-DD, e.g. 2024-01-31".to_string(),
        "date-time" => "Use an RFC 3339 timestamp, e.g. 2024-01-31T09:30:00Z".to_string(),
        "email" => "Provide an email address such as name@example.com".to_string(),
        "uuid" => "Provide a UUID such as 123e4567-e89b-12d3-a456-426614174000".to_string(),
        "uri" => "Provide an absolute URI such as https://example.com/path".to_string(),
        other => format!("Provide a value in '{}' format", other),
    }
}

fn is_date(value: &str) -> bool {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn is_date_time(value: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

fn is_uuid(value: &str) -> bool {
    uuid::Uuid::parse_str(value).is_ok()
}

fn is_uri(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(registry: &FormatRegistry, format: &str, value: &str) -> bool {
        (registry.get(format).expect("format registered"))(value)
    }

    #[test]
    fn test_builtin_formats() {
        let registry = FormatRegistry::with_builtins();
        assert!(check(&registry, "date", "2024-02-29"));
        assert!(!check(&registry, "date", "2023-02-29"));
        assert!(!check(&registry, "date", "31/01/2024"));
        assert!(check(&registry, "date-time", "2024-01-31T09:30:00Z"));
        assert!(check(&registry, "date-time", "2024-01-31T09:30:00+02:00"));
        assert!(!check(&registry, "date-time", "2024-01-31"));
        assert!(check(&registry, "email", "billing@acme.io"));
        assert!(!check(&registry, "email", "billing@"));
        assert!(check(&registry, "uuid", "123e4567-e89b-12d3-a456-426614174000"));
        assert!(!check(&registry, "uuid", "not-a-uuid"));
        assert!(check(&registry, "uri", "https://example.com/a?b=c"));
        assert!(!check(&registry, "uri", "example dot com"));
    }

    #[test]
    fn test_custom_format() {
        let mut registry = FormatRegistry::with_builtins();
        registry.register("currency", |v: &str| v.len() == 3 && v.chars().all(|c| c.is_ascii_uppercase()));
        assert!(check(&registry, "currency", "EUR"));
        assert!(!check(&registry, "currency", "eur"));
        assert_eq!(registry.names().len(), 6);
    }
}
