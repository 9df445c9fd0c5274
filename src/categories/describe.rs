//! Natural-language category descriptions

use crate::categories::metadata::CategoryMetadata;
use crate::registry::{Capability, Category};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Render a category description
///
/// `tools` is `None` when tools are not to be listed.
pub fn render(
    metadata: &CategoryMetadata,
    all_metadata: &BTreeMap<Category, CategoryMetadata>,
    tools: Option<&[Capability]>,
    example_limit: usize,
) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "{}: {}", metadata.display_name, metadata.description);

    if !metadata.use_cases.is_empty() {
        out.push_str("\nUse cases:\n");
        for use_case in &metadata.use_cases {
            let _ = writeln!(out, "- {}", use_case);
        }
    }

    if !metadata.prerequisites.is_empty() {
        out.push_str("\nPrerequisites:\n");
        for prerequisite in &metadata.prerequisites {
            let _ = writeln!(out, "- {}", prerequisite);
        }
    }

    if let Some(tools) = tools {
        if !tools.is_empty() {
            out.push_str("\nExample tools:\n");
            for tool in tools.iter().take(example_limit) {
                let _ = writeln!(out, "- {}: {}", tool.name, tool.description);
            }
            if tools.len() > example_limit {
                let _ = writeln!(out, "...and {} more", tools.len() - example_limit);
            }
        }
    }

    if !metadata.related.is_empty() {
        let related: Vec<&str> = metadata
            .related
            .iter()
            .map(|c| {
                all_metadata
                    .get(c)
                    .map(|m| m.display_name.as_str())
                    .unwrap_or_else(|| c.display_name())
            })
            .collect();
        let _ = write!(out, "\nRelated categories: {}", related.join(", "));
    }

    out.trim_end().to_string()
}
