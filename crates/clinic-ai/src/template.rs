//! `{{VARIABLE}}` interpolation for prompt templates.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("placeholder pattern is valid"));

/// Result of rendering a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Placeholders with no value, replaced by the empty string.
    pub unresolved: Vec<String>,
}

/// Break `{{`/`}}` pairs inside values so no placeholder survives rendering.
fn neutralize(value: &str) -> String {
    let mut out = value.to_string();
    while out.contains("{{") || out.contains("}}") {
        out = out.replace("{{", "{ {").replace("}}", "} }");
    }
    out
}

/// Replace every `{{NAME}}` with its value. Names are trimmed; unknown names
/// become the empty string and are reported in [`Rendered::unresolved`].
#[must_use]
pub fn render(template: &str, values: &BTreeMap<String, String>) -> Rendered {
    let mut unresolved = Vec::new();
    let text = PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = caps[1].trim();
            if let Some(value) = values.get(name) {
                neutralize(value)
            } else {
                if !unresolved.iter().any(|u| u == name) {
                    unresolved.push(name.to_string());
                }
                String::new()
            }
        })
        .into_owned();

    for name in &unresolved {
        tracing::warn!(placeholder = %name, "unknown template placeholder left empty");
    }
    Rendered { text, unresolved }
}

/// Distinct placeholder names in order of first appearance.
#[must_use]
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = caps[1].trim();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
