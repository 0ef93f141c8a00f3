//! Template rendering for the debug view.
//!
//! The dispatcher only needs to turn a template name and a set of variables
//! into a string, so rendering sits behind the [`TemplateRenderer`] trait.
//! [`BuiltinTemplates`] is a minimal implementation that substitutes
//! `{{ name }}` placeholders with HTML-escaped values; hosts with a real
//! template engine implement the trait instead.

use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Name of the bundled debug template.
pub const APIDUMP_TEMPLATE: &str = "apidump.html";

const APIDUMP_SOURCE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>API response</title>
    <style>
        body { margin: 0; padding: 1em; font-family: sans-serif; }
        pre { padding: 1em; background: #f5f5f5; border: 1px solid #ddd; }
    </style>
</head>
<body>
    <pre>{{ dump }}</pre>
</body>
</html>
"#;

/// Errors raised while rendering a template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// No template is registered under the name.
    #[error("template not found: {0}")]
    NotFound(String),

    /// A placeholder was opened but never closed.
    #[error("unterminated placeholder in template {template} at byte {offset}")]
    Unterminated {
        /// The template being rendered.
        template: String,
        /// Byte offset of the opening `{{`.
        offset: usize,
    },
}

/// Renders a named template with variables.
pub trait TemplateRenderer: Send + Sync {
    /// Renders `name` with `vars`.
    fn render(&self, name: &str, vars: &Map<String, Value>) -> Result<String, TemplateError>;
}

/// An in-memory set of templates with `{{ name }}` placeholders.
///
/// String values are inserted as-is (after escaping); other values are
/// inserted as JSON. Unknown variables render as an empty string.
///
/// # Example
///
/// ```
/// use serde_json::{json, Map};
/// use talaria_negotiate::{BuiltinTemplates, TemplateRenderer};
///
/// let templates = BuiltinTemplates::empty().with_template("hello.html", "<p>{{ name }}</p>");
///
/// let mut vars = Map::new();
/// vars.insert("name".into(), json!("<b>"));
///
/// assert_eq!(templates.render("hello.html", &vars).unwrap(), "<p>&lt;b&gt;</p>");
/// ```
#[derive(Debug, Clone)]
pub struct BuiltinTemplates {
    templates: HashMap<String, String>,
}

impl Default for BuiltinTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinTemplates {
    /// Creates a set holding the bundled `apidump.html`.
    #[must_use]
    pub fn new() -> Self {
        Self::empty().with_template(APIDUMP_TEMPLATE, APIDUMP_SOURCE)
    }

    /// Creates a set with no templates.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Adds or replaces a template.
    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.templates.insert(name.into(), source.into());
        self
    }
}

impl TemplateRenderer for BuiltinTemplates {
    fn render(&self, name: &str, vars: &Map<String, Value>) -> Result<String, TemplateError> {
        let source = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;

        let mut out = String::with_capacity(source.len());
        let mut rest = source.as_str();
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| TemplateError::Unterminated {
                template: name.to_string(),
                offset: offset + start,
            })?;

            let var = after[..end].trim();
            match vars.get(var) {
                Some(Value::String(s)) => out.push_str(&html_escape(s)),
                Some(Value::Null) | None => {}
                Some(other) => out.push_str(&html_escape(&other.to_string())),
            }

            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        out.push_str(rest);

        Ok(out)
    }
}

/// Simple HTML escape for XSS prevention.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
