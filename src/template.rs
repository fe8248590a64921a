//! Named-variable templates and the catalog that holds them.
//!
//! A [`VariableTemplate`] is authored content with `{{name}}` placeholders.
//! It is populated from a binding map; it never goes through blank-space
//! detection.

use crate::error::BlankFillError;
use crate::pipeline::variables::{extract_variables, substitute};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Literals that look like a place to type something.
static RE_CANDIDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.{3,}|-{3,}|_{3,}|\[[^\]\n]*\]|\([^)\n]*\)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "VariableTemplateRecord")]
pub struct VariableTemplate {
    pub id: String,
    pub name: String,
    content: String,
    variables: Vec<String>,
}

impl VariableTemplate {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            variables: extract_variables(&content),
            content,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Distinct variable names in first-occurrence order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.variables = extract_variables(&self.content);
    }

    pub fn render(&self, bindings: &HashMap<String, String>) -> String {
        substitute(&self.content, bindings)
    }

    /// Names that `bindings` leaves unresolved, in template order.
    pub fn unbound(&self, bindings: &HashMap<String, String>) -> Vec<String> {
        self.variables
            .iter()
            .filter(|v| !bindings.contains_key(*v))
            .cloned()
            .collect()
    }

    /// Replace the first occurrence of `literal` with `{{name}}`.
    ///
    /// Returns `false` (and changes nothing) when `literal` is empty or absent.
    pub fn promote_placeholder(&mut self, literal: &str, name: &str) -> bool {
        if literal.is_empty() || !self.content.contains(literal) {
            return false;
        }
        let promoted = self.content.replacen(literal, &format!("{{{{{name}}}}}"), 1);
        self.set_content(promoted);
        debug!("Promoted {:?} to variable '{}'", literal, name);
        true
    }
}

/// Stored form of a template. `variables` is re-derived from `content`.
#[derive(Deserialize)]
struct VariableTemplateRecord {
    id: String,
    name: String,
    content: String,
}

impl From<VariableTemplateRecord> for VariableTemplate {
    fn from(r: VariableTemplateRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            variables: extract_variables(&r.content),
            content: r.content,
        }
    }
}

/// A placeholder-looking literal found while authoring a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderCandidate {
    pub text: String,
    /// Character offset into the content.
    pub position: usize,
    /// Length in characters.
    pub length: usize,
}

/// Candidate literals in document order. Overlapping matches resolve to the
/// one that starts first.
pub fn find_candidates(content: &str) -> Vec<PlaceholderCandidate> {
    let mut out = Vec::new();
    let mut byte_cursor = 0;
    let mut char_cursor = 0;
    for m in RE_CANDIDATE.find_iter(content) {
        char_cursor += content[byte_cursor..m.start()].chars().count();
        byte_cursor = m.start();
        let length = m.as_str().chars().count();
        out.push(PlaceholderCandidate {
            text: m.as_str().to_string(),
            position: char_cursor,
            length,
        });
    }
    out
}

/// In-memory collection of templates keyed by id.
#[derive(Debug, Default)]
pub struct TemplateCatalog {
    templates: HashMap<String, VariableTemplate>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template. Returns its id.
    pub fn register(&mut self, template: VariableTemplate) -> String {
        let id = template.id.clone();
        info!(
            "Registered template '{}' ({} variables)",
            template.name,
            template.variables.len()
        );
        self.templates.insert(id.clone(), template);
        id
    }

    pub fn get(&self, id: &str) -> Option<&VariableTemplate> {
        self.templates.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<VariableTemplate> {
        self.templates.remove(id)
    }

    /// All templates sorted by name.
    pub fn list(&self) -> Vec<&VariableTemplate> {
        let mut all: Vec<_> = self.templates.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        all
    }

    /// Render template `id` with `bindings`.
    pub fn populate(
        &self,
        id: &str,
        bindings: &HashMap<String, String>,
    ) -> Result<String, BlankFillError> {
        let template = self
            .templates
            .get(id)
            .ok_or_else(|| BlankFillError::TemplateNotFound { id: id.to_string() })?;
        Ok(template.render(bindings))
    }
}
