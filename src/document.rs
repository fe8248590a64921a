//! The [`Document`] aggregate: named markup plus its blank-space projection.
//!
//! `content` is the single source of truth. `blank_spaces` is a cache of
//! `extract(content)` that every content-changing method refreshes before it
//! returns. No setter exists for it, and deserialising a stored document
//! re-extracts rather than trusting the stored list. Mutating methods take
//! `&mut self`, so one writer per document is enforced by the borrow checker.

use crate::blank::BlankSpace;
use crate::error::BlankFillError;
use crate::pipeline::{detect, extract, mutate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Whether a document was ingested from a source file or authored as a
/// reusable template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    System,
    Template,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentType::System => "system",
            DocumentType::Template => "template",
        })
    }
}

/// A named unit of markup content with addressable blank spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DocumentRecord")]
pub struct Document {
    id: String,
    name: String,
    content: String,
    original_content: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    #[serde(rename = "type")]
    doc_type: DocumentType,
    blank_spaces: Vec<BlankSpace>,
}

/// How many blanks a document has and how many are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FillProgress {
    pub total: usize,
    pub filled: usize,
}

impl FillProgress {
    pub fn is_complete(&self) -> bool {
        self.filled == self.total
    }
}

impl Document {
    /// New document with a fresh id. `content` is also captured as the
    /// original snapshot.
    pub fn new(name: impl Into<String>, content: impl Into<String>, doc_type: DocumentType) -> Self {
        let content = content.into();
        let now = Utc::now();
        let blank_spaces = extract::extract(&content);
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            original_content: content.clone(),
            content,
            created_at: now,
            modified_at: now,
            doc_type,
            blank_spaces,
        }
    }

    /// Copy this document's current content into a new template.
    pub fn clone_as_template(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.content.clone(), DocumentType::Template)
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn original_content(&self) -> &str {
        &self.original_content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    pub fn doc_type(&self) -> DocumentType {
        self.doc_type
    }

    pub fn blank_spaces(&self) -> &[BlankSpace] {
        &self.blank_spaces
    }

    // ── Mutation ─────────────────────────────────────────────────────────

    /// Replace the markup wholesale (an editor change event).
    pub fn set_content(&mut self, markup: impl Into<String>) {
        self.content = markup.into();
        self.refresh();
    }

    /// Fill the blank with id `id`. Empty `text` clears it.
    pub fn fill_blank(&mut self, id: &str, text: &str) -> Result<(), BlankFillError> {
        self.content = mutate::fill(&self.content, id, text)?;
        self.refresh();
        Ok(())
    }

    /// Insert a new empty blank at character offset `caret` and return it.
    pub fn insert_blank(&mut self, caret: usize, width: usize) -> Result<BlankSpace, BlankFillError> {
        let inserted = mutate::insert(&self.content, caret, width)?;
        self.content = inserted.markup;
        self.refresh();
        Ok(inserted.blank)
    }

    /// Run pattern detection over the current content. Returns how many
    /// blanks were added.
    pub fn redetect(&mut self) -> usize {
        let before = self.blank_spaces.len();
        self.content = detect::detect(&self.content);
        self.refresh();
        self.blank_spaces.len().saturating_sub(before)
    }

    /// Discard every edit and return to the ingested content.
    pub fn reset(&mut self) {
        self.content = self.original_content.clone();
        self.refresh();
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Stamp `modified_at` with the current time.
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    fn refresh(&mut self) {
        self.blank_spaces = extract::extract(&self.content);
        self.touch();
        debug!(
            "Document '{}' now has {} blank spaces",
            self.id,
            self.blank_spaces.len()
        );
    }

    // ── Navigation ───────────────────────────────────────────────────────

    pub fn blank(&self, id: &str) -> Option<&BlankSpace> {
        self.blank_spaces.iter().find(|b| b.id == id)
    }

    /// The blank after `id` in document order; `None` at the end or when
    /// `id` is unknown.
    pub fn next_blank(&self, id: &str) -> Option<&BlankSpace> {
        let idx = self.index_of(id)?;
        self.blank_spaces.get(idx + 1)
    }

    /// The blank before `id` in document order; `None` at the start or when
    /// `id` is unknown.
    pub fn previous_blank(&self, id: &str) -> Option<&BlankSpace> {
        let idx = self.index_of(id)?;
        idx.checked_sub(1).and_then(|i| self.blank_spaces.get(i))
    }

    pub fn first_unfilled(&self) -> Option<&BlankSpace> {
        self.blank_spaces.iter().find(|b| !b.is_filled())
    }

    pub fn progress(&self) -> FillProgress {
        FillProgress {
            total: self.blank_spaces.len(),
            filled: self.blank_spaces.iter().filter(|b| b.is_filled()).count(),
        }
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.blank_spaces.iter().position(|b| b.id == id)
    }
}

// ── Stored shape ─────────────────────────────────────────────────────────────

/// What a store hands back. Any stored `blankSpaces` list is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRecord {
    id: String,
    name: String,
    content: String,
    original_content: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    #[serde(rename = "type")]
    doc_type: DocumentType,
}

impl From<DocumentRecord> for Document {
    fn from(r: DocumentRecord) -> Self {
        let blank_spaces = extract::extract(&r.content);
        Self {
            id: r.id,
            name: r.name,
            content: r.content,
            original_content: r.original_content,
            created_at: r.created_at,
            modified_at: r.modified_at,
            doc_type: r.doc_type,
            blank_spaces,
        }
    }
}
