//! Document persistence.
//!
//! [`DocumentStore`] is the seam between the engine and wherever documents
//! live. Two implementations ship with the crate: [`MemoryStore`] for tests
//! and embedding, and [`JsonFileStore`], which keeps one pretty-printed
//! `<id>.json` per document in a directory.
//!
//! Stores persist the markup, never the blank list. A loaded document
//! re-extracts its blanks from `content`.

use crate::document::{Document, DocumentType};
use crate::error::BlankFillError;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub trait DocumentStore {
    fn load(&self, id: &str) -> Result<Document, BlankFillError>;

    /// Insert or overwrite, keyed by the document's id.
    fn put(&mut self, doc: &Document) -> Result<(), BlankFillError>;

    fn delete(&mut self, id: &str) -> Result<(), BlankFillError>;

    /// Every stored document, most recently modified first.
    fn list(&self) -> Result<Vec<Document>, BlankFillError>;

    /// Stamp `modified_at` and store.
    fn save(&mut self, doc: &mut Document) -> Result<(), BlankFillError> {
        doc.touch();
        self.put(doc)
    }

    fn list_by_type(&self, doc_type: DocumentType) -> Result<Vec<Document>, BlankFillError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|d| d.doc_type() == doc_type)
            .collect())
    }
}

fn newest_first(docs: &mut [Document]) {
    docs.sort_by(|a, b| {
        b.modified_at()
            .cmp(&a.modified_at())
            .then_with(|| a.id().cmp(b.id()))
    });
}

// ── In-memory ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: HashMap<String, Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Document, BlankFillError> {
        self.docs
            .get(id)
            .cloned()
            .ok_or_else(|| BlankFillError::DocumentNotFound { id: id.to_string() })
    }

    fn put(&mut self, doc: &Document) -> Result<(), BlankFillError> {
        self.docs.insert(doc.id().to_string(), doc.clone());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), BlankFillError> {
        self.docs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| BlankFillError::DocumentNotFound { id: id.to_string() })
    }

    fn list(&self) -> Result<Vec<Document>, BlankFillError> {
        let mut docs: Vec<_> = self.docs.values().cloned().collect();
        newest_first(&mut docs);
        Ok(docs)
    }
}

// ── JSON files ───────────────────────────────────────────────────────────────

/// One `<id>.json` file per document under `root`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, BlankFillError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| storage(&root, e))?;
        debug!("Opened document store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

fn storage(path: &Path, source: io::Error) -> BlankFillError {
    BlankFillError::Storage {
        path: path.to_path_buf(),
        source,
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self, id: &str) -> Result<Document, BlankFillError> {
        let path = self.path_for(id);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(BlankFillError::DocumentNotFound { id: id.to_string() })
            }
            Err(e) => return Err(storage(&path, e)),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn put(&mut self, doc: &Document) -> Result<(), BlankFillError> {
        let path = self.path_for(doc.id());
        let json = serde_json::to_vec_pretty(doc)?;

        // Atomic write: temp file in the same directory, then persist over
        // the target.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root).map_err(|e| storage(&path, e))?;
        tmp.write_all(&json).map_err(|e| storage(&path, e))?;
        tmp.persist(&path).map_err(|e| storage(&path, e.error))?;

        info!("Stored document '{}' ({})", doc.name(), doc.id());
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), BlankFillError> {
        let path = self.path_for(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted document {}", id);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(BlankFillError::DocumentNotFound { id: id.to_string() })
            }
            Err(e) => Err(storage(&path, e)),
        }
    }

    fn list(&self) -> Result<Vec<Document>, BlankFillError> {
        let entries = fs::read_dir(&self.root).map_err(|e| storage(&self.root, e))?;
        let mut docs = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| storage(&self.root, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).map_err(|e| storage(&path, e))?;
            match serde_json::from_slice::<Document>(&bytes) {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }
        newest_first(&mut docs);
        Ok(docs)
    }
}
