//! # blankfill
//!
//! Find, fill and export the blanks in fill-in-the-blank documents.
//!
//! ## Why markers in the markup?
//!
//! Forms, contracts and templates mark the places a person should type with
//! runs of underscores, dots, `[bracketed hints]` or `( )`. This crate
//! rewrites those runs into tagged spans that carry a stable id and a
//! logical length. The markup string stays the single source of truth: the
//! list of blanks is always re-derived from it, so an editor, a store and an
//! exporter can never disagree about what is filled.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (.docx / .txt / .html)
//!  │
//!  ├─ 1. Ingest   bytes → markup
//!  ├─ 2. Detect   placeholder patterns → blank-space markers
//!  ├─ 3. Extract  markers → ordered BlankSpace list
//!  ├─ 4. Mutate   fill by id / insert at caret (re-extract after each)
//!  └─ 5. Export   blanks resolved → .docx / .txt / .html / .json
//! ```
//!
//! `{{name}}` variable templates ([`template`]) are a separate pipeline that
//! is populated from a binding map instead of being filled blank by blank.
//!
//! ## Quick Start
//!
//! ```rust
//! use blankfill::{convert, EngineConfig, ExportFormat};
//!
//! # fn main() -> Result<(), blankfill::BlankFillError> {
//! let config = EngineConfig::default();
//! let mut doc = convert::ingest_bytes(b"Name: .......", "form.txt", None, &config)?;
//! let id = doc.blank_spaces()[0].id.clone();
//! doc.fill_blank(&id, "Jane Doe")?;
//!
//! let artifact = convert::export(&doc, ExportFormat::Text, &config)?;
//! assert_eq!(artifact.bytes, b"Name: Jane Doe");
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `blankfill` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! blankfill = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod blank;
pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod template;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use blank::{BlankSpace, BlankState};
pub use config::{EngineConfig, EngineConfigBuilder};
pub use convert::{export, export_to_file, ingest_bytes, ingest_bytes_with, ingest_file, inspect};
pub use document::{Document, DocumentType, FillProgress};
pub use error::BlankFillError;
pub use pipeline::detect::detect;
pub use pipeline::export::{ExportArtifact, ExportFormat};
pub use pipeline::extract::extract;
pub use pipeline::ingest::{ContentKind, DocxConverter, MarkupConverter};
pub use pipeline::mutate::{fill, insert, Inserted};
pub use pipeline::variables::{extract_variables, substitute};
pub use store::{DocumentStore, JsonFileStore, MemoryStore};
pub use template::{find_candidates, PlaceholderCandidate, TemplateCatalog, VariableTemplate};
