//! Error types for the blankfill library.
//!
//! Every fallible operation returns [`BlankFillError`]. The variants fall
//! into two groups that callers treat differently:
//!
//! * **Recoverable** ([`BlankFillError::BlankNotFound`],
//!   [`BlankFillError::InvalidPosition`]): the caller asked for something the
//!   current markup cannot satisfy (a stale blank id, a caret past the end).
//!   The document is untouched; re-extract or clamp and try again.
//!
//! * **Fatal** (everything else): the input could not become markup at all,
//!   an export could not be serialised, or the store failed. Nothing was
//!   mutated; surface the message to the user.
//!
//! No operation in this crate retries internally. All transforms are
//! deterministic, so a retry cannot change the outcome.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the blankfill library.
#[derive(Debug, Error)]
pub enum BlankFillError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The uploaded bytes could not be converted to markup.
    #[error("Failed to parse document: {detail}")]
    Parse { detail: String },

    /// Neither the declared content type nor the extension is supported.
    #[error("Unsupported file type: '{file_name}'\nSupported formats: Word (.docx, .doc), text (.txt), HTML (.html).")]
    UnsupportedFormat { file_name: String },

    /// The input file could not be read.
    #[error("Failed to read input file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Upload exceeds the configured size limit.
    #[error("File is too large: {size} bytes (limit is {limit} bytes)")]
    UploadTooLarge { size: usize, limit: usize },

    // ── Blank-space errors ────────────────────────────────────────────────
    /// No marker in the markup carries this id.
    #[error("Blank space '{id}' not found in document")]
    BlankNotFound { id: String },

    /// Insert caret lies outside the markup.
    #[error("Position {position} is out of range (markup has {len} characters)")]
    InvalidPosition { position: usize, len: usize },

    // ── Export errors ─────────────────────────────────────────────────────
    /// The resolved document could not be serialised to the target format.
    #[error("Failed to export as {format}: {detail}")]
    Conversion { format: String, detail: String },

    /// Could not create or write the exported file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Template errors ───────────────────────────────────────────────────
    /// No template registered under this id.
    #[error("Template '{id}' not found")]
    TemplateNotFound { id: String },

    // ── Store errors ──────────────────────────────────────────────────────
    /// The store holds no document with this id.
    #[error("Document '{id}' not found")]
    DocumentNotFound { id: String },

    /// Reading or writing the backing store failed.
    #[error("Storage error at '{path}': {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BlankFillError {
    /// `true` for errors the caller can recover from without user input:
    /// a stale blank id or an out-of-range caret.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BlankFillError::BlankNotFound { .. } | BlankFillError::InvalidPosition { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_not_found_display() {
        let e = BlankFillError::BlankNotFound {
            id: "blank_1_2".into(),
        };
        assert!(e.to_string().contains("blank_1_2"));
        assert!(e.is_recoverable());
    }

    #[test]
    fn invalid_position_display() {
        let e = BlankFillError::InvalidPosition {
            position: 42,
            len: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("42"), "got: {msg}");
        assert!(msg.contains("10 characters"), "got: {msg}");
        assert!(e.is_recoverable());
    }

    #[test]
    fn conversion_is_fatal() {
        let e = BlankFillError::Conversion {
            format: "docx".into(),
            detail: "zip failure".into(),
        };
        assert!(e.to_string().contains("docx"));
        assert!(!e.is_recoverable());
    }

    #[test]
    fn upload_too_large_display() {
        let e = BlankFillError::UploadTooLarge {
            size: 20,
            limit: 10,
        };
        assert!(e.to_string().contains("limit is 10"));
    }
}
