//! Document-level entry points: ingest an upload, export a document.
//!
//! The pipeline stages work on bare markup strings. The functions here wrap
//! them with the bookkeeping a caller needs: size limits, content sniffing,
//! document naming, artifact naming, and atomic file output.

use crate::blank::BlankSpace;
use crate::config::EngineConfig;
use crate::document::{Document, DocumentType};
use crate::error::BlankFillError;
use crate::pipeline::export::{self, ExportArtifact, ExportFormat};
use crate::pipeline::ingest::{self, ContentKind, DocxConverter, MarkupConverter};
use crate::pipeline::{detect, extract};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Turn an uploaded file into a [`Document`].
///
/// # Arguments
/// * `bytes` — Raw upload contents
/// * `file_name` — Original file name; its extension is the fallback for
///   content sniffing and its stem becomes the document name
/// * `declared_mime` — Content type reported by the client, if any
/// * `config` — Upload limit and whether to run detection
///
/// # Errors
/// - [`BlankFillError::UploadTooLarge`] past `config.max_upload_bytes`
/// - [`BlankFillError::UnsupportedFormat`] when neither MIME nor extension
///   is recognised
/// - [`BlankFillError::Parse`] when the bytes cannot become markup
pub fn ingest_bytes(
    bytes: &[u8],
    file_name: &str,
    declared_mime: Option<&str>,
    config: &EngineConfig,
) -> Result<Document, BlankFillError> {
    ingest_bytes_with(bytes, file_name, declared_mime, config, &DocxConverter)
}

/// [`ingest_bytes`] with a caller-supplied word-processor converter.
pub fn ingest_bytes_with(
    bytes: &[u8],
    file_name: &str,
    declared_mime: Option<&str>,
    config: &EngineConfig,
    converter: &dyn MarkupConverter,
) -> Result<Document, BlankFillError> {
    let start = Instant::now();
    info!("Ingesting '{}' ({} bytes)", file_name, bytes.len());

    if bytes.len() > config.max_upload_bytes {
        return Err(BlankFillError::UploadTooLarge {
            size: bytes.len(),
            limit: config.max_upload_bytes,
        });
    }

    let kind = ContentKind::infer(file_name, declared_mime)?;
    let mut markup = ingest::to_markup(bytes, kind, converter)?;
    if config.detect_on_ingest {
        markup = detect::detect(&markup);
    }

    let doc = Document::new(ingest::document_name(file_name), markup, DocumentType::System);
    info!(
        "Ingested '{}' as {:?}: {} blank spaces in {}ms",
        doc.name(),
        kind,
        doc.blank_spaces().len(),
        start.elapsed().as_millis()
    );
    Ok(doc)
}

/// Read `path` and ingest it. The MIME type is inferred from the extension.
pub fn ingest_file(path: impl AsRef<Path>, config: &EngineConfig) -> Result<Document, BlankFillError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| BlankFillError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    ingest_bytes(&bytes, file_name, None, config)
}

/// Serialise `doc` in `format`.
///
/// Text and word exports resolve blanks: filled → fill text, empty →
/// `length` × `config.unfilled_char`. Markup export is the current content
/// byte for byte. JSON export is the pretty-printed document record.
pub fn export(
    doc: &Document,
    format: ExportFormat,
    config: &EngineConfig,
) -> Result<ExportArtifact, BlankFillError> {
    let bytes = match format {
        ExportFormat::Word => export::to_word(doc.content(), config.unfilled_char)?,
        ExportFormat::Markup => export::to_markup(doc.content()),
        ExportFormat::Text => export::to_text(doc.content(), config.unfilled_char).into_bytes(),
        ExportFormat::Json => serde_json::to_vec_pretty(doc)?,
    };
    let artifact = ExportArtifact::new(doc.name(), format, bytes);
    info!(
        "Exported '{}' as {} ({} bytes)",
        doc.name(),
        format,
        artifact.bytes.len()
    );
    Ok(artifact)
}

/// Export `doc` and write the artifact into `dir`. Returns the written path.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub fn export_to_file(
    doc: &Document,
    format: ExportFormat,
    dir: impl AsRef<Path>,
    config: &EngineConfig,
) -> Result<PathBuf, BlankFillError> {
    let artifact = export(doc, format, config)?;
    let path = dir.as_ref().join(&artifact.file_name);
    let write_failed = |source| BlankFillError::OutputWriteFailed {
        path: path.clone(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }

    let tmp_path = path.with_extension(format!("{}.tmp", format.extension()));
    fs::write(&tmp_path, &artifact.bytes).map_err(write_failed)?;
    fs::rename(&tmp_path, &path).map_err(write_failed)?;

    debug!("Wrote {}", path.display());
    Ok(path)
}

/// List the blank spaces in `markup` without building a document.
pub fn inspect(markup: &str) -> Vec<BlankSpace> {
    extract::extract(markup)
}
