//! Ingest: normalise uploaded bytes into markup.
//!
//! Three kinds of input are accepted. Markup passes through untouched.
//! Plain text is escaped and wrapped one `<p>` per line, so blank lines
//! survive as empty paragraphs. Word-processor files go through a
//! [`MarkupConverter`], the binary-to-markup collaborator; the default is
//! [`DocxConverter`], backed by `docx-rs`.

use crate::error::BlankFillError;
use docx_rs::{
    DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// What an upload contains, which decides how it becomes markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    WordProcessor,
    PlainText,
    Markup,
}

impl ContentKind {
    /// Infer the kind from a declared MIME type, falling back to the file
    /// extension.
    pub fn infer(file_name: &str, declared_mime: Option<&str>) -> Result<Self, BlankFillError> {
        let by_mime = declared_mime.and_then(|mime| {
            let essence = mime.split(';').next().unwrap_or(mime).trim();
            match essence.to_ascii_lowercase().as_str() {
                DOCX_MIME | "application/msword" => Some(ContentKind::WordProcessor),
                "text/plain" => Some(ContentKind::PlainText),
                "text/html" => Some(ContentKind::Markup),
                _ => None,
            }
        });
        if let Some(kind) = by_mime {
            return Ok(kind);
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("docx" | "doc") => Ok(ContentKind::WordProcessor),
            Some("txt") => Ok(ContentKind::PlainText),
            Some("html" | "htm") => Ok(ContentKind::Markup),
            _ => Err(BlankFillError::UnsupportedFormat {
                file_name: file_name.to_string(),
            }),
        }
    }
}

/// Converts a binary word-processor file into markup.
pub trait MarkupConverter {
    fn convert(&self, bytes: &[u8]) -> Result<String, BlankFillError>;
}

/// `.docx` → `<p>` per paragraph. Run text is concatenated and escaped,
/// tabs are kept, and line breaks become `<br>`. Runs inside hyperlinks and
/// tracked insertions count as paragraph text. Tables become
/// `<table><tr><td>` with one `<p>` per cell paragraph, nested tables
/// included. Images and other non-text content are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxConverter;

impl MarkupConverter for DocxConverter {
    fn convert(&self, bytes: &[u8]) -> Result<String, BlankFillError> {
        let docx = docx_rs::read_docx(bytes).map_err(|e| BlankFillError::Parse {
            detail: format!("not a readable Word document: {e}"),
        })?;

        let mut markup = String::new();
        let mut count = 0usize;
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(para) => {
                    paragraph_markup(para, &mut markup);
                    count += 1;
                }
                DocumentChild::Table(table) => count += table_markup(table, &mut markup),
                _ => {}
            }
        }

        debug!("Converted Word document: {} paragraphs", count);
        Ok(markup)
    }
}

fn paragraph_markup(para: &Paragraph, out: &mut String) {
    out.push_str("<p>");
    inline_markup(&para.children, out);
    out.push_str("</p>");
}

fn inline_markup(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => run_markup(run, out),
            ParagraphChild::Hyperlink(link) => inline_markup(&link.children, out),
            ParagraphChild::Insert(insert) => {
                for ic in &insert.children {
                    if let InsertChild::Run(run) = ic {
                        run_markup(run, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn run_markup(run: &Run, out: &mut String) {
    for rc in &run.children {
        match rc {
            RunChild::Text(t) => out.push_str(&escape_html(&t.text)),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push_str("<br>"),
            _ => {}
        }
    }
}

/// Returns the number of cell paragraphs written.
fn table_markup(table: &Table, out: &mut String) -> usize {
    let mut count = 0;
    out.push_str("<table>");
    for TableChild::TableRow(row) in &table.rows {
        out.push_str("<tr>");
        for TableRowChild::TableCell(cell) in &row.cells {
            out.push_str("<td>");
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(para) => {
                        paragraph_markup(para, out);
                        count += 1;
                    }
                    TableCellContent::Table(nested) => count += table_markup(nested, out),
                    _ => {}
                }
            }
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
    count
}

/// Turn raw upload bytes into markup according to `kind`.
pub fn to_markup(
    bytes: &[u8],
    kind: ContentKind,
    converter: &dyn MarkupConverter,
) -> Result<String, BlankFillError> {
    info!("Ingesting {} bytes as {:?}", bytes.len(), kind);
    match kind {
        ContentKind::WordProcessor => converter.convert(bytes),
        ContentKind::PlainText => decode_utf8(bytes).map(|text| plain_text_to_markup(&text)),
        ContentKind::Markup => decode_utf8(bytes),
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String, BlankFillError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| BlankFillError::Parse {
        detail: format!("input is not valid UTF-8: {e}"),
    })
}

/// One `<p>` per line; blank lines become empty paragraphs.
pub fn plain_text_to_markup(text: &str) -> String {
    let normalised = text.replace("\r\n", "\n").replace('\r', "\n");
    normalised
        .split('\n')
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Document name for an upload: the file name without its last extension.
pub fn document_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);
    match base.rfind('.') {
        Some(dot) if dot > 0 => base[..dot].to_string(),
        _ => base.to_string(),
    }
}
