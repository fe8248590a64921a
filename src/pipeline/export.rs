//! Export transcoding: resolve blanks and serialise markup to output formats.
//!
//! ## Why resolve before segmenting?
//!
//! Filled markers may hold nested markup, including paragraph tags. Blanks
//! are therefore resolved over the *whole* markup string first (filled →
//! fill text, empty → `length` copies of the unfilled glyph), and only then
//! is the result cut into paragraphs and stripped of tags. A marker can
//! never end up half in one paragraph and half in another.
//!
//! ## Paragraphs
//!
//! Markup with structural blocks (`<p>`, `<div>`, `<h1>`–`<h6>`, `<li>`, …)
//! yields one paragraph per block, empty blocks included: an empty `<p>` is
//! deliberate vertical space. Markup without blocks is split on newlines.
//! Text and word exports share this segmentation, so a `.txt` has exactly
//! one line per `.docx` paragraph.

use super::marker;
use crate::error::BlankFillError;
use docx_rs::{BreakType, Docx, Paragraph, Run};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use tracing::debug;

static RE_BLOCK_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:p|div|h[1-6]|li|blockquote|tr|pre)\b[^>]*>").unwrap()
});

static RE_BLOCK_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(?:p|div|h[1-6]|li|blockquote|tr|pre)\s*>").unwrap());

static RE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());

/// Output formats a document can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Word-processor document (`.docx`), one paragraph per source block.
    Word,
    /// The current markup, verbatim (`.html`).
    Markup,
    /// Plain text with blanks resolved (`.txt`).
    Text,
    /// The full document record (`.json`).
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Word => "docx",
            ExportFormat::Markup => "html",
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Markup => "text/html",
            ExportFormat::Text => "text/plain",
            ExportFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A serialised export, named `<document name>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// No sanitisation is applied to `document_name`.
    pub fn new(document_name: &str, format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format!("{}.{}", document_name, format.extension()),
            mime_type: format.mime_type(),
            bytes,
        }
    }
}

// ── Blank resolution ─────────────────────────────────────────────────────────

/// Replace every marker with its fill text, or `length` × `unfilled` when
/// empty. All other markup is left in place.
pub fn resolve_blanks(markup: &str, unfilled: char) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut cursor = 0;
    for m in marker::scan(markup) {
        out.push_str(&markup[cursor..m.span.start]);
        if m.filled {
            out.push_str(m.inner_text);
        } else {
            out.extend(std::iter::repeat_n(unfilled, m.length));
        }
        cursor = m.span.end;
    }
    out.push_str(&markup[cursor..]);
    out
}

// ── Segmentation ─────────────────────────────────────────────────────────────

/// Resolve blanks, then split into plain-text paragraphs.
///
/// Line breaks inside a paragraph (`<br>`) appear as `\n`.
pub fn paragraphs(markup: &str, unfilled: char) -> Vec<String> {
    let resolved = resolve_blanks(markup, unfilled);

    if !RE_BLOCK_CLOSE.is_match(&resolved) {
        return strip_markup(&resolved)
            .split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
    }

    RE_BLOCK_CLOSE
        .split(&resolved)
        .filter(|segment| is_paragraph(segment))
        .flat_map(split_leading_text)
        .collect()
}

/// Text sitting in front of a segment's innermost block opener is a
/// paragraph of its own (`Intro<p>Body` → `Intro`, `Body`).
fn split_leading_text(segment: &str) -> Vec<String> {
    let opener = RE_BLOCK_OPEN.find_iter(segment).last();
    let Some(opener) = opener else {
        return vec![segment_text(segment)];
    };
    let leading = strip_markup(&segment[..opener.start()]);
    let body = segment_text(&segment[opener.start()..]);
    if leading.trim().is_empty() {
        vec![body]
    } else {
        vec![leading.trim_matches(|c| c == '\n' || c == '\r').to_string(), body]
    }
}

fn segment_text(segment: &str) -> String {
    let segment = if segment.trim_start().starts_with('<') {
        segment.trim_start()
    } else {
        segment
    };
    strip_markup(segment)
        .trim_matches(|c| c == '\n' || c == '\r')
        .to_string()
}

/// A segment between block closers is a paragraph if it opens a block
/// (possibly an empty one) or carries text. Whitespace between nested
/// closers (`</p></div>`) is not.
fn is_paragraph(segment: &str) -> bool {
    RE_BLOCK_OPEN.is_match(segment) || !strip_markup(segment).trim().is_empty()
}

/// `<br>` → newline, drop every other tag, decode character references.
fn strip_markup(markup: &str) -> String {
    let s = RE_BREAK.replace_all(markup, "\n");
    let s = marker::RE_TAG.replace_all(&s, "");
    decode_entities(&s)
}

fn decode_entities(input: &str) -> String {
    RE_ENTITY
        .replace_all(input, |caps: &Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16)
                        .ok()
                        .and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

// ── Encoders ─────────────────────────────────────────────────────────────────

/// Plain text: one line per paragraph.
pub fn to_text(markup: &str, unfilled: char) -> String {
    paragraphs(markup, unfilled).join("\n")
}

/// Verbatim markup bytes.
pub fn to_markup(markup: &str) -> Vec<u8> {
    markup.as_bytes().to_vec()
}

/// `.docx` bytes with one paragraph per input paragraph.
///
/// Fails with [`BlankFillError::Conversion`] when the resolved text holds
/// characters XML cannot carry; no partial archive is ever returned.
pub fn to_word(markup: &str, unfilled: char) -> Result<Vec<u8>, BlankFillError> {
    let paras = paragraphs(markup, unfilled);
    for (i, p) in paras.iter().enumerate() {
        if let Some(bad) = p.chars().find(|c| !is_xml_char(*c)) {
            return Err(BlankFillError::Conversion {
                format: ExportFormat::Word.to_string(),
                detail: format!(
                    "paragraph {} contains character U+{:04X} which cannot be stored",
                    i + 1,
                    bad as u32
                ),
            });
        }
    }

    let docx = paras
        .iter()
        .fold(Docx::new(), |docx, p| docx.add_paragraph(word_paragraph(p)));

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| BlankFillError::Conversion {
            format: ExportFormat::Word.to_string(),
            detail: e.to_string(),
        })?;

    let bytes = buf.into_inner();
    debug!("Packed {} paragraphs → {} bytes docx", paras.len(), bytes.len());
    Ok(bytes)
}

fn word_paragraph(text: &str) -> Paragraph {
    if text.is_empty() {
        return Paragraph::new();
    }
    let mut run = Run::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                run = run.add_tab();
            }
            if !piece.is_empty() {
                run = run.add_text(piece);
            }
        }
    }
    Paragraph::new().add_run(run)
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::marker::{render_empty, render_filled};

    #[test]
    fn resolves_filled_and_empty() {
        let markup = format!(
            "Name: {} Date: {}",
            render_filled("a", 7, "Jane Doe"),
            render_empty("b", 11)
        );
        assert_eq!(to_text(&markup, '_'), "Name: Jane Doe Date: ___________");
    }

    #[test]
    fn unfilled_glyph_is_configurable() {
        let markup = render_empty("a", 3);
        assert_eq!(to_text(&markup, '.'), "...");
    }

    #[test]
    fn block_markup_yields_one_line_per_paragraph() {
        let markup = "<p>One</p>\n<p></p>\n<p>Two <b>bold</b></p>";
        assert_eq!(paragraphs(markup, '_'), vec!["One", "", "Two bold"]);
        assert_eq!(to_text(markup, '_'), "One\n\nTwo bold");
    }

    #[test]
    fn nested_closers_do_not_create_paragraphs() {
        let markup = "<div><p>a</p></div><div><p>b</p></div>";
        assert_eq!(paragraphs(markup, '_'), vec!["a", "b"]);
    }

    #[test]
    fn text_before_a_block_is_its_own_paragraph() {
        assert_eq!(paragraphs("Intro<p>Body</p>", '_'), vec!["Intro", "Body"]);
        assert_eq!(
            paragraphs("<p>a</p>Between<p>b</p>Outro", '_'),
            vec!["a", "Between", "b", "Outro"]
        );
        assert_eq!(
            paragraphs("<div>Lead<p>Body</p></div>", '_'),
            vec!["Lead", "Body"]
        );
        assert_eq!(to_text("Intro<p>Body</p>", '_'), "Intro\nBody");
    }

    #[test]
    fn plain_text_splits_on_newlines() {
        assert_eq!(paragraphs("a\n\nb", '_'), vec!["a", "", "b"]);
    }

    #[test]
    fn breaks_and_entities() {
        let markup = "<p>Smith &amp; Sons<br>Nairobi &#169; &lt;x&gt;</p>";
        assert_eq!(
            paragraphs(markup, '_'),
            vec!["Smith & Sons\nNairobi © <x>"]
        );
    }

    #[test]
    fn fill_with_paragraph_markup_is_resolved_first() {
        let markup = format!("<p>A {}</p>", render_filled("a", 3, "x</p><p>y"));
        assert_eq!(paragraphs(&markup, '_'), vec!["A x", "y"]);
    }

    #[test]
    fn markup_passthrough_is_byte_identical() {
        let markup = format!("<p>{}</p>", render_empty("a", 3));
        assert_eq!(to_markup(&markup), markup.as_bytes());
    }

    #[test]
    fn word_export_is_a_zip() {
        let markup = format!("<p>Name: {}</p><p></p>", render_empty("a", 5));
        let bytes = to_word(&markup, '_').unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn word_export_rejects_control_chars() {
        let err = to_word("<p>bad \u{0007} bell</p>", '_').unwrap_err();
        assert!(matches!(err, BlankFillError::Conversion { .. }));
    }

    #[test]
    fn artifact_name_is_not_sanitised() {
        let a = ExportArtifact::new("Lease: draft/2", ExportFormat::Text, vec![]);
        assert_eq!(a.file_name, "Lease: draft/2.txt");
        assert_eq!(a.mime_type, "text/plain");
    }
}
