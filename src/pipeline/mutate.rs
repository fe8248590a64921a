//! Blank-space mutation: fill an existing marker or insert a new one.
//!
//! Both operations are pure string transforms. They either return new
//! markup or fail without producing any, and they never re-extract: that is
//! the caller's job (see [`crate::Document`], which always does).

use super::marker::{self, FILLED_CLASS};
use crate::blank::BlankSpace;
use crate::error::BlankFillError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_CHAR_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z][a-zA-Z0-9]*);").unwrap());

/// Result of [`insert`]: the new markup plus the blank that was created, so
/// callers can select it without another extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inserted {
    pub markup: String,
    pub blank: BlankSpace,
}

/// Replace the content of the marker with id `id` by `text`.
///
/// Any non-empty `text`, whitespace included, marks the marker filled with
/// exactly that text. Empty `text` clears it back to an empty marker of its
/// original width. `data-length` is never changed. Extra class tokens and
/// attributes are preserved.
pub fn fill(markup: &str, id: &str, text: &str) -> Result<String, BlankFillError> {
    let markers = marker::scan(markup);
    let target = markers
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| BlankFillError::BlankNotFound { id: id.to_string() })?;

    let clearing = text.is_empty();
    let mut classes: Vec<&str> = markup[target.class_suffix.clone()]
        .split_whitespace()
        .filter(|token| *token != FILLED_CLASS)
        .collect();
    if !clearing {
        classes.push(FILLED_CLASS);
    }
    let suffix: String = classes.iter().map(|c| format!(" {c}")).collect();
    let dots;
    let inner = if clearing {
        dots = ".".repeat(target.length);
        dots.as_str()
    } else {
        text
    };

    let mut out = String::with_capacity(markup.len() + text.len());
    out.push_str(&markup[..target.class_suffix.start]);
    out.push_str(&suffix);
    out.push_str(&markup[target.class_suffix.end..target.inner.start]);
    out.push_str(inner);
    out.push_str(&markup[target.inner.end..]);

    debug!(
        "{} blank space '{}' ({} chars)",
        if clearing { "Cleared" } else { "Filled" },
        id,
        text.chars().count()
    );
    Ok(out)
}

/// Splice a new empty marker of `width` into `markup` at character offset
/// `caret`.
///
/// `caret` must satisfy `0 ≤ caret ≤ markup.chars().count()`. A caret that
/// falls inside a tag, a character reference (`&amp;`) or an existing
/// marker is moved forward to the end of it, so the new marker never
/// splits markup.
/// The returned blank's `position` is where it actually landed.
pub fn insert(markup: &str, caret: usize, width: usize) -> Result<Inserted, BlankFillError> {
    let len = markup.chars().count();
    if caret > len {
        return Err(BlankFillError::InvalidPosition {
            position: caret,
            len,
        });
    }

    let byte = markup
        .char_indices()
        .nth(caret)
        .map_or(markup.len(), |(b, _)| b);
    let byte = snap_to_boundary(markup, byte);
    let position = markup[..byte].chars().count();

    let id = marker::next_id();
    let rendered = marker::render_empty(&id, width);

    let mut out = String::with_capacity(markup.len() + rendered.len());
    out.push_str(&markup[..byte]);
    out.push_str(&rendered);
    out.push_str(&markup[byte..]);

    debug!("Inserted blank space '{}' at {}", id, position);
    Ok(Inserted {
        markup: out,
        blank: BlankSpace::empty(id, position, width),
    })
}

/// Move a byte offset out of any marker, tag or character reference that
/// strictly contains it.
fn snap_to_boundary(markup: &str, byte: usize) -> usize {
    if let Some(m) = marker::scan(markup)
        .into_iter()
        .find(|m| m.span.start < byte && byte < m.span.end)
    {
        return m.span.end;
    }
    marker::RE_TAG
        .find_iter(markup)
        .chain(RE_CHAR_REF.find_iter(markup))
        .find(|t| t.start() < byte && byte < t.end())
        .map_or(byte, |t| t.end())
}
