//! The blank-space marker grammar, shared by every stage.
//!
//! ```text
//! <span class="blank-space[ filled]" data-id="<id>" data-length="<n>"><inner></span>
//! ```
//!
//! Empty markers hold `n` periods; filled markers hold the fill text, which
//! may itself contain markup (including nested `<span>`s). [`scan`] therefore
//! pairs each opening tag with its *balanced* closing tag rather than the
//! first `</span>` it sees.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

/// Class token every marker carries.
pub const MARKER_CLASS: &str = "blank-space";

/// Class token added to markers holding fill text.
pub const FILLED_CLASS: &str = "filled";

/// Opening tag. Groups: 1 = class suffix, 2 = id, 3 = declared length.
static RE_MARKER_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<span class="blank-space((?:\s[^"]*)?)" data-id="([^"]*)" data-length="([^"]*)"[^>]*>"#,
    )
    .unwrap()
});

/// Any `<span …>` or `</span>`, for depth counting.
static RE_SPAN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(/?)span\b[^>]*>").unwrap());

/// Markup tags and comments (`<p>`, `</b>`, `<!-- … -->`).
pub(crate) static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z!][^>]*>").unwrap());

static NEXT_SEQ: AtomicU64 = AtomicU64::new(1);

/// One marker located in a markup string. Offsets are byte offsets into the
/// string that was scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Whole marker, opening `<` through closing `>`.
    pub span: Range<usize>,
    /// Class suffix after `blank-space` inside the class attribute.
    pub class_suffix: Range<usize>,
    /// Content between the opening and closing tags.
    pub inner: Range<usize>,
    pub id: &'a str,
    pub length: usize,
    pub filled: bool,
    pub inner_text: &'a str,
}

/// Locate every marker in document order.
///
/// Markers nested inside another marker's fill text are part of that
/// marker's inner content and are not reported separately. An opening tag
/// with no balanced `</span>` is not a marker.
pub fn scan(markup: &str) -> Vec<Marker<'_>> {
    let mut markers = Vec::new();
    let mut from = 0;

    while let Some(caps) = RE_MARKER_OPEN.captures_at(markup, from) {
        let (Some(open), Some(suffix), Some(id), Some(declared)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            break;
        };

        let Some(close) = find_balanced_close(markup, open.end()) else {
            from = open.end();
            continue;
        };

        let inner_text = &markup[open.end()..close.start];
        let length = declared
            .as_str()
            .trim()
            .parse::<usize>()
            .unwrap_or_else(|_| inner_text.chars().count());
        let filled = suffix
            .as_str()
            .split_whitespace()
            .any(|token| token == FILLED_CLASS);

        markers.push(Marker {
            span: open.start()..close.end,
            class_suffix: suffix.range(),
            inner: open.end()..close.start,
            id: id.as_str(),
            length,
            filled,
            inner_text,
        });
        from = close.end;
    }

    markers
}

/// Find the `</span>` closing the span opened just before `from`.
fn find_balanced_close(markup: &str, from: usize) -> Option<Range<usize>> {
    let mut depth = 0usize;
    for caps in RE_SPAN_TAG.captures_iter(&markup[from..]) {
        let tag = caps.get(0)?;
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        if closing {
            if depth == 0 {
                return Some(from + tag.start()..from + tag.end());
            }
            depth -= 1;
        } else if !tag.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    None
}

// ── Rendering ────────────────────────────────────────────────────────────────

pub fn open_tag(id: &str, length: usize, filled: bool) -> String {
    let suffix = if filled {
        format!(" {FILLED_CLASS}")
    } else {
        String::new()
    };
    format!(r#"<span class="{MARKER_CLASS}{suffix}" data-id="{id}" data-length="{length}">"#)
}

/// Empty marker: `length` periods regardless of the glyphs it replaced.
pub fn render_empty(id: &str, length: usize) -> String {
    format!("{}{}</span>", open_tag(id, length, false), ".".repeat(length))
}

pub fn render_filled(id: &str, length: usize, text: &str) -> String {
    format!("{}{}</span>", open_tag(id, length, true), text)
}

// ── Identity ─────────────────────────────────────────────────────────────────

/// Fresh blank id: `blank_<unix millis>_<seq>`.
///
/// `seq` is process-wide and monotonic, so two ids minted in the same
/// millisecond (same pass or not) never collide.
pub fn next_id() -> String {
    let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("blank_{}_{}", Utc::now().timestamp_millis(), seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_finds_markers_in_order() {
        let m = format!(
            "a {} b {}",
            render_empty("x1", 3),
            render_filled("x2", 5, "Jane")
        );
        let found = scan(&m);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "x1");
        assert!(!found[0].filled);
        assert_eq!(found[0].inner_text, "...");
        assert_eq!(found[1].id, "x2");
        assert!(found[1].filled);
        assert_eq!(found[1].length, 5);
        assert_eq!(found[1].inner_text, "Jane");
        assert_eq!(&m[found[0].span.clone()], render_empty("x1", 3));
    }

    #[test]
    fn nested_markup_inside_fill_is_kept_whole() {
        let m = render_filled("x", 4, "<span class=\"em\">Jo</span> Doe");
        let found = scan(&m);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].inner_text, "<span class=\"em\">Jo</span> Doe");
        assert_eq!(found[0].span, 0..m.len());
    }

    #[test]
    fn unterminated_marker_is_ignored() {
        let m = r#"<span class="blank-space" data-id="a" data-length="3">..."#;
        assert!(scan(m).is_empty());
    }

    #[test]
    fn other_classes_are_not_markers() {
        let m = r#"<span class="blank-spaces" data-id="a" data-length="3">...</span>"#;
        assert!(scan(m).is_empty());
    }

    #[test]
    fn bad_length_falls_back_to_inner_width() {
        let m = r#"<span class="blank-space" data-id="a" data-length="wide">....</span>"#;
        assert_eq!(scan(m)[0].length, 4);
    }

    #[test]
    fn ids_are_unique() {
        let a = next_id();
        let b = next_id();
        assert_ne!(a, b);
        assert!(a.starts_with("blank_"));
    }
}
