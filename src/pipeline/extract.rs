//! Extraction: derive the ordered [`BlankSpace`] list from markup.
//!
//! The list is a disposable projection. Positions are character offsets into
//! the string passed to *this* call and are recomputed every time; nothing
//! is cached between calls, so extracting twice from the same markup yields
//! identical lists.

use super::marker;
use crate::blank::BlankSpace;
use tracing::debug;

/// Extract every blank space in document order.
pub fn extract(markup: &str) -> Vec<BlankSpace> {
    let mut blanks = Vec::new();
    // Running byte → char offset conversion keeps the scan linear.
    let mut byte_cursor = 0;
    let mut char_cursor = 0;

    for m in marker::scan(markup) {
        char_cursor += markup[byte_cursor..m.span.start].chars().count();
        byte_cursor = m.span.start;

        let blank = if m.filled {
            BlankSpace::filled(m.id, char_cursor, m.length, m.inner_text)
        } else {
            BlankSpace::empty(m.id, char_cursor, m.length)
        };
        blanks.push(blank);
    }

    debug!("Extracted {} blank spaces", blanks.len());
    blanks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::marker::{render_empty, render_filled};

    #[test]
    fn positions_are_char_offsets() {
        let first = render_empty("a", 3);
        let markup = format!("Café {first} and {}", render_filled("b", 4, "Zoë"));
        let blanks = extract(&markup);

        assert_eq!(blanks.len(), 2);
        assert_eq!(blanks[0].position, 5);
        assert_eq!(
            blanks[1].position,
            5 + first.chars().count() + " and ".chars().count()
        );
        assert_eq!(blanks[1].content(), Some("Zoë"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let markup = format!("{} x {}", render_empty("a", 5), render_filled("b", 2, "hi"));
        assert_eq!(extract(&markup), extract(&markup));
    }

    #[test]
    fn filled_state_comes_from_class() {
        let markup = format!("{}{}", render_empty("a", 3), render_filled("b", 3, "..."));
        let blanks = extract(&markup);
        assert!(!blanks[0].is_filled());
        assert_eq!(blanks[0].placeholder().as_deref(), Some("___"));
        assert!(blanks[1].is_filled());
    }

    #[test]
    fn no_markers_no_blanks() {
        assert!(extract("<p>Nothing to fill</p>").is_empty());
    }
}
