//! The [`BlankSpace`] value: one placeholder occurrence in a document.
//!
//! A `BlankSpace` is always a projection of markup, never independent state.
//! The extractor builds a fresh list on every pass; nothing in this crate
//! mutates a `BlankSpace` in place.
//!
//! Empty and filled blanks share `id`, `position` and `length`; what differs
//! lives in [`BlankState`], so "exactly one of content/placeholder" holds by
//! construction. On the wire the flat shape
//! `{id, position, length, filled, content?, placeholder?}` is kept for
//! stored documents and JSON exports.

use serde::{Deserialize, Serialize};

/// A single blank space located in a document's markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BlankSpaceRecord", try_from = "BlankSpaceRecord")]
pub struct BlankSpace {
    /// Process-unique id embedded in the marker's `data-id` attribute.
    pub id: String,
    /// Character offset of the marker's opening tag at extraction time.
    pub position: usize,
    /// Logical width recorded in `data-length`.
    pub length: usize,
    /// Fill state.
    pub state: BlankState,
}

/// Whether a blank carries fill text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlankState {
    Empty,
    Filled { content: String },
}

impl BlankSpace {
    pub fn empty(id: impl Into<String>, position: usize, length: usize) -> Self {
        Self {
            id: id.into(),
            position,
            length,
            state: BlankState::Empty,
        }
    }

    pub fn filled(
        id: impl Into<String>,
        position: usize,
        length: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            length,
            state: BlankState::Filled {
                content: content.into(),
            },
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self.state, BlankState::Filled { .. })
    }

    /// Fill text, only for filled blanks.
    pub fn content(&self) -> Option<&str> {
        match &self.state {
            BlankState::Filled { content } => Some(content),
            BlankState::Empty => None,
        }
    }

    /// Display hint for empty blanks: `length` underscores.
    pub fn placeholder(&self) -> Option<String> {
        match self.state {
            BlankState::Empty => Some("_".repeat(self.length)),
            BlankState::Filled { .. } => None,
        }
    }
}

// ── Wire shape ───────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct BlankSpaceRecord {
    id: String,
    position: usize,
    length: usize,
    filled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
}

impl From<BlankSpace> for BlankSpaceRecord {
    fn from(b: BlankSpace) -> Self {
        let placeholder = b.placeholder();
        let (filled, content) = match b.state {
            BlankState::Filled { content } => (true, Some(content)),
            BlankState::Empty => (false, None),
        };
        Self {
            id: b.id,
            position: b.position,
            length: b.length,
            filled,
            content,
            placeholder,
        }
    }
}

impl TryFrom<BlankSpaceRecord> for BlankSpace {
    type Error = String;

    fn try_from(r: BlankSpaceRecord) -> Result<Self, Self::Error> {
        let state = match (r.filled, r.content) {
            (true, Some(content)) => BlankState::Filled { content },
            (true, None) => return Err(format!("filled blank '{}' has no content", r.id)),
            (false, _) => BlankState::Empty,
        };
        Ok(Self {
            id: r.id,
            position: r.position,
            length: r.length,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_blank_has_placeholder_only() {
        let b = BlankSpace::empty("b1", 0, 4);
        assert!(!b.is_filled());
        assert_eq!(b.content(), None);
        assert_eq!(b.placeholder().as_deref(), Some("____"));
    }

    #[test]
    fn filled_blank_has_content_only() {
        let b = BlankSpace::filled("b1", 3, 4, "Jane");
        assert!(b.is_filled());
        assert_eq!(b.content(), Some("Jane"));
        assert_eq!(b.placeholder(), None);
    }

    #[test]
    fn serialises_flat_shape() {
        let json = serde_json::to_value(BlankSpace::empty("b1", 2, 3)).unwrap();
        assert_eq!(json["filled"], false);
        assert_eq!(json["placeholder"], "___");
        assert!(json.get("content").is_none());

        let json = serde_json::to_value(BlankSpace::filled("b2", 0, 3, "x")).unwrap();
        assert_eq!(json["filled"], true);
        assert_eq!(json["content"], "x");
        assert!(json.get("placeholder").is_none());
    }

    #[test]
    fn rejects_filled_without_content() {
        let raw = r#"{"id":"b","position":0,"length":3,"filled":true}"#;
        assert!(serde_json::from_str::<BlankSpace>(raw).is_err());
    }

    #[test]
    fn deserialises_wire_shape() {
        let raw = r#"{"id":"b","position":5,"length":3,"filled":true,"content":"ok"}"#;
        let b: BlankSpace = serde_json::from_str(raw).unwrap();
        assert_eq!(b, BlankSpace::filled("b", 5, 3, "ok"));
    }
}
