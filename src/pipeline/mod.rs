//! Pipeline stages for blank-space documents.
//!
//! Each submodule implements exactly one transformation step, and every
//! step is a pure string transform: markup in, markup (or a derived value)
//! out. No stage holds state between calls.
//!
//! ## Data Flow
//!
//! ```text
//! ingest ──▶ detect ──▶ extract ──▶ ( mutate ──▶ extract )* ──▶ export
//! (bytes)    (markers)  (list)        (fill/insert)              (txt/html/docx)
//!
//! variables   ({{name}} templates, an independent pipeline)
//! ```
//!
//! 1. [`ingest`]    — turn uploaded bytes (docx, text, markup) into markup
//! 2. [`detect`]    — rewrite placeholder-looking text as tagged markers
//! 3. [`extract`]   — project markers into an ordered `BlankSpace` list
//! 4. [`mutate`]    — fill a marker by id, or insert a new one at a caret
//! 5. [`export`]    — resolve blanks and serialise to an output format
//! 6. [`variables`] — extract and substitute `{{name}}` placeholders
//!
//! [`marker`] holds the tag grammar every stage reads and writes.

pub mod detect;
pub mod export;
pub mod extract;
pub mod ingest;
pub mod marker;
pub mod mutate;
pub mod variables;
