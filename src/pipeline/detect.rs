//! Pattern detection: rewrite placeholder-looking text as blank-space markers.
//!
//! Source documents mark their blanks in many ways: dotted leaders, runs of
//! underscores, `[bracketed hints]`, `{{braces}}`, `__emphasised__` labels,
//! empty `( )`. This stage recognises each style and replaces the match with
//! a tagged, addressable marker (see [`super::marker`]).
//!
//! ## Rule Order
//!
//! Rules run sequentially, each over the output of the previous one, so the
//! order below decides what wins when styles overlap (e.g. dots inside
//! brackets become a blank and the brackets are then left as text):
//!
//! 1. `___` three or more underscores
//! 2. `...` three or more periods
//! 3. `[...]` square brackets, possibly empty
//! 4. `{{...}}` double braces, possibly empty
//! 5. `__text__` text between underscore pairs
//! 6. `( )` parentheses with a whitespace-only interior
//!
//! Rules only ever see *text*: existing markers and markup tags are copied
//! through untouched, so no rule can match inside a marker emitted by an
//! earlier rule (its period run, its `data-id`) or inside a tag attribute.
//! Running the detector twice therefore adds nothing the second time.
//!
//! Inline formatting tags split text runs too. A pattern interrupted by a
//! tag, as in `[<b>Name</b>]`, is seen as three runs and is not matched;
//! `<b>[Name]</b>` is.

use super::marker;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, info};

/// A single recogniser: a named expression whose optional group 1 captures
/// interior text.
struct Rule {
    name: &'static str,
    regex: Regex,
}

impl Rule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).unwrap(),
        }
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("underscores", r"_{3,}"),
        Rule::new("dots", r"\.{3,}"),
        Rule::new("brackets", r"\[([^\]]*)\]"),
        Rule::new("curly", r"\{\{([^}]*)\}\}"),
        Rule::new("underscores_with_text", r"__+([^_]*)__+"),
        Rule::new("empty_parentheses", r"\(\s*\)"),
    ]
});

/// Apply every detection rule, in order, and return the rewritten markup.
///
/// Each match becomes a fresh marker whose `data-length` is the match's
/// character count. Matches with non-blank interior text become *filled*
/// markers holding that text verbatim; all others become *empty* markers
/// holding `length` periods.
pub fn detect(markup: &str) -> String {
    let mut out = markup.to_string();
    let mut total = 0usize;

    for rule in RULES.iter() {
        let mut count = 0usize;
        out = rewrite_text(&out, |text| {
            rule.regex
                .replace_all(text, |caps: &Captures<'_>| {
                    count += 1;
                    render_match(caps)
                })
                .into_owned()
        });
        if count > 0 {
            debug!("Rule '{}' produced {} blank spaces", rule.name, count);
        }
        total += count;
    }

    info!("Detected {} blank spaces", total);
    out
}

fn render_match(caps: &Captures<'_>) -> String {
    let id = marker::next_id();
    let length = caps[0].chars().count();
    match caps.get(1).map(|m| m.as_str()) {
        Some(text) if !text.trim().is_empty() => marker::render_filled(&id, length, text),
        _ => marker::render_empty(&id, length),
    }
}

/// Rewrite every text run of `markup` with `f`, copying markers and tags
/// through verbatim.
fn rewrite_text(markup: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(markup.len() + 64);
    let mut cursor = 0;

    for m in marker::scan(markup) {
        rewrite_between_tags(&markup[cursor..m.span.start], &mut out, &mut f);
        out.push_str(&markup[m.span.clone()]);
        cursor = m.span.end;
    }
    rewrite_between_tags(&markup[cursor..], &mut out, &mut f);
    out
}

fn rewrite_between_tags(chunk: &str, out: &mut String, f: &mut impl FnMut(&str) -> String) {
    let mut last = 0;
    for tag in marker::RE_TAG.find_iter(chunk) {
        if tag.start() > last {
            out.push_str(&f(&chunk[last..tag.start()]));
        }
        out.push_str(tag.as_str());
        last = tag.end();
    }
    if last < chunk.len() {
        out.push_str(&f(&chunk[last..]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::marker::scan;

    fn summary(markup: &str) -> Vec<(usize, bool, String)> {
        scan(markup)
            .into_iter()
            .map(|m| (m.length, m.filled, m.inner_text.to_string()))
            .collect()
    }

    #[test]
    fn underscores_and_dots_become_empty_markers() {
        let out = detect("Name: ....... Date: ___________");
        assert_eq!(
            summary(&out),
            vec![
                (7, false, ".......".to_string()),
                (11, false, "...........".to_string()),
            ]
        );
        assert!(out.starts_with("Name: <span"));
    }

    #[test]
    fn short_runs_are_ignored() {
        let out = detect("a.. b__ c");
        assert_eq!(out, "a.. b__ c");
    }

    #[test]
    fn bracket_with_text_becomes_filled_marker() {
        let out = detect("Landlord: [Full Name]");
        assert_eq!(summary(&out), vec![(11, true, "Full Name".to_string())]);
    }

    #[test]
    fn empty_and_blank_brackets_become_empty_markers() {
        let out = detect("[] and [   ]");
        assert_eq!(
            summary(&out),
            vec![(2, false, "..".to_string()), (5, false, ".....".to_string())]
        );
    }

    #[test]
    fn curly_spans_are_positional_blanks() {
        let out = detect("Dear {{tenant_name}}, {{}}");
        assert_eq!(
            summary(&out),
            vec![
                (15, true, "tenant_name".to_string()),
                (4, false, "....".to_string()),
            ]
        );
    }

    #[test]
    fn underscore_delimited_text() {
        let out = detect("Signed __Witness__ here");
        assert_eq!(summary(&out), vec![(11, true, "Witness".to_string())]);
    }

    #[test]
    fn empty_parentheses() {
        let out = detect("Tick ( ) or ()");
        assert_eq!(
            summary(&out),
            vec![(3, false, "...".to_string()), (2, false, "..".to_string())]
        );
    }

    #[test]
    fn earlier_rule_wins_inside_brackets() {
        // Dots are rewritten first; the bracket rule then sees "[Name" and
        // "]" as separate text runs.
        let out = detect("[Name....]");
        let found = summary(&out);
        assert_eq!(found, vec![(4, false, "....".to_string())]);
        assert!(out.starts_with("[Name<span"));
        assert!(out.ends_with("</span>]"));
    }

    #[test]
    fn never_matches_inside_tags() {
        let input = r#"<a href="http://x/a___b">link</a>"#;
        assert_eq!(detect(input), input);
    }

    #[test]
    fn inline_tags_split_patterns() {
        let input = "Sign: [<b>Name</b>] and __<i>x</i>__";
        assert_eq!(detect(input), input);

        let found = summary(&detect("Sign: <b>[Name]</b>"));
        assert_eq!(found, vec![(6, true, "Name".to_string())]);
    }

    #[test]
    fn detection_is_idempotent() {
        let once = detect("<p>Name: ___ Date: ....</p><p>[Town]</p>");
        let twice = detect(&once);
        assert_eq!(once, twice);
        assert_eq!(scan(&once).len(), 3);
    }
}
