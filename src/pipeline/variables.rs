//! Named-variable templates: `{{name}}` placeholders resolved by name.
//!
//! This is a separate pipeline from blank-space detection and never runs
//! over the same document. A name is the literal interior of a `{{…}}` span:
//! any text up to the first `}}`, untrimmed and unvalidated. Extraction and
//! substitution share one expression, so every extracted name substitutes.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use tracing::debug;

static RE_VARIABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap());

/// Distinct variable names in first-occurrence order.
pub fn extract_variables(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    RE_VARIABLE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Replace every `{{name}}` whose name is bound; leave the rest verbatim.
///
/// Substitution is a single pass, so a bound value that itself contains
/// `{{…}}` is inserted literally and not expanded again.
pub fn substitute(content: &str, bindings: &HashMap<String, String>) -> String {
    let mut replaced = 0usize;
    let out = RE_VARIABLE.replace_all(content, |caps: &Captures<'_>| match bindings.get(&caps[1]) {
        Some(value) => {
            replaced += 1;
            value.clone()
        }
        None => caps[0].to_string(),
    });
    debug!("Substituted {} variable occurrences", replaced);
    out.into_owned()
}
