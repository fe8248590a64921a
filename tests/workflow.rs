//! Whole-workflow tests: ingest, detect, fill, insert, store and export
//! through the public API only.

use blankfill::{
    convert, detect, extract, extract_variables, fill, insert, substitute, BlankFillError,
    Document, DocumentStore, DocumentType, EngineConfig, ExportFormat, JsonFileStore,
    MemoryStore, TemplateCatalog, VariableTemplate,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Raw inputs paired with the number of blanks detection should find.
const CORPUS: &[(&str, usize)] = &[
    ("Name: ....... Date: ___________", 2),
    ("<p>Tenant: [full name]</p><p>Rent: {{amount}} per month</p>", 2),
    ("Sign here ( ) and initial (   )", 2),
    ("__Client Name__ agrees", 1),
    ("<div><p>A ___</p><p>B ...</p><p>C ___</p></div>", 3),
    ("Total … ..", 0),
    ("", 0),
];

fn bind(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn no_marker_syntax(text: &str) -> bool {
    !text.contains("<span") && !text.contains("blank-space") && !text.contains("data-id")
}

// ── End-to-end ───────────────────────────────────────────────────────────────

#[test]
fn name_and_date_form() {
    let markup = detect("Name: ....... Date: ___________");

    let blanks = extract(&markup);
    assert_eq!(blanks.len(), 2);
    assert_eq!((blanks[0].length, blanks[1].length), (7, 11));
    assert!(!blanks[0].is_filled() && !blanks[1].is_filled());
    assert!(blanks[0].position < blanks[1].position);

    let filled = fill(&markup, &blanks[0].id, "Jane Doe").unwrap();
    let after = extract(&filled);
    assert_eq!(after[0].content(), Some("Jane Doe"));
    assert_eq!(after[1].id, blanks[1].id);
    assert_eq!(after[1].length, 11);
    assert!(!after[1].is_filled());

    let doc = Document::new("form", filled, DocumentType::System);
    let text = convert::export(&doc, ExportFormat::Text, &EngineConfig::default()).unwrap();
    assert_eq!(
        String::from_utf8(text.bytes).unwrap(),
        "Name: Jane Doe Date: ___________"
    );
}

#[test]
fn lease_lifecycle_through_a_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::default();
    let mut store = JsonFileStore::open(dir.path().join("store")).unwrap();

    let mut doc = convert::ingest_bytes(
        b"Tenant: ________\nLandlord: ........\nDeposit: [amount]",
        "Lease.txt",
        Some("text/plain"),
        &config,
    )
    .unwrap();
    store.save(&mut doc).unwrap();
    assert_eq!(doc.progress().total, 3);
    assert_eq!(doc.progress().filled, 1);

    let mut doc = store.load(doc.id()).unwrap();
    let first = doc.first_unfilled().unwrap().id.clone();
    doc.fill_blank(&first, "Ada Lovelace").unwrap();
    let next = doc.first_unfilled().unwrap().id.clone();
    doc.fill_blank(&next, "C. Babbage").unwrap();
    assert!(doc.progress().is_complete());
    store.save(&mut doc).unwrap();

    let reloaded = store.load(doc.id()).unwrap();
    assert_eq!(reloaded.blank_spaces(), doc.blank_spaces());

    let out = dir.path().join("out");
    let txt = convert::export_to_file(&reloaded, ExportFormat::Text, &out, &config).unwrap();
    assert_eq!(
        std::fs::read_to_string(txt).unwrap(),
        "Tenant: Ada Lovelace\nLandlord: C. Babbage\nDeposit: amount"
    );
    let docx = convert::export_to_file(&reloaded, ExportFormat::Word, &out, &config).unwrap();
    assert!(docx.ends_with("Lease.docx"));

    let mut fresh = reloaded.clone();
    fresh.reset();
    assert_eq!(fresh.content(), fresh.original_content());
    assert_eq!(fresh.progress().filled, 1);
}

#[test]
fn clone_as_template_is_listed_separately() {
    let mut store = MemoryStore::new();
    let mut doc = Document::new("Form", detect("<p>Name: ____</p>"), DocumentType::System);
    store.save(&mut doc).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let mut tpl = doc.clone_as_template("Form template");
    store.save(&mut tpl).unwrap();

    let templates = store.list_by_type(DocumentType::Template).unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].name(), "Form template");
    assert_eq!(store.list().unwrap()[0].id(), tpl.id());
}

// ── Properties over the corpus ───────────────────────────────────────────────

#[test]
fn extraction_is_idempotent() {
    for (raw, _) in CORPUS {
        let markup = detect(raw);
        assert_eq!(extract(&markup), extract(&markup), "input: {raw:?}");
    }
}

#[test]
fn detection_finds_every_pattern_instance() {
    for (raw, expected) in CORPUS {
        assert_eq!(extract(&detect(raw)).len(), *expected, "input: {raw:?}");
    }
}

#[test]
fn detection_is_stable_on_its_own_output() {
    for (raw, _) in CORPUS {
        let once = detect(raw);
        assert_eq!(detect(&once), once, "input: {raw:?}");
    }
}

#[test]
fn fill_preserves_count() {
    for (raw, _) in CORPUS {
        let markup = detect(raw);
        let before = extract(&markup);
        for blank in &before {
            for text in ["value", " "] {
                let filled = fill(&markup, &blank.id, text).unwrap();
                let after = extract(&filled);
                assert_eq!(after.len(), before.len());
                let hit = after.iter().find(|b| b.id == blank.id).unwrap();
                assert!(hit.is_filled(), "input: {raw:?} text {text:?}");
                assert_eq!(hit.content(), Some(text));
            }
        }
    }
}

#[test]
fn insert_adds_exactly_one_empty_blank() {
    for (raw, _) in CORPUS {
        let markup = detect(raw);
        let before = extract(&markup).len();
        let len = markup.chars().count();
        for caret in [0, len / 3, len / 2, len] {
            let inserted = insert(&markup, caret, 10).unwrap();
            let after = extract(&inserted.markup);
            assert_eq!(after.len(), before + 1, "input: {raw:?} caret {caret}");
            let new = after.iter().find(|b| b.id == inserted.blank.id).unwrap();
            assert!(!new.is_filled());
            assert_eq!(new.length, 10);
        }
    }
}

#[test]
fn insert_past_end_is_rejected() {
    let markup = detect("A ___");
    let len = markup.chars().count();
    let err = insert(&markup, len + 1, 10).unwrap_err();
    assert!(err.is_recoverable());
    assert!(matches!(err, BlankFillError::InvalidPosition { .. }));
}

#[test]
fn export_never_loses_filled_content() {
    let config = EngineConfig::default();
    for (raw, _) in CORPUS {
        let mut doc = Document::new("d", detect(raw), DocumentType::System);
        let ids: Vec<String> = doc.blank_spaces().iter().map(|b| b.id.clone()).collect();
        let values: Vec<String> = (0..ids.len()).map(|i| format!("value-{i}")).collect();
        for (id, value) in ids.iter().zip(&values) {
            doc.fill_blank(id, value).unwrap();
        }

        let artifact = convert::export(&doc, ExportFormat::Text, &config).unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();
        for value in &values {
            assert!(text.contains(value.as_str()), "{value} missing from {text:?}");
        }
        assert!(no_marker_syntax(&text), "marker left in {text:?}");
    }
}

#[test]
fn clearing_a_fill_restores_the_placeholder() {
    let markup = detect("Name: .......");
    let id = extract(&markup)[0].id.clone();
    let filled = fill(&markup, &id, "Jane").unwrap();
    let cleared = fill(&filled, &id, "").unwrap();

    let blank = &extract(&cleared)[0];
    assert!(!blank.is_filled());
    assert_eq!(blank.length, 7);
}

// ── Named variables ──────────────────────────────────────────────────────────

#[test]
fn partial_substitution_leaves_unbound_names() {
    assert_eq!(
        substitute("Hi {{a}} and {{b}}", &bind(&[("a", "X")])),
        "Hi X and {{b}}"
    );
}

#[test]
fn variable_extraction_dedups_in_order() {
    assert_eq!(extract_variables("{{x}} {{y}} {{x}}"), vec!["x", "y"]);
}

#[test]
fn template_authoring_and_population() {
    let mut template = VariableTemplate::new("Receipt", "Received from ______ the sum of [amount].");
    assert!(template.promote_placeholder("______", "payer"));
    assert!(template.promote_placeholder("[amount]", "amount"));
    assert_eq!(template.variables(), ["payer", "amount"]);

    let mut catalog = TemplateCatalog::new();
    let id = catalog.register(template);
    let out = catalog
        .populate(&id, &bind(&[("payer", "Ada"), ("amount", "£5")]))
        .unwrap();
    assert_eq!(out, "Received from Ada the sum of £5.");
}
