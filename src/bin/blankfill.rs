//! CLI binary for blankfill.
//!
//! A thin shim over the library crate: each subcommand loads a document from
//! a `JsonFileStore`, calls one library operation, saves, and prints a
//! short result.

use anyhow::{bail, Context, Result};
use blankfill::{
    export_to_file, find_candidates, ingest_file, BlankFillError, Document, DocumentStore,
    DocumentType, EngineConfig, ExportFormat, JsonFileStore, VariableTemplate,
};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Import a form and list its blanks
  blankfill import lease.docx
  blankfill show 3f2c…

  # Fill a blank, then export as Word
  blankfill fill 3f2c… blank_1718000000000_1 "Jane Doe"
  blankfill export 3f2c… --format word --out-dir out/

  # Add a blank at character 42, 15 wide
  blankfill --insert-width 15 insert 3f2c… 42

  # Named-variable templates (no store involved)
  blankfill vars letter.txt --candidates
  blankfill render letter.txt --set name=Ada --set city=London

ENVIRONMENT VARIABLES:
  BLANKFILL_STORE          Store directory (default: .blankfill)
  BLANKFILL_INSERT_WIDTH   Width of inserted blanks
  BLANKFILL_UNFILLED_CHAR  Glyph for unfilled blanks in exports
  RUST_LOG                 Overrides --verbose / --quiet
"#;

/// Find, fill and export the blanks in fill-in-the-blank documents.
#[derive(Parser, Debug)]
#[command(
    name = "blankfill",
    version,
    about = "Find, fill and export the blanks in fill-in-the-blank documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding stored documents.
    #[arg(long, global = true, env = "BLANKFILL_STORE", default_value = ".blankfill")]
    store: PathBuf,

    /// Width of blanks created by `insert`.
    #[arg(long, global = true, env = "BLANKFILL_INSERT_WIDTH", default_value_t = 10)]
    insert_width: usize,

    /// Largest accepted upload in bytes.
    #[arg(long, global = true, env = "BLANKFILL_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    max_upload_bytes: usize,

    /// Import markup as-is, without pattern detection.
    #[arg(long, global = true, env = "BLANKFILL_NO_DETECT")]
    no_detect: bool,

    /// Glyph repeated for unfilled blanks in text and word exports.
    #[arg(long, global = true, env = "BLANKFILL_UNFILLED_CHAR", default_value_t = '_')]
    unfilled_char: char,

    /// Disable progress bar.
    #[arg(long, global = true, env = "BLANKFILL_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "BLANKFILL_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "BLANKFILL_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest files (.docx, .txt, .html) and print their document ids.
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List stored documents, most recently modified first.
    List {
        #[arg(long = "type", value_enum)]
        doc_type: Option<TypeArg>,
    },
    /// Show a document's blanks.
    Show {
        doc: String,
        /// Print the full document record as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Fill a blank. Empty text clears it.
    Fill {
        doc: String,
        blank_id: String,
        text: String,
    },
    /// Insert an empty blank at a character offset.
    Insert { doc: String, position: usize },
    /// Re-run pattern detection over a document.
    Detect { doc: String },
    /// Copy a document's current content into a new template.
    Clone { doc: String, name: String },
    /// Discard all edits and restore the imported content.
    Reset { doc: String },
    /// Remove a document from the store.
    Delete { doc: String },
    /// Export a document to a file.
    Export {
        doc: String,
        #[arg(short, long, value_enum, default_value = "word")]
        format: FormatArg,
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// List the {{variables}} in a template file.
    Vars {
        file: PathBuf,
        /// Also list placeholder-looking literals worth promoting.
        #[arg(long)]
        candidates: bool,
    },
    /// Substitute {{variables}} in a template file and print the result.
    Render {
        file: PathBuf,
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_binding)]
        bindings: Vec<(String, String)>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TypeArg {
    System,
    Template,
}

impl From<TypeArg> for DocumentType {
    fn from(v: TypeArg) -> Self {
        match v {
            TypeArg::System => DocumentType::System,
            TypeArg::Template => DocumentType::Template,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Word,
    Markup,
    Text,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Word => ExportFormat::Word,
            FormatArg::Markup => ExportFormat::Markup,
            FormatArg::Text => ExportFormat::Text,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

fn parse_binding(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    let open_store = || {
        JsonFileStore::open(&cli.store)
            .with_context(|| format!("Failed to open store at {}", cli.store.display()))
    };

    match &cli.command {
        Command::Import { files } => import(&cli, &config, &mut open_store()?, files)?,
        Command::List { doc_type } => {
            let store = open_store()?;
            let docs = match doc_type {
                Some(t) => store.list_by_type((*t).into())?,
                None => store.list()?,
            };
            for doc in &docs {
                let p = doc.progress();
                println!(
                    "{}  {:<8}  {:>3}/{:<3}  {}",
                    doc.id(),
                    doc.doc_type().to_string(),
                    p.filled,
                    p.total,
                    bold(doc.name())
                );
            }
            if docs.is_empty() && !cli.quiet {
                eprintln!("{}", dim("No documents."));
            }
        }
        Command::Show { doc, json } => {
            let doc = load(&open_store()?, doc)?;
            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&doc).context("Failed to serialise document")?
                );
            } else {
                print_blanks(&doc);
            }
        }
        Command::Fill { doc, blank_id, text } => {
            let mut store = open_store()?;
            let mut doc = load(&store, doc)?;
            doc.fill_blank(blank_id, text)
                .map_err(with_hint)
                .context("Fill failed")?;
            store.save(&mut doc)?;
            report(&cli, &doc, &format!("Filled {blank_id}"));
        }
        Command::Insert { doc, position } => {
            let mut store = open_store()?;
            let mut doc = load(&store, doc)?;
            let blank = doc
                .insert_blank(*position, config.insert_width)
                .map_err(with_hint)
                .context("Insert failed")?;
            store.save(&mut doc)?;
            println!("{}", blank.id);
            report(&cli, &doc, &format!("Inserted blank at {}", blank.position));
        }
        Command::Detect { doc } => {
            let mut store = open_store()?;
            let mut doc = load(&store, doc)?;
            let added = doc.redetect();
            store.save(&mut doc)?;
            report(&cli, &doc, &format!("Detected {added} new blanks"));
        }
        Command::Clone { doc, name } => {
            let mut store = open_store()?;
            let source = load(&store, doc)?;
            let mut copy = source.clone_as_template(name.as_str());
            store.save(&mut copy)?;
            println!("{}", copy.id());
            report(&cli, &copy, &format!("Cloned '{}' as template", source.name()));
        }
        Command::Reset { doc } => {
            let mut store = open_store()?;
            let mut doc = load(&store, doc)?;
            doc.reset();
            store.save(&mut doc)?;
            report(&cli, &doc, "Reset to imported content");
        }
        Command::Delete { doc } => {
            open_store()?.delete(doc)?;
            if !cli.quiet {
                eprintln!("{} Deleted {}", green("✔"), doc);
            }
        }
        Command::Export {
            doc,
            format,
            out_dir,
        } => {
            let doc = load(&open_store()?, doc)?;
            let path = export_to_file(&doc, (*format).into(), out_dir, &config)
                .context("Export failed")?;
            if !cli.quiet {
                eprintln!(
                    "{} {}  →  {}",
                    green("✔"),
                    doc.name(),
                    bold(&path.display().to_string())
                );
            }
        }
        Command::Vars { file, candidates } => vars(file, *candidates)?,
        Command::Render { file, bindings } => render(file, bindings)?,
    }

    Ok(())
}

/// Map CLI args to `EngineConfig`.
fn build_config(cli: &Cli) -> Result<EngineConfig> {
    EngineConfig::builder()
        .insert_width(cli.insert_width)
        .max_upload_bytes(cli.max_upload_bytes)
        .detect_on_ingest(!cli.no_detect)
        .unfilled_char(cli.unfilled_char)
        .build()
        .context("Invalid configuration")
}

fn load(store: &JsonFileStore, id: &str) -> Result<Document> {
    store
        .load(id)
        .with_context(|| format!("Failed to load document '{id}'"))
}

/// Recoverable errors get a hint on what to try next.
fn with_hint(e: BlankFillError) -> anyhow::Error {
    let hint = match &e {
        BlankFillError::BlankNotFound { .. } => Some("run `blankfill show <doc>` for current ids"),
        BlankFillError::InvalidPosition { .. } => Some("positions count characters of the markup"),
        _ => None,
    };
    match hint {
        Some(h) => anyhow::Error::new(e).context(format!("hint: {h}")),
        None => e.into(),
    }
}

fn report(cli: &Cli, doc: &Document, what: &str) {
    if cli.quiet {
        return;
    }
    let p = doc.progress();
    eprintln!(
        "{} {}  {}",
        green("✔"),
        what,
        dim(&format!("{}/{} filled", p.filled, p.total))
    );
}

fn print_blanks(doc: &Document) {
    let p = doc.progress();
    println!("{}  {}", bold(doc.name()), dim(doc.id()));
    println!(
        "{}  {}/{} filled{}",
        doc.doc_type(),
        p.filled,
        p.total,
        if p.is_complete() && p.total > 0 {
            format!("  {}", green("complete"))
        } else {
            String::new()
        }
    );
    for blank in doc.blank_spaces() {
        let (mark, value) = match blank.content() {
            Some(text) => (green("✓"), text.to_string()),
            None => (dim("·"), dim(&blank.placeholder().unwrap_or_default())),
        };
        println!(
            "  {} {:<32} {:>6} {:>4}  {}",
            mark, blank.id, blank.position, blank.length, value
        );
    }
}

fn import(
    cli: &Cli,
    config: &EngineConfig,
    store: &mut JsonFileStore,
    files: &[PathBuf],
) -> Result<()> {
    let bar = if files.len() > 1 && !cli.quiet && !cli.no_progress {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Importing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let mut failed = 0usize;
    for path in files {
        if let Some(ref bar) = bar {
            bar.set_message(path.display().to_string());
        }
        let line = match ingest_file(path, config).and_then(|mut doc| {
            store.save(&mut doc)?;
            Ok(doc)
        }) {
            Ok(doc) => {
                println!("{}", doc.id());
                format!(
                    "  {} {:<40} {}",
                    green("✓"),
                    doc.name(),
                    dim(&format!("{} blanks", doc.blank_spaces().len()))
                )
            }
            Err(e) => {
                failed += 1;
                format!("  {} {:<40} {}", red("✗"), path.display(), red(&e.to_string()))
            }
        };
        match bar {
            Some(ref bar) => {
                bar.println(line);
                bar.inc(1);
            }
            None if !cli.quiet => eprintln!("{line}"),
            None => {}
        }
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
        eprintln!(
            "{} {}/{} files imported",
            if failed == 0 { green("✔") } else { cyan("⚠") },
            bold(&(files.len() - failed).to_string()),
            files.len()
        );
    }

    if failed > 0 {
        bail!("{failed} of {} files could not be imported", files.len());
    }
    Ok(())
}

fn vars(file: &Path, candidates: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read template from {:?}", file))?;
    let template = VariableTemplate::new(file.display().to_string(), content);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for name in template.variables() {
        writeln!(out, "{name}").context("Failed to write to stdout")?;
    }
    if candidates {
        for c in find_candidates(template.content()) {
            writeln!(
                out,
                "{} {:>6} {:>4}  {}",
                cyan("?"),
                c.position,
                c.length,
                c.text
            )
            .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn render(file: &Path, bindings: &[(String, String)]) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read template from {:?}", file))?;
    let template = VariableTemplate::new(file.display().to_string(), content);
    let bindings: HashMap<String, String> = bindings.iter().cloned().collect();

    let unbound = template.unbound(&bindings);
    if !unbound.is_empty() {
        eprintln!(
            "{} unbound: {}",
            cyan("⚠"),
            unbound
                .iter()
                .map(|n| format!("{{{{{n}}}}}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let rendered = template.render(&bindings);
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(rendered.as_bytes())
        .context("Failed to write to stdout")?;
    if !rendered.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}
