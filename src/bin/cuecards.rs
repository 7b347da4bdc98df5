//! CLI binary for cuecards.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `FlashcardConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use cuecards::{
    build_to_file, inspect, AnswerLayout, BuildProgressCallback, FlashcardConfig, PageKind,
    ProgressCallback, DEFAULT_FILE_NAME,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the whole document plus a log
/// line per finished page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Spinner until `on_build_start` tells us the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading cards…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Laying out");
    }
}

impl BuildProgressCallback for CliProgressCallback {
    fn on_build_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Building {total_pages} pages…"))
        ));
    }

    fn on_page_complete(
        &self,
        page_num: usize,
        total_pages: usize,
        kind: PageKind,
        populated_sections: usize,
    ) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<9}  {}",
            green("✓"),
            page_num,
            total_pages,
            kind.title(),
            dim(&format!("{populated_sections} cards")),
        ));
        self.bar.inc(1);
    }

    fn on_build_complete(&self, total_pages: usize, byte_len: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages written  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("{byte_len} bytes")),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Build Flashcards.pdf in the current directory
  cuecards cards.json

  # Choose the output path
  cuecards cards.txt -o biology.pdf

  # Rich text exported from a word processor
  cuecards notes.rtf -o notes.pdf

  # Print answers in their own column, right of a vertical cut line
  cuecards --answer-layout split --gutter 10 cards.json

  # Count cards and pages without writing anything
  cuecards --inspect-only cards.json

  # Machine-readable build stats
  cuecards --json cards.json > stats.json

INPUT FORMAT:
  A JSON array of objects with string "question" and "answer" fields:

    [
      {"question": "Capital of France?", "answer": "Paris"},
      {"question": "2 + 2?", "answer": "4"}
    ]

  Curly quotes and dashes pasted from an editor are straightened before
  parsing. Extra fields are ignored. Use \n inside a string for a line break.

LAYOUT:
  Four cards per sheet. Page 1 holds questions 1-4, page 2 the matching
  answers in the same slots, page 3 questions 5-8, and so on. Print
  double-sided, cut along the dashed lines.

ENVIRONMENT VARIABLES:
  RUST_LOG                Override the log filter (e.g. cuecards=debug)
  CUECARDS_OUTPUT         Default for --output
  CUECARDS_ANSWER_LAYOUT  Default for --answer-layout
"#;

/// Lay out question/answer flashcards as a printable PDF.
#[derive(Parser, Debug)]
#[command(
    name = "cuecards",
    version,
    about = "Lay out question/answer flashcards as a printable PDF",
    long_about = "Read a .json, .txt or .rtf file holding a JSON array of question/answer \
pairs and write a double-sided, cut-ready PDF: four questions per page, each followed by a \
page of the matching answers in the same positions.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Card file: .json, .txt or .rtf.
    input: PathBuf,

    /// Where to write the PDF.
    #[arg(short, long, env = "CUECARDS_OUTPUT", default_value = DEFAULT_FILE_NAME)]
    output: PathBuf,

    /// Answer page column: shared (same column as questions) or split.
    #[arg(
        long,
        env = "CUECARDS_ANSWER_LAYOUT",
        value_enum,
        default_value = "shared"
    )]
    answer_layout: AnswerLayoutArg,

    /// Space between the vertical cut line and answer text (split layout).
    #[arg(long, env = "CUECARDS_GUTTER", default_value_t = 8.0)]
    gutter: f32,

    /// Document title stored in the PDF metadata.
    #[arg(long, env = "CUECARDS_TITLE", default_value = "Flashcards")]
    title: String,

    /// Write uncompressed content streams (readable in a text editor).
    #[arg(long, env = "CUECARDS_NO_COMPRESS")]
    no_compress: bool,

    /// Print build stats as JSON on stdout.
    #[arg(long, env = "CUECARDS_JSON")]
    json: bool,

    /// Parse the input and report counts only, no PDF is written.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "CUECARDS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CUECARDS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CUECARDS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum AnswerLayoutArg {
    Shared,
    Split,
}

impl AnswerLayoutArg {
    fn into_layout(self, gutter: f32) -> AnswerLayout {
        match self {
            AnswerLayoutArg::Shared => AnswerLayout::SharedColumn,
            AnswerLayoutArg::Split => AnswerLayout::SplitColumn { gutter },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn BuildProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let stats = inspect(&cli.input, &config)
            .await
            .context("Failed to read cards")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
            );
        } else {
            println!("File:           {}", cli.input.display());
            println!("Cards:          {}", stats.record_count);
            println!("Page pairs:     {}", stats.group_count);
            println!("Pages:          {}", stats.page_count);
            if stats.dropped_lines > 0 {
                println!(
                    "Truncated:      {} {}",
                    stats.dropped_lines,
                    yellow("lines do not fit their card")
                );
            }
        }
        return Ok(());
    }

    // ── Build ────────────────────────────────────────────────────────────
    let stats = build_to_file(&cli.input, &cli.output, &config)
        .await
        .context("Build failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{}  {} cards  {} pages  {}ms  →  {}",
            green("✔"),
            stats.record_count,
            stats.page_count,
            stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
        if stats.dropped_lines > 0 {
            eprintln!(
                "   {} {} wrapped lines did not fit and were left out",
                yellow("⚠"),
                stats.dropped_lines
            );
        }
    }

    Ok(())
}

/// Map CLI args to `FlashcardConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<FlashcardConfig> {
    let file_name = cli
        .output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

    let mut builder = FlashcardConfig::builder()
        .answer_layout(cli.answer_layout.clone().into_layout(cli.gutter))
        .title(cli.title.clone())
        .file_name(file_name)
        .compress(!cli.no_compress);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
