//! # cuecards
//!
//! Lay out question/answer flashcards as a printable, cut-ready PDF.
//!
//! ## Why this crate?
//!
//! Double-sided card printing needs every card to land in the same spot on
//! the front and back of a sheet. This crate puts four cards on a Questions
//! page and the matching four answers, in the same slots, on the following
//! Answers page, then draws dashed cut lines and crop marks so the stack can
//! be trimmed with a guillotine.
//!
//! ## Pipeline Overview
//!
//! ```text
//! cards.json / .txt / .rtf
//!  │
//!  ├─ 1. Normalize  decode, strip RTF, fix typographic quotes, parse JSON
//!  ├─ 2. Layout     group by 4, wrap, truncate, place guides (pure)
//!  ├─ 3. Serialise  lopdf, Helvetica/WinAnsi (spawn_blocking)
//!  └─ 4. Deliver    bytes + stats, optionally through a DocumentSink
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cuecards::{build, CardRecord, FlashcardConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cards = vec![
//!         CardRecord::new("Capital of France?", "Paris"),
//!         CardRecord::new("2 + 2?", "4"),
//!     ];
//!     let document = build(&cards, &FlashcardConfig::default()).await?;
//!     std::fs::write("Flashcards.pdf", document.as_bytes())?;
//!     eprintln!("{} pages", document.stats.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cuecards` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! cuecards = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod build;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod sink;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use build::{build, build_from_file, build_sync, build_to_file, build_to_sink, inspect};
pub use config::{
    AnswerLayout, FlashcardConfig, FlashcardConfigBuilder, GuideStyle, PageGeometry,
    DEFAULT_FILE_NAME,
};
pub use error::FlashcardError;
pub use output::{BuildStats, CardRecord, FlashcardDocument};
pub use pipeline::layout::{LayoutEngine, PageKind, PagePlan};
pub use pipeline::normalize::InputFormat;
pub use progress::{BuildProgressCallback, NoopProgressCallback, ProgressCallback};
pub use sink::{DocumentSink, FileSink, MemorySink};
