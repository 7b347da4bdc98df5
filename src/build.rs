//! Document build entry points.
//!
//! [`build`] is the core operation: ordered card records in, PDF bytes out.
//! The remaining functions wrap it with the input normalizer on one side and
//! a [`DocumentSink`] on the other.

use crate::config::FlashcardConfig;
use crate::error::FlashcardError;
use crate::output::{BuildStats, CardRecord, FlashcardDocument};
use crate::pipeline::layout::{LayoutEngine, PageKind, PagePlan};
use crate::pipeline::{normalize, pdf};
use crate::sink::{self, DocumentSink};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Build a flashcard PDF from an ordered sequence of records.
///
/// Record `i` is printed in page pair `i / sections_per_page`, in slot
/// `i % sections_per_page` of both its Questions and its Answers page. An
/// empty slice yields a valid zero-page document.
///
/// Layout runs on the calling task; serialisation runs on tokio's blocking
/// pool and is awaited before returning.
///
/// # Errors
/// [`FlashcardError::InvalidConfig`] when `config` fails validation, otherwise
/// only [`FlashcardError::SerializationFailed`] or
/// [`FlashcardError::Internal`]; any string content lays out successfully.
pub async fn build(
    records: &[CardRecord],
    config: &FlashcardConfig,
) -> Result<FlashcardDocument, FlashcardError> {
    config.validate()?;
    let total_start = Instant::now();
    let engine = LayoutEngine::from_config(config);
    let total_pages = engine.page_count(records.len());
    info!(
        "Building flashcards: {} cards → {} pages",
        records.len(),
        total_pages
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_build_start(total_pages);
    }

    // ── Step 1: Lay out pages in order ───────────────────────────────────
    let layout_start = Instant::now();
    let pages = layout_all(&engine, records, config, total_pages);
    let layout_duration_ms = layout_start.elapsed().as_millis() as u64;

    let dropped_lines: usize = pages.iter().map(PagePlan::dropped_lines).sum();
    if dropped_lines > 0 {
        warn!(
            "{} wrapped line(s) did not fit their section and were left out",
            dropped_lines
        );
    }
    let populated_sections = pages.iter().map(PagePlan::populated_sections).sum();

    // ── Step 2: Serialise ────────────────────────────────────────────────
    let serialize_start = Instant::now();
    let geometry = config.geometry;
    let options = pdf::PdfOptions {
        title: config.title.clone(),
        compress: config.compress,
        guide_gray: config.guides.gray,
    };
    let bytes =
        tokio::task::spawn_blocking(move || pdf::write_document(&pages, &geometry, &options))
            .await
            .map_err(|e| FlashcardError::Internal(format!("Serialise task panicked: {}", e)))??;
    let serialize_duration_ms = serialize_start.elapsed().as_millis() as u64;

    let stats = BuildStats {
        record_count: records.len(),
        group_count: engine.group_count(records.len()),
        page_count: total_pages,
        populated_sections,
        dropped_lines,
        byte_len: bytes.len(),
        layout_duration_ms,
        serialize_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Build complete: {} pages, {} bytes, {}ms total",
        stats.page_count, stats.byte_len, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_build_complete(total_pages, bytes.len());
    }

    Ok(FlashcardDocument { bytes, stats })
}

fn layout_all(
    engine: &LayoutEngine,
    records: &[CardRecord],
    config: &FlashcardConfig,
    total_pages: usize,
) -> Vec<PagePlan> {
    let group_size = engine.group_size();
    let mut pages = Vec::with_capacity(total_pages);

    for (group, chunk) in records.chunks(group_size).enumerate() {
        let first = group * group_size;
        for kind in [PageKind::Questions, PageKind::Answers] {
            let page = engine.layout_page(kind, group, first, chunk);
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_complete(pages.len() + 1, total_pages, kind, page.populated_sections());
            }
            pages.push(page);
        }
    }
    debug!("Laid out {} pages", pages.len());
    pages
}

/// Synchronous wrapper around [`build`].
///
/// Creates a temporary tokio runtime internally; do not call from inside an
/// async context.
pub fn build_sync(
    records: &[CardRecord],
    config: &FlashcardConfig,
) -> Result<FlashcardDocument, FlashcardError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FlashcardError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(build(records, config))
}

/// Read a `.json`, `.txt` or `.rtf` card file and build its PDF.
///
/// Input errors halt before layout, so no partial document is produced.
pub async fn build_from_file(
    input: impl AsRef<Path>,
    config: &FlashcardConfig,
) -> Result<FlashcardDocument, FlashcardError> {
    let records = normalize::read_records(input).await?;
    build(&records, config).await
}

/// Build from a card file and write the PDF to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn build_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &FlashcardConfig,
) -> Result<BuildStats, FlashcardError> {
    let document = build_from_file(input, config).await?;
    let path = output_path.as_ref().to_path_buf();

    let FlashcardDocument { bytes, stats } = document;
    let target = path.clone();
    tokio::task::spawn_blocking(move || sink::write_atomic(&target, &bytes))
        .await
        .map_err(|e| FlashcardError::Internal(format!("Write task panicked: {}", e)))??;

    info!("Saved {}", path.display());
    Ok(stats)
}

/// Build from records and hand the PDF to `sink` under the configured file
/// name. Returns the build stats and the location reported by the sink.
pub async fn build_to_sink(
    records: &[CardRecord],
    config: &FlashcardConfig,
    sink: &dyn DocumentSink,
) -> Result<(BuildStats, String), FlashcardError> {
    let document = build(records, config).await?;
    let location = sink.deliver(&document.bytes, &config.file_name)?;
    Ok((document.stats, location))
}

/// Parse a card file and report what building it would produce, without
/// serialising anything.
pub async fn inspect(
    input: impl AsRef<Path>,
    config: &FlashcardConfig,
) -> Result<BuildStats, FlashcardError> {
    config.validate()?;
    let records = normalize::read_records(input).await?;
    let engine = LayoutEngine::from_config(config);
    let pages = engine.paginate(&records);
    Ok(BuildStats {
        record_count: records.len(),
        group_count: engine.group_count(records.len()),
        page_count: pages.len(),
        populated_sections: pages.iter().map(PagePlan::populated_sections).sum(),
        dropped_lines: pages.iter().map(PagePlan::dropped_lines).sum(),
        ..BuildStats::default()
    })
}
