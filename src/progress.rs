//! Progress-callback trait for per-page build events.
//!
//! Inject an [`Arc<dyn BuildProgressCallback>`] via
//! [`crate::config::FlashcardConfigBuilder::progress_callback`] to receive
//! events as the layout engine finishes each page.
//!
//! # Example
//!
//! ```rust
//! use cuecards::{BuildProgressCallback, FlashcardConfig, PageKind};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl BuildProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, kind: PageKind, _populated: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} page {}/{}", kind.title(), page_num, total_pages);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { pages: AtomicUsize::new(0) });
//!
//! let config = FlashcardConfig::builder()
//!     .progress_callback(counter as Arc<dyn BuildProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::layout::PageKind;
use std::sync::Arc;

/// Called by the build pipeline as it lays out each page.
///
/// Pages are always produced in order on a single task, but the trait is
/// `Send + Sync` so a callback can be shared with whatever thread renders it.
/// All methods have default no-op implementations.
pub trait BuildProgressCallback: Send + Sync {
    /// Called once before the first page is laid out.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages the document will have
    fn on_build_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page's text and guides are placed.
    ///
    /// # Arguments
    /// * `page_num`           — 1-indexed page number
    /// * `total_pages`        — total pages in the document
    /// * `kind`               — Questions or Answers
    /// * `populated_sections` — sections on this page holding a card
    fn on_page_complete(
        &self,
        page_num: usize,
        total_pages: usize,
        kind: PageKind,
        populated_sections: usize,
    ) {
        let _ = (page_num, total_pages, kind, populated_sections);
    }

    /// Called once after the document has been serialised.
    ///
    /// # Arguments
    /// * `total_pages` — pages in the finished document
    /// * `byte_len`    — size of the PDF in bytes
    fn on_build_complete(&self, total_pages: usize, byte_len: usize) {
        let _ = (total_pages, byte_len);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BuildProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::FlashcardConfig`].
pub type ProgressCallback = Arc<dyn BuildProgressCallback>;
