//! Error types for the cuecards library.
//!
//! The layout engine itself cannot fail on well-formed records: any string
//! pair, including empty strings and an empty sequence, lays out cleanly.
//! Every variant here therefore belongs to one of the edges of the pipeline:
//!
//! * **Input** — the file could not be read, has an unsupported extension, or
//!   its content is not a list of question/answer records. These halt the
//!   pipeline before any page is laid out, so no partial document exists.
//!
//! * **Output** — the PDF could not be serialised or written to its
//!   destination.
//!
//! * **Config** — a [`crate::config::FlashcardConfig`] failed validation.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the cuecards library.
#[derive(Debug, Error)]
pub enum FlashcardError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Card file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension is not one of `.json`, `.txt` or `.rtf`.
    #[error("Unsupported file type '{name}'\nPlease upload a .json, .txt, or .rtf file.")]
    UnsupportedFileType { name: String },

    /// Rich-text content could not be reduced to plain text.
    #[error("Could not extract text from rich-text file: {detail}")]
    MalformedMarkup { detail: String },

    /// Content parsed, but is not an array of `{question, answer}` objects.
    #[error(
        "Invalid card format: {detail}\n\
Ensure your file contains ONLY a JSON array of {{\"question\": ..., \"answer\": ...}} objects using straight quotes."
    )]
    InvalidRecordFormat { detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// lopdf refused to encode a content stream or the document.
    #[error("Failed to serialise PDF: {0}")]
    SerializationFailed(String),

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlashcardError {
    /// True for errors raised by the input normalizer, i.e. problems the end
    /// user fixes by editing their card file rather than their setup.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            FlashcardError::UnsupportedFileType { .. }
                | FlashcardError::MalformedMarkup { .. }
                | FlashcardError::InvalidRecordFormat { .. }
        )
    }
}
