//! Data types flowing into and out of a build.

use serde::{Deserialize, Serialize};

/// One question/answer pair to be printed.
///
/// Both fields are required; empty strings are allowed and leave the
/// corresponding section blank. Records are never mutated during layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub question: String,
    pub answer: String,
}

impl CardRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A finished flashcard PDF.
#[derive(Debug, Clone, Serialize)]
pub struct FlashcardDocument {
    /// The serialised PDF.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub stats: BuildStats,
}

impl FlashcardDocument {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Counters and timings for one build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Records in the input sequence.
    pub record_count: usize,
    /// Question/answer page pairs, `⌈records / sections_per_page⌉`.
    pub group_count: usize,
    /// Pages in the document (always `2 × group_count`).
    pub page_count: usize,
    /// Sections holding a card, summed over all pages.
    pub populated_sections: usize,
    /// Wrapped lines dropped because they did not fit their section.
    pub dropped_lines: usize,
    /// Size of the serialised PDF.
    pub byte_len: usize,
    pub layout_duration_ms: u64,
    pub serialize_duration_ms: u64,
    pub total_duration_ms: u64,
}
