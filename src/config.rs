//! Configuration types for flashcard document builds.
//!
//! Page geometry is an explicit, immutable [`PageGeometry`] value handed to
//! the layout engine, so tests (and callers printing on A4) can vary the page
//! without touching the algorithm. The rest of a build's settings live in
//! [`FlashcardConfig`], built via its [`FlashcardConfigBuilder`].

use crate::error::FlashcardError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default suggested name for the produced document.
pub const DEFAULT_FILE_NAME: &str = "Flashcards.pdf";

/// Fixed page grid, in PDF points (1/72 inch).
///
/// The origin is the bottom-left corner of the page; `y` grows upwards.
/// Defaults describe a US Letter portrait sheet split into four cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width. Default: 612.
    pub page_width: f32,
    /// Page height. Default: 792.
    pub page_height: f32,
    /// Distance from the page top to the top of section 0. Default: 80.
    pub top_margin: f32,
    /// Distance from the bottom of the last section to the page bottom. Default: 40.
    pub bottom_margin: f32,
    /// Left and right margin. Default: 40.
    pub side_margin: f32,
    /// Number of equal-height sections per page, i.e. cards per group. Default: 4.
    pub sections_per_page: usize,
    /// Inset of text from a section's top and bottom boundaries. Default: 20.
    pub section_padding: f32,
    /// Baseline-to-baseline distance of wrapped lines. Default: 18.
    pub line_height: f32,
    /// Font size of card text. Default: 14.
    pub body_font_size: f32,
    /// Font size of the page title. Default: 16.
    pub title_font_size: f32,
    /// Distance from the page top to the title baseline. Default: 50.
    pub title_offset: f32,
    /// Fraction of the usable width card text wraps to. Default: 0.6.
    pub wrap_factor: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            top_margin: 80.0,
            bottom_margin: 40.0,
            side_margin: 40.0,
            sections_per_page: 4,
            section_padding: 20.0,
            line_height: 18.0,
            body_font_size: 14.0,
            title_font_size: 16.0,
            title_offset: 50.0,
            wrap_factor: 0.6,
        }
    }
}

impl PageGeometry {
    /// Width between the left and right margins.
    pub fn usable_width(&self) -> f32 {
        self.page_width - 2.0 * self.side_margin
    }

    /// Height between the top and bottom margins.
    pub fn usable_height(&self) -> f32 {
        self.page_height - self.top_margin - self.bottom_margin
    }

    pub fn section_height(&self) -> f32 {
        self.usable_height() / self.sections_per_page as f32
    }

    /// Top boundary of section `k` (0 = topmost).
    pub fn section_top(&self, k: usize) -> f32 {
        self.page_height - self.top_margin - self.section_height() * k as f32
    }

    /// Lowest baseline a text line in section `k` may sit on.
    pub fn section_bottom_limit(&self, k: usize) -> f32 {
        self.section_top(k) - self.section_height() + self.section_padding
    }

    /// Heights of the internal boundaries between adjacent sections, top-down.
    pub fn boundaries(&self) -> impl Iterator<Item = f32> + '_ {
        (1..self.sections_per_page).map(move |k| self.section_top(k))
    }

    /// Maximum line width of card text in the left (question) column.
    pub fn wrap_width(&self) -> f32 {
        self.usable_width() * self.wrap_factor
    }

    /// x coordinate of the boundary between the question column and the
    /// remaining space on the right.
    pub fn column_split_x(&self) -> f32 {
        self.side_margin + self.wrap_width()
    }

    pub fn title_baseline(&self) -> f32 {
        self.page_height - self.title_offset
    }

    /// Check the geometry describes a drawable page.
    pub fn validate(&self) -> Result<(), FlashcardError> {
        let positive = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("line_height", self.line_height),
            ("body_font_size", self.body_font_size),
            ("title_font_size", self.title_font_size),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(FlashcardError::InvalidConfig(format!(
                    "{name} must be a positive number, got {v}"
                )));
            }
        }
        let non_negative = [
            ("top_margin", self.top_margin),
            ("bottom_margin", self.bottom_margin),
            ("side_margin", self.side_margin),
            ("section_padding", self.section_padding),
            ("title_offset", self.title_offset),
        ];
        for (name, v) in non_negative {
            if !(v.is_finite() && v >= 0.0) {
                return Err(FlashcardError::InvalidConfig(format!(
                    "{name} must be ≥ 0, got {v}"
                )));
            }
        }
        if self.sections_per_page == 0 {
            return Err(FlashcardError::InvalidConfig(
                "sections_per_page must be ≥ 1".into(),
            ));
        }
        if self.usable_width() <= 0.0 {
            return Err(FlashcardError::InvalidConfig(format!(
                "side margins ({}) leave no usable width on a {}-wide page",
                self.side_margin, self.page_width
            )));
        }
        if self.usable_height() <= 0.0 {
            return Err(FlashcardError::InvalidConfig(format!(
                "top/bottom margins ({}/{}) leave no usable height on a {}-high page",
                self.top_margin, self.bottom_margin, self.page_height
            )));
        }
        if !(self.wrap_factor > 0.0 && self.wrap_factor <= 1.0) {
            return Err(FlashcardError::InvalidConfig(format!(
                "wrap_factor must be in (0, 1], got {}",
                self.wrap_factor
            )));
        }
        Ok(())
    }
}

/// Appearance of the printed cutting guides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideStyle {
    /// Length of one dash segment. Default: 8.
    pub dash_length: f32,
    /// Space between dash segments. Default: 6.
    pub dash_gap: f32,
    /// Stroke thickness of dashes and crop marks. Default: 0.8.
    pub thickness: f32,
    /// How far dashed separators stop short of the margins. Default: 4.
    pub inset: f32,
    /// Length of a crop-mark tick. Default: 8.
    pub crop_mark_length: f32,
    /// Distance of crop-mark ticks outside the margin. Default: 12.
    pub crop_mark_offset: f32,
    /// DeviceGray level of all guides (0 = black). Default: 0.3.
    pub gray: f32,
}

impl Default for GuideStyle {
    fn default() -> Self {
        Self {
            dash_length: 8.0,
            dash_gap: 6.0,
            thickness: 0.8,
            inset: 4.0,
            crop_mark_length: 8.0,
            crop_mark_offset: 12.0,
            gray: 0.3,
        }
    }
}

impl GuideStyle {
    pub fn validate(&self) -> Result<(), FlashcardError> {
        if !(self.dash_length > 0.0) {
            return Err(FlashcardError::InvalidConfig(format!(
                "dash_length must be > 0, got {}",
                self.dash_length
            )));
        }
        if !(self.dash_gap >= 0.0) || !(self.thickness > 0.0) || !(self.crop_mark_length >= 0.0) {
            return Err(FlashcardError::InvalidConfig(
                "dash_gap and crop_mark_length must be ≥ 0 and thickness > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.gray) {
            return Err(FlashcardError::InvalidConfig(format!(
                "gray must be within 0–1, got {}",
                self.gray
            )));
        }
        Ok(())
    }
}

/// Where answer text goes on the Answers page.
///
/// Two printed layouts are in circulation and neither is canonical, so the
/// choice is explicit configuration rather than a hidden default:
///
/// | Variant | Answer column | Extra guide |
/// |---------|---------------|-------------|
/// | `SharedColumn` | same left 0.6-width column as questions (default) | none |
/// | `SplitColumn`  | remaining right column, `gutter` units right of the split | vertical dashed cut line |
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AnswerLayout {
    #[default]
    SharedColumn,
    SplitColumn {
        /// Space between the vertical cut line and the answer text.
        gutter: f32,
    },
}

impl AnswerLayout {
    /// Split layout with the default 8-unit gutter.
    pub fn split() -> Self {
        AnswerLayout::SplitColumn { gutter: 8.0 }
    }
}

/// Configuration for a flashcard document build.
///
/// Built via [`FlashcardConfig::builder()`] or using
/// [`FlashcardConfig::default()`].
///
/// # Example
/// ```rust
/// use cuecards::{AnswerLayout, FlashcardConfig};
///
/// let config = FlashcardConfig::builder()
///     .answer_layout(AnswerLayout::split())
///     .title("Biology revision")
///     .build()
///     .unwrap();
/// assert_eq!(config.geometry.sections_per_page, 4);
/// ```
#[derive(Clone)]
pub struct FlashcardConfig {
    /// Page grid. Default: US Letter, four sections.
    pub geometry: PageGeometry,

    /// Dashed separator and crop-mark styling.
    pub guides: GuideStyle,

    /// Answer-page column policy. Default: [`AnswerLayout::SharedColumn`].
    pub answer_layout: AnswerLayout,

    /// Title stored in the PDF Info dictionary. Default: "Flashcards".
    pub title: String,

    /// Name handed to a [`crate::sink::DocumentSink`]. Default: `Flashcards.pdf`.
    pub file_name: String,

    /// Flate-compress page content streams. Default: true.
    pub compress: bool,

    /// Optional per-page progress reporting.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for FlashcardConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            guides: GuideStyle::default(),
            answer_layout: AnswerLayout::default(),
            title: "Flashcards".to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            compress: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for FlashcardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlashcardConfig")
            .field("geometry", &self.geometry)
            .field("guides", &self.guides)
            .field("answer_layout", &self.answer_layout)
            .field("title", &self.title)
            .field("file_name", &self.file_name)
            .field("compress", &self.compress)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BuildProgressCallback>"),
            )
            .finish()
    }
}

impl FlashcardConfig {
    /// Create a new builder for `FlashcardConfig`.
    pub fn builder() -> FlashcardConfigBuilder {
        FlashcardConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check every constraint the builder enforces. The build entry points
    /// call this too, since the fields are public and a config may be
    /// assembled without the builder.
    pub fn validate(&self) -> Result<(), FlashcardError> {
        self.geometry.validate()?;
        self.guides.validate()?;
        if let AnswerLayout::SplitColumn { gutter } = self.answer_layout {
            let right_column = self.geometry.usable_width() - self.geometry.wrap_width();
            if gutter.is_nan() || gutter < 0.0 || gutter >= right_column {
                return Err(FlashcardError::InvalidConfig(format!(
                    "split-column gutter must be within 0–{right_column}, got {gutter}"
                )));
            }
        }
        if self.file_name.trim().is_empty() {
            return Err(FlashcardError::InvalidConfig(
                "file_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`FlashcardConfig`].
#[derive(Debug)]
pub struct FlashcardConfigBuilder {
    config: FlashcardConfig,
}

impl FlashcardConfigBuilder {
    pub fn geometry(mut self, geometry: PageGeometry) -> Self {
        self.config.geometry = geometry;
        self
    }

    pub fn guides(mut self, guides: GuideStyle) -> Self {
        self.config.guides = guides;
        self
    }

    pub fn answer_layout(mut self, layout: AnswerLayout) -> Self {
        self.config.answer_layout = layout;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.file_name = name.into();
        self
    }

    pub fn compress(mut self, v: bool) -> Self {
        self.config.compress = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<FlashcardConfig, FlashcardError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
