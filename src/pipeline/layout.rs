//! Fixed-grid page layout.
//!
//! The engine turns an ordered slice of [`CardRecord`]s into [`PagePlan`]s:
//! plain geometry (text runs and filled guide rectangles) that the
//! [`crate::pipeline::pdf`] stage serialises without making any decisions of
//! its own. Keeping placement here means every coordinate the printed sheet
//! depends on can be asserted in a unit test without parsing a PDF.
//!
//! ## Grid
//!
//! ```text
//!   page top ─┬─────────────────────────────────────────
//!             │  Questions                  (title)
//!   top_margin│
//!        ─────┼─ section 0 ──────────────────────────
//!   +      -- │ - - - - - - - - - - - - - - - - - - -  +   boundary 1
//!             │  section 1
//!   +      -- │ - - - - - - - - - - - - - - - - - - -  +   boundary 2
//!             │  section 2
//!   +      -- │ - - - - - - - - - - - - - - - - - - -  +   boundary 3
//!             │  section 3
//!        ─────┼─ bottom_margin ─────────────────────────
//! ```
//!
//! Records are consumed in groups of `sections_per_page`; each group yields a
//! Questions page followed by an Answers page, and record `i` sits in slot
//! `i % sections_per_page` of both pages of pair `i / sections_per_page`.

use crate::config::{AnswerLayout, FlashcardConfig, GuideStyle, PageGeometry};
use crate::output::CardRecord;
use crate::pipeline::font::{standard_font, TextMeasure};
use crate::pipeline::wrap::wrap_text;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Which side of a card a page prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageKind {
    Questions,
    Answers,
}

impl PageKind {
    /// Heading printed at the top of the page.
    pub fn title(self) -> &'static str {
        match self {
            PageKind::Questions => "Questions",
            PageKind::Answers => "Answers",
        }
    }

    fn text(self, record: &CardRecord) -> &str {
        match self {
            PageKind::Questions => &record.question,
            PageKind::Answers => &record.answer,
        }
    }
}

/// A single line of text with its baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub text: String,
}

/// An axis-aligned filled rectangle in the guide colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Horizontal placement of card text on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextColumn {
    pub x: f32,
    pub max_width: f32,
}

/// One of the fixed slots on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPlan {
    /// Slot number, 0 = topmost.
    pub slot: usize,
    /// Top boundary of the section.
    pub top: f32,
    /// Index into the input sequence, `None` for a blank slot.
    pub record_index: Option<usize>,
    pub lines: Vec<TextRun>,
    /// Wrapped lines that did not fit above the bottom padding.
    pub dropped_lines: usize,
}

impl SectionPlan {
    pub fn is_populated(&self) -> bool {
        self.record_index.is_some()
    }
}

/// Everything drawn on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub kind: PageKind,
    /// 0-indexed question/answer pair this page belongs to.
    pub group: usize,
    pub title: TextRun,
    pub sections: Vec<SectionPlan>,
    pub guides: Vec<GuideRect>,
}

impl PagePlan {
    pub fn populated_sections(&self) -> usize {
        self.sections.iter().filter(|s| s.is_populated()).count()
    }

    pub fn dropped_lines(&self) -> usize {
        self.sections.iter().map(|s| s.dropped_lines).sum()
    }

    /// Title followed by every section line, top-down.
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        std::iter::once(&self.title).chain(self.sections.iter().flat_map(|s| s.lines.iter()))
    }
}

/// Lays out card records on the fixed page grid.
///
/// Holds no state between calls: [`LayoutEngine::paginate`] is a pure
/// function of its input records.
#[derive(Clone)]
pub struct LayoutEngine {
    geometry: PageGeometry,
    guides: GuideStyle,
    answer_layout: AnswerLayout,
    measure: Arc<dyn TextMeasure>,
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("geometry", &self.geometry)
            .field("guides", &self.guides)
            .field("answer_layout", &self.answer_layout)
            .finish_non_exhaustive()
    }
}

impl LayoutEngine {
    /// Engine measuring text with the standard document font.
    pub fn new(geometry: PageGeometry, guides: GuideStyle, answer_layout: AnswerLayout) -> Self {
        Self {
            geometry,
            guides,
            answer_layout,
            measure: standard_font(),
        }
    }

    pub fn from_config(config: &FlashcardConfig) -> Self {
        Self::new(config.geometry, config.guides, config.answer_layout)
    }

    /// Replace the text measurer (tests use fixed-width metrics).
    pub fn with_measure(mut self, measure: Arc<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Records laid out per page pair.
    pub fn group_size(&self) -> usize {
        self.geometry.sections_per_page
    }

    /// Number of question/answer page pairs needed for `record_count` cards.
    pub fn group_count(&self, record_count: usize) -> usize {
        record_count.div_ceil(self.group_size())
    }

    pub fn page_count(&self, record_count: usize) -> usize {
        2 * self.group_count(record_count)
    }

    /// Lay out every record, in input order, Questions page before Answers.
    pub fn paginate(&self, records: &[CardRecord]) -> Vec<PagePlan> {
        let mut pages = Vec::with_capacity(self.page_count(records.len()));
        for (group, chunk) in records.chunks(self.group_size()).enumerate() {
            let first = group * self.group_size();
            pages.push(self.layout_page(PageKind::Questions, group, first, chunk));
            pages.push(self.layout_page(PageKind::Answers, group, first, chunk));
        }
        pages
    }

    /// Lay out one page of a group. `first_index` is the input position of
    /// `group_records[0]`; `group_records` holds at most `group_size()` cards.
    pub fn layout_page(
        &self,
        kind: PageKind,
        group: usize,
        first_index: usize,
        group_records: &[CardRecord],
    ) -> PagePlan {
        let g = &self.geometry;
        let column = self.text_column(kind);

        let sections: Vec<SectionPlan> = (0..g.sections_per_page)
            .map(|slot| match group_records.get(slot) {
                Some(record) => self.layout_section(slot, first_index + slot, kind.text(record), column),
                None => SectionPlan {
                    slot,
                    top: g.section_top(slot),
                    record_index: None,
                    lines: Vec::new(),
                    dropped_lines: 0,
                },
            })
            .collect();

        let page = PagePlan {
            kind,
            group,
            title: TextRun {
                x: g.side_margin,
                y: g.title_baseline(),
                font_size: g.title_font_size,
                text: kind.title().to_string(),
            },
            sections,
            guides: self.page_guides(kind),
        };

        debug!(
            "Laid out {} page for group {}: {} populated sections, {} guide rects",
            kind.title(),
            group,
            page.populated_sections(),
            page.guides.len()
        );
        page
    }

    /// Where text of the given page kind starts and how wide it may run.
    pub fn text_column(&self, kind: PageKind) -> TextColumn {
        let g = &self.geometry;
        match (kind, self.answer_layout) {
            (PageKind::Answers, AnswerLayout::SplitColumn { gutter }) => TextColumn {
                x: g.column_split_x() + gutter,
                max_width: g.usable_width() - g.wrap_width() - gutter,
            },
            _ => TextColumn {
                x: g.side_margin,
                max_width: g.wrap_width(),
            },
        }
    }

    fn layout_section(
        &self,
        slot: usize,
        record_index: usize,
        text: &str,
        column: TextColumn,
    ) -> SectionPlan {
        let g = &self.geometry;
        let top = g.section_top(slot);
        let first_baseline = top - g.section_padding;
        let bottom_limit = g.section_bottom_limit(slot);

        let wrapped = wrap_text(text, column.max_width, g.body_font_size, self.measure.as_ref());
        let total = wrapped.len();

        let mut lines = Vec::with_capacity(total);
        for (i, line) in wrapped.into_iter().enumerate() {
            let y = first_baseline - g.line_height * i as f32;
            if y < bottom_limit {
                break;
            }
            lines.push(TextRun {
                x: column.x,
                y,
                font_size: g.body_font_size,
                text: line,
            });
        }

        SectionPlan {
            slot,
            top,
            record_index: Some(record_index),
            dropped_lines: total - lines.len(),
            lines,
        }
    }

    fn page_guides(&self, kind: PageKind) -> Vec<GuideRect> {
        let g = &self.geometry;
        let s = &self.guides;
        let mut rects = Vec::new();

        let x_start = g.side_margin + s.inset;
        let x_end = g.page_width - g.side_margin - s.inset;
        for y in g.boundaries() {
            for (x, width) in dash_segments(x_start, x_end, s.dash_length, s.dash_gap) {
                rects.push(GuideRect {
                    x,
                    y: y - s.thickness / 2.0,
                    width,
                    height: s.thickness,
                });
            }
            rects.push(self.vertical_tick(g.side_margin - s.crop_mark_offset, y));
            rects.push(self.vertical_tick(g.page_width - g.side_margin + s.crop_mark_offset, y));
        }

        if let (PageKind::Answers, AnswerLayout::SplitColumn { .. }) = (kind, self.answer_layout) {
            let x = g.column_split_x();
            let content_top = g.page_height - g.top_margin;
            let content_bottom = g.bottom_margin;
            let dashes = dash_segments(
                content_bottom + s.inset,
                content_top - s.inset,
                s.dash_length,
                s.dash_gap,
            );
            for (y, height) in dashes {
                rects.push(GuideRect {
                    x: x - s.thickness / 2.0,
                    y,
                    width: s.thickness,
                    height,
                });
            }
            rects.push(self.horizontal_tick(x, content_top + s.crop_mark_offset));
            rects.push(self.horizontal_tick(x, content_bottom - s.crop_mark_offset));
        }

        rects
    }

    /// Crop mark marking a horizontal cut, centred on `(x, y)`.
    fn vertical_tick(&self, x: f32, y: f32) -> GuideRect {
        let s = &self.guides;
        GuideRect {
            x: x - s.thickness / 2.0,
            y: y - s.crop_mark_length / 2.0,
            width: s.thickness,
            height: s.crop_mark_length,
        }
    }

    /// Crop mark marking a vertical cut, centred on `(x, y)`.
    fn horizontal_tick(&self, x: f32, y: f32) -> GuideRect {
        let s = &self.guides;
        GuideRect {
            x: x - s.crop_mark_length / 2.0,
            y: y - s.thickness / 2.0,
            width: s.crop_mark_length,
            height: s.thickness,
        }
    }
}

/// Split `[start, end)` into dashes of `dash` separated by `gap`, returned as
/// `(offset, length)` pairs. The final dash is clipped to `end`.
pub fn dash_segments(start: f32, end: f32, dash: f32, gap: f32) -> Vec<(f32, f32)> {
    let period = dash + gap;
    if !(period > 0.0) || !(dash > 0.0) {
        return Vec::new();
    }
    let mut segments = Vec::new();
    let mut i = 0usize;
    loop {
        let pos = start + period * i as f32;
        if pos >= end {
            break;
        }
        segments.push((pos, dash.min(end - pos)));
        i += 1;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Monospace;

    impl TextMeasure for Monospace {
        fn text_width(&self, text: &str, font_size: f32) -> f32 {
            text.chars().count() as f32 * font_size * 0.5
        }
    }

    fn engine() -> LayoutEngine {
        LayoutEngine::new(PageGeometry::default(), GuideStyle::default(), AnswerLayout::SharedColumn)
    }

    fn records(n: usize) -> Vec<CardRecord> {
        (0..n)
            .map(|i| CardRecord::new(format!("Q{i}"), format!("A{i}")))
            .collect()
    }

    #[test]
    fn page_count_is_two_per_started_group() {
        let e = engine();
        for (n, expected) in [(0, 0), (1, 2), (4, 2), (5, 4), (8, 4), (9, 6)] {
            assert_eq!(e.page_count(n), expected, "n = {n}");
            assert_eq!(e.paginate(&records(n)).len(), expected, "n = {n}");
        }
    }

    #[test]
    fn pages_alternate_questions_then_answers() {
        let pages = engine().paginate(&records(6));
        let kinds: Vec<PageKind> = pages.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![PageKind::Questions, PageKind::Answers, PageKind::Questions, PageKind::Answers]
        );
        assert_eq!(pages[0].title.text, "Questions");
        assert_eq!(pages[1].title.text, "Answers");
        assert_eq!(pages[3].group, 1);
    }

    #[test]
    fn record_lands_in_group_and_slot_on_both_pages() {
        let recs = records(11);
        let pages = engine().paginate(&recs);
        for (i, record) in recs.iter().enumerate() {
            let (q, a) = (&pages[2 * (i / 4)], &pages[2 * (i / 4) + 1]);
            let slot = i % 4;
            assert_eq!(q.sections[slot].record_index, Some(i));
            assert_eq!(a.sections[slot].record_index, Some(i));
            assert_eq!(q.sections[slot].lines[0].text, record.question);
            assert_eq!(a.sections[slot].lines[0].text, record.answer);
        }
    }

    #[test]
    fn two_records_fill_two_of_four_sections() {
        let recs = vec![CardRecord::new("A?", "1"), CardRecord::new("B?", "2")];
        let pages = engine().paginate(&recs);
        assert_eq!(pages.len(), 2);
        for page in &pages {
            assert_eq!(page.sections.len(), 4);
            assert_eq!(page.populated_sections(), 2);
            assert!(page.sections[2].lines.is_empty());
            assert!(page.sections[3].lines.is_empty());
            // 3 boundaries × (38 dashes + 2 crop marks)
            assert_eq!(page.guides.len(), 3 * (38 + 2));
        }
    }

    #[test]
    fn five_records_leave_one_card_on_second_pair() {
        let pages = engine().paginate(&records(5));
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0].populated_sections(), 4);
        assert_eq!(pages[1].populated_sections(), 4);
        assert_eq!(pages[2].populated_sections(), 1);
        assert_eq!(pages[3].populated_sections(), 1);
        assert_eq!(pages[2].sections[0].record_index, Some(4));
    }

    #[test]
    fn short_question_sits_at_margin_below_section_top() {
        let pages = engine().paginate(&[CardRecord::new("Short?", "Yes")]);
        let line = &pages[0].sections[0].lines;
        assert_eq!(line.len(), 1);
        assert_eq!(line[0].x, 40.0);
        assert_eq!(line[0].y, 712.0 - 20.0);
        assert_eq!(line[0].font_size, 14.0);
    }

    #[test]
    fn second_section_starts_one_section_lower() {
        let pages = engine().paginate(&records(2));
        let y0 = pages[0].sections[0].lines[0].y;
        let y1 = pages[0].sections[1].lines[0].y;
        assert_eq!(y0 - y1, 168.0);
    }

    #[test]
    fn long_text_is_truncated_inside_its_section() {
        let word = "word ";
        let long = word.repeat(400);
        let e = engine().with_measure(Arc::new(Monospace));
        let pages = e.paginate(&[CardRecord::new(long, "")]);
        let section = &pages[0].sections[0];
        let g = PageGeometry::default();

        // Baselines 20, 38, … 146 below the top fit above the 148 limit.
        assert_eq!(section.lines.len(), 8);
        assert!(section.dropped_lines > 0);
        for line in &section.lines {
            assert!(line.y >= g.section_bottom_limit(0));
        }
        // Nothing spilled into the next section.
        assert!(pages[0].sections[1].lines.is_empty());
        assert_eq!(pages[0].dropped_lines(), section.dropped_lines);
    }

    #[test]
    fn lines_are_spaced_by_line_height() {
        let e = engine().with_measure(Arc::new(Monospace));
        // Monospace at 14pt: 7 units/char, wrap width 319.2 → 45 chars per line.
        let text = "abcdefghij ".repeat(10);
        let pages = e.paginate(&[CardRecord::new(text, "")]);
        let lines = &pages[0].sections[0].lines;
        assert!(lines.len() >= 2);
        for pair in lines.windows(2) {
            assert_eq!(pair[0].y - pair[1].y, 18.0);
        }
    }

    #[test]
    fn empty_text_leaves_populated_but_blank_section() {
        let pages = engine().paginate(&[CardRecord::new("", "")]);
        let section = &pages[0].sections[0];
        assert!(section.is_populated());
        assert!(section.lines.is_empty());
        assert_eq!(section.dropped_lines, 0);
    }

    #[test]
    fn dash_segments_clip_last_dash() {
        let segs = dash_segments(44.0, 568.0, 8.0, 6.0);
        assert_eq!(segs.len(), 38);
        assert_eq!(segs[0], (44.0, 8.0));
        let (last_x, last_w) = *segs.last().unwrap();
        assert_eq!(last_x, 44.0 + 37.0 * 14.0);
        assert!((last_x + last_w - 568.0).abs() < 1e-3);
        assert!(last_w < 8.0);
    }

    #[test]
    fn dash_segments_never_overdraw() {
        for end in [10.0_f32, 14.0, 15.5, 100.0] {
            for (x, w) in dash_segments(0.0, end, 8.0, 6.0) {
                assert!(x + w <= end + 1e-4);
            }
        }
        assert!(dash_segments(5.0, 5.0, 8.0, 6.0).is_empty());
    }

    #[test]
    fn guides_sit_on_section_boundaries() {
        let page = engine().layout_page(PageKind::Questions, 0, 0, &[]);
        let t = GuideStyle::default().thickness;
        let boundary_ys: Vec<f32> = PageGeometry::default().boundaries().collect();
        for rect in page.guides.iter().filter(|r| r.height == t) {
            let centre = rect.y + t / 2.0;
            assert!(boundary_ys.iter().any(|b| (b - centre).abs() < 1e-3));
        }
        // crop marks straddle the boundary 12 units outside each margin
        let ticks: Vec<&GuideRect> = page.guides.iter().filter(|r| r.height == 8.0).collect();
        assert_eq!(ticks.len(), 6);
        assert!(ticks.iter().any(|r| (r.x + t / 2.0 - 28.0).abs() < 1e-3));
        assert!(ticks.iter().any(|r| (r.x + t / 2.0 - 584.0).abs() < 1e-3));
    }

    #[test]
    fn shared_column_answers_use_question_column() {
        let e = engine();
        assert_eq!(e.text_column(PageKind::Answers), e.text_column(PageKind::Questions));
    }

    #[test]
    fn split_column_moves_answers_right_of_cut_line() {
        let e = LayoutEngine::new(PageGeometry::default(), GuideStyle::default(), AnswerLayout::split());
        let q = e.text_column(PageKind::Questions);
        let a = e.text_column(PageKind::Answers);
        let split = 40.0 + 532.0 * 0.6;
        assert!((a.x - (split + 8.0)).abs() < 1e-3);
        assert!((a.max_width - (532.0 * 0.4 - 8.0)).abs() < 1e-3);
        assert_eq!(q.x, 40.0);

        let pages = e.paginate(&records(1));
        assert_eq!(pages[1].sections[0].lines[0].x, a.x);
        // Answers page carries the extra vertical cut line; Questions does not.
        assert!(pages[1].guides.len() > pages[0].guides.len());
        let vertical = pages[1]
            .guides
            .iter()
            .filter(|r| r.width == 0.8 && r.height <= 8.0 && (r.x + 0.4 - split).abs() < 1e-3)
            .count();
        assert!(vertical > 0);
    }

    #[test]
    fn smaller_grid_changes_group_size() {
        let g = PageGeometry {
            sections_per_page: 2,
            ..PageGeometry::default()
        };
        let e = LayoutEngine::new(g, GuideStyle::default(), AnswerLayout::SharedColumn);
        let pages = e.paginate(&records(3));
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[2].sections[0].record_index, Some(2));
        assert_eq!(pages[0].guides.len(), 38 + 2);
    }
}
