//! PDF serialisation of laid-out pages.
//!
//! Every page shares a single resource dictionary that names one font,
//! `/F1`, the standard Type1 Helvetica. Guides are drawn as filled DeviceGray
//! rectangles and text with plain `Tj` strings, so the output opens in any
//! reader without embedded fonts or images.
//!
//! This stage makes no layout decisions: it writes exactly the coordinates
//! found in the [`PagePlan`]s.

use crate::config::PageGeometry;
use crate::error::FlashcardError;
use crate::pipeline::font::{encode_win_ansi, Helvetica};
use crate::pipeline::layout::{PagePlan, TextRun};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

/// Resource name of the document font.
const FONT_RESOURCE: &str = "F1";

/// Document-level settings for serialisation.
#[derive(Debug, Clone)]
pub struct PdfOptions {
    /// `/Title` in the Info dictionary.
    pub title: String,
    /// Flate-compress content streams.
    pub compress: bool,
    /// Fill level used for guides (0 = black).
    pub guide_gray: f32,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            title: "Flashcards".to_string(),
            compress: true,
            guide_gray: 0.3,
        }
    }
}

/// Serialise `pages` into a complete PDF file.
///
/// An empty slice produces a valid document with zero pages.
pub fn write_document(
    pages: &[PagePlan],
    geometry: &PageGeometry,
    options: &PdfOptions,
) -> Result<Vec<u8>, FlashcardError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Helvetica::BASE_FONT,
        "Encoding" => Helvetica::ENCODING,
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        geometry.page_width.into(),
        geometry.page_height.into(),
    ];

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        let page_id = write_page(&mut doc, page, pages_id, options)?;
        debug!("Serialised page {} ({})", i + 1, page.kind.title());
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(&options.title)),
        "Producer" => Object::string_literal(concat!("cuecards ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    if options.compress {
        doc.compress();
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| FlashcardError::SerializationFailed(e.to_string()))?;
    Ok(bytes)
}

fn write_page(
    doc: &mut Document,
    page: &PagePlan,
    parent: ObjectId,
    options: &PdfOptions,
) -> Result<ObjectId, FlashcardError> {
    let content = Content {
        operations: page_operations(page, options),
    };
    let encoded = content
        .encode()
        .map_err(|e| FlashcardError::SerializationFailed(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    }))
}

/// Content-stream operators for one page: guides first, then text in black.
pub fn page_operations(page: &PagePlan, options: &PdfOptions) -> Vec<Operation> {
    let mut ops = Vec::new();

    if !page.guides.is_empty() {
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("g", vec![options.guide_gray.into()]));
        for rect in &page.guides {
            ops.push(Operation::new(
                "re",
                vec![
                    rect.x.into(),
                    rect.y.into(),
                    rect.width.into(),
                    rect.height.into(),
                ],
            ));
        }
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    ops.push(Operation::new("g", vec![0.into()]));
    for run in page.text_runs().filter(|r| !r.text.is_empty()) {
        push_text(&mut ops, run);
    }
    ops
}

fn push_text(ops: &mut Vec<Operation>, run: &TextRun) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![FONT_RESOURCE.into(), run.font_size.into()],
    ));
    ops.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(&run.text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnswerLayout, GuideStyle};
    use crate::output::CardRecord;
    use crate::pipeline::layout::LayoutEngine;

    fn plans(n: usize) -> Vec<PagePlan> {
        let records: Vec<CardRecord> = (0..n)
            .map(|i| CardRecord::new(format!("Question {i}"), format!("Answer {i}")))
            .collect();
        LayoutEngine::new(PageGeometry::default(), GuideStyle::default(), AnswerLayout::SharedColumn)
            .paginate(&records)
    }

    fn strings_of(ops: &[Operation]) -> Vec<Vec<u8>> {
        ops.iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn writes_pdf_header_and_trailer() {
        let bytes = write_document(&plans(1), &PageGeometry::default(), &PdfOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let tail = String::from_utf8_lossy(&bytes[bytes.len().saturating_sub(32)..]).to_string();
        assert!(tail.contains("%%EOF"), "tail: {tail}");
    }

    #[test]
    fn page_count_round_trips_through_lopdf() {
        let bytes = write_document(&plans(5), &PageGeometry::default(), &PdfOptions::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 4);
    }

    #[test]
    fn zero_pages_is_still_a_valid_document() {
        let bytes = write_document(&[], &PageGeometry::default(), &PdfOptions::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 0);
    }

    #[test]
    fn operations_draw_title_then_card_text() {
        let pages = plans(2);
        let ops = page_operations(&pages[0], &PdfOptions::default());
        let strings = strings_of(&ops);
        assert_eq!(
            strings,
            vec![b"Questions".to_vec(), b"Question 0".to_vec(), b"Question 1".to_vec()]
        );
    }

    #[test]
    fn guides_are_filled_in_guide_gray() {
        let pages = plans(1);
        let ops = page_operations(&pages[0], &PdfOptions::default());
        let rects = ops.iter().filter(|op| op.operator == "re").count();
        assert_eq!(rects, pages[0].guides.len());
        let gray = ops.iter().find(|op| op.operator == "g").unwrap();
        assert_eq!(gray.operands[0].as_float().unwrap(), 0.3);
    }

    #[test]
    fn text_position_matches_plan() {
        let pages = plans(1);
        let ops = page_operations(&pages[0], &PdfOptions::default());
        let positions: Vec<(f32, f32)> = ops
            .iter()
            .filter(|op| op.operator == "Td")
            .map(|op| {
                (
                    op.operands[0].as_float().unwrap(),
                    op.operands[1].as_float().unwrap(),
                )
            })
            .collect();
        assert_eq!(positions, vec![(40.0, 742.0), (40.0, 692.0)]);
    }

    #[test]
    fn uncompressed_streams_are_readable() {
        let options = PdfOptions {
            compress: false,
            ..PdfOptions::default()
        };
        let bytes = write_document(&plans(1), &PageGeometry::default(), &options).unwrap();
        let raw = String::from_utf8_lossy(&bytes);
        assert!(raw.contains("(Question 0) Tj"));
        assert!(raw.contains("Helvetica"));
        assert!(raw.contains("WinAnsiEncoding"));
    }
}
