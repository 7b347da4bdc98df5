//! Text metrics for the single typeface cards are printed in.
//!
//! Documents reference the standard Type1 font Helvetica with
//! `WinAnsiEncoding`, so nothing is embedded: every PDF reader ships the
//! font, and its advance widths are published in Adobe's AFM files. The
//! tables below are those widths (in 1/1000 em) for the WinAnsi code points
//! card text can reach. Characters outside the encoding are drawn, and
//! therefore measured, as `?`.

use once_cell::sync::Lazy;
use std::sync::Arc;

/// Measures rendered text width. The layout engine only ever asks this one
/// question of a font, which keeps test doubles trivial.
pub trait TextMeasure: Send + Sync {
    /// Advance width of `text` set at `font_size`, in points.
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

/// Byte substituted for characters WinAnsi cannot represent.
pub const REPLACEMENT: u8 = b'?';

/// Standard-14 Helvetica with WinAnsi encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl Helvetica {
    /// `BaseFont` name written into the PDF font dictionary.
    pub const BASE_FONT: &'static str = "Helvetica";
    pub const ENCODING: &'static str = "WinAnsiEncoding";

    /// Advance width of one encoded byte, in 1/1000 em.
    pub fn glyph_width(byte: u8) -> u16 {
        match byte {
            0x20..=0x7E => ASCII_WIDTHS[(byte - 0x20) as usize],
            0xA0..=0xFF => LATIN1_WIDTHS[(byte - 0xA0) as usize],
            0x80 | 0x86 | 0x87 => 556,
            0x82 | 0x91 | 0x92 => 222,
            0x84 | 0x93 | 0x94 => 333,
            0x85 | 0x97 | 0x99 => 1000,
            0x95 => 350,
            0x96 => 556,
            _ => ASCII_WIDTHS[(REPLACEMENT - 0x20) as usize],
        }
    }
}

impl TextMeasure for Helvetica {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| Helvetica::glyph_width(encode_char(c)) as u32)
            .sum();
        units as f32 * font_size / 1000.0
    }
}

static STANDARD_FONT: Lazy<Arc<dyn TextMeasure>> = Lazy::new(|| Arc::new(Helvetica));

/// Shared handle to the metrics of the font documents are printed in.
pub fn standard_font() -> Arc<dyn TextMeasure> {
    Arc::clone(&STANDARD_FONT)
}

/// Map one character to its WinAnsi byte, or [`REPLACEMENT`].
pub fn encode_char(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        _ => REPLACEMENT,
    }
}

/// Encode a whole string for a PDF literal string operand.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

// U+0020 ..= U+007E
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space–/
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0–9
    278, 278, 584, 584, 584, 556, 1015, // :–@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A–M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N–Z
    278, 278, 278, 469, 556, 333, // [–`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a–m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n–z
    334, 260, 334, 584, // {–~
];

// U+00A0 ..= U+00FF
const LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // A0–AF
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // B0–BF
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // C0–CF
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // D0–DF
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // E0–EF
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // F0–FF
];
