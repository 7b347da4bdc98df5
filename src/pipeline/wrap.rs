//! Greedy word wrap.
//!
//! Words are appended to the current line one at a time; when the candidate
//! line would measure wider than `max_width`, the current line is closed and
//! the word starts a new one. A single word wider than `max_width` still gets
//! a line of its own and is never split or hyphenated.

use crate::pipeline::font::TextMeasure;

/// Wrap `text` into lines no wider than `max_width` at `font_size`.
///
/// `\n` forces a line break and an empty paragraph yields an empty line.
/// Text that is empty or only whitespace yields no lines at all.
///
/// An overlong first word is not preceded by an empty line. A plain greedy
/// loop that flushes the current line before every overflowing word would
/// emit one here, pushing the whole card one line down.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    font_size: f32,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let wrapped = wrap_paragraph(paragraph, max_width, font_size, measure);
        if wrapped.is_empty() {
            lines.push(String::new());
        } else {
            lines.extend(wrapped);
        }
    }
    lines
}

fn wrap_paragraph(
    paragraph: &str,
    max_width: f32,
    font_size: f32,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in paragraph.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure.text_width(&candidate, font_size) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
