//! Input normalisation: turn an uploaded card file into [`CardRecord`]s.
//!
//! Card lists usually arrive as text pasted out of a chat window or a word
//! processor, so the JSON is wrapped in whatever the editor saved it as and
//! peppered with typographic punctuation. This stage undoes both before
//! parsing:
//!
//! ```text
//! bytes ──▶ decode ──▶ [rtf → plain text] ──▶ sanitise ──▶ parse
//!          (UTF-8)      (.rtf files only)     (quotes,    (JSON array of
//!                                              dashes)     {question, answer})
//! ```
//!
//! Every failure is one of three input errors, and nothing is handed to the
//! layout engine unless the whole file parsed.

use crate::error::FlashcardError;
use crate::output::CardRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

/// Format of a card file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Text,
    Rtf,
}

impl InputFormat {
    /// Detect the format from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self, FlashcardError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(InputFormat::Json),
            Some("txt") => Ok(InputFormat::Text),
            Some("rtf") => Ok(InputFormat::Rtf),
            _ => Err(FlashcardError::UnsupportedFileType {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            }),
        }
    }
}

/// Read and normalise a card file from disk.
pub async fn read_records(path: impl AsRef<Path>) -> Result<Vec<CardRecord>, FlashcardError> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path)?;

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FlashcardError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => FlashcardError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => FlashcardError::Internal(format!("Failed to read '{}': {e}", path.display())),
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    let records = normalize_bytes(&bytes, format)?;
    info!("Parsed {} cards from {}", records.len(), display_name(path));
    Ok(records)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Normalise raw file content of a known format.
pub fn normalize_bytes(bytes: &[u8], format: InputFormat) -> Result<Vec<CardRecord>, FlashcardError> {
    let text = String::from_utf8_lossy(bytes);
    normalize_text(&text, format)
}

/// Normalise decoded file content of a known format.
pub fn normalize_text(text: &str, format: InputFormat) -> Result<Vec<CardRecord>, FlashcardError> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let plain = match format {
        InputFormat::Rtf => extract_text_from_rtf(text)?,
        InputFormat::Json | InputFormat::Text => text.to_string(),
    };
    parse_records(&sanitize(&plain))
}

// ── Rich text ────────────────────────────────────────────────────────────────

/// Groups whose content is metadata, never document text.
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "header",
    "footer",
    "listtable",
    "listoverridetable",
];

/// Reduce an RTF document to its plain text.
///
/// Paragraph and line breaks become `\n`, `\'hh` escapes are decoded as
/// Windows-1252, `\{` `\}` `\\` become literal characters, and every other
/// control word, control symbol and group brace is dropped. Metadata groups
/// (font and colour tables, `{\* …}` destinations) are skipped entirely.
pub fn extract_text_from_rtf(rtf: &str) -> Result<String, FlashcardError> {
    let trimmed = rtf.trim();
    if !trimmed.starts_with("{\\rtf") {
        return Err(FlashcardError::MalformedMarkup {
            detail: "file does not start with an {\\rtf header".into(),
        });
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars().peekable();
    let mut depth: usize = 0;
    // Depth at which a skipped destination group started.
    let mut skip_from: Option<usize> = None;
    // True directly after `{`, when the next control word names the group.
    let mut group_start = false;

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                depth += 1;
                group_start = true;
                continue;
            }
            '}' => {
                if depth == 0 {
                    return Err(malformed("unbalanced closing brace"));
                }
                if skip_from == Some(depth) {
                    skip_from = None;
                }
                depth -= 1;
            }
            '\\' => {
                let Some(&next) = chars.peek() else {
                    return Err(malformed("dangling backslash at end of file"));
                };
                if next.is_ascii_alphabetic() {
                    let word = take_control_word(&mut chars);
                    if group_start && skip_from.is_none() && SKIPPED_DESTINATIONS.contains(&word.as_str()) {
                        skip_from = Some(depth);
                    }
                    if skip_from.is_none() {
                        match word.as_str() {
                            "par" | "pard" | "line" | "sect" | "page" => out.push('\n'),
                            "tab" => out.push('\t'),
                            _ => {}
                        }
                    }
                } else {
                    chars.next();
                    match next {
                        '{' | '}' | '\\' if skip_from.is_none() => out.push(next),
                        '\'' => {
                            let hex: String = chars.by_ref().take(2).collect();
                            let byte = u8::from_str_radix(&hex, 16)
                                .ok()
                                .filter(|_| hex.len() == 2)
                                .ok_or_else(|| malformed(&format!("invalid hex escape \\'{hex}")))?;
                            if skip_from.is_none() {
                                out.push(decode_cp1252(byte));
                            }
                        }
                        '*' if group_start && skip_from.is_none() => skip_from = Some(depth),
                        '\n' | '\r' if skip_from.is_none() => out.push('\n'),
                        '~' if skip_from.is_none() => out.push('\u{A0}'),
                        '_' if skip_from.is_none() => out.push('-'),
                        _ => {}
                    }
                }
            }
            '\r' | '\n' => {}
            _ => {
                if skip_from.is_none() {
                    out.push(c);
                }
            }
        }
        group_start = false;
    }

    if depth != 0 {
        return Err(malformed(&format!("{depth} unclosed group(s)")));
    }
    Ok(out.trim().to_string())
}

/// Consume `[a-zA-Z]+-?[0-9]*` plus one optional delimiting space.
fn take_control_word(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut word = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphabetic() {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if chars.peek() == Some(&'-') {
        chars.next();
    }
    while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
        chars.next();
    }
    if chars.peek() == Some(&' ') {
        chars.next();
    }
    word
}

fn malformed(detail: &str) -> FlashcardError {
    FlashcardError::MalformedMarkup {
        detail: detail.to_string(),
    }
}

/// Windows-1252 byte to char; the 0x80–0x9F block differs from Latin-1.
fn decode_cp1252(byte: u8) -> char {
    match byte {
        0x80 => '€',
        0x82 => '‚',
        0x84 => '„',
        0x85 => '…',
        0x91 => '‘',
        0x92 => '’',
        0x93 => '“',
        0x94 => '”',
        0x95 => '•',
        0x96 => '–',
        0x97 => '—',
        0x99 => '™',
        b => b as char,
    }
}

// ── Sanitisation ─────────────────────────────────────────────────────────────

static RE_CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B-\x1F\x7F]").unwrap());

/// Replace typographic punctuation with the ASCII JSON understands.
///
/// 1. Curly double quotes → `"`
/// 2. Curly single quotes → `'`
/// 3. Non-breaking space → space
/// 4. En and em dashes → `-`
/// 5. Tabs → space
/// 6. Carriage returns and other control characters removed
/// 7. Surrounding whitespace trimmed
pub fn sanitize(input: &str) -> String {
    let s = input
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{A0}', " ")
        .replace(['\u{2013}', '\u{2014}'], "-")
        .replace('\t', " ");
    RE_CONTROL_CHARS.replace_all(&s, "").trim().to_string()
}

// ── Parsing ──────────────────────────────────────────────────────────────────

/// Parse sanitised text as a JSON array of `{question, answer}` objects.
pub fn parse_records(text: &str) -> Result<Vec<CardRecord>, FlashcardError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| FlashcardError::InvalidRecordFormat {
            detail: format!("not valid JSON ({e})"),
        })?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(FlashcardError::InvalidRecordFormat {
                detail: format!("expected a JSON array, found {}", json_kind(&other)),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<CardRecord>(item).map_err(|e| {
                FlashcardError::InvalidRecordFormat {
                    detail: format!("card {}: {e}", i + 1),
                }
            })
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("cards.json")).unwrap(), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("CARDS.TXT")).unwrap(), InputFormat::Text);
        assert_eq!(InputFormat::from_path(Path::new("a/b/notes.Rtf")).unwrap(), InputFormat::Rtf);
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["cards.docx", "cards", "cards.pdf"] {
            let err = InputFormat::from_path(Path::new(name)).unwrap_err();
            assert!(matches!(err, FlashcardError::UnsupportedFileType { .. }), "{name}");
        }
    }

    #[test]
    fn sanitizes_typographic_punctuation() {
        let s = sanitize("\u{201C}q\u{201D}\u{A0}\u{2018}x\u{2019} \u{2013} \u{2014}\t\r\n");
        assert_eq!(s, "\"q\" 'x' - -");
    }

    #[test]
    fn sanitize_leaves_plain_json_alone() {
        let json = r#"[{"question": "A?", "answer": "1"}]"#;
        assert_eq!(sanitize(json), json);
    }

    #[test]
    fn parses_array_of_records() {
        let records = parse_records(r#"[{"question":"A?","answer":"1"},{"question":"B?","answer":"2"}]"#).unwrap();
        assert_eq!(records, vec![CardRecord::new("A?", "1"), CardRecord::new("B?", "2")]);
    }

    #[test]
    fn extra_fields_are_ignored_and_empty_strings_kept() {
        let records = parse_records(r#"[{"question":"","answer":"","id":7}]"#).unwrap();
        assert_eq!(records, vec![CardRecord::new("", "")]);
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_array_top_level() {
        let err = parse_records(r#"{"question":"A?","answer":"1"}"#).unwrap_err();
        assert!(err.to_string().contains("found an object"), "{err}");
    }

    #[test]
    fn rejects_missing_and_non_string_fields() {
        let err = parse_records(r#"[{"question":"A?","answer":"1"},{"question":"B?"}]"#).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("card 2"), "{msg}");
        assert!(msg.contains("answer"), "{msg}");

        let err = parse_records(r#"[{"question":5,"answer":"1"}]"#).unwrap_err();
        assert!(matches!(err, FlashcardError::InvalidRecordFormat { .. }));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_records("[{question: A}]").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn curly_quoted_json_parses_after_sanitising() {
        let text = "[{\u{201C}question\u{201D}: \u{201C}What\u{2019}s up?\u{201D}, \u{201C}answer\u{201D}: \u{201C}Sky\u{201D}}]";
        let records = normalize_text(text, InputFormat::Text).unwrap();
        assert_eq!(records, vec![CardRecord::new("What's up?", "Sky")]);
    }

    #[test]
    fn bom_is_stripped() {
        let records = normalize_bytes("\u{FEFF}[]".as_bytes(), InputFormat::Json).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn extracts_json_from_textedit_rtf() {
        let rtf = r#"{\rtf1\ansi\ansicpg1252\cocoartf2761
{\fonttbl\f0\fswiss\fcharset0 Helvetica;}
{\colortbl;\red255\green255\blue255;}
{\*\expandedcolortbl;;}
\paperw11900\paperh16840\margl1440\margr1440\vieww11520\viewh8400\viewkind0
\pard\tx566\tx1133\pardirnatural\partightenfactor0

\f0\fs24 \cf0 [\
  \{ \'93question\'94: "Caf\'e9?", "answer": "Coffee" \}\
]}"#;
        let plain = extract_text_from_rtf(rtf).unwrap();
        assert!(!plain.contains("Helvetica"), "{plain}");
        assert!(!plain.contains("erw"), "{plain}");
        let records = normalize_text(rtf, InputFormat::Rtf).unwrap();
        assert_eq!(records, vec![CardRecord::new("Café?", "Coffee")]);
    }

    #[test]
    fn rtf_par_becomes_newline() {
        let plain = extract_text_from_rtf(r"{\rtf1 one\par two}").unwrap();
        assert_eq!(plain, "one\ntwo");
    }

    #[test]
    fn rejects_rtf_without_header() {
        let err = extract_text_from_rtf("[]").unwrap_err();
        assert!(matches!(err, FlashcardError::MalformedMarkup { .. }));
    }

    #[test]
    fn rejects_unbalanced_rtf() {
        assert!(extract_text_from_rtf(r"{\rtf1 {\b text}").is_err());
        assert!(extract_text_from_rtf(r"{\rtf1 text}}").is_err());
        assert!(extract_text_from_rtf(r"{\rtf1 bad \'zz}").is_err());
    }

    #[tokio::test]
    async fn read_records_reports_missing_file() {
        let err = read_records("/definitely/not/here/cards.json").await.unwrap_err();
        assert!(matches!(err, FlashcardError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn read_records_checks_extension_before_reading() {
        let err = read_records("/definitely/not/here/cards.docx").await.unwrap_err();
        assert!(matches!(err, FlashcardError::UnsupportedFileType { .. }));
    }

    #[tokio::test]
    async fn read_records_parses_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.json");
        std::fs::write(&path, r#"[{"question":"A?","answer":"1"}]"#).unwrap();
        let records = read_records(&path).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn display_name_is_the_file_name() {
        assert_eq!(display_name(Path::new("/tmp/decks/cards.json")), "cards.json");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
