//! Export rendering: plain text and rich text (RTF) documents, plus the
//! filename sanitizer used for the suggested download name.

use std::path::Path;

use crate::error::{Error, Result};
use crate::store::Transcript;

/// Timestamp layout used in both export headers.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output encodings for a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    PlainText,
    RichText,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::PlainText => "txt",
            ExportFormat::RichText => "rtf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::PlainText => "text/plain;charset=utf-8",
            ExportFormat::RichText => "application/rtf",
        }
    }

    /// Filename offered for the saved document, built from the sanitized title.
    pub fn suggested_filename(&self, title: &str) -> String {
        format!("{}.{}", sanitize_filename(title), self.extension())
    }

    pub fn render(&self, transcript: &Transcript) -> String {
        match self {
            ExportFormat::PlainText => to_plain_text(transcript),
            ExportFormat::RichText => to_rich_text(transcript),
        }
    }
}

/// Render the transcript as plain text: title line, generation timestamp,
/// blank separator, body.
pub fn to_plain_text(transcript: &Transcript) -> String {
    format!(
        "{}\nGenerated at: {}\n\n{}",
        transcript.title,
        transcript.generated_at.format(TIMESTAMP_FORMAT),
        transcript.text
    )
}

/// Render the transcript as a minimal RTF document.
///
/// Title in bold at a larger size, timestamp line below it, then the body
/// with newlines converted to paragraph breaks.
pub fn to_rich_text(transcript: &Transcript) -> String {
    let title = rtf_escape(&transcript.title);
    let timestamp = transcript.generated_at.format(TIMESTAMP_FORMAT);
    let body = rtf_escape(&transcript.text).replace('\n', "\\par ");

    format!(
        "{{\\rtf1\\ansi\\deff0 {{\\fonttbl {{\\f0 Calibri;}}}}\n\
         {{\\colortbl;\\red0\\green0\\blue128;}}\n\
         \\f0\\fs28\\cf1\\b {title}\\b0\\par\n\
         \\fs20 Generated at: {timestamp}\\par\\par\n\
         \\fs22 {body}\n\
         }}"
    )
}

/// Escape RTF control characters and non-ASCII code points.
fn rtf_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            c if c.is_ascii() => out.push(c),
            c => {
                // RTF unicode escape: signed 16-bit code units with a fallback char
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }
    out
}

/// Replace every character outside `[a-zA-Z0-9]` with `_`.
///
/// Total and idempotent; the result is always a safe filename stem.
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Write a rendered export to disk. Side effect only.
pub fn write_export(format: ExportFormat, transcript: &Transcript, path: &Path) -> Result<()> {
    let content = format.render(transcript);
    std::fs::write(path, content)
        .map_err(|e| Error::io(format!("Failed to write '{}'", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn transcript(title: &str, text: &str) -> Transcript {
        Transcript {
            text: text.to_string(),
            title: title.to_string(),
            generated_at: chrono::Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
        }
    }

    #[test]
    fn plain_text_layout() {
        let out = to_plain_text(&transcript("Weekly sync", "all good"));
        assert_eq!(
            out,
            "Weekly sync\nGenerated at: 2026-03-14 09:26:53\n\nall good"
        );
    }

    #[test]
    fn rich_text_embeds_title_and_paragraph_breaks() {
        let out = to_rich_text(&transcript("Weekly sync", "line one\nline two"));
        assert!(out.starts_with("{\\rtf1\\ansi"));
        assert!(out.contains("\\b Weekly sync\\b0"));
        assert!(out.contains("line one\\par line two"));
        assert!(out.ends_with('}'));
    }

    #[test]
    fn rich_text_escapes_control_characters() {
        let out = to_rich_text(&transcript("a{b}c\\d", "café"));
        assert!(out.contains("a\\{b\\}c\\\\d"));
        assert!(out.contains("caf\\u233?"));
    }

    #[test]
    fn sanitize_is_total_and_idempotent() {
        for title in ["", "Weekly sync: 2026/03", "áéí øü", "already_clean_42", "../../etc"] {
            let once = sanitize_filename(title);
            assert!(once.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            assert_eq!(sanitize_filename(&once), once);
        }
        assert_eq!(sanitize_filename("Weekly sync!"), "Weekly_sync_");
    }

    #[test]
    fn suggested_filenames_carry_extension() {
        assert_eq!(
            ExportFormat::PlainText.suggested_filename("My notes"),
            "My_notes.txt"
        );
        assert_eq!(
            ExportFormat::RichText.suggested_filename("My notes"),
            "My_notes.rtf"
        );
    }
}
