use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::TextSpan;

/// Renders a line of text with labelled span markers underneath.
///
/// ```text
/// Officer Smith demanded my license.
/// ╰───────────╯Person
///                           ╰─────╯Item
/// ```
///
/// Line breaks and tabs in the source are shown as single spaces so that
/// every marker stays aligned with the byte offsets it was built from.
pub struct SpanDisplay<'a> {
    text: &'a str,
    spans: Vec<(TextSpan, String)>,
}

impl<'a> SpanDisplay<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            spans: Vec::new(),
        }
    }

    /// Add a span to render, in insertion order.
    pub fn include(&mut self, span: TextSpan, label: impl Into<String>) -> &mut Self {
        self.spans.push((span, label.into()));
        self
    }

    /// Display column of a byte offset, clamped to the text.
    fn column(&self, opening_line: &str, byte_idx: usize) -> usize {
        let mut idx = byte_idx.min(opening_line.len());
        while !opening_line.is_char_boundary(idx) {
            idx -= 1;
        }
        UnicodeWidthStr::width(&opening_line[..idx])
    }
}

// 0         10        20        30
// Officer Smith demanded my license.
// ╰───────────╯Person
//                           ╰─────╯Item
impl<'a> std::fmt::Display for SpanDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let opening_line: String = self
            .text
            .chars()
            .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
            .collect();

        f.write_str(&opening_line)?;

        for (span, label) in &self.spans {
            f.write_char('\n')?;

            let start_char_idx = self.column(&opening_line, span.start);
            let end_char_idx = self.column(&opening_line, span.end);
            for _ in 0..start_char_idx {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;

            let char_len = end_char_idx.saturating_sub(start_char_idx);
            for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                f.write_char('─')?;
            }

            if char_len > 1 {
                f.write_char('╯')?;
            }

            f.write_str(label)?;
        }

        Ok(())
    }
}
