//! Case folding and diacritic stripping.
//!
//! Pattern matching runs on the normalized text, while titles and locations are
//! copied from the original message. [`NormalizedText`] keeps the byte-offset
//! map needed to go from one to the other.

use std::ops::Range;

use unicode_normalization::char::{decompose_canonical, is_combining_mark};

/// Lowercase `text` and strip combining marks (`"Reunião"` → `"reuniao"`).
///
/// Total and idempotent: normalizing already-normalized text is a no-op.
pub fn normalize(text: &str) -> String {
    NormalizedText::new(text).text
}

/// A value found in the normalized text, with the span it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    /// Byte span in the normalized text, connectors included.
    pub span: Range<usize>,
    /// Name of the table row that produced the value.
    pub rule: &'static str,
}

/// Normalized view of a message that remembers where each byte came from.
#[derive(Debug, Clone)]
pub struct NormalizedText<'a> {
    original: &'a str,
    text: String,
    /// `origins[i]` is the byte offset in `original` of the char that produced
    /// byte `i` of `text`.
    origins: Vec<usize>,
}

impl<'a> NormalizedText<'a> {
    pub fn new(original: &'a str) -> Self {
        let mut text = String::with_capacity(original.len());
        let mut origins = Vec::with_capacity(original.len());

        for (offset, ch) in original.char_indices() {
            for lower in ch.to_lowercase() {
                decompose_canonical(lower, |c| {
                    if !is_combining_mark(c) {
                        text.push(c);
                        origins.extend(std::iter::repeat_n(offset, c.len_utf8()));
                    }
                });
            }
        }

        Self {
            original,
            text,
            origins,
        }
    }

    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The untouched input.
    pub fn original(&self) -> &'a str {
        self.original
    }

    /// Map a byte span of the normalized text onto the original text.
    pub fn original_span(&self, span: Range<usize>) -> Range<usize> {
        if span.start >= span.end || span.start >= self.origins.len() {
            let at = self
                .origins
                .get(span.start)
                .copied()
                .unwrap_or(self.original.len());
            return at..at;
        }

        let start = self.origins[span.start];
        let last = self.origins[span.end.min(self.origins.len()) - 1];
        let end = self.original[last..]
            .chars()
            .next()
            .map_or(last, |c| last + c.len_utf8());
        start..end
    }

    /// Slice of the original text behind a normalized span.
    pub fn original_slice(&self, span: Range<usize>) -> &'a str {
        let span = self.original_span(span);
        &self.original[span]
    }
}
