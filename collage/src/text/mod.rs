//! Text measurement.
//!
//! Tiles never talk to a font directly. They size themselves through a
//! [`TextMeasure`], which only has to answer two questions (line height and
//! single-line width); wrapping and multi-line extents are derived from
//! those so every backend breaks lines identically.

pub mod cosmic;
pub mod monospace;

pub use cosmic::CosmicText;
pub use monospace::MonospaceMetrics;

use crate::primitives::Size;

/// Line spacing multiplier applied to the font height between lines.
pub const LINE_SPACING: f32 = 1.5;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_RATIO: f32 = 1.2;

/// Text-measurement collaborator.
pub trait TextMeasure {
    /// Height of one line of text, without line spacing.
    fn font_height(&self) -> f32;

    /// Advance width of a single line (no `\n`).
    fn measure_line(&mut self, line: &str) -> f32;

    /// Extent of `text` split on hard line breaks.
    ///
    /// Width is the widest line. Height counts `spacing` between lines
    /// but not after the last one.
    fn measure_multiline(&mut self, text: &str, spacing: f32) -> Size {
        let mut width: f32 = 0.0;
        let mut lines = 0usize;
        for line in text.split('\n') {
            width = width.max(self.measure_line(line));
            lines += 1;
        }
        let h = self.font_height();
        Size::new(width, lines as f32 * h * spacing - (spacing - 1.0) * h)
    }

    /// Greedy word wrap to `width`.
    fn word_wrap(&mut self, text: &str, width: f32) -> Vec<String> {
        wrap_words(self, text, width)
    }
}

/// Greedy word wrap shared by every [`TextMeasure`].
///
/// Hard line breaks are kept. Runs of whitespace collapse to one space.
/// A word wider than `width` is split between characters, so no produced
/// line is wider than `width` unless a single character is.
pub fn wrap_words<M: TextMeasure + ?Sized>(measure: &mut M, text: &str, width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure.measure_line(&candidate) <= width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if measure.measure_line(word) <= width {
                current = word.to_string();
            } else {
                current = break_word(measure, word, width, &mut lines);
            }
        }
        lines.push(current);
    }
    lines
}

/// Split an overlong word, pushing full pieces and returning the tail.
fn break_word<M: TextMeasure + ?Sized>(
    measure: &mut M,
    word: &str,
    width: f32,
    lines: &mut Vec<String>,
) -> String {
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if piece.chars().count() > 1 && measure.measure_line(&piece) > width {
            piece.pop();
            lines.push(std::mem::replace(&mut piece, ch.to_string()));
        }
    }
    piece
}
