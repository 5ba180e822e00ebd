//! Fixed-advance text metrics.
//!
//! Sizes text without loading a font: every cell is `advance` wide and
//! wide characters (CJK) take two cells. Layout stays deterministic across
//! machines, which makes this the measurer of choice for headless sizing.

use unicode_width::UnicodeWidthChar;

use super::{LINE_HEIGHT_RATIO, TextMeasure};

/// Advance of one cell as a multiple of the font size.
pub const ADVANCE_RATIO: f32 = 0.6;

/// Display width in cell units (1 for Latin, 2 for CJK, 0 for combining marks).
pub(crate) fn unicode_display_width(text: &str) -> f32 {
    text.chars()
        .map(|c| UnicodeWidthChar::width(c).unwrap_or(0) as f32)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    advance: f32,
    line_height: f32,
}

impl MonospaceMetrics {
    /// Metrics for a monospace face at `font_size` pixels.
    pub fn new(font_size: f32) -> Self {
        Self {
            advance: font_size * ADVANCE_RATIO,
            line_height: font_size * LINE_HEIGHT_RATIO,
        }
    }

    pub fn with_advance(advance: f32, line_height: f32) -> Self {
        Self { advance, line_height }
    }

    pub fn advance(&self) -> f32 {
        self.advance
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FONT_SIZE)
    }
}

impl TextMeasure for MonospaceMetrics {
    fn font_height(&self) -> f32 {
        self.line_height
    }

    fn measure_line(&mut self, line: &str) -> f32 {
        unicode_display_width(line) * self.advance
    }
}
