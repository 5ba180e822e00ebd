//! TextBlock - a plain-text leaf tile.

use crate::error::LayoutError;
use crate::primitives::{Point, Size};
use crate::text::{LINE_SPACING, TextMeasure};

use super::tile::{LayoutContext, PaintContext, Tile};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBlockOpts {
    /// Wrap text to the width it is given.
    pub wrap: bool,
}

/// A block of text, optionally word-wrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    text: String,
    opts: TextBlockOpts,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, opts: TextBlockOpts) -> Self {
        Self {
            text: text.into(),
            opts,
        }
    }

    /// Unwrapped text, laid out at its natural extent.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextBlockOpts { wrap: false })
    }

    /// Text wrapped to whatever width it is sized and drawn at.
    pub fn wrapped(text: impl Into<String>) -> Self {
        Self::new(text, TextBlockOpts { wrap: true })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn opts(&self) -> TextBlockOpts {
        self.opts
    }

    /// Size at `width` (0 = unconstrained).
    ///
    /// Wrapped text reports the widest line actually produced, which can
    /// be narrower than `width`.
    pub fn measure(&self, text: &mut dyn TextMeasure, width: f32) -> Size {
        if !self.opts.wrap || width <= 0.0 {
            return text.measure_multiline(&self.text, LINE_SPACING);
        }

        let lines = text.word_wrap(&self.text, width);
        let max_width = lines
            .iter()
            .map(|line| text.measure_line(line))
            .fold(0.0f32, f32::max);
        let height = lines.len() as f32 * text.font_height() * LINE_SPACING;
        Size::new(max_width, height)
    }
}

impl Tile for TextBlock {
    fn intrinsic_size(&self, cx: &mut LayoutContext<'_>, constraint: Size) -> Result<Size, LayoutError> {
        Ok(self.measure(cx.text(), constraint.width))
    }

    fn draw(&self, cx: &mut PaintContext<'_>, allotted: Size) -> Result<(), LayoutError> {
        let surface = cx.surface();
        if self.opts.wrap && allotted.width > 0.0 {
            surface.draw_text_wrapped(&self.text, Point::ORIGIN, allotted.width, LINE_SPACING);
        } else {
            surface.draw_text(&self.text, Point::ORIGIN);
        }
        Ok(())
    }
}
