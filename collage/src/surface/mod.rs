//! Drawing surfaces.
//!
//! A [`Surface`] is the drawing-context collaborator tiles paint into. It
//! keeps a translate/scale transform stack; tiles always draw relative to
//! the current origin and never see device coordinates.

pub mod raster;
pub mod recording;

pub use raster::RasterSurface;
pub use recording::{DrawCommand, RecordingSurface};

use image::RgbaImage;

use crate::primitives::{Color, Point};
use crate::text::{LINE_SPACING, TextMeasure};

/// Axis-aligned affine transform (scale then translate).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub sx: f32,
    pub sy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Map a local point to device space.
    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.sx + self.tx, p.y * self.sy + self.ty)
    }

    /// Translate in local units.
    #[inline]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            tx: self.tx + dx * self.sx,
            ty: self.ty + dy * self.sy,
            ..*self
        }
    }

    #[inline]
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self {
            sx: self.sx * sx,
            sy: self.sy * sy,
            ..*self
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Current transform plus the saved ones.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    current: Transform,
    saved: Vec<Transform>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> Transform {
        self.current
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the last pushed transform. Unbalanced pops reset to identity.
    pub fn pop(&mut self) {
        self.current = self.saved.pop().unwrap_or_default();
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.current = self.current.translated(dx, dy);
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.current = self.current.scaled(sx, sy);
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

/// Drawing-context collaborator.
///
/// Surfaces also measure text, since wrapped text must break at the same
/// places when it is sized and when it is drawn.
pub trait Surface: TextMeasure {
    fn as_measure(&mut self) -> &mut dyn TextMeasure;

    fn transforms(&mut self) -> &mut TransformStack;

    /// Fill the whole surface, ignoring the transform.
    fn clear(&mut self, color: Color);

    /// Set the foreground color used for text.
    fn set_color(&mut self, color: Color);

    /// Draw one line of text with its top-left corner at `at`.
    fn draw_line(&mut self, line: &str, at: Point);

    /// Draw `image` with its top-left corner at `at`, scaled by `scale`.
    fn draw_image(&mut self, image: &RgbaImage, at: Point, scale: f32);

    fn push(&mut self) {
        self.transforms().push();
    }

    fn pop(&mut self) {
        self.transforms().pop();
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transforms().translate(dx, dy);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.transforms().scale(sx, sy);
    }

    /// Draw text split on hard line breaks, top-left anchored at `at`.
    fn draw_text(&mut self, text: &str, at: Point) {
        let step = self.font_height() * LINE_SPACING;
        for (i, line) in text.split('\n').enumerate() {
            self.draw_line(line, Point::new(at.x, at.y + i as f32 * step));
        }
    }

    /// Draw text wrapped to `width`, left-aligned.
    fn draw_text_wrapped(&mut self, text: &str, at: Point, width: f32, spacing: f32) {
        let step = self.font_height() * spacing;
        for (i, line) in self.word_wrap(text, width).iter().enumerate() {
            self.draw_line(line, Point::new(at.x, at.y + i as f32 * step));
        }
    }
}
