//! The tile contract and the contexts threaded through it.
//!
//! Contexts carry the text/drawing collaborators and track how deep the
//! tile tree has been entered. Tiles form a tree by ownership, so a cycle
//! cannot be built, but the depth guard still turns runaway nesting into a
//! [`LayoutError::NestingTooDeep`] instead of a stack overflow.

use crate::error::LayoutError;
use crate::primitives::Size;
use crate::surface::Surface;
use crate::text::TextMeasure;

/// Deepest pane nesting accepted before layout gives up.
pub const MAX_NESTING_DEPTH: u32 = 64;

/// Any drawable, measurable block.
pub trait Tile {
    /// Natural size under `constraint`. A zero axis is unconstrained.
    ///
    /// Must not change observable state; only a pane's one-time shape
    /// memoization is allowed.
    fn intrinsic_size(&self, cx: &mut LayoutContext<'_>, constraint: Size) -> Result<Size, LayoutError>;

    /// Draw at the surface's current origin within `allotted`.
    fn draw(&self, cx: &mut PaintContext<'_>, allotted: Size) -> Result<(), LayoutError>;
}

/// Context for sizing passes.
pub struct LayoutContext<'a> {
    text: &'a mut dyn TextMeasure,
    depth: u32,
}

impl<'a> LayoutContext<'a> {
    pub fn new(text: &'a mut dyn TextMeasure) -> Self {
        Self { text, depth: 0 }
    }

    #[inline]
    pub fn text(&mut self) -> &mut dyn TextMeasure {
        &mut *self.text
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Enter a container. Fails once nesting exceeds [`MAX_NESTING_DEPTH`].
    pub fn enter(&mut self) -> Result<(), LayoutError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(LayoutError::NestingTooDeep { max: MAX_NESTING_DEPTH });
        }
        self.depth += 1;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Context for drawing passes.
pub struct PaintContext<'a> {
    surface: &'a mut dyn Surface,
    depth: u32,
}

impl<'a> PaintContext<'a> {
    pub fn new(surface: &'a mut dyn Surface) -> Self {
        Self { surface, depth: 0 }
    }

    #[inline]
    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }

    /// Sizing context at the current depth, measuring through the surface.
    pub fn layout(&mut self) -> LayoutContext<'_> {
        LayoutContext {
            text: self.surface.as_measure(),
            depth: self.depth,
        }
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn enter(&mut self) -> Result<(), LayoutError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(LayoutError::NestingTooDeep { max: MAX_NESTING_DEPTH });
        }
        self.depth += 1;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl<T: Tile + ?Sized> Tile for Box<T> {
    fn intrinsic_size(&self, cx: &mut LayoutContext<'_>, constraint: Size) -> Result<Size, LayoutError> {
        (**self).intrinsic_size(cx, constraint)
    }

    fn draw(&self, cx: &mut PaintContext<'_>, allotted: Size) -> Result<(), LayoutError> {
        (**self).draw(cx, allotted)
    }
}
