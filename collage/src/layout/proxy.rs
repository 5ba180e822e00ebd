//! Frozen-size tile wrapper used by the shape search.
//!
//! The search queries every tile's height once per candidate column count.
//! Proxies measure each tile exactly once up front, so those queries are
//! O(1) and cannot drift between candidates.

use crate::error::LayoutError;
use crate::primitives::Size;

use super::tile::{LayoutContext, Tile};

#[derive(Clone, Copy)]
pub struct TileProxy<'t> {
    tile: &'t dyn Tile,
    size: Size,
}

impl<'t> TileProxy<'t> {
    /// Measure `tile` at `col_width` (height unconstrained) and freeze the result.
    pub fn measure(tile: &'t dyn Tile, cx: &mut LayoutContext<'_>, col_width: f32) -> Result<Self, LayoutError> {
        let size = tile.intrinsic_size(cx, Size::width_only(col_width))?;
        Ok(Self { tile, size })
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn tile(&self) -> &'t dyn Tile {
        self.tile
    }
}

impl std::fmt::Debug for TileProxy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileProxy").field("size", &self.size).finish()
    }
}
