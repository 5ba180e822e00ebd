//! Pane - a composite tile that packs its children into columns.
//!
//! The column assignment is found once by [`ShapeSearch`] and memoized in a
//! `OnceCell`. Later size queries recompute the bounding box from live tile
//! heights, so measuring and drawing always agree on the geometry.

use std::cell::OnceCell;

use crate::error::LayoutError;
use crate::primitives::Size;

use super::shape::{Column, Shape, ShapeSearch, Tiling};
use super::tile::{LayoutContext, PaintContext, Tile};

/// Panes with more tiles than this log a warning before searching.
pub const LARGE_PANE_TILES: usize = 256;

/// Container of tiles laid out in equal-width columns.
pub struct Pane {
    tiles: Vec<Box<dyn Tile>>,
    tiling: Tiling,
    /// Columns were supplied by the caller; search never runs.
    explicit: bool,
    shape: OnceCell<Shape>,
}

impl Pane {
    pub fn new() -> Self {
        Self::with_params(Tiling::default())
    }

    pub fn with_params(tiling: Tiling) -> Self {
        Self {
            tiles: Vec::new(),
            tiling,
            explicit: false,
            shape: OnceCell::new(),
        }
    }

    pub fn from_tiles(tiles: Vec<Box<dyn Tile>>) -> Self {
        Self {
            tiles,
            ..Self::new()
        }
    }

    /// Caller-authored columns, left to right.
    pub fn with_columns(columns: Vec<Vec<Box<dyn Tile>>>) -> Self {
        let mut tiles = Vec::new();
        let mut shape = Vec::with_capacity(columns.len());
        for column in columns {
            let start = tiles.len();
            tiles.extend(column);
            shape.push(Column::from((start..tiles.len()).collect::<Vec<_>>()));
        }

        Self {
            tiles,
            tiling: Tiling::default(),
            explicit: true,
            shape: OnceCell::from(Shape::new(shape)),
        }
    }

    /// Add a tile. Explicit panes append it to their last column.
    pub fn push(self, tile: impl Tile + 'static) -> Self {
        self.push_boxed(Box::new(tile))
    }

    pub fn push_boxed(mut self, tile: Box<dyn Tile>) -> Self {
        let index = self.tiles.len();
        self.tiles.push(tile);
        if self.explicit {
            if let Some(shape) = self.shape.get_mut() {
                shape.append(index);
            }
        } else {
            self.shape.take();
        }
        self
    }

    pub fn col_width(mut self, width: f32) -> Self {
        self.tiling.col_width = width;
        self.invalidate();
        self
    }

    pub fn col_pad(mut self, pad: f32) -> Self {
        self.tiling.col_pad = pad;
        self.invalidate();
        self
    }

    pub fn row_pad(mut self, pad: f32) -> Self {
        self.tiling.row_pad = pad;
        self.invalidate();
        self
    }

    fn invalidate(&mut self) {
        if !self.explicit {
            self.shape.take();
        }
    }

    pub fn tiling(&self) -> Tiling {
        self.tiling
    }

    pub fn tiles(&self) -> &[Box<dyn Tile>] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// The memoized shape, if layout has happened.
    pub fn shape(&self) -> Option<&Shape> {
        self.shape.get()
    }

    /// Memoized shape, searching for it on first use.
    pub fn layout(&self, cx: &mut LayoutContext<'_>) -> Result<&Shape, LayoutError> {
        if let Some(shape) = self.shape.get() {
            return Ok(shape);
        }

        if self.tiles.len() > LARGE_PANE_TILES {
            tracing::warn!(
                tiles = self.tiles.len(),
                limit = LARGE_PANE_TILES,
                "Large pane, shape search is quadratic in tile count"
            );
        }
        let result = ShapeSearch::new(&self.tiles, cx, self.tiling)?.run()?;
        Ok(self.shape.get_or_init(|| result.shape))
    }

    /// Current height of every tile at the column width.
    pub fn tile_heights(&self, cx: &mut LayoutContext<'_>) -> Result<Vec<f32>, LayoutError> {
        self.tiles
            .iter()
            .map(|tile| {
                tile.intrinsic_size(cx, Size::width_only(self.tiling.col_width))
                    .map(|size| size.height)
            })
            .collect()
    }

    fn measure(&self, cx: &mut LayoutContext<'_>) -> Result<Size, LayoutError> {
        if self.tiles.is_empty() {
            return Err(LayoutError::EmptyPane);
        }
        let shape = self.layout(cx)?;
        let heights = self.tile_heights(cx)?;
        let size = shape.canvas_size(&heights, &self.tiling);
        if !size.is_drawable() {
            return Err(LayoutError::Degenerate {
                width: size.width,
                height: size.height,
            });
        }
        Ok(size)
    }

    fn draw_columns(&self, cx: &mut PaintContext<'_>) -> Result<(), LayoutError> {
        if self.tiles.is_empty() {
            return Err(LayoutError::EmptyPane);
        }
        let (shape, heights) = {
            let mut layout = cx.layout();
            let shape = self.layout(&mut layout)?;
            (shape, self.tile_heights(&mut layout)?)
        };

        let Tiling {
            col_width, row_pad, ..
        } = self.tiling;
        for (i, column) in shape.columns().iter().enumerate() {
            let surface = cx.surface();
            surface.push();
            surface.translate(self.tiling.column_x(i), 0.0);

            let result = column.tiles().iter().try_for_each(|&index| -> Result<(), LayoutError> {
                let height = heights[index];
                self.tiles[index].draw(cx, Size::new(col_width, height))?;
                cx.surface().translate(0.0, height + row_pad);
                Ok(())
            });

            cx.surface().pop();
            result?;
        }
        Ok(())
    }
}

impl Default for Pane {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Pane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pane")
            .field("tiles", &self.tiles.len())
            .field("tiling", &self.tiling)
            .field("explicit", &self.explicit)
            .field("shape", &self.shape.get())
            .finish()
    }
}

impl Tile for Pane {
    /// The pane's own best bounding box. The constraint is ignored.
    fn intrinsic_size(&self, cx: &mut LayoutContext<'_>, _constraint: Size) -> Result<Size, LayoutError> {
        cx.enter()?;
        let result = self.measure(cx);
        cx.exit();
        result
    }

    fn draw(&self, cx: &mut PaintContext<'_>, _allotted: Size) -> Result<(), LayoutError> {
        cx.enter()?;
        let result = self.draw_columns(cx);
        cx.exit();
        result
    }
}
