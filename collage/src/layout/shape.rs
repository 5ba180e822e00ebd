//! Column partitions and the search that picks one.
//!
//! A [`Shape`] assigns every tile of a pane to a column. [`ShapeSearch`]
//! tries each column count from 1 to N, fills columns greedily (each tile
//! goes to the currently shortest column) and keeps the candidate with the
//! lowest [`score`]. Every count runs a full O(N) placement, so a pane costs
//! O(N²) placements in total.

use crate::error::LayoutError;
use crate::primitives::Size;

use super::proxy::TileProxy;
use super::tile::{LayoutContext, Tile};
use super::{DEFAULT_COL_PAD, DEFAULT_COL_WIDTH, DEFAULT_ROW_PAD};

// =========================================================================
// Tiling parameters
// =========================================================================

/// Column geometry shared by the search and by drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tiling {
    pub col_width: f32,
    pub col_pad: f32,
    pub row_pad: f32,
}

impl Tiling {
    pub const fn new(col_width: f32, col_pad: f32, row_pad: f32) -> Self {
        Self {
            col_width,
            col_pad,
            row_pad,
        }
    }

    /// Horizontal offset of column `index`.
    #[inline]
    pub fn column_x(&self, index: usize) -> f32 {
        index as f32 * (self.col_width + self.col_pad)
    }

    /// Total width of `col_count` columns.
    pub fn width_of(&self, col_count: usize) -> f32 {
        if col_count == 0 {
            return 0.0;
        }
        col_count as f32 * self.col_width + (col_count - 1) as f32 * self.col_pad
    }
}

impl Default for Tiling {
    fn default() -> Self {
        Self::new(DEFAULT_COL_WIDTH, DEFAULT_COL_PAD, DEFAULT_ROW_PAD)
    }
}

// =========================================================================
// Column / Shape
// =========================================================================

/// Indices into the owning pane's tile list, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    tiles: Vec<usize>,
}

impl Column {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, index: usize) {
        self.tiles.push(index);
    }

    pub fn tiles(&self) -> &[usize] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Stacked height given per-tile `heights` (indexed like the pane's tiles).
    pub fn height(&self, heights: &[f32], row_pad: f32) -> f32 {
        if self.tiles.is_empty() {
            return 0.0;
        }
        let content: f32 = self.tiles.iter().map(|&i| heights[i]).sum();
        content + (self.tiles.len() - 1) as f32 * row_pad
    }
}

impl From<Vec<usize>> for Column {
    fn from(tiles: Vec<usize>) -> Self {
        Self { tiles }
    }
}

/// An ordered list of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shape {
    columns: Vec<Column>,
}

impl Shape {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// `count` empty columns.
    pub fn empty(count: usize) -> Self {
        Self {
            columns: vec![Column::new(); count],
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn tile_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Append `index` to the last column, opening one if there is none.
    pub(crate) fn append(&mut self, index: usize) {
        if self.columns.is_empty() {
            self.columns.push(Column::new());
        }
        if let Some(last) = self.columns.last_mut() {
            last.push(index);
        }
    }

    /// Bounding box of this shape for the given per-tile heights.
    pub fn canvas_size(&self, heights: &[f32], tiling: &Tiling) -> Size {
        let height = self
            .columns
            .iter()
            .map(|col| col.height(heights, tiling.row_pad))
            .fold(0.0f32, f32::max);
        Size::new(tiling.width_of(self.columns.len()), height)
    }
}

// =========================================================================
// Scoring
// =========================================================================

/// Area penalized by how far the box is from square. Lower is better.
///
/// Boxes that cannot be drawn score infinity and never win.
pub fn score(size: Size) -> f32 {
    if !size.is_drawable() {
        return f32::INFINITY;
    }
    let aspect = (size.width / size.height).max(size.height / size.width);
    size.area() * aspect
}

/// One evaluated column count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub col_count: usize,
    pub size: Size,
    pub score: f32,
}

/// The winning candidate together with its placement.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub shape: Shape,
    pub size: Size,
    pub score: f32,
}

// =========================================================================
// Search
// =========================================================================

/// Column-count search over a fixed set of tiles.
pub struct ShapeSearch<'t> {
    proxies: Vec<TileProxy<'t>>,
    tiling: Tiling,
}

impl<'t> ShapeSearch<'t> {
    /// Measure every tile once at the column width.
    pub fn new(tiles: &'t [Box<dyn Tile>], cx: &mut LayoutContext<'_>, tiling: Tiling) -> Result<Self, LayoutError> {
        let proxies = tiles
            .iter()
            .map(|tile| TileProxy::measure(tile.as_ref(), cx, tiling.col_width))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { proxies, tiling })
    }

    pub fn tiling(&self) -> Tiling {
        self.tiling
    }

    pub fn proxies(&self) -> &[TileProxy<'t>] {
        &self.proxies
    }

    /// Greedy placement into `col_count` columns.
    ///
    /// Tiles are taken in order; each goes to the shortest column so far,
    /// the leftmost one on ties.
    pub fn place(&self, col_count: usize) -> (Shape, Size) {
        let mut shape = Shape::empty(col_count);
        let mut heights = vec![0.0f32; col_count];

        for (index, proxy) in self.proxies.iter().enumerate() {
            let Some(target) = shortest(&heights) else { break };
            if !shape.columns[target].is_empty() {
                heights[target] += self.tiling.row_pad;
            }
            heights[target] += proxy.height();
            shape.columns[target].push(index);
        }

        let height = heights.iter().copied().fold(0.0f32, f32::max);
        let size = Size::new(self.tiling.width_of(col_count), height);
        (shape, size)
    }

    /// Every column count from 1 to N with its size and score.
    pub fn candidates(&self) -> Vec<Candidate> {
        (1..=self.proxies.len())
            .map(|col_count| {
                let (_, size) = self.place(col_count);
                Candidate {
                    col_count,
                    size,
                    score: score(size),
                }
            })
            .collect()
    }

    /// Pick the lowest-scoring column count. Ties keep the fewer columns.
    pub fn run(&self) -> Result<SearchResult, LayoutError> {
        if self.proxies.is_empty() {
            return Err(LayoutError::EmptyPane);
        }

        let mut best: Option<SearchResult> = None;
        for col_count in 1..=self.proxies.len() {
            let (shape, size) = self.place(col_count);
            let candidate_score = score(size);
            tracing::trace!(col_count, ?size, score = candidate_score, "Shape candidate");

            let better = match &best {
                None => true,
                Some(current) => candidate_score < current.score,
            };
            if better {
                best = Some(SearchResult {
                    shape,
                    size,
                    score: candidate_score,
                });
            }
        }

        let Some(best) = best else {
            return Err(LayoutError::EmptyPane);
        };
        if !best.size.is_drawable() {
            return Err(LayoutError::Degenerate {
                width: best.size.width,
                height: best.size.height,
            });
        }

        tracing::debug!(
            tiles = self.proxies.len(),
            columns = best.shape.column_count(),
            width = best.size.width,
            height = best.size.height,
            score = best.score,
            "Shape search done"
        );
        Ok(best)
    }
}

/// Index of the smallest height, first one on ties.
fn shortest(heights: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &h) in heights.iter().enumerate() {
        match best {
            Some((_, current)) if h >= current => {}
            _ => best = Some((i, h)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ImageBlock, TextBlock};
    use crate::text::MonospaceMetrics;
    use image::{Rgba, RgbaImage};

    fn image_tiles(count: usize, width: u32, height: u32) -> Vec<Box<dyn Tile>> {
        (0..count)
            .map(|i| {
                let pixels = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
                Box::new(ImageBlock::from_image(pixels, format!("img {i}"))) as Box<dyn Tile>
            })
            .collect()
    }

    fn search(tiles: &[Box<dyn Tile>], tiling: Tiling) -> SearchResult {
        let mut m = MonospaceMetrics::with_advance(8.0, 12.0);
        let mut cx = LayoutContext::new(&mut m);
        ShapeSearch::new(tiles, &mut cx, tiling).unwrap().run().unwrap()
    }

    #[test]
    fn test_column_height() {
        let heights = [10.0, 20.0, 30.0];
        assert_eq!(Column::new().height(&heights, 5.0), 0.0);
        assert_eq!(Column::from(vec![1]).height(&heights, 5.0), 20.0);
        assert_eq!(Column::from(vec![0, 2]).height(&heights, 5.0), 45.0);
    }

    #[test]
    fn test_shape_canvas_size() {
        let shape = Shape::new(vec![Column::from(vec![0, 1]), Column::from(vec![2])]);
        let size = shape.canvas_size(&[10.0, 20.0, 50.0], &Tiling::default());
        assert_eq!(size, Size::new(610.0, 50.0));
        assert_eq!(shape.tile_count(), 3);
    }

    #[test]
    fn test_score_prefers_square() {
        assert!(score(Size::new(100.0, 100.0)) < score(Size::new(200.0, 50.0)));
        assert_eq!(score(Size::new(0.0, 10.0)), f32::INFINITY);
    }

    #[test]
    fn test_shortest_takes_first_on_tie() {
        assert_eq!(shortest(&[3.0, 1.0, 1.0]), Some(1));
        assert_eq!(shortest(&[0.0, 0.0]), Some(0));
        assert_eq!(shortest(&[]), None);
    }

    #[test]
    fn test_single_text_tile_is_one_column() {
        let tiles: Vec<Box<dyn Tile>> = vec![Box::new(TextBlock::plain("Hello, World!"))];
        let result = search(&tiles, Tiling::default());
        assert_eq!(result.shape, Shape::new(vec![Column::from(vec![0])]));
        assert_eq!(result.size, Size::new(300.0, 12.0));
    }

    #[test]
    fn test_greedy_fills_shortest_column() {
        let tiles = image_tiles(3, 300, 300);
        let mut m = MonospaceMetrics::with_advance(8.0, 12.0);
        let mut cx = LayoutContext::new(&mut m);
        let search = ShapeSearch::new(&tiles, &mut cx, Tiling::default()).unwrap();

        // every tile is sized once, at the column width
        let proxies = search.proxies();
        assert_eq!(proxies.len(), 3);
        assert!(proxies.iter().all(|p| p.size() == proxies[0].size()));
        assert!(proxies[0].size().width <= search.tiling().col_width);

        let (shape, _) = search.place(2);
        assert_eq!(shape.columns()[0].tiles(), &[0, 2]);
        assert_eq!(shape.columns()[1].tiles(), &[1]);
    }

    #[test]
    fn test_more_columns_than_tiles_leaves_empty_columns() {
        let tiles = image_tiles(2, 300, 300);
        let mut m = MonospaceMetrics::default();
        let mut cx = LayoutContext::new(&mut m);
        let search = ShapeSearch::new(&tiles, &mut cx, Tiling::default()).unwrap();

        let (shape, size) = search.place(3);
        assert!(shape.columns()[2].is_empty());
        assert_eq!(size.width, 3.0 * 300.0 + 2.0 * 10.0);
    }

    #[test]
    fn test_identical_images_pick_minimal_score() {
        let tiles = image_tiles(8, 485, 485);
        let mut m = MonospaceMetrics::with_advance(8.0, 12.0);
        let mut cx = LayoutContext::new(&mut m);
        let search = ShapeSearch::new(&tiles, &mut cx, Tiling::default()).unwrap();
        let result = search.run().unwrap();

        let candidates = search.candidates();
        assert_eq!(candidates.len(), 8);
        let min = candidates.iter().map(|c| c.score).fold(f32::INFINITY, f32::min);
        assert_eq!(result.score, min);

        let first_min = candidates.iter().find(|c| c.score == min).unwrap();
        assert_eq!(result.shape.column_count(), first_min.col_count);
        assert_eq!(result.shape.tile_count(), 8);
    }

    #[test]
    fn test_empty_search_fails() {
        let tiles: Vec<Box<dyn Tile>> = Vec::new();
        let mut m = MonospaceMetrics::default();
        let mut cx = LayoutContext::new(&mut m);
        let search = ShapeSearch::new(&tiles, &mut cx, Tiling::default()).unwrap();
        assert!(matches!(search.run(), Err(LayoutError::EmptyPane)));
    }

    struct Fixed(Size);

    impl Tile for Fixed {
        fn intrinsic_size(&self, _cx: &mut LayoutContext<'_>, _constraint: Size) -> Result<Size, LayoutError> {
            Ok(self.0)
        }

        fn draw(&self, _cx: &mut crate::layout::PaintContext<'_>, _allotted: Size) -> Result<(), LayoutError> {
            Ok(())
        }
    }

    #[test]
    fn test_zero_height_tiles_are_degenerate() {
        let tiles: Vec<Box<dyn Tile>> = vec![Box::new(Fixed(Size::ZERO)), Box::new(Fixed(Size::ZERO))];
        let mut m = MonospaceMetrics::default();
        let mut cx = LayoutContext::new(&mut m);
        let search = ShapeSearch::new(&tiles, &mut cx, Tiling::new(300.0, 10.0, 0.0)).unwrap();
        assert!(matches!(search.run(), Err(LayoutError::Degenerate { .. })));
    }
}
