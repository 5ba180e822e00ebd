//! Layout System for collage
//!
//! Tiles report an intrinsic size under a width/height constraint and draw
//! themselves into an allotted box. A [`Pane`] packs its tiles into columns
//! by searching every column count and keeping the most compact, most
//! square result.
//!
//! # Architecture
//!
//! ```text
//! leaf tiles -> proxies (frozen sizes) -> shape search -> Pane memoizes Shape
//!            -> driver measures root once -> draw reuses the same Shape
//! ```

pub mod tile;
pub mod text_block;
pub mod image_block;
pub mod proxy;
pub mod shape;
pub mod pane;

// Re-export core types
pub use tile::{LayoutContext, PaintContext, Tile, MAX_NESTING_DEPTH};
pub use text_block::{TextBlock, TextBlockOpts};
pub use image_block::{ImageBlock, LABEL_PAD};
pub use proxy::TileProxy;
pub use shape::{Candidate, Column, SearchResult, Shape, ShapeSearch, Tiling, score};
pub use pane::{Pane, LARGE_PANE_TILES};

/// Default width of every column in a pane.
pub const DEFAULT_COL_WIDTH: f32 = 300.0;
/// Default horizontal gap between columns.
pub const DEFAULT_COL_PAD: f32 = 10.0;
/// Default vertical gap between tiles in a column.
pub const DEFAULT_ROW_PAD: f32 = 10.0;
