//! Collage: column-packing image and text composition
//!
//! Collage arranges text blocks, captioned images and nested panes into a
//! single raster canvas:
//! - Every pane searches all column counts and keeps the most compact,
//!   most square packing
//! - The chosen packing is memoized, so measuring and drawing agree
//! - The finished canvas is fitted to a maximum size by uniform downscaling
//!
//! # Architecture
//!
//! Tiles are sized through a [`text::TextMeasure`] and drawn through a
//! [`surface::Surface`]. The [`engine::Engine`] measures the root pane
//! once, plans the canvas, and draws into a [`surface::RasterSurface`]
//! (or any caller-supplied surface).
//!
//! # Usage
//!
//! ```ignore
//! use collage::{Config, Engine, ImageBlock, Pane, Scene, TextBlock};
//!
//! let pane = Pane::new()
//!     .push(TextBlock::plain("Holiday"))
//!     .push(ImageBlock::open("beach.jpg", "Beach")?);
//! let canvas = Engine::new(Config::default()).render(&Scene::new(pane))?;
//! canvas.save("collage.png")?;
//! ```

// Core primitives
pub mod primitives;
pub mod error;
pub mod config;

// Text measurement and drawing backends
pub mod text;
pub mod surface;

// Layout system (tiles, shape search, panes)
pub mod layout;

// Composition driver
pub mod engine;

// Re-export commonly used types
pub use config::{Config, ResolvedConfig};
pub use engine::{Canvas, CanvasPlan, Engine, OUTER_PAD, Scene};
pub use error::{ComposeError, LayoutError, Result};
pub use layout::{ImageBlock, Pane, Shape, TextBlock, Tile, Tiling};
pub use primitives::{Color, Point, Size};
pub use surface::{RasterSurface, RecordingSurface, Surface};
pub use text::{CosmicText, MonospaceMetrics, TextMeasure};
