//! Layout and composition error types.

use thiserror::Error;

/// Contract violations detected while sizing or drawing tiles.
///
/// None of these occur in correct usage; they exist so that a broken
/// tile tree fails loudly instead of producing an empty canvas.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("pane has no tiles to lay out")]
    EmptyPane,

    #[error("degenerate layout: {width}x{height}")]
    Degenerate { width: f32, height: f32 },

    #[error("tile nesting exceeds {max} levels")]
    NestingTooDeep { max: u32 },
}

/// Errors surfaced by the composition driver and by tile construction.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// `font` is the file path or the family name that failed.
    #[error("failed to load font {font}: {reason}")]
    FontLoad { font: String, reason: String },

    #[error("failed to encode canvas: {0}")]
    Encode(#[source] image::ImageError),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type Result<T, E = ComposeError> = std::result::Result<T, E>;
