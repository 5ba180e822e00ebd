//! Engine configuration.
//!
//! Every field has a documented default that applies when the field is
//! zero or unset, so `Config::default()` renders a usable canvas.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, Result};
use crate::primitives::Color;

/// Font size used when `Config::font_size` is zero.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Configuration for the composition driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum canvas width in pixels. 0 = unbounded.
    pub max_canvas_width: u32,
    /// Maximum canvas height in pixels. 0 = unbounded.
    pub max_canvas_height: u32,
    /// Text color. Defaults to black.
    pub fg_color: Option<Color>,
    /// Canvas background. Defaults to white.
    pub bg_color: Option<Color>,
    /// Base font size in pixels. Defaults to 12.
    pub font_size: f32,
    /// TrueType/OpenType font file. Defaults to the system monospace family.
    pub font_path: Option<PathBuf>,
}

/// A `Config` with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub max_canvas_width: Option<u32>,
    pub max_canvas_height: Option<u32>,
    pub fg_color: Color,
    pub bg_color: Color,
    pub font_size: f32,
    pub font_path: Option<PathBuf>,
}

impl Config {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ComposeError::Config(e.to_string()))
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn max_canvas(mut self, width: u32, height: u32) -> Self {
        self.max_canvas_width = width;
        self.max_canvas_height = height;
        self
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    pub fn colors(mut self, fg: Color, bg: Color) -> Self {
        self.fg_color = Some(fg);
        self.bg_color = Some(bg);
        self
    }

    /// Apply defaults for zero/unset fields.
    pub fn resolved(&self) -> ResolvedConfig {
        let font_size = if self.font_size > 0.0 && self.font_size.is_finite() {
            self.font_size
        } else {
            DEFAULT_FONT_SIZE
        };
        ResolvedConfig {
            max_canvas_width: (self.max_canvas_width > 0).then_some(self.max_canvas_width),
            max_canvas_height: (self.max_canvas_height > 0).then_some(self.max_canvas_height),
            fg_color: self.fg_color.unwrap_or(Color::BLACK),
            bg_color: self.bg_color.unwrap_or(Color::WHITE),
            font_size,
            font_path: self.font_path.clone(),
        }
    }
}
