//! Composition driver.
//!
//! Measures the root pane once, fits the padded result into the configured
//! maximum canvas by a uniform downscale, then draws into a surface. The
//! pane memoizes its shape during measurement, so the draw pass reuses the
//! exact partition that sized the canvas.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use crate::config::{Config, ResolvedConfig};
use crate::error::{ComposeError, LayoutError, Result};
use crate::layout::{LayoutContext, PaintContext, Pane, Tile};
use crate::primitives::Size;
use crate::surface::{RasterSurface, Surface};
use crate::text::{CosmicText, TextMeasure};

/// Margin around the root pane on every side.
pub const OUTER_PAD: f32 = 10.0;

const DEFAULT_JPEG_QUALITY: u8 = 90;

/// What gets composed: a root pane.
#[derive(Debug, Default)]
pub struct Scene {
    main: Pane,
}

impl Scene {
    pub fn new(main: Pane) -> Self {
        Self { main }
    }

    pub fn main(&self) -> &Pane {
        &self.main
    }
}

impl From<Pane> for Scene {
    fn from(main: Pane) -> Self {
        Self::new(main)
    }
}

/// Sizing decisions for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasPlan {
    /// Root pane size in layout units.
    pub content: Size,
    /// Content plus [`OUTER_PAD`] on every side.
    pub padded: Size,
    /// Uniform factor applied to the whole canvas, never above 1.
    pub scale: f32,
    pub width: u32,
    pub height: u32,
}

/// Uniform scale that fits `size` within the given bounds.
///
/// `None` leaves an axis unbounded. Returns 1 when nothing overflows.
pub fn fit_scale(size: Size, max_width: Option<u32>, max_height: Option<u32>) -> f32 {
    let ratio = |extent: f32, max: Option<u32>| match max {
        Some(max) if extent > max as f32 => max as f32 / extent,
        _ => 1.0,
    };
    let scale = ratio(size.width, max_width).min(ratio(size.height, max_height));
    if scale < 1.0 {
        tracing::warn!(
            width = size.width,
            height = size.height,
            ?max_width,
            ?max_height,
            scale,
            "Canvas exceeds maximum, downscaling"
        );
    }
    scale
}

/// Pixel extent of a scaled axis, clamped to its maximum.
fn pixels(extent: f32, scale: f32, max: Option<u32>) -> u32 {
    let px = (extent * scale).ceil().max(1.0) as u32;
    max.map_or(px, |max| px.min(max))
}

/// Lays out and renders scenes with one configuration.
#[derive(Debug, Clone)]
pub struct Engine {
    config: ResolvedConfig,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            config: config.resolved(),
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Measure `scene` and plan the canvas without drawing.
    pub fn measure(&self, scene: &Scene, text: &mut dyn TextMeasure) -> Result<CanvasPlan, LayoutError> {
        let mut cx = LayoutContext::new(text);
        let content = scene.main.intrinsic_size(&mut cx, Size::ZERO)?;
        if !content.is_drawable() {
            return Err(LayoutError::Degenerate {
                width: content.width,
                height: content.height,
            });
        }

        let padded = content.padded(OUTER_PAD);
        let (max_w, max_h) = (self.config.max_canvas_width, self.config.max_canvas_height);
        let scale = fit_scale(padded, max_w, max_h);
        let plan = CanvasPlan {
            content,
            padded,
            scale,
            width: pixels(padded.width, scale, max_w),
            height: pixels(padded.height, scale, max_h),
        };
        tracing::debug!(?plan, "Canvas planned");
        Ok(plan)
    }

    /// Render `scene` to an RGBA canvas.
    pub fn render(&self, scene: &Scene) -> Result<Canvas> {
        let mut text = match &self.config.font_path {
            Some(path) => CosmicText::from_font_file(path, self.config.font_size)?,
            None => CosmicText::new(self.config.font_size)?,
        };
        let plan = self.measure(scene, &mut text)?;

        let mut surface = RasterSurface::new(plan.width, plan.height, text);
        self.paint(scene, &mut surface, &plan)?;

        tracing::info!(width = plan.width, height = plan.height, scale = plan.scale, "Rendered canvas");
        Ok(Canvas::new(surface.into_image()))
    }

    /// Render `scene` into a caller-supplied surface.
    pub fn render_with(&self, scene: &Scene, surface: &mut dyn Surface) -> Result<CanvasPlan> {
        let plan = self.measure(scene, surface.as_measure())?;
        self.paint(scene, surface, &plan)?;
        tracing::info!(width = plan.width, height = plan.height, scale = plan.scale, "Rendered scene");
        Ok(plan)
    }

    fn paint(&self, scene: &Scene, surface: &mut dyn Surface, plan: &CanvasPlan) -> Result<(), LayoutError> {
        surface.clear(self.config.bg_color);
        surface.set_color(self.config.fg_color);
        surface.push();
        surface.scale(plan.scale, plan.scale);
        surface.translate(OUTER_PAD, OUTER_PAD);

        let result = {
            let mut cx = PaintContext::new(&mut *surface);
            scene.main.draw(&mut cx, plan.content)
        };
        surface.pop();
        result
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// A rendered RGBA canvas.
#[derive(Debug, Clone)]
pub struct Canvas {
    raw: RgbaImage,
}

impl Canvas {
    pub fn new(raw: RgbaImage) -> Self {
        Self { raw }
    }

    pub fn width(&self) -> u32 {
        self.raw.width()
    }

    pub fn height(&self) -> u32 {
        self.raw.height()
    }

    pub fn raw(&self) -> &RgbaImage {
        &self.raw
    }

    pub fn into_raw(self) -> RgbaImage {
        self.raw
    }

    pub fn to_png<W: Write>(&self, writer: W) -> Result<()> {
        PngEncoder::new(writer)
            .write_image(self.raw.as_raw(), self.width(), self.height(), ExtendedColorType::Rgba8)
            .map_err(ComposeError::Encode)
    }

    /// Encode as JPEG. Alpha is dropped; quality is clamped to 1..=100.
    pub fn to_jpeg<W: Write>(&self, mut writer: W, quality: u8) -> Result<()> {
        let rgb = DynamicImage::ImageRgba8(self.raw.clone()).to_rgb8();
        JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(ComposeError::Encode)
    }

    /// Save with the format picked from the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let jpeg = match ext.as_deref() {
            Some("jpg" | "jpeg") => true,
            Some("png") => false,
            _ => return self.raw.save(path).map_err(ComposeError::Encode),
        };

        // buffered bytes only reach the file on flush, which can fail
        let mut writer = BufWriter::new(File::create(path)?);
        if jpeg {
            self.to_jpeg(&mut writer, DEFAULT_JPEG_QUALITY)?;
        } else {
            self.to_png(&mut writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}
