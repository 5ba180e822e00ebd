//! RGBA raster surface.
//!
//! Pixels live in an `image::RgbaImage`; glyphs come from [`CosmicText`]
//! and are alpha-blended in place. Everything is clipped to the canvas.

use image::imageops::{self, FilterType};
use image::{Pixel, Rgba, RgbaImage};

use super::{Surface, TransformStack};
use crate::primitives::{Color, Point};
use crate::text::{CosmicText, TextMeasure};

pub struct RasterSurface {
    image: RgbaImage,
    text: CosmicText,
    color: Color,
    transforms: TransformStack,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, text: CosmicText) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            text,
            color: Color::BLACK,
            transforms: TransformStack::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Alpha-blend a solid rectangle into `image`, clipped to its bounds.
fn blend_rect(image: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, rgba: [u8; 4]) {
    if rgba[3] == 0 {
        return;
    }
    let (iw, ih) = (image.width() as i64, image.height() as i64);
    let x0 = (x as i64).clamp(0, iw);
    let y0 = (y as i64).clamp(0, ih);
    let x1 = (x as i64 + w as i64).clamp(0, iw);
    let y1 = (y as i64 + h as i64).clamp(0, ih);
    let src = Rgba(rgba);
    for py in y0..y1 {
        for px in x0..x1 {
            image.get_pixel_mut(px as u32, py as u32).blend(&src);
        }
    }
}

impl TextMeasure for RasterSurface {
    fn font_height(&self) -> f32 {
        self.text.font_height()
    }

    fn measure_line(&mut self, line: &str) -> f32 {
        self.text.measure_line(line)
    }
}

impl Surface for RasterSurface {
    fn as_measure(&mut self) -> &mut dyn TextMeasure {
        self
    }

    fn transforms(&mut self) -> &mut TransformStack {
        &mut self.transforms
    }

    fn clear(&mut self, color: Color) {
        let fill = Rgba(color.to_rgba8());
        for pixel in self.image.pixels_mut() {
            *pixel = fill;
        }
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn draw_line(&mut self, line: &str, at: Point) {
        if line.trim().is_empty() {
            return;
        }
        let t = self.transforms.current();
        let origin = t.apply(at);
        let Self { image, text, color, .. } = self;
        text.rasterize_line(line, origin, t.sx, *color, |x, y, w, h, rgba| {
            blend_rect(image, x, y, w, h, rgba)
        });
    }

    fn draw_image(&mut self, source: &RgbaImage, at: Point, scale: f32) {
        let t = self.transforms.current();
        let origin = t.apply(at);
        let width = (source.width() as f32 * scale * t.sx).round() as u32;
        let height = (source.height() as f32 * scale * t.sy).round() as u32;
        if width == 0 || height == 0 {
            return;
        }

        let (x, y) = (origin.x.round() as i64, origin.y.round() as i64);
        if width == source.width() && height == source.height() {
            imageops::overlay(&mut self.image, source, x, y);
        } else {
            let resized = imageops::resize(source, width, height, FilterType::Triangle);
            imageops::overlay(&mut self.image, &resized, x, y);
        }
    }
}
