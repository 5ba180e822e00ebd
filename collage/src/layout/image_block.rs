//! ImageBlock - a decoded image with a caption underneath.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;

use crate::error::{ComposeError, LayoutError, Result};
use crate::primitives::{Point, Size};
use crate::text::TextMeasure;

use super::text_block::TextBlock;
use super::tile::{LayoutContext, PaintContext, Tile};

/// Gap between an image and its caption.
pub const LABEL_PAD: f32 = 3.0;

/// An image leaf. Pixels are shared, so cloning a block is cheap.
#[derive(Debug, Clone)]
pub struct ImageBlock {
    pixels: Arc<RgbaImage>,
    caption: TextBlock,
}

/// Resolved geometry for one constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    scale: f32,
    image: Size,
    caption: Size,
}

impl Placement {
    fn size(&self) -> Size {
        Size::new(self.image.width, self.image.height + self.caption.height + LABEL_PAD)
    }
}

impl ImageBlock {
    /// Wrap already decoded pixels.
    pub fn from_image(pixels: RgbaImage, caption: impl Into<String>) -> Self {
        Self {
            pixels: Arc::new(pixels),
            caption: TextBlock::wrapped(caption),
        }
    }

    /// Decode a JPEG or PNG (format detected from the header).
    pub fn decode(bytes: &[u8], caption: impl Into<String>) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).map_err(ComposeError::Decode)?;
        tracing::debug!("Decoded image {}x{}", decoded.width(), decoded.height());
        Ok(Self::from_image(decoded.to_rgba8(), caption))
    }

    pub fn from_reader(mut reader: impl Read, caption: impl Into<String>) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::decode(&bytes, caption)
    }

    pub fn open(path: impl AsRef<Path>, caption: impl Into<String>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::decode(&bytes, caption)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn caption(&self) -> &TextBlock {
        &self.caption
    }

    pub fn native_size(&self) -> Size {
        Size::new(self.pixels.width() as f32, self.pixels.height() as f32)
    }

    /// Scale factor for `constraint`.
    ///
    /// Width-only and box constraints only ever shrink. A height-only
    /// constraint scales to exactly that height, up or down.
    pub fn scale_for(&self, constraint: Size) -> f32 {
        let Size { width: w, height: h } = self.native_size();
        if w <= 0.0 || h <= 0.0 {
            return 1.0;
        }
        match (constraint.width > 0.0, constraint.height > 0.0) {
            (false, false) => 1.0,
            (true, false) => (constraint.width / w).min(1.0),
            (false, true) => constraint.height / h,
            (true, true) => (constraint.width / w).min(constraint.height / h).min(1.0),
        }
    }

    fn place(&self, text: &mut dyn TextMeasure, constraint: Size) -> Placement {
        let scale = self.scale_for(constraint);
        let image = self.native_size().scaled(scale);
        let caption = self.caption.measure(text, image.width);
        Placement { scale, image, caption }
    }
}

impl Tile for ImageBlock {
    fn intrinsic_size(&self, cx: &mut LayoutContext<'_>, constraint: Size) -> Result<Size, LayoutError> {
        Ok(self.place(cx.text(), constraint).size())
    }

    fn draw(&self, cx: &mut PaintContext<'_>, allotted: Size) -> Result<(), LayoutError> {
        let placement = {
            let mut layout = cx.layout();
            self.place(layout.text(), Size::width_only(allotted.width))
        };

        let surface = cx.surface();
        surface.draw_image(&self.pixels, Point::ORIGIN, placement.scale);
        surface.push();
        surface.translate(0.0, placement.image.height + LABEL_PAD);
        let result = self.caption.draw(cx, Size::new(placement.image.width, placement.caption.height));
        cx.surface().pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};
    use crate::text::{LINE_SPACING, MonospaceMetrics};
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn metrics() -> MonospaceMetrics {
        MonospaceMetrics::with_advance(8.0, 12.0)
    }

    fn block(width: u32, height: u32, caption: &str) -> ImageBlock {
        ImageBlock::from_image(RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255])), caption)
    }

    fn size_of(block: &ImageBlock, constraint: Size) -> Size {
        let mut m = metrics();
        let mut cx = LayoutContext::new(&mut m);
        block.intrinsic_size(&mut cx, constraint).unwrap()
    }

    /// One caption line at 12px font height.
    const CAPTION_H: f32 = 12.0 * LINE_SPACING;

    #[test]
    fn test_unconstrained_uses_native_size() {
        let size = size_of(&block(485, 485, "Sample"), Size::ZERO);
        assert_eq!(size, Size::new(485.0, 485.0 + CAPTION_H + LABEL_PAD));
    }

    #[test]
    fn test_width_constraint_scales_down() {
        let size = size_of(&block(485, 485, "Sample"), Size::width_only(300.0));
        assert_eq!(size.width, 300.0);
        assert_eq!(size.height, 300.0 + CAPTION_H + LABEL_PAD);
    }

    #[test]
    fn test_width_constraint_never_upscales() {
        let size = size_of(&block(100, 50, "Sample"), Size::width_only(300.0));
        assert_eq!(size, Size::new(100.0, 50.0 + CAPTION_H + LABEL_PAD));
    }

    #[test]
    fn test_height_constraint_may_upscale() {
        let size = size_of(&block(100, 50, "S"), Size::height_only(100.0));
        assert_eq!(size.width, 200.0);
        assert_eq!(size.height, 100.0 + CAPTION_H + LABEL_PAD);
    }

    #[test]
    fn test_box_constraint_fits_within() {
        // 800x400 into 400x400: width is the tighter axis
        let size = size_of(&block(800, 400, "S"), Size::new(400.0, 400.0));
        assert_eq!(size.width, 400.0);
        assert_eq!(size.height, 200.0 + CAPTION_H + LABEL_PAD);
    }

    #[test]
    fn test_box_constraint_never_upscales() {
        let size = size_of(&block(100, 50, "S"), Size::new(1000.0, 1000.0));
        assert_eq!(size, Size::new(100.0, 50.0 + CAPTION_H + LABEL_PAD));
    }

    #[test]
    fn test_caption_measured_at_scaled_width() {
        // 20-char caption is 160px: one line at 300px, two lines at 100px
        let caption = "aaaaaaaaa bbbbbbbbbb";
        let wide = size_of(&block(300, 300, caption), Size::ZERO);
        let narrow = size_of(&block(300, 300, caption), Size::width_only(100.0));
        assert_eq!(wide.height, 300.0 + CAPTION_H + LABEL_PAD);
        assert_eq!(narrow.height, 100.0 + 2.0 * CAPTION_H + LABEL_PAD);
    }

    #[test]
    fn test_empty_caption_still_has_a_line() {
        let size = size_of(&block(10, 10, ""), Size::ZERO);
        assert_eq!(size.height, 10.0 + CAPTION_H + LABEL_PAD);
    }

    #[test]
    fn test_decode_png() {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(7, 5, Rgba([1, 2, 3, 255]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let decoded = ImageBlock::decode(&bytes, "png").unwrap();
        assert_eq!(decoded.native_size(), Size::new(7.0, 5.0));
        assert_eq!(decoded.caption().text(), "png");
    }

    #[test]
    fn test_decode_jpeg_from_reader() {
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 8, Rgba([9, 9, 9, 255])))
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();

        let decoded = ImageBlock::from_reader(Cursor::new(bytes), "jpg").unwrap();
        assert_eq!(decoded.native_size(), Size::new(16.0, 8.0));
    }

    #[test]
    fn test_decode_garbage_is_error() {
        let err = ImageBlock::decode(b"not an image", "bad").unwrap_err();
        assert!(matches!(err, ComposeError::Decode(_)));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let err = ImageBlock::open("/nonexistent/picture.png", "missing").unwrap_err();
        assert!(matches!(err, ComposeError::Io(_)));
    }

    #[test]
    fn test_draw_scales_image_and_places_caption() {
        let img = block(600, 300, "cap");
        let mut surface = RecordingSurface::new(metrics());
        let mut cx = PaintContext::new(&mut surface);
        img.draw(&mut cx, Size::new(300.0, 200.0)).unwrap();

        assert_eq!(surface.transform_depth(), 0);
        assert_eq!(
            surface.commands(),
            &[
                DrawCommand::Image {
                    origin: Point::ORIGIN,
                    size: Size::new(300.0, 150.0),
                },
                DrawCommand::Text {
                    text: "cap".into(),
                    origin: Point::new(0.0, 150.0 + LABEL_PAD),
                    scale: 1.0,
                    color: crate::primitives::Color::BLACK,
                },
            ]
        );
    }
}
