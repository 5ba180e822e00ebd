//! Display-list surface.
//!
//! Records draw calls in device coordinates instead of rasterizing them.
//! Useful for inspecting where a layout put things without touching
//! pixels or fonts.

use image::RgbaImage;

use super::{Surface, TransformStack};
use crate::primitives::{Color, Point, Size};
use crate::text::{MonospaceMetrics, TextMeasure};

/// A recorded draw call. Positions and sizes are in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Text {
        text: String,
        origin: Point,
        scale: f32,
        color: Color,
    },
    Image {
        origin: Point,
        size: Size,
    },
}

pub struct RecordingSurface<M: TextMeasure = MonospaceMetrics> {
    measure: M,
    color: Color,
    transforms: TransformStack,
    commands: Vec<DrawCommand>,
}

impl<M: TextMeasure> RecordingSurface<M> {
    pub fn new(measure: M) -> Self {
        Self {
            measure,
            color: Color::BLACK,
            transforms: TransformStack::new(),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Recorded image placements, in draw order.
    pub fn images(&self) -> impl Iterator<Item = (Point, Size)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Image { origin, size } => Some((*origin, *size)),
            _ => None,
        })
    }

    /// Recorded text lines with their device origins, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = (&str, Point)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, origin, .. } => Some((text.as_str(), *origin)),
            _ => None,
        })
    }

    /// Transform nesting depth; zero once every push was popped.
    pub fn transform_depth(&self) -> usize {
        self.transforms.depth()
    }
}

impl Default for RecordingSurface<MonospaceMetrics> {
    fn default() -> Self {
        Self::new(MonospaceMetrics::default())
    }
}

impl<M: TextMeasure> TextMeasure for RecordingSurface<M> {
    fn font_height(&self) -> f32 {
        self.measure.font_height()
    }

    fn measure_line(&mut self, line: &str) -> f32 {
        self.measure.measure_line(line)
    }
}

impl<M: TextMeasure> Surface for RecordingSurface<M> {
    fn as_measure(&mut self) -> &mut dyn TextMeasure {
        self
    }

    fn transforms(&mut self) -> &mut TransformStack {
        &mut self.transforms
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn draw_line(&mut self, line: &str, at: Point) {
        let t = self.transforms.current();
        self.commands.push(DrawCommand::Text {
            text: line.to_string(),
            origin: t.apply(at),
            scale: t.sx,
            color: self.color,
        });
    }

    fn draw_image(&mut self, image: &RgbaImage, at: Point, scale: f32) {
        let t = self.transforms.current();
        self.commands.push(DrawCommand::Image {
            origin: t.apply(at),
            size: Size::new(
                image.width() as f32 * scale * t.sx,
                image.height() as f32 * scale * t.sy,
            ),
        });
    }
}
