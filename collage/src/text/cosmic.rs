//! cosmic-text integration.
//!
//! Shapes text with cosmic-text for measurement and rasterizes glyphs
//! through its SwashCache when drawing. Line widths are kept in an LRU
//! cache since the layout search measures the same strings many times.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use cosmic_text::fontdb::{Query, Source, Stretch, Style, Weight};
use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache};
use lru::LruCache;

use super::{LINE_HEIGHT_RATIO, TextMeasure};
use crate::error::{ComposeError, Result};
use crate::primitives::{Color, Point};

const WIDTH_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(1023);

/// Font family to shape with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Monospace,
    Named(String),
}

impl std::fmt::Display for FontFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontFamily::Monospace => f.write_str("monospace"),
            FontFamily::Named(name) => f.write_str(name),
        }
    }
}

impl FontFamily {
    fn to_cosmic(&self) -> Family<'_> {
        match self {
            FontFamily::Monospace => Family::Monospace,
            FontFamily::Named(name) => Family::Name(name),
        }
    }
}

/// Fast non-cryptographic hash for cache keys.
#[inline]
fn hash_text(text: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Text measurement and glyph rasterization backed by cosmic-text.
pub struct CosmicText {
    font_system: FontSystem,
    swash_cache: SwashCache,
    family: FontFamily,
    font_size: f32,
    /// Line width by text hash, at scale 1.
    widths: LruCache<u64, f32>,
}

impl CosmicText {
    /// Use the system monospace family.
    ///
    /// Fails with [`ComposeError::FontLoad`] when the system has no fonts.
    pub fn new(font_size: f32) -> Result<Self> {
        Self::from_font_system(FontSystem::new(), FontFamily::Monospace, font_size)
    }

    /// Use `family` from an already populated font system.
    ///
    /// An empty font database is an error, since shaping would have nothing
    /// to fall back on. A family with no matching face is replaced by the
    /// first family in the database.
    pub fn from_font_system(font_system: FontSystem, family: FontFamily, font_size: f32) -> Result<Self> {
        let family = {
            let db = font_system.db();
            let Some(first) = db.faces().next() else {
                return Err(ComposeError::FontLoad {
                    font: family.to_string(),
                    reason: "no fonts available".into(),
                });
            };

            let query = Query {
                families: &[family.to_cosmic()],
                weight: Weight::NORMAL,
                stretch: Stretch::Normal,
                style: Style::Normal,
            };
            if db.query(&query).is_some() {
                family
            } else {
                let fallback = first
                    .families
                    .first()
                    .map(|(name, _)| name.clone())
                    .ok_or_else(|| ComposeError::FontLoad {
                        font: family.to_string(),
                        reason: "no face matches and no fallback family".into(),
                    })?;
                tracing::warn!("Font family {} not found, using {}", family, fallback);
                FontFamily::Named(fallback)
            }
        };
        Ok(Self::with_font_system(font_system, family, font_size))
    }

    /// Load a font file and use its first family.
    pub fn from_font_file(path: impl AsRef<Path>, font_size: f32) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| ComposeError::FontLoad {
            font: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_font_data(data, font_size).map_err(|reason| ComposeError::FontLoad {
            font: path.display().to_string(),
            reason,
        })
    }

    fn from_font_data(data: Vec<u8>, font_size: f32) -> std::result::Result<Self, String> {
        let mut font_system = FontSystem::new();
        let ids = font_system
            .db_mut()
            .load_font_source(Source::Binary(Arc::new(data)));
        let family = ids
            .first()
            .and_then(|id| font_system.db().face(*id))
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| "no usable font face in file".to_string())?;

        tracing::debug!("Loaded font family {:?}", family);
        Ok(Self::with_font_system(font_system, FontFamily::Named(family), font_size))
    }

    fn with_font_system(font_system: FontSystem, family: FontFamily, font_size: f32) -> Self {
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            family,
            font_size,
            widths: LruCache::new(WIDTH_CACHE_CAPACITY),
        }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn family(&self) -> &FontFamily {
        &self.family
    }

    /// Number of cached line widths.
    pub fn cache_len(&self) -> usize {
        self.widths.len()
    }

    /// Shape a single run of text at `scale` times the base size.
    fn shape(&mut self, text: &str, scale: f32) -> Buffer {
        let metrics = Metrics::new(self.font_size * scale, self.font_height() * scale);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, Some(f32::MAX), Some(f32::MAX));

        let attrs = Attrs::new().family(self.family.to_cosmic());
        buffer.set_text(&mut self.font_system, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    /// Rasterize one line with its top-left corner at `origin` (device pixels).
    ///
    /// `put` receives `(x, y, width, height, rgba)` rectangles of coverage.
    pub fn rasterize_line(
        &mut self,
        line: &str,
        origin: Point,
        scale: f32,
        color: Color,
        mut put: impl FnMut(i32, i32, u32, u32, [u8; 4]),
    ) {
        let buffer = self.shape(line, scale);
        let [r, g, b, a] = color.to_rgba8();
        let (ox, oy) = (origin.x.round() as i32, origin.y.round() as i32);
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            cosmic_text::Color::rgba(r, g, b, a),
            |x, y, w, h, c| put(ox + x, oy + y, w, h, [c.r(), c.g(), c.b(), c.a()]),
        );
    }
}

impl TextMeasure for CosmicText {
    fn font_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT_RATIO
    }

    fn measure_line(&mut self, line: &str) -> f32 {
        let key = hash_text(line);
        if let Some(&width) = self.widths.get(&key) {
            return width;
        }

        let buffer = self.shape(line, 1.0);
        let width = buffer
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0f32, f32::max);

        self.widths.put(key, width);
        width
    }
}
