use std::cell::RefCell;
use std::rc::Rc;

use cosmic_text::{
    Attrs, Buffer, Color as CosmicColor, Family, FontSystem, Metrics as CosmicMetrics, Shaping,
    SwashCache,
};

use crate::geometry::Size;
use crate::surface::{Color, Surface};

/// Render arguments passed through to the font on every glyph run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    /// Solid fill behind the glyphs; None leaves the run transparent.
    pub background: Option<Color>,
}

impl TextStyle {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            background: None,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

/// Text measuring and rasterizing capability consumed by `Text` elements.
pub trait Font {
    /// Pixel extent of `text` as a single run.
    fn size(&mut self, text: &str) -> Size;
    /// Rasterize `text` as a single run onto a new surface of its extent.
    fn render(&mut self, text: &str, style: &TextStyle) -> Surface;
}

/// Shared font handle. Elements hold one so re-layout never needs a
/// global font context.
pub type FontHandle = Rc<RefCell<dyn Font>>;

pub fn handle(font: impl Font + 'static) -> FontHandle {
    Rc::new(RefCell::new(font))
}

// ---------------------------------------------------------------------------
// cosmic-text backed font
// ---------------------------------------------------------------------------

pub struct CosmicFont {
    font_system: FontSystem,
    cache: SwashCache,
    metrics: CosmicMetrics,
    family: Option<String>,
}

impl CosmicFont {
    /// Font at `size_px` drawn from the system font database.
    pub fn new(size_px: f32) -> Self {
        Self::with_font_system(FontSystem::new(), size_px)
    }

    /// Font at `size_px` using only the given font file bytes.
    pub fn from_bytes(data: Vec<u8>, size_px: f32) -> Self {
        let mut db = cosmic_text::fontdb::Database::new();
        db.load_font_data(data);
        let font_system = FontSystem::new_with_locale_and_db("en-US".to_string(), db);
        Self::with_font_system(font_system, size_px)
    }

    fn with_font_system(font_system: FontSystem, size_px: f32) -> Self {
        Self {
            font_system,
            cache: SwashCache::new(),
            metrics: CosmicMetrics::new(size_px, size_px * 1.3),
            family: None,
        }
    }

    /// Restrict shaping to a named family instead of the default sans-serif.
    pub fn with_family(mut self, name: impl Into<String>) -> Self {
        self.family = Some(name.into());
        self
    }

    fn shape(&mut self, text: &str) -> Buffer {
        let mut buffer = Buffer::new(&mut self.font_system, self.metrics);
        buffer.set_size(&mut self.font_system, None, None);
        let attrs = match &self.family {
            Some(name) => Attrs::new().family(Family::Name(name.as_str())),
            None => Attrs::new().family(Family::SansSerif),
        };
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    fn extent(&self, buffer: &Buffer) -> Size {
        let mut width: f32 = 0.0;
        let mut lines = 0u32;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            lines += 1;
        }
        let height = lines.max(1) as f32 * self.metrics.line_height;
        Size::new(width.ceil() as u32, height.ceil() as u32)
    }
}

impl Font for CosmicFont {
    fn size(&mut self, text: &str) -> Size {
        let buffer = self.shape(text);
        self.extent(&buffer)
    }

    fn render(&mut self, text: &str, style: &TextStyle) -> Surface {
        let buffer = self.shape(text);
        let mut surface = Surface::new(self.extent(&buffer));
        if let Some(bg) = style.background {
            surface.fill(bg);
        }

        let c = style.color;
        let base = CosmicColor::rgba(c.r, c.g, c.b, c.a);
        buffer.draw(
            &mut self.font_system,
            &mut self.cache,
            base,
            |x, y, w, h, color| {
                let px = Color::rgba(color.r(), color.g(), color.b(), color.a());
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        surface.blend_pixel(x + dx, y + dy, px);
                    }
                }
            },
        );
        surface
    }
}

// ---------------------------------------------------------------------------
// Fixed-advance block font
// ---------------------------------------------------------------------------

/// Every glyph is one `advance` x `height` cell; non-space glyphs are drawn
/// as a solid box one pixel narrower than the cell. Deterministic and
/// system-independent, so layouts can be asserted exactly.
#[derive(Debug, Clone, Copy)]
pub struct BlockFont {
    pub advance: u32,
    pub height: u32,
}

impl BlockFont {
    pub fn new(advance: u32, height: u32) -> Self {
        Self { advance, height }
    }
}

impl Font for BlockFont {
    fn size(&mut self, text: &str) -> Size {
        Size::new(text.chars().count() as u32 * self.advance, self.height)
    }

    fn render(&mut self, text: &str, style: &TextStyle) -> Surface {
        let mut surface = Surface::new(self.size(text));
        if let Some(bg) = style.background {
            surface.fill(bg);
        }
        let mut glyph = Surface::new(Size::new(self.advance.saturating_sub(1), self.height));
        glyph.fill(style.color);
        for (i, ch) in text.chars().enumerate() {
            if !ch.is_whitespace() {
                surface.blit(&glyph, (i as u32 * self.advance) as i32, 0);
            }
        }
        surface
    }
}
