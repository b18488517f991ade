use smallvec::SmallVec;

use crate::font::{FontHandle, TextStyle};
use crate::geometry::{Anchor, Size};
use crate::surface::{Color, Surface};

/// A rendered word and where it lands on the text surface, before the
/// per-line centering shift is applied.
struct PlacedWord {
    surface: Surface,
    x: f32,
    y: f32,
}

#[derive(Default)]
struct Line {
    words: SmallVec<[PlacedWord; 8]>,
    /// Accumulated horizontal shift that centers this line (center anchor).
    shift: f32,
}

/// Text laid out onto an element surface.
///
/// The element surface keeps its size; layout fills it with the element's
/// fill color and composites the laid-out glyphs on top.
pub struct Text {
    text: String,
    font: FontHandle,
    pub style: TextStyle,
    pub anchor: Anchor,
    pub wrap: bool,
    text_surface: Option<Surface>,
    line_count: usize,
}

impl Text {
    /// Centered, word-wrapped text.
    pub fn new(text: impl Into<String>, font: FontHandle, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            font,
            style,
            anchor: Anchor::Center,
            wrap: true,
            text_surface: None,
            line_count: 0,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Glyphs from the last layout, before they were placed on the element.
    pub fn text_surface(&self) -> Option<&Surface> {
        self.text_surface.as_ref()
    }

    /// Lines produced by the last wrapped layout (1 for single-line text).
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Replace the text and re-layout onto `surface` before returning.
    pub fn set_text(&mut self, value: impl Into<String>, surface: &mut Surface, fill: Color) {
        self.text = value.into();
        self.draw_text(surface, fill);
    }

    /// Layout then place onto `surface`.
    pub fn draw_text(&mut self, surface: &mut Surface, fill: Color) {
        self.render_text(surface.size());
        self.blit_text(surface, fill);
    }

    /// Rebuild the text surface for an element of `bounds` size.
    pub fn render_text(&mut self, bounds: Size) {
        if self.wrap {
            self.render_wrapped(bounds);
        } else {
            let rendered = self.font.borrow_mut().render(&self.text, &self.style);
            self.text_surface = Some(rendered);
            self.line_count = 1;
        }
    }

    fn render_wrapped(&mut self, bounds: Size) {
        let mut font = self.font.borrow_mut();
        let space_size = font.size(" ");
        let space = space_size.width as f32;
        let max_width = bounds.width as f32;
        let centered = self.anchor == Anchor::Center;

        let origin = if centered {
            ((bounds.width / 2) as f32, (bounds.height / 2) as f32)
        } else {
            (0.0, 0.0)
        };
        let (mut x, mut y) = origin;
        let mut word_height = space_size.height as f32;
        let mut lines: Vec<Line> = Vec::new();

        for source_line in self.text.lines() {
            let words: Vec<&str> = source_line.split_whitespace().collect();
            let mut line = Line::default();

            for (j, word) in words.iter().enumerate() {
                let surface = font.render(word, &self.style);
                let word_width = surface.width() as f32;
                word_height = surface.height() as f32;

                // Break before a word whose midpoint would cross the right edge.
                // An oversized first word leaves an empty line behind it.
                if x + 0.5 * word_width + line.shift >= max_width {
                    lines.push(std::mem::take(&mut line));
                    x = origin.0;
                    y += word_height;
                }

                line.words.push(PlacedWord { surface, x, y });
                if centered {
                    let trailing = if j + 1 < words.len() { space } else { 0.0 };
                    line.shift -= 0.5 * (word_width + trailing);
                }
                x += word_width + space;
            }

            lines.push(line);
            x = origin.0;
            y += word_height;
        }

        let vertical_shift = if centered {
            lines.len() as f32 * word_height / 2.0
        } else {
            0.0
        };

        let mut text_surface = Surface::new(bounds);
        for line in &lines {
            let shift = if centered { line.shift } else { 0.0 };
            for word in &line.words {
                text_surface.blit(
                    &word.surface,
                    (word.x + shift) as i32,
                    (word.y - vertical_shift) as i32,
                );
            }
        }

        self.line_count = lines.len();
        self.text_surface = Some(text_surface);
    }

    /// Fill `surface` and place the text surface at its center or origin.
    pub fn blit_text(&self, surface: &mut Surface, fill: Color) {
        surface.fill(fill);
        let Some(text_surface) = &self.text_surface else {
            return;
        };
        match self.anchor {
            Anchor::Center => {
                let x = (surface.width() / 2) as i32 - (text_surface.width() / 2) as i32;
                let y = (surface.height() / 2) as i32 - (text_surface.height() / 2) as i32;
                surface.blit(text_surface, x, y);
            }
            Anchor::TopLeft => surface.blit(text_surface, 0, 0),
        }
    }
}
