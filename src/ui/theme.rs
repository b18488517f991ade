use serde::Deserialize;

use crate::surface::Color;

/// Visual constants shared by the built-in elements.
///
/// Elements copy what they need out of the theme at construction time, so
/// changing a theme later does not restyle existing elements. Every field has
/// a default, which lets a RON theme file name only what it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Theme {
    // -- Screen --
    /// Display clear color used by the demo frame loop: #282828
    pub background: Color,

    // -- ScrollingFrame defaults --
    /// Scrollbar thumb color.
    pub scroll_fill: Color,
    /// Gap between the thumb and the viewport edge, in pixels.
    pub scrollbar_padding: i32,
    /// Thumb width in pixels.
    pub scrollbar_width: u32,
    /// Pixels scrolled per wheel notch.
    pub scroll_speed: i32,

    // -- Text / Sprite defaults --
    /// Fill behind laid-out text.
    pub text_fill: Color,
    /// Outline drawn around sprites when bounding boxes are requested.
    pub bounding_box_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::rgb(0x28, 0x28, 0x28),

            scroll_fill: Color::rgb(230, 230, 230),
            scrollbar_padding: 4,
            scrollbar_width: 2,
            scroll_speed: 10,

            text_fill: Color::BLACK,
            bounding_box_color: Color::WHITE,
        }
    }
}
