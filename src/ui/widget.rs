use super::scrolling::ScrollingFrame;
use super::sprite::Sprite;
use super::text::Text;

/// Flat enum element identity.
/// Closed set: every element carries the shared node state plus one of these.
pub enum Widget {
    /// Plain container drawing its own surface.
    Frame,

    /// Frame whose surface came from an image file (or was handed in).
    Image,

    /// Selectable entry in a list of options. Selection is pure state;
    /// embedders restyle the surface themselves.
    OptionItem { selected: bool },

    /// Word-wrapped or single-line text laid out onto the element surface.
    Text(Text),

    /// Clipped, vertically scrollable viewport over an oversized content
    /// surface. The element surface *is* the content surface.
    ScrollingFrame(ScrollingFrame),

    /// Rotatable image with an optional collision mask.
    Sprite(Sprite),
}

impl Widget {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Widget::Frame => "Frame",
            Widget::Image => "Image",
            Widget::OptionItem { .. } => "OptionItem",
            Widget::Text(_) => "Text",
            Widget::ScrollingFrame(_) => "ScrollingFrame",
            Widget::Sprite(_) => "Sprite",
        }
    }
}
