use crate::geometry::{RelativePosition, Size};
use crate::surface::{Color, Surface};

use super::input::{MouseButton, Tick, UiEvent};
use super::theme::Theme;
use super::widget::Widget;
use super::{ElementNode, require};

/// Vertical-only scroller.
///
/// The owning element's surface is the full-size content surface that
/// children compose onto; `viewport` is the clipped window onto it that
/// actually gets drawn into the parent.
pub struct ScrollingFrame {
    /// Visible window, resolved against the parent surface on every update.
    pub window_size: RelativePosition,
    /// Total content size.
    pub scroll_limits: Size,
    /// Vertical pixel offset of the content, always in `-max_scroll()..=0`.
    scroll_offset: i32,
    pub scroll_speed: i32,
    pub scrollable: bool,
    pub show_scrollbar: bool,
    pub scroll_fill: Color,
    pub scrollbar_padding: i32,
    pub scrollbar_width: u32,
    pub(super) viewport: Option<Surface>,
    scrollbar: Option<Surface>,
}

impl ScrollingFrame {
    pub fn new(scroll_limits: Size, window_size: RelativePosition, theme: &Theme) -> Self {
        Self {
            window_size,
            scroll_limits,
            scroll_offset: 0,
            scroll_speed: theme.scroll_speed,
            scrollable: true,
            show_scrollbar: true,
            scroll_fill: theme.scroll_fill,
            scrollbar_padding: theme.scrollbar_padding,
            scrollbar_width: theme.scrollbar_width,
            viewport: None,
            scrollbar: None,
        }
    }

    pub fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    /// Viewport from the last update, if any.
    pub fn viewport(&self) -> Option<&Surface> {
        self.viewport.as_ref()
    }

    /// Scrollbar thumb from the last update, if any.
    pub fn scrollbar(&self) -> Option<&Surface> {
        self.scrollbar.as_ref()
    }

    fn viewport_height(&self) -> Option<i32> {
        self.viewport.as_ref().map(|v| v.height() as i32)
    }

    /// Furthest the content can move up. Zero until the first update and
    /// whenever the content fits in the viewport.
    pub fn max_scroll(&self) -> i32 {
        match self.viewport_height() {
            Some(h) if h < self.scroll_limits.height as i32 => self.scroll_limits.height as i32 - h,
            _ => 0,
        }
    }

    /// Set the offset directly, clamped to the scrollable range.
    pub fn set_scroll_offset(&mut self, offset: i32) {
        self.scroll_offset = offset.clamp(-self.max_scroll(), 0);
    }

    fn track_length(&self, viewport_height: f32) -> f32 {
        viewport_height - 2.0 * self.scrollbar_padding as f32
    }

    /// Allocate a fresh viewport and blank content surface for a parent of
    /// `parent_size`, size the scrollbar thumb, and return the content.
    pub fn layout(&mut self, parent_size: Size) -> Surface {
        let window = self.window_size.resolve(parent_size);
        let window = Size::new(window.x.max(0.0) as u32, window.y.max(0.0) as u32);

        let content = Surface::new(self.scroll_limits);
        self.viewport = Some(Surface::new(window));
        // A taller window shrinks the range; pull a stale offset back in.
        self.scroll_offset = self.scroll_offset.clamp(-self.max_scroll(), 0);
        self.scroll(&content);

        let shown = window.height as f32 / self.scroll_limits.height.max(1) as f32;
        let thumb_height = (shown * self.track_length(window.height as f32)).max(0.0);
        let mut scrollbar = Surface::new(Size::new(self.scrollbar_width, thumb_height as u32));
        scrollbar.fill(self.scroll_fill);
        self.scrollbar = Some(scrollbar);

        content
    }

    /// Redraw the viewport from `content` at the current offset.
    pub fn scroll(&mut self, content: &Surface) {
        let viewport = require(self.viewport.as_mut(), "ScrollingFrame scrolled before update()");
        viewport.fill(Color::TRANSPARENT);
        viewport.blit(content, 0, self.scroll_offset);
    }

    /// Scroll `content` into the viewport and overlay the scrollbar thumb.
    pub fn compose(&mut self, content: &Surface) {
        self.scroll(content);

        let progress = -self.scroll_offset as f32 / self.scroll_limits.height.max(1) as f32;
        let viewport = require(self.viewport.as_mut(), "ScrollingFrame drawn before update()");
        let track = viewport.height() as f32 - 2.0 * self.scrollbar_padding as f32;

        if self.show_scrollbar
            && let Some(scrollbar) = &self.scrollbar
            && (scrollbar.height() as f32) < track
        {
            let padding = self.scrollbar_padding as f32;
            let (x, y) = RelativePosition::new(
                1.0,
                -padding - self.scrollbar_width as f32,
                0.0,
                padding + progress * track,
            )
            .resolve(viewport.size())
            .truncate();
            viewport.blit(scrollbar, x, y);
        }
    }

    /// Apply one wheel notch. Returns whether the offset changed.
    pub fn wheel(&mut self, button: MouseButton, content: &Surface) -> bool {
        let Some(viewport_height) = self.viewport_height() else {
            return false;
        };
        let before = self.scroll_offset;
        match button {
            MouseButton::WheelUp => {
                self.scroll_offset += self.scroll_speed.min(-self.scroll_offset);
            }
            MouseButton::WheelDown => {
                let limit = self.scroll_limits.height as i32;
                if viewport_height < limit {
                    self.scroll_offset -= self
                        .scroll_speed
                        .min(limit + self.scroll_offset - viewport_height);
                }
            }
            _ => return false,
        }
        self.scroll(content);
        self.scroll_offset != before
    }
}

/// Universal handler bound to every scrolling frame: wheel events scroll the
/// content while the pointer is over the frame.
pub(super) fn scroll_input(node: &mut ElementNode, event: &UiEvent, _tick: Tick) {
    if !node.mouse_inside() {
        return;
    }
    let UiEvent::ButtonDown { button, .. } = *event else {
        return;
    };
    let (Widget::ScrollingFrame(frame), Some(content)) = (&mut node.widget, node.surface.as_ref())
    else {
        return;
    };
    if frame.scrollable {
        frame.wheel(button, content);
    }
}
