use crate::geometry::{Anchor, Position, Rect};
use crate::mask::{Collidable, Mask};
use crate::surface::{Color, Surface};

use super::ElementNode;
use super::widget::Widget;

/// Rotatable image with an optional collision mask.
///
/// The element surface stays unrotated; rotation is applied whenever the
/// sprite is measured or drawn.
pub struct Sprite {
    /// Counter-clockwise rotation in degrees.
    pub rotation: f32,
    pub anchor: Anchor,
    pub has_mask: bool,
    mask: Option<Mask>,
}

impl Sprite {
    pub fn new(anchor: Anchor, has_mask: bool) -> Self {
        Self {
            rotation: 0.0,
            anchor,
            has_mask,
            mask: None,
        }
    }

    /// Mask from the last update. None before the first update or when the
    /// sprite was built without one.
    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    pub fn rotated(&self, surface: &Surface) -> Surface {
        surface.rotate(self.rotation)
    }

    /// Bounding rect of the rotated surface placed at `at` by the anchor.
    pub fn bounds(&self, surface: &Surface, at: Position) -> Rect {
        let (x, y) = at.truncate();
        Rect::anchored(self.anchor, x, y, self.rotated(surface).size())
    }

    /// Rebuild the mask from the unrotated surface.
    pub fn refresh_mask(&mut self, surface: &Surface) {
        if self.has_mask {
            self.mask = Some(Mask::from_surface(surface));
        }
    }

    /// Rotated surface ready to blit, with an optional 1px outline, and the
    /// top-left it lands on when anchored at `at`.
    pub(super) fn compose(
        &self,
        surface: &Surface,
        at: Position,
        outline: Option<Color>,
    ) -> (Surface, (i32, i32)) {
        let mut rotated = self.rotated(surface);
        if let Some(color) = outline {
            rotated.draw_outline(color);
        }
        // Same integer anchoring as `bounds`: for odd extents the sprite sits
        // on its hit rect, one pixel right of a float `x - w / 2` placement.
        let (x, y) = at.truncate();
        let origin = Rect::anchored(self.anchor, x, y, rotated.size()).top_left();
        (rotated, origin)
    }
}

impl Collidable for ElementNode {
    fn collision_rect(&self) -> Option<Rect> {
        self.rect
    }

    fn collision_mask(&self) -> Option<&Mask> {
        match &self.widget {
            Widget::Sprite(sprite) => sprite.mask(),
            _ => None,
        }
    }
}
