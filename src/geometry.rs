use serde::Deserialize;

// ---------------------------------------------------------------------------
// Sizes and absolute positions
// ---------------------------------------------------------------------------

/// Pixel dimensions of a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Absolute position in pixels, relative to some ancestor surface.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Drop the fractional part toward zero, the way blits land on whole pixels.
    pub fn truncate(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

impl std::ops::Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

// ---------------------------------------------------------------------------
// Relative (scale + offset) positions
// ---------------------------------------------------------------------------

/// A point expressed as a fraction of the parent's size plus a fixed pixel
/// offset on each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct RelativePosition {
    pub x_scale: f32,
    pub x_offset: f32,
    pub y_scale: f32,
    pub y_offset: f32,
}

impl RelativePosition {
    pub const ZERO: Self = Self {
        x_scale: 0.0,
        x_offset: 0.0,
        y_scale: 0.0,
        y_offset: 0.0,
    };

    pub fn new(x_scale: f32, x_offset: f32, y_scale: f32, y_offset: f32) -> Self {
        Self {
            x_scale,
            x_offset,
            y_scale,
            y_offset,
        }
    }

    /// Fixed pixel position, no scale component.
    pub fn from_offsets(x: f32, y: f32) -> Self {
        Self::new(0.0, x, 0.0, y)
    }

    /// Pure fraction of the parent, no pixel component.
    pub fn from_scale(x: f32, y: f32) -> Self {
        Self::new(x, 0.0, y, 0.0)
    }

    /// Resolve against the reference surface size.
    pub fn resolve(&self, reference: Size) -> Position {
        Position {
            x: self.x_offset + self.x_scale * reference.width as f32,
            y: self.y_offset + self.y_scale * reference.height as f32,
        }
    }

    /// Only the fixed-pixel component.
    pub fn offsets(&self) -> Position {
        Position {
            x: self.x_offset,
            y: self.y_offset,
        }
    }

    /// Elementwise sum with `delta`.
    pub fn offset(&self, delta: RelativePosition) -> RelativePosition {
        RelativePosition {
            x_scale: self.x_scale + delta.x_scale,
            x_offset: self.x_offset + delta.x_offset,
            y_scale: self.y_scale + delta.y_scale,
            y_offset: self.y_offset + delta.y_offset,
        }
    }
}

// ---------------------------------------------------------------------------
// Rectangles and anchoring
// ---------------------------------------------------------------------------

/// Reference point of an element's bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Anchor {
    TopLeft,
    #[default]
    Center,
}

/// Axis-aligned box in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn from_top_left(x: i32, y: i32, size: Size) -> Self {
        Self {
            x,
            y,
            width: size.width as i32,
            height: size.height as i32,
        }
    }

    /// Rect of `size` whose center lands on (cx, cy). Odd sizes round the
    /// top-left toward the origin.
    pub fn from_center(cx: i32, cy: i32, size: Size) -> Self {
        let width = size.width as i32;
        let height = size.height as i32;
        Self {
            x: cx - width / 2,
            y: cy - height / 2,
            width,
            height,
        }
    }

    pub fn anchored(anchor: Anchor, x: i32, y: i32, size: Size) -> Self {
        match anchor {
            Anchor::TopLeft => Self::from_top_left(x, y, size),
            Anchor::Center => Self::from_center(x, y, size),
        }
    }

    pub fn top_left(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Returns true if the point (px, py) is inside this rectangle.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}
