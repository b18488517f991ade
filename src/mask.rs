use crate::geometry::{Rect, Size};
use crate::surface::Surface;

/// Pixels with alpha above this count as solid.
const ALPHA_THRESHOLD: u8 = 127;

/// Per-pixel opacity bitmap for exact collision tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    size: Size,
    bits: Vec<bool>,
}

impl Mask {
    /// Empty (all clear) mask.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            bits: vec![false; size.width as usize * size.height as usize],
        }
    }

    /// Set a bit for every pixel whose alpha exceeds the threshold.
    pub fn from_surface(surface: &Surface) -> Self {
        let size = surface.size();
        let bits = surface
            .image()
            .pixels()
            .map(|p| p.0[3] > ALPHA_THRESHOLD)
            .collect();
        Self { size, bits }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.size.width as i32 || y >= self.size.height as i32 {
            return false;
        }
        self.bits[y as usize * self.size.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.size.width && y < self.size.height {
            self.bits[y as usize * self.size.width as usize + x as usize] = value;
        }
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// First pixel set in both masks when `other` is placed with its top-left
    /// at (dx, dy) in this mask's coordinates. Scans row-major.
    pub fn overlap(&self, other: &Mask, dx: i32, dy: i32) -> Option<(i32, i32)> {
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (dx + other.size.width as i32).min(self.size.width as i32);
        let y1 = (dy + other.size.height as i32).min(self.size.height as i32);

        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - dx, y - dy) {
                    return Some((x, y));
                }
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Pixel collision between positioned, masked objects
// ---------------------------------------------------------------------------

/// Anything with an absolute bounding rect and an optional mask.
pub trait Collidable {
    fn collision_rect(&self) -> Option<Rect>;
    fn collision_mask(&self) -> Option<&Mask>;
}

/// Absolute coordinate of the first overlapping pixel between `a` and `b`,
/// or None. Objects without a rect or a mask never collide.
pub fn pixel_collide(a: &impl Collidable, b: &impl Collidable) -> Option<(i32, i32)> {
    let (rect_a, rect_b) = (a.collision_rect()?, b.collision_rect()?);
    let (mask_a, mask_b) = (a.collision_mask()?, b.collision_mask()?);

    let dx = rect_b.x - rect_a.x;
    let dy = rect_b.y - rect_a.y;
    let (ox, oy) = mask_a.overlap(mask_b, dx, dy)?;
    Some((ox + rect_a.x, oy + rect_a.y))
}

/// Boolean form of [`pixel_collide`].
pub fn pixel_detected(a: &impl Collidable, b: &impl Collidable) -> bool {
    pixel_collide(a, b).is_some()
}
