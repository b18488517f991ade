use std::path::Path;

use image::{ImageResult, Rgba, RgbaImage, imageops};
use serde::Deserialize;

use crate::geometry::{Rect, Size};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque_alpha")]
    pub a: u8,
}

fn opaque_alpha() -> u8 {
    255
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color from out-of-range channel arithmetic, saturating
    /// each channel into 0..=255.
    pub fn clamped(r: i32, g: i32, b: i32) -> Self {
        let c = |v: i32| v.clamp(0, 255) as u8;
        Self::rgb(c(r), c(g), c(b))
    }

    fn to_pixel(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Integer source-over compositing. Fully opaque and fully transparent
/// sources are exact.
fn source_over(dst: &mut Rgba<u8>, src: Rgba<u8>, force_opaque: bool) {
    let sa = src.0[3] as u32;
    if sa == 255 {
        *dst = src;
    } else if sa > 0 {
        let da = dst.0[3] as u32 * (255 - sa) / 255;
        let out_a = sa + da;
        for c in 0..3 {
            dst.0[c] = ((src.0[c] as u32 * sa + dst.0[c] as u32 * da) / out_a) as u8;
        }
        dst.0[3] = out_a as u8;
    }
    if force_opaque {
        dst.0[3] = 255;
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// Rectangular RGBA pixel buffer with blit/fill/rotate.
///
/// Surfaces created with [`Surface::new`] carry per-pixel alpha and start
/// fully transparent; blitting them alpha-composites onto the destination.
/// Surfaces created with [`Surface::opaque`] ignore alpha: fills are forced
/// opaque and blits copy pixels verbatim.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
    per_pixel_alpha: bool,
}

impl Surface {
    /// Transparent surface with per-pixel alpha.
    pub fn new(size: Size) -> Self {
        Self {
            pixels: RgbaImage::new(size.width, size.height),
            per_pixel_alpha: true,
        }
    }

    /// Opaque black surface without per-pixel alpha.
    pub fn opaque(size: Size) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(size.width, size.height, Color::BLACK.to_pixel()),
            per_pixel_alpha: false,
        }
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            per_pixel_alpha: true,
        }
    }

    /// Decode an image file into an alpha surface.
    pub fn load(path: impl AsRef<Path>) -> ImageResult<Self> {
        let pixels = image::open(path)?.to_rgba8();
        Ok(Self::from_image(pixels))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.pixels.save(path)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Bounding rect at the origin.
    pub fn rect(&self) -> Rect {
        Rect::from_top_left(0, 0, self.size())
    }

    pub fn has_alpha(&self) -> bool {
        self.per_pixel_alpha
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Pixel at (x, y), or None outside the surface.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let Rgba([r, g, b, a]) = *self.pixels.get_pixel(x, y);
        Some(Color::rgba(r, g, b, a))
    }

    /// Alpha-composite a single pixel. Out-of-bounds writes are dropped.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let opaque = !self.per_pixel_alpha;
        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        source_over(dst, color.to_pixel(), opaque);
    }

    /// Replace every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        let color = if self.per_pixel_alpha {
            color
        } else {
            Color { a: 255, ..color }
        };
        let px = color.to_pixel();
        for p in self.pixels.pixels_mut() {
            *p = px;
        }
    }

    /// Composite `src` with its top-left at (x, y). Out-of-bounds parts are
    /// clipped.
    pub fn blit(&mut self, src: &Surface, x: i32, y: i32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + src.width() as i32).min(self.width() as i32);
        let y1 = (y + src.height() as i32).min(self.height() as i32);
        let opaque = !self.per_pixel_alpha;

        for dy in y0..y1 {
            for dx in x0..x1 {
                let px = *src.pixels.get_pixel((dx - x) as u32, (dy - y) as u32);
                let dst = self.pixels.get_pixel_mut(dx as u32, dy as u32);
                if src.per_pixel_alpha {
                    source_over(dst, px, opaque);
                } else {
                    *dst = Rgba([px.0[0], px.0[1], px.0[2], 255]);
                }
            }
        }
    }

    /// Draw a 1-pixel border along the surface edges.
    pub fn draw_outline(&mut self, color: Color) {
        let (w, h) = (self.width(), self.height());
        if w == 0 || h == 0 {
            return;
        }
        let px = color.to_pixel();
        for x in 0..w {
            self.pixels.put_pixel(x, 0, px);
            self.pixels.put_pixel(x, h - 1, px);
        }
        for y in 0..h {
            self.pixels.put_pixel(0, y, px);
            self.pixels.put_pixel(w - 1, y, px);
        }
    }

    /// New surface holding this one rotated counter-clockwise by `degrees`.
    /// The result grows to the rotated bounding box; uncovered corners are
    /// transparent.
    pub fn rotate(&self, degrees: f32) -> Surface {
        let normalized = degrees.rem_euclid(360.0);
        let pixels = if normalized == 0.0 {
            self.pixels.clone()
        } else if normalized == 90.0 {
            imageops::rotate270(&self.pixels)
        } else if normalized == 180.0 {
            imageops::rotate180(&self.pixels)
        } else if normalized == 270.0 {
            imageops::rotate90(&self.pixels)
        } else {
            self.rotate_nearest(normalized.to_radians())
        };
        Surface {
            pixels,
            per_pixel_alpha: true,
        }
    }

    fn rotate_nearest(&self, radians: f32) -> RgbaImage {
        let (sin, cos) = radians.sin_cos();
        let (w, h) = (self.width() as f32, self.height() as f32);
        let out_w = (w * cos.abs() + h * sin.abs()).ceil() as u32;
        let out_h = (w * sin.abs() + h * cos.abs()).ceil() as u32;
        let mut out = RgbaImage::new(out_w, out_h);

        let (src_cx, src_cy) = (w / 2.0, h / 2.0);
        let (dst_cx, dst_cy) = (out_w as f32 / 2.0, out_h as f32 / 2.0);
        for (dx, dy, px) in out.enumerate_pixels_mut() {
            // Inverse-map the destination pixel center back into the source.
            let rx = dx as f32 + 0.5 - dst_cx;
            let ry = dy as f32 + 0.5 - dst_cy;
            let sx = rx * cos - ry * sin + src_cx;
            let sy = rx * sin + ry * cos + src_cy;
            if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
                let src = *self.pixels.get_pixel(sx as u32, sy as u32);
                *px = if self.per_pixel_alpha {
                    src
                } else {
                    Rgba([src.0[0], src.0[1], src.0[2], 255])
                };
            }
        }
        out
    }
}
