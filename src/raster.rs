//! CPU rasterizer.
//!
//! [`PixelSurface`] is a straight-alpha RGBA8 buffer implementing
//! [`Surface`]. It backs the native preview and PNG snapshots. Shapes are
//! drawn with one-pixel edge antialiasing and source-over blending.

use std::path::Path;

use glam::Vec2;
use tracing::info;

use crate::error::FolioError;
use crate::surface::{Rgb, Surface};

/// Page background behind the backdrop (`#0a0a0f`).
pub const BACKGROUND: Rgb = Rgb::from_hex(0x0a0a0f);

#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
    background: Rgb,
    smoothing: bool,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; (width as usize) * (height as usize)],
            background: BACKGROUND,
            smoothing: true,
        }
    }

    /// Color used by [`Surface::fade`].
    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Whether scaled presentation should filter linearly.
    pub fn image_smoothing(&self) -> bool {
        self.smoothing
    }

    /// Raw RGBA8 rows, top to bottom.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Composite over the background and write a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), FolioError> {
        let path = path.as_ref();
        let mut out = image::RgbaImage::new(self.width, self.height);
        for (dst, src) in out.pixels_mut().zip(&self.pixels) {
            let a = src[3] as f32 / 255.0;
            let over = |c: u8, bg: u8| (c as f32 * a + bg as f32 * (1.0 - a)).round() as u8;
            *dst = image::Rgba([
                over(src[0], self.background.r),
                over(src[1], self.background.g),
                over(src[2], self.background.b),
                255,
            ]);
        }
        out.save(path)?;
        info!(path = %path.display(), width = self.width, height = self.height, "snapshot written");
        Ok(())
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 || alpha <= 0.0 {
            return;
        }
        let px = &mut self.pixels[(y as usize) * (self.width as usize) + x as usize];
        let sa = alpha.min(1.0);
        let da = px[3] as f32 / 255.0;
        let oa = sa + da * (1.0 - sa);
        if oa <= 0.0 {
            return;
        }
        let mix = |s: u8, d: u8| {
            let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / oa;
            c.round().clamp(0.0, 255.0) as u8
        };
        *px = [
            mix(color.r, px[0]),
            mix(color.g, px[1]),
            mix(color.b, px[2]),
            (oa * 255.0).round() as u8,
        ];
    }

    /// Pixel bounds of a shape's bounding box, clipped to the surface.
    fn clip(&self, min: Vec2, max: Vec2) -> Option<(i64, i64, i64, i64)> {
        let x0 = (min.x.floor() as i64).max(0);
        let y0 = (min.y.floor() as i64).max(0);
        let x1 = (max.x.ceil() as i64).min(self.width as i64 - 1);
        let y1 = (max.y.ceil() as i64).min(self.height as i64 - 1);
        (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1))
    }
}

/// Edge coverage for a pixel whose center is `distance` from a shape of
/// half-extent `extent`.
#[inline]
fn coverage(distance: f32, extent: f32) -> f32 {
    (extent + 0.5 - distance).clamp(0.0, 1.0)
}

impl Surface for PixelSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![[0; 4]; (width as usize) * (height as usize)];
    }

    fn clear(&mut self) {
        self.pixels.fill([0; 4]);
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.smoothing = enabled;
    }

    fn fade(&mut self, alpha: f32) {
        let bg = self.background;
        for y in 0..self.height as i64 {
            for x in 0..self.width as i64 {
                self.blend(x, y, bg, alpha);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        let pad = Vec2::splat(radius + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(center - pad, center + pad) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let c = coverage(p.distance(center), radius);
                self.blend(x, y, color, alpha * c);
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgb, alpha: f32) {
        let half = width * 0.5;
        let pad = Vec2::splat(half + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(from.min(to) - pad, from.max(to) + pad) else {
            return;
        };
        let seg = to - from;
        let len2 = seg.length_squared();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len2 > 0.0 {
                    ((p - from).dot(seg) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = p.distance(from + seg * t);
                // Hairlines keep their total ink by trading width for opacity.
                let c = if half < 0.5 {
                    coverage(d, 0.5) * width
                } else {
                    coverage(d, half)
                };
                self.blend(x, y, color, alpha * c);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_covers_center_not_corner() {
        let mut s = PixelSurface::new(20, 20);
        s.fill_circle(Vec2::new(10.0, 10.0), 4.0, Rgb::WHITE, 1.0);
        assert_eq!(s.pixel(10, 10), Some([255, 255, 255, 255]));
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_offscreen_shapes_are_clipped() {
        let mut s = PixelSurface::new(8, 8);
        s.fill_circle(Vec2::new(-50.0, -50.0), 3.0, Rgb::WHITE, 1.0);
        s.stroke_line(Vec2::new(100.0, 0.0), Vec2::new(200.0, 0.0), 1.0, Rgb::WHITE, 1.0);
        assert!(s.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_line_alpha_blends() {
        let mut s = PixelSurface::new(10, 3);
        s.stroke_line(Vec2::new(0.0, 1.5), Vec2::new(10.0, 1.5), 1.0, Rgb::WHITE, 0.5);
        let [r, g, b, a] = s.pixel(5, 1).unwrap();
        assert_eq!((r, g, b), (255, 255, 255));
        assert!((120..=135).contains(&a));
        assert_eq!(s.pixel(5, 0).unwrap()[3], 0);
    }

    #[test]
    fn test_clear_and_fade() {
        let mut s = PixelSurface::new(4, 4);
        s.fill_circle(Vec2::new(2.0, 2.0), 2.0, Rgb::WHITE, 1.0);
        s.clear();
        assert!(s.as_bytes().iter().all(|b| *b == 0));

        s.fade(1.0);
        let bg = BACKGROUND;
        assert_eq!(s.pixel(3, 3), Some([bg.r, bg.g, bg.b, 255]));
    }

    #[test]
    fn test_fade_uses_custom_background() {
        let paper = Rgb::from_hex(0xf5f5f0);
        let mut s = PixelSurface::new(2, 2).with_background(paper);
        s.fade(1.0);
        assert_eq!(s.pixel(1, 1), Some([paper.r, paper.g, paper.b, 255]));
    }

    #[test]
    fn test_resize_reallocates() {
        let mut s = PixelSurface::new(4, 4);
        s.resize(16, 9);
        assert_eq!(s.size(), (16, 9));
        assert_eq!(s.as_bytes().len(), 16 * 9 * 4);
    }
}
