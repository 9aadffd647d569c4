//! Drawing surface abstraction.
//!
//! The backdrop draws through [`Surface`], a 2D-canvas-shaped API. The browser
//! front end implements it on a canvas context, [`PixelSurface`](crate::raster::PixelSurface)
//! rasterizes on the CPU, and [`CommandRecorder`] keeps a display list.

use glam::Vec2;

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB` packed color.
    pub const fn from_hex(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// CSS `#rrggbb` notation.
    pub fn css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A 2D drawing target sized in device pixels.
pub trait Surface {
    /// Current size in device pixels.
    fn size(&self) -> (u32, u32);

    /// Resize the backing store. Contents are discarded.
    fn resize(&mut self, width: u32, height: u32);

    /// Clear to fully transparent.
    fn clear(&mut self);

    /// Paint the background color over everything at `alpha`.
    fn fade(&mut self, alpha: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgb, alpha: f32);

    /// Hint for scaled image drawing. Surfaces without smoothing ignore it.
    fn set_image_smoothing(&mut self, _enabled: bool) {}
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Fade {
        alpha: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgb,
        alpha: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Rgb,
        alpha: f32,
    },
}

/// A surface that records every call instead of drawing.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    width: u32,
    height: u32,
    pub commands: Vec<DrawCommand>,
    pub image_smoothing: Option<bool>,
}

impl CommandRecorder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }
}

impl Surface for CommandRecorder {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.commands.clear();
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fade(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::Fade { alpha });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            alpha,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
            alpha,
        });
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.image_smoothing = Some(enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex_roundtrip_to_css() {
        assert_eq!(Rgb::from_hex(0x06b6d4).css(), "#06b6d4");
        assert_eq!(Rgb::WHITE.css(), "#ffffff");
    }

    #[test]
    fn test_recorder_resize_drops_commands() {
        let mut rec = CommandRecorder::new(10, 10);
        rec.clear();
        rec.fill_circle(Vec2::ZERO, 1.0, Rgb::WHITE, 1.0);
        assert_eq!(rec.circles().count(), 1);
        rec.resize(20, 30);
        assert!(rec.commands.is_empty());
        assert_eq!(rec.size(), (20, 30));
    }
}
