//! Presentation shader for the native preview.

use bytemuck::{Pod, Zeroable};

use crate::surface::Rgb;

pub const PRESENT_SOURCE: &str = include_str!("present.wgsl");

/// Uniform block read by `fs_main`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct PresentUniforms {
    /// Linear-space RGBA; alpha is unused.
    pub background: [f32; 4],
}

impl PresentUniforms {
    pub fn new(background: Rgb) -> Self {
        Self {
            background: [
                srgb_to_linear(background.r),
                srgb_to_linear(background.g),
                srgb_to_linear(background.b),
                1.0,
            ],
        }
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_present_shader_validates() {
        validate_wgsl(PRESENT_SOURCE).unwrap();
    }

    #[test]
    fn test_present_uniforms_layout() {
        assert_eq!(std::mem::size_of::<PresentUniforms>(), 16);
        let u = PresentUniforms::new(Rgb::WHITE);
        assert!(u.background.iter().all(|c| (c - 1.0).abs() < 1e-5));
        assert_eq!(PresentUniforms::new(Rgb::new(0, 0, 0)).background[0], 0.0);
    }
}
