use std::fmt;

use crate::driver::consts;

/// Requested framebuffer capabilities.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelFormat {
    /// Bits per pixel for all color channels.
    pub color_depth: u8,
    pub alpha_depth: u8,
    /// Depth buffer bits per pixel.
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub double_buffer: bool,
    /// Multisample count; `0` disables multisampling.
    pub multisample: u8,
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self {
            color_depth: 32,
            alpha_depth: 8,
            depth_bits: 24,
            stencil_bits: 8,
            double_buffer: true,
            multisample: 0,
        }
    }
}

impl PixelFormat {
    /// Zero-terminated attribute list for `wglChoosePixelFormatARB`.
    pub fn to_attributes(&self) -> Vec<i32> {
        let flag = |on: bool| if on { consts::TRUE } else { consts::FALSE };

        let pairs = [
            (consts::WGL_DRAW_TO_WINDOW_ARB, consts::TRUE),
            (consts::WGL_SUPPORT_OPENGL_ARB, consts::TRUE),
            (consts::WGL_DOUBLE_BUFFER_ARB, flag(self.double_buffer)),
            (consts::WGL_PIXEL_TYPE_ARB, consts::WGL_TYPE_RGBA_ARB),
            (consts::WGL_ACCELERATION_ARB, consts::WGL_FULL_ACCELERATION_ARB),
            (consts::WGL_COLOR_BITS_ARB, i32::from(self.color_depth)),
            (consts::WGL_ALPHA_BITS_ARB, i32::from(self.alpha_depth)),
            (consts::WGL_DEPTH_BITS_ARB, i32::from(self.depth_bits)),
            (consts::WGL_STENCIL_BITS_ARB, i32::from(self.stencil_bits)),
            (consts::WGL_SAMPLE_BUFFERS_ARB, flag(self.multisample > 0)),
            (consts::WGL_SAMPLES_ARB, i32::from(self.multisample)),
        ];

        let mut attribs: Vec<i32> = pairs.iter().flat_map(|&(key, value)| [key, value]).collect();
        attribs.push(0);
        attribs
    }
}

/// Pixel format chosen by the driver. The caller applies it to the surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PixelFormatId(pub i32);

impl fmt::Display for PixelFormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(attribs: &[i32], key: i32) -> Option<i32> {
        attribs.chunks_exact(2).find(|pair| pair[0] == key).map(|pair| pair[1])
    }

    #[test]
    fn attributes_are_zero_terminated_pairs() {
        let attribs = PixelFormat::default().to_attributes();
        assert_eq!(attribs.len() % 2, 1);
        assert_eq!(attribs.last(), Some(&0));
        assert_eq!(attribs.len(), 23);
    }

    #[test]
    fn attributes_carry_the_request() {
        let format = PixelFormat {
            color_depth: 24,
            alpha_depth: 0,
            depth_bits: 16,
            stencil_bits: 0,
            double_buffer: false,
            multisample: 4,
        };
        let attribs = format.to_attributes();

        assert_eq!(value_of(&attribs, consts::WGL_COLOR_BITS_ARB), Some(24));
        assert_eq!(value_of(&attribs, consts::WGL_DEPTH_BITS_ARB), Some(16));
        assert_eq!(value_of(&attribs, consts::WGL_DOUBLE_BUFFER_ARB), Some(consts::FALSE));
        assert_eq!(value_of(&attribs, consts::WGL_SAMPLE_BUFFERS_ARB), Some(consts::TRUE));
        assert_eq!(value_of(&attribs, consts::WGL_SAMPLES_ARB), Some(4));
        assert_eq!(
            value_of(&attribs, consts::WGL_ACCELERATION_ARB),
            Some(consts::WGL_FULL_ACCELERATION_ARB)
        );
    }

    #[test]
    fn no_multisampling_disables_sample_buffers() {
        let attribs = PixelFormat::default().to_attributes();
        assert_eq!(value_of(&attribs, consts::WGL_SAMPLE_BUFFERS_ARB), Some(consts::FALSE));
        assert_eq!(value_of(&attribs, consts::WGL_SAMPLES_ARB), Some(0));
    }
}
