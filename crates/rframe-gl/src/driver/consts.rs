//! Native enum values used by this crate.
//!
//! Values come from the Khronos `gl.xml` / `wgl.xml` registries.

use super::GlEnum;

pub const NO_ERROR: GlEnum = 0;
pub const INVALID_ENUM: GlEnum = 0x0500;
pub const INVALID_VALUE: GlEnum = 0x0501;
pub const INVALID_OPERATION: GlEnum = 0x0502;

pub const TRUE: i32 = 1;
pub const FALSE: i32 = 0;

// Polygon rasterization
pub const POINT: GlEnum = 0x1B00;
pub const LINE: GlEnum = 0x1B01;
pub const FILL: GlEnum = 0x1B02;

// Faces
pub const FRONT: GlEnum = 0x0404;
pub const BACK: GlEnum = 0x0405;
pub const FRONT_AND_BACK: GlEnum = 0x0408;

// Capabilities
pub const CULL_FACE: GlEnum = 0x0B44;
pub const DEPTH_TEST: GlEnum = 0x0B71;
pub const BLEND: GlEnum = 0x0BE2;
pub const DEBUG_OUTPUT: GlEnum = 0x92E0;

// Blend factors
pub const ZERO: GlEnum = 0;
pub const ONE: GlEnum = 1;
pub const SRC_ALPHA: GlEnum = 0x0302;
pub const ONE_MINUS_SRC_ALPHA: GlEnum = 0x0303;

// Clear masks
pub const DEPTH_BUFFER_BIT: GlEnum = 0x0000_0100;
pub const COLOR_BUFFER_BIT: GlEnum = 0x0000_4000;

// Debug output severities
pub const DEBUG_SEVERITY_HIGH: GlEnum = 0x9146;
pub const DEBUG_SEVERITY_MEDIUM: GlEnum = 0x9147;
pub const DEBUG_SEVERITY_LOW: GlEnum = 0x9148;
pub const DEBUG_SEVERITY_NOTIFICATION: GlEnum = 0x826B;

// WGL_ARB_pixel_format
pub const WGL_DRAW_TO_WINDOW_ARB: i32 = 0x2001;
pub const WGL_ACCELERATION_ARB: i32 = 0x2003;
pub const WGL_SUPPORT_OPENGL_ARB: i32 = 0x2010;
pub const WGL_DOUBLE_BUFFER_ARB: i32 = 0x2011;
pub const WGL_PIXEL_TYPE_ARB: i32 = 0x2013;
pub const WGL_COLOR_BITS_ARB: i32 = 0x2014;
pub const WGL_ALPHA_BITS_ARB: i32 = 0x201B;
pub const WGL_DEPTH_BITS_ARB: i32 = 0x2022;
pub const WGL_STENCIL_BITS_ARB: i32 = 0x2023;
pub const WGL_FULL_ACCELERATION_ARB: i32 = 0x2027;
pub const WGL_TYPE_RGBA_ARB: i32 = 0x202B;

// WGL_ARB_multisample
pub const WGL_SAMPLE_BUFFERS_ARB: i32 = 0x2041;
pub const WGL_SAMPLES_ARB: i32 = 0x2042;

// WGL_ARB_create_context / WGL_ARB_create_context_profile
pub const WGL_CONTEXT_MAJOR_VERSION_ARB: i32 = 0x2091;
pub const WGL_CONTEXT_MINOR_VERSION_ARB: i32 = 0x2092;
pub const WGL_CONTEXT_PROFILE_MASK_ARB: i32 = 0x9126;
pub const WGL_CONTEXT_CORE_PROFILE_BIT_ARB: i32 = 0x0001;
pub const WGL_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB: i32 = 0x0002;
