//! OpenGL context ownership, render modes and pixel formats.

pub mod bootstrap;
mod gl_context;
mod init;
mod modes;
mod pixel_format;

pub use gl_context::{ContextBinding, GlContext, NativeHandles};
pub use init::{ContextInit, GlVersion};
pub use modes::{BlendMode, CullingMode, DepthTestMode, PolygonMode, RenderState};
pub use pixel_format::{PixelFormat, PixelFormatId};
