//! Thread-aware OpenGL context management.
//!
//! - [`activation`]: per-thread LIFO activation with the [`MakeCurrent`] guard
//! - [`context`]: [`GlContext`], its cached render modes and pixel formats
//! - [`checked`]: driver calls with immediate error attribution
//! - [`driver`]: the native seam, with a headless driver for tests and tooling

pub mod activation;
pub mod checked;
pub mod color;
pub mod context;
pub mod debug;
pub mod driver;
pub mod error;
pub mod logging;

pub use activation::{Activate, Bindable, MakeCurrent};
pub use color::Rgb;
pub use context::{
    BlendMode, ContextInit, CullingMode, DepthTestMode, GlContext, GlVersion, PixelFormat, PixelFormatId,
    PolygonMode, RenderState,
};
pub use error::{CallFailure, ContextError, ErrorKind, Result};
