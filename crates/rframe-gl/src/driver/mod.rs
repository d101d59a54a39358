//! Native graphics driver seam.
//!
//! [`Driver`] lists every native entry point the context layer issues.
//! Nothing above this module talks to WGL or OpenGL directly:
//! - `WglDriver` (Windows) forwards to `opengl32.dll` and extension pointers
//! - [`HeadlessDriver`] records calls in-process for tests and tooling

pub mod consts;
mod headless;
#[cfg(windows)]
mod wgl;

use std::fmt;
use std::num::NonZeroUsize;

pub use headless::{Fault, HeadlessContext, HeadlessDriver, HeadlessGlState, HeadlessSurface};
#[cfg(windows)]
pub use wgl::{DeviceSurface, NativeContext, WglDriver};

/// Native enum value (`GLenum`).
pub type GlEnum = u32;

/// A resolved extension entry point.
///
/// Only obtainable from [`Driver::proc_address`]; drivers may rely on `name`
/// describing what `addr` points to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProcAddress {
    name: &'static str,
    addr: NonZeroUsize,
}

impl ProcAddress {
    pub fn new(name: &'static str, addr: NonZeroUsize) -> Self {
        Self { name, addr }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn addr(&self) -> NonZeroUsize {
        self.addr
    }
}

/// Outcome of reloading the driver function table after a rebind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReloadStatus {
    Ok,
    MissingEntryPoints,
}

/// Severity attached to a driver debug message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugSeverity {
    High,
    Medium,
    Low,
    Notification,
}

impl DebugSeverity {
    /// Maps a native severity; unknown values are treated as notifications.
    pub fn from_native(value: GlEnum) -> Self {
        match value {
            consts::DEBUG_SEVERITY_HIGH => Self::High,
            consts::DEBUG_SEVERITY_MEDIUM => Self::Medium,
            consts::DEBUG_SEVERITY_LOW => Self::Low,
            _ => Self::Notification,
        }
    }
}

/// A message delivered through the driver's debug output.
#[derive(Debug, Clone, Copy)]
pub struct DebugMessage<'a> {
    pub source: GlEnum,
    pub kind: GlEnum,
    pub id: u32,
    pub severity: DebugSeverity,
    pub text: &'a str,
}

/// Receiver installed with [`Driver::debug_message_callback`].
pub type DebugHandler = fn(&DebugMessage<'_>);

/// The native graphics API as seen by the context layer.
///
/// Methods mirror single native calls. None of them check errors: callers
/// route them through [`crate::checked`] so every call is followed by an
/// error query. Error codes are per thread, as in the native API.
pub trait Driver: Send + Sync + 'static {
    /// Device surface (`HDC` on Windows).
    type Surface: Copy + Eq + fmt::Debug + Send + Sync + 'static;
    /// Native rendering context (`HGLRC` on Windows).
    type Context: Copy + Eq + fmt::Debug + Send + Sync + 'static;

    /// Pops the oldest pending error code, or [`consts::NO_ERROR`].
    fn get_error(&self) -> GlEnum;

    /// Resolves an extension entry point by name.
    fn proc_address(&self, name: &'static str) -> Option<ProcAddress>;

    /// Creates a legacy context without version negotiation.
    fn create_context(&self, surface: Self::Surface) -> Option<Self::Context>;

    /// Creates a context through `wglCreateContextAttribsARB`.
    ///
    /// `attribs` is a zero-terminated key/value list.
    fn create_context_attribs(
        &self,
        entry: ProcAddress,
        surface: Self::Surface,
        attribs: &[i32],
    ) -> Option<Self::Context>;

    fn delete_context(&self, context: Self::Context) -> bool;

    /// Binds `target` to the calling thread, or unbinds when `None`.
    fn make_current(&self, target: Option<(Self::Surface, Self::Context)>) -> bool;

    /// Reloads the function table for the context bound to this thread.
    fn reload_functions(&self) -> ReloadStatus;

    /// Queries pixel formats through `wglChoosePixelFormatARB`.
    ///
    /// Writes up to `formats.len()` identifiers and stores how many were
    /// written in `count`.
    fn choose_pixel_format(
        &self,
        entry: ProcAddress,
        surface: Self::Surface,
        attribs: &[i32],
        formats: &mut [i32],
        count: &mut u32,
    ) -> bool;

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    fn clear(&self, mask: GlEnum);
    fn polygon_mode(&self, face: GlEnum, mode: GlEnum);
    fn enable(&self, capability: GlEnum);
    fn disable(&self, capability: GlEnum);
    fn cull_face(&self, face: GlEnum);
    fn depth_mask(&self, write: bool);
    fn blend_func(&self, source: GlEnum, destination: GlEnum);

    /// Installs `handler` as the debug output callback.
    ///
    /// Returns `false` when the entry point is not loaded.
    fn debug_message_callback(&self, handler: DebugHandler) -> bool;

    fn swap_buffers(&self, surface: Self::Surface) -> bool;
}
