//! WGL / OpenGL driver for Windows.
//!
//! OpenGL 1.1 entry points are linked from `opengl32.dll` through the
//! `windows` crate. Everything newer is resolved with `wglGetProcAddress`,
//! either on demand (WGL extensions) or when the function table is reloaded
//! after a rebind.

use std::ffi::{CString, c_char, c_void};
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use raw_window_handle::RawWindowHandle;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{GetDC, HDC};
use windows::Win32::Graphics::OpenGL::{
    HGLRC, SwapBuffers, glBlendFunc, glClear, glClearColor, glCullFace, glDepthMask, glDisable,
    glEnable, glGetError, glPolygonMode, wglCreateContext, wglDeleteContext, wglGetProcAddress,
    wglMakeCurrent,
};
use windows::core::PCSTR;

use super::{DebugHandler, DebugMessage, DebugSeverity, Driver, GlEnum, ProcAddress, ReloadStatus};

type CreateContextAttribsArb =
    unsafe extern "system" fn(hdc: *mut c_void, share: *mut c_void, attribs: *const i32) -> *mut c_void;

type ChoosePixelFormatArb = unsafe extern "system" fn(
    hdc: *mut c_void,
    int_attribs: *const i32,
    float_attribs: *const f32,
    max_formats: u32,
    formats: *mut i32,
    count: *mut u32,
) -> i32;

type DebugProc = unsafe extern "system" fn(
    source: u32,
    kind: u32,
    id: u32,
    severity: u32,
    length: i32,
    message: *const c_char,
    user: *mut c_void,
);

type DebugMessageCallback = unsafe extern "system" fn(callback: Option<DebugProc>, user: *const c_void);

/// Extension entry points required by the context layer.
const REQUIRED: [&str; 2] = ["wglCreateContextAttribsARB", "wglChoosePixelFormatARB"];

/// Device context handle (`HDC`) stored as an address.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DeviceSurface(usize);

impl DeviceSurface {
    /// Wraps an `HDC` obtained by the windowing layer.
    pub fn from_hdc(hdc: HDC) -> Self {
        Self(hdc.0 as usize)
    }

    /// Fetches the device context of a Win32 window.
    ///
    /// Returns `None` for non-Win32 handles or when `GetDC` fails.
    pub fn from_window_handle(handle: RawWindowHandle) -> Option<Self> {
        let RawWindowHandle::Win32(window) = handle else {
            return None;
        };
        let hwnd = HWND(window.hwnd.get() as *mut c_void);
        // SAFETY: the handle comes from a live window owned by the caller.
        let hdc = unsafe { GetDC(hwnd) };
        (!hdc.is_invalid()).then(|| Self::from_hdc(hdc))
    }

    fn hdc(self) -> HDC {
        HDC(self.0 as *mut c_void)
    }
}

/// Rendering context handle (`HGLRC`) stored as an address.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NativeContext(usize);

impl NativeContext {
    fn hglrc(self) -> HGLRC {
        HGLRC(self.0 as *mut c_void)
    }
}

#[derive(Default)]
struct FunctionTable {
    debug_message_callback: Option<usize>,
}

/// Driver backed by `opengl32.dll`.
#[derive(Default)]
pub struct WglDriver {
    table: Mutex<FunctionTable>,
}

impl WglDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, FunctionTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(name: &str) -> Option<NonZeroUsize> {
        let name = CString::new(name).ok()?;
        // SAFETY: `name` is a valid zero-terminated string for the call.
        let proc = unsafe { wglGetProcAddress(PCSTR(name.as_ptr().cast())) }?;
        let addr = proc as usize;
        // Some ICDs report failure with small sentinel values instead of null.
        match addr as isize {
            1 | 2 | 3 | -1 => None,
            _ => NonZeroUsize::new(addr),
        }
    }
}

unsafe extern "system" fn debug_trampoline(
    source: u32,
    kind: u32,
    id: u32,
    severity: u32,
    length: i32,
    message: *const c_char,
    user: *mut c_void,
) {
    if user.is_null() {
        return;
    }
    // SAFETY: `user` was produced from a `DebugHandler` in
    // `debug_message_callback` and function pointers are never freed.
    let handler = unsafe { std::mem::transmute::<*mut c_void, DebugHandler>(user) };
    let text = if message.is_null() || length < 0 {
        String::new()
    } else {
        // SAFETY: the driver guarantees `length` readable bytes at `message`.
        let bytes = unsafe { std::slice::from_raw_parts(message.cast::<u8>(), length as usize) };
        String::from_utf8_lossy(bytes).into_owned()
    };
    handler(&DebugMessage {
        source,
        kind,
        id,
        severity: DebugSeverity::from_native(severity),
        text: &text,
    });
}

impl Driver for WglDriver {
    type Surface = DeviceSurface;
    type Context = NativeContext;

    fn get_error(&self) -> GlEnum {
        // SAFETY: plain query on the calling thread's binding.
        unsafe { glGetError() }
    }

    fn proc_address(&self, name: &'static str) -> Option<ProcAddress> {
        Self::resolve(name).map(|addr| ProcAddress::new(name, addr))
    }

    fn create_context(&self, surface: DeviceSurface) -> Option<NativeContext> {
        // SAFETY: `surface` is a device context with a pixel format applied.
        unsafe { wglCreateContext(surface.hdc()) }
            .ok()
            .map(|hglrc| NativeContext(hglrc.0 as usize))
    }

    fn create_context_attribs(
        &self,
        entry: ProcAddress,
        surface: DeviceSurface,
        attribs: &[i32],
    ) -> Option<NativeContext> {
        debug_assert_eq!(entry.name(), "wglCreateContextAttribsARB");
        debug_assert_eq!(attribs.last(), Some(&0));
        // SAFETY: `entry` was resolved under this exact name.
        let create = unsafe { std::mem::transmute::<usize, CreateContextAttribsArb>(entry.addr().get()) };
        // SAFETY: `attribs` is zero-terminated; no share context is passed.
        let hglrc = unsafe { create(surface.hdc().0, std::ptr::null_mut(), attribs.as_ptr()) };
        (!hglrc.is_null()).then(|| NativeContext(hglrc as usize))
    }

    fn delete_context(&self, context: NativeContext) -> bool {
        // SAFETY: the context is owned by the caller and deleted once.
        unsafe { wglDeleteContext(context.hglrc()) }.is_ok()
    }

    fn make_current(&self, target: Option<(DeviceSurface, NativeContext)>) -> bool {
        let (hdc, hglrc) = match target {
            Some((surface, context)) => (surface.hdc(), context.hglrc()),
            None => (HDC::default(), HGLRC::default()),
        };
        // SAFETY: both handles are live, or both null to unbind.
        unsafe { wglMakeCurrent(hdc, hglrc) }.is_ok()
    }

    fn reload_functions(&self) -> ReloadStatus {
        let mut table = self.table();
        table.debug_message_callback = Self::resolve("glDebugMessageCallback").map(NonZeroUsize::get);

        if REQUIRED.iter().all(|name| Self::resolve(name).is_some()) {
            ReloadStatus::Ok
        } else {
            ReloadStatus::MissingEntryPoints
        }
    }

    fn choose_pixel_format(
        &self,
        entry: ProcAddress,
        surface: DeviceSurface,
        attribs: &[i32],
        formats: &mut [i32],
        count: &mut u32,
    ) -> bool {
        debug_assert_eq!(entry.name(), "wglChoosePixelFormatARB");
        debug_assert_eq!(attribs.last(), Some(&0));
        // SAFETY: `entry` was resolved under this exact name.
        let choose = unsafe { std::mem::transmute::<usize, ChoosePixelFormatArb>(entry.addr().get()) };
        // SAFETY: output buffers outlive the call and `formats.len()` bounds the writes.
        let ok = unsafe {
            choose(
                surface.hdc().0,
                attribs.as_ptr(),
                std::ptr::null(),
                formats.len() as u32,
                formats.as_mut_ptr(),
                count,
            )
        };
        ok != 0
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { glClearColor(red, green, blue, alpha) }
    }

    fn clear(&self, mask: GlEnum) {
        unsafe { glClear(mask) }
    }

    fn polygon_mode(&self, face: GlEnum, mode: GlEnum) {
        unsafe { glPolygonMode(face, mode) }
    }

    fn enable(&self, capability: GlEnum) {
        unsafe { glEnable(capability) }
    }

    fn disable(&self, capability: GlEnum) {
        unsafe { glDisable(capability) }
    }

    fn cull_face(&self, face: GlEnum) {
        unsafe { glCullFace(face) }
    }

    fn depth_mask(&self, write: bool) {
        unsafe { glDepthMask(u8::from(write)) }
    }

    fn blend_func(&self, source: GlEnum, destination: GlEnum) {
        unsafe { glBlendFunc(source, destination) }
    }

    fn debug_message_callback(&self, handler: DebugHandler) -> bool {
        let Some(addr) = self.table().debug_message_callback else {
            return false;
        };
        // SAFETY: the address was resolved as `glDebugMessageCallback`.
        let install = unsafe { std::mem::transmute::<usize, DebugMessageCallback>(addr) };
        // SAFETY: the trampoline matches GLDEBUGPROC and `handler` is 'static.
        unsafe { install(Some(debug_trampoline), handler as *const c_void) };
        true
    }

    fn swap_buffers(&self, surface: DeviceSurface) -> bool {
        // SAFETY: `surface` is a live device context.
        unsafe { SwapBuffers(surface.hdc()) }.is_ok()
    }
}
