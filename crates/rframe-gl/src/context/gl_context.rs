use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::activation::{self, Activate, Bindable, MakeCurrent, StackToken};
use crate::checked;
use crate::color::Rgb;
use crate::debug;
use crate::driver::{Driver, GlEnum, ProcAddress, ReloadStatus, consts};
use crate::error::{CallFailure, ContextError, Result};

use super::init::{ContextInit, GlVersion};
use super::modes::{self, BlendMode, CullingMode, DepthTestMode, PolygonMode, RenderState};
use super::pixel_format::{PixelFormat, PixelFormatId};

/// Native handles owned by a context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NativeHandles<S, C> {
    pub surface: S,
    pub context: C,
}

/// Thread binding of a [`GlContext`], shared with the activation stacks.
///
/// Stacks only keep weak references to it. The native context is deleted
/// when the last strong reference goes, i.e. with its `GlContext`.
pub struct ContextBinding<D: Driver> {
    driver: Arc<D>,
    surface: D::Surface,
    handle: D::Context,

    /// Thread the context is bound to, if any.
    owner: Mutex<Option<ThreadId>>,
}

impl<D: Driver> ContextBinding<D> {
    fn lock_owner(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn owner(&self) -> Option<ThreadId> {
        *self.lock_owner()
    }

    /// Clears the thread's binding. Never fails.
    fn unbind(&self) {
        let released = checked::call_skip_errors(&*self.driver, "wglMakeCurrent", |d| d.make_current(None));
        if !released {
            log::warn!("failed to unbind context {:?}", self.handle);
        }
    }
}

impl<D: Driver> Activate for ContextBinding<D> {
    type Error = ContextError;

    fn activate(&self, _: StackToken) -> Result<()> {
        let mut owner = self.lock_owner();
        let thread = thread::current().id();

        match *owner {
            Some(other) if other != thread => {
                return Err(ContextError::Activate(CallFailure::OwnedByOtherThread { owner: other }));
            }
            _ => {}
        }

        // Can't go through `checked`: nothing was bound before this call.
        let driver = &*self.driver;
        let bound = driver.make_current(Some((self.surface, self.handle)));
        let code = driver.get_error();
        if !bound || code != consts::NO_ERROR {
            self.unbind();
            let failure = if code != consts::NO_ERROR {
                CallFailure::DriverError {
                    call: "wglMakeCurrent",
                    code,
                }
            } else {
                CallFailure::InvalidReturn { call: "wglMakeCurrent" }
            };
            return Err(ContextError::Activate(failure));
        }

        // The function table is only valid for the binding it was loaded under.
        if let Err(err) = checked::call_pass_value(
            driver,
            ContextError::Activate,
            "reloadFunctions",
            ReloadStatus::Ok,
            |d| d.reload_functions(),
        ) {
            self.unbind();
            return Err(err);
        }

        *owner = Some(thread);
        log::trace!("context {:?} bound to {thread:?}", self.handle);
        Ok(())
    }

    fn deactivate(&self, _: StackToken) {
        let mut owner = self.lock_owner();
        self.unbind();

        // Entries further down this thread's stack still claim the context.
        let thread = thread::current().id();
        if *owner == Some(thread) && activation::occurrences(self) <= 1 {
            *owner = None;
        }
        log::trace!("context {:?} released", self.handle);
    }
}

impl<D: Driver> Drop for ContextBinding<D> {
    fn drop(&mut self) {
        let leaked = activation::evict(&*self);
        if leaked > 0 {
            log::warn!("context {:?} dropped with {leaked} leaked activation(s)", self.handle);
        }

        match self.owner() {
            Some(owner) if owner == thread::current().id() => self.unbind(),
            Some(owner) => log::warn!("deleting context {:?} still bound on thread {owner:?}", self.handle),
            None => {}
        }

        let handle = self.handle;
        if checked::call_skip_errors(&*self.driver, "wglDeleteContext", |d| d.delete_context(handle)) {
            log::debug!("deleted context {handle:?}");
        } else {
            log::warn!("failed to delete context {handle:?}");
        }
    }
}

/// An OpenGL rendering context bound to one device surface.
///
/// The context is only ever made current through [`MakeCurrent`]; every
/// operation that touches the driver activates it first and restores the
/// previously active context afterwards. Render modes are cached and
/// committed only once the driver accepted them.
///
/// A context can be active on at most one thread at a time. Activating it
/// from a second thread fails instead of waiting.
pub struct GlContext<D: Driver> {
    binding: Arc<ContextBinding<D>>,
    version: GlVersion,
    state: RenderState,

    /// Format set on the surface, once chosen or adopted.
    pixel_format: Option<PixelFormat>,
}

impl<D: Driver> GlContext<D> {
    /// Negotiates a context on `surface`, using `reference` to reach the
    /// `wglCreateContextAttribsARB` extension.
    ///
    /// `reference` is active for the duration of the negotiation and
    /// restored (or released) afterwards.
    pub fn new_shared(surface: D::Surface, reference: &GlContext<D>, init: ContextInit) -> Result<Self> {
        let driver = Arc::clone(&reference.binding.driver);

        let handle = {
            let _active = MakeCurrent::new(reference)?;

            let entry = resolve(&*driver, "wglCreateContextAttribsARB")?;
            let profile = if init.core_profile {
                consts::WGL_CONTEXT_CORE_PROFILE_BIT_ARB
            } else {
                consts::WGL_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB
            };
            let attribs = [
                consts::WGL_CONTEXT_MAJOR_VERSION_ARB,
                init.version.major,
                consts::WGL_CONTEXT_MINOR_VERSION_ARB,
                init.version.minor,
                consts::WGL_CONTEXT_PROFILE_MASK_ARB,
                profile,
                0,
            ];

            checked::call_some(&*driver, ContextError::Init, "wglCreateContextAttribsARB", |d| {
                d.create_context_attribs(entry, surface, &attribs)
            })?
        };

        log::debug!("created OpenGL {} context {handle:?}", init.version);
        let context = Self::from_handle(driver, surface, handle, init.version);
        debug::install(&context)?;
        Ok(context)
    }

    /// Creates a minimal context directly on `surface`.
    ///
    /// Such a context only serves to load the extension entry points needed
    /// by [`GlContext::new_shared`] and [`GlContext::assign_pixel_format`].
    pub fn new_legacy(driver: Arc<D>, surface: D::Surface) -> Result<Self> {
        let handle = driver
            .create_context(surface)
            .ok_or(ContextError::Init(CallFailure::InvalidReturn { call: "wglCreateContext" }))?;

        log::debug!("created legacy context {handle:?}");
        let context = Self::from_handle(driver, surface, handle, GlVersion::LEGACY);
        debug::install(&context)?;
        Ok(context)
    }

    fn from_handle(driver: Arc<D>, surface: D::Surface, handle: D::Context, version: GlVersion) -> Self {
        Self {
            binding: Arc::new(ContextBinding {
                driver,
                surface,
                handle,
                owner: Mutex::new(None),
            }),
            version,
            state: RenderState::default(),
            pixel_format: None,
        }
    }

    /// Chooses the pixel format best matching `format` for this context's
    /// surface.
    ///
    /// Applying the returned format to the surface is up to the caller.
    /// A surface gets at most one pixel format; later calls fail.
    pub fn assign_pixel_format(&mut self, format: &PixelFormat) -> Result<PixelFormatId> {
        if self.pixel_format.is_some() {
            return Err(ContextError::BadPixelFormat(CallFailure::AlreadyAssigned));
        }

        let surface = self.binding.surface;
        let attribs = format.to_attributes();

        let id = self.with_active(|driver| {
            let entry = resolve(driver, "wglChoosePixelFormatARB")?;

            let mut ids = [0_i32; 1];
            let mut count = 0_u32;
            checked::call_fail_value(
                driver,
                ContextError::BadPixelFormat,
                "wglChoosePixelFormatARB",
                false,
                |d| d.choose_pixel_format(entry, surface, &attribs, &mut ids, &mut count),
            )?;

            if count == 0 {
                return Err(ContextError::BadPixelFormat(CallFailure::NoMatchingFormat));
            }
            Ok(PixelFormatId(ids[0]))
        })?;

        self.pixel_format = Some(*format);
        log::debug!("pixel format {id} chosen for {surface:?}");
        Ok(id)
    }

    /// Records a format applied to this context's surface by other means,
    /// e.g. chosen through a bootstrap context.
    pub fn adopt_pixel_format(&mut self, format: &PixelFormat) -> Result<()> {
        if self.pixel_format.is_some() {
            return Err(ContextError::BadPixelFormat(CallFailure::AlreadyAssigned));
        }
        self.pixel_format = Some(*format);
        Ok(())
    }

    pub fn pixel_format(&self) -> Option<&PixelFormat> {
        self.pixel_format.as_ref()
    }

    /// Negotiated OpenGL version.
    pub fn version(&self) -> GlVersion {
        self.version
    }

    pub fn handles(&self) -> NativeHandles<D::Surface, D::Context> {
        NativeHandles {
            surface: self.binding.surface,
            context: self.binding.handle,
        }
    }

    pub fn driver(&self) -> &D {
        &self.binding.driver
    }

    /// Thread this context is currently bound to.
    pub fn owner(&self) -> Option<ThreadId> {
        self.binding.owner()
    }

    pub fn render_state(&self) -> RenderState {
        self.state
    }

    /// Clears the color and depth buffers.
    pub fn clear_frame(&self, color: Rgb) -> Result<()> {
        self.with_active(|driver| {
            checked::call(driver, ContextError::ClearFrame, "glClearColor", |d| {
                d.clear_color(color.r, color.g, color.b, 1.0)
            })?;
            checked::call(driver, ContextError::ClearFrame, "glClear", |d| {
                d.clear(consts::COLOR_BUFFER_BIT | consts::DEPTH_BUFFER_BIT)
            })
        })
    }

    /// Swaps the surface buffers. Single-buffered surfaces have nothing to swap.
    pub fn present(&self) -> Result<()> {
        if self.pixel_format.is_some_and(|format| !format.double_buffer) {
            log::trace!("single-buffered surface; present skipped");
            return Ok(());
        }

        let surface = self.binding.surface;
        self.with_active(|driver| {
            checked::call_fail_value(driver, ContextError::Present, "SwapBuffers", false, |d| {
                d.swap_buffers(surface)
            })
            .map(|_| ())
        })
    }

    pub fn set_polygon_mode(&mut self, mode: PolygonMode) -> Result<()> {
        self.apply_polygon_mode(mode, modes::POLYGON_MODES)
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.state.polygon_mode
    }

    fn apply_polygon_mode(&mut self, mode: PolygonMode, table: &[(PolygonMode, GlEnum)]) -> Result<()> {
        self.with_active(|driver| {
            let native = modes::lookup(table, mode, "polygon mode")?;
            checked::call(driver, ContextError::ModeEdit, "glPolygonMode", |d| {
                d.polygon_mode(consts::FRONT_AND_BACK, native)
            })
        })?;

        self.state.polygon_mode = mode;
        log::debug!("polygon mode: {mode:?}");
        Ok(())
    }

    pub fn set_culling_mode(&mut self, mode: CullingMode) -> Result<()> {
        self.with_active(|driver| {
            if mode == CullingMode::NoCulling {
                return checked::call(driver, ContextError::ModeEdit, "glDisable", |d| {
                    d.disable(consts::CULL_FACE)
                });
            }

            let face = modes::lookup(modes::CULLED_FACES, mode, "face culling mode")?;
            checked::call(driver, ContextError::ModeEdit, "glEnable", |d| d.enable(consts::CULL_FACE))?;
            checked::call(driver, ContextError::ModeEdit, "glCullFace", |d| d.cull_face(face))
        })?;

        self.state.culling_mode = mode;
        log::debug!("culling mode: {mode:?}");
        Ok(())
    }

    pub fn culling_mode(&self) -> CullingMode {
        self.state.culling_mode
    }

    pub fn set_depth_test_mode(&mut self, mode: DepthTestMode) -> Result<()> {
        self.with_active(|driver| {
            if mode == DepthTestMode::Disabled {
                return checked::call(driver, ContextError::ModeEdit, "glDisable", |d| {
                    d.disable(consts::DEPTH_TEST)
                });
            }

            let write = modes::lookup(modes::DEPTH_WRITES, mode, "depth test mode")?;
            checked::call(driver, ContextError::ModeEdit, "glEnable", |d| d.enable(consts::DEPTH_TEST))?;
            checked::call(driver, ContextError::ModeEdit, "glDepthMask", |d| d.depth_mask(write))
        })?;

        self.state.depth_test_mode = mode;
        log::debug!("depth test mode: {mode:?}");
        Ok(())
    }

    pub fn depth_test_mode(&self) -> DepthTestMode {
        self.state.depth_test_mode
    }

    pub fn set_blending_mode(&mut self, mode: BlendMode) -> Result<()> {
        self.with_active(|driver| {
            if mode == BlendMode::Disabled {
                return checked::call(driver, ContextError::ModeEdit, "glDisable", |d| {
                    d.disable(consts::BLEND)
                });
            }

            // Every enabled mode has a blend function; a gap here is a bug in the table.
            let (source, destination) = modes::lookup(modes::BLEND_FUNCTIONS, mode, "blend function")
                .unwrap_or_else(|_| unreachable!("no blend function registered for {mode:?}"));
            checked::call(driver, ContextError::ModeEdit, "glEnable", |d| d.enable(consts::BLEND))?;
            checked::call(driver, ContextError::ModeEdit, "glBlendFunc", |d| {
                d.blend_func(source, destination)
            })
        })?;

        self.state.blending_mode = mode;
        log::debug!("blending mode: {mode:?}");
        Ok(())
    }

    pub fn blending_mode(&self) -> BlendMode {
        self.state.blending_mode
    }

    /// Runs `f` with this context active on the calling thread.
    fn with_active<R>(&self, f: impl FnOnce(&D) -> Result<R>) -> Result<R> {
        let _active = MakeCurrent::new(self)?;
        f(self.driver())
    }
}

fn resolve<D: Driver>(driver: &D, name: &'static str) -> Result<ProcAddress> {
    checked::call_some(driver, ContextError::FunctionNotFound, name, |d| d.proc_address(name))
}

impl<D: Driver> Bindable for GlContext<D> {
    type Binding = ContextBinding<D>;

    fn binding(&self) -> &Arc<ContextBinding<D>> {
        &self.binding
    }
}

impl<D: Driver> fmt::Debug for GlContext<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlContext")
            .field("surface", &self.binding.surface)
            .field("handle", &self.binding.handle)
            .field("version", &self.version)
            .field("state", &self.state)
            .field("owner", &self.owner())
            .finish()
    }
}
