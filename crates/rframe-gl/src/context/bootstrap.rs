//! Two-step context creation for a frame surface.
//!
//! Extension entry points can only be resolved with a context bound, and a
//! surface's pixel format can be set once. So the frame context is built
//! through a throwaway context on a dummy surface:
//! 1) legacy context on the dummy surface
//! 2) pixel format chosen through it, then applied to the target surface
//! 3) shared context negotiated on the target surface
//!
//! The dummy context is deleted before returning.

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::driver::Driver;

use super::gl_context::GlContext;
use super::init::ContextInit;
use super::pixel_format::{PixelFormat, PixelFormatId};

/// Creates the rendering context for `surface`.
///
/// `apply_format` sets the chosen pixel format on the target surface; that
/// step belongs to the windowing layer.
pub fn create_frame_context<D, F>(
    driver: &Arc<D>,
    dummy_surface: D::Surface,
    surface: D::Surface,
    format: &PixelFormat,
    init: ContextInit,
    apply_format: F,
) -> Result<GlContext<D>>
where
    D: Driver,
    F: FnOnce(D::Surface, PixelFormatId) -> Result<()>,
{
    let mut dummy = GlContext::new_legacy(Arc::clone(driver), dummy_surface)
        .context("failed to create the bootstrap context")?;

    let id = dummy
        .assign_pixel_format(format)
        .context("failed to choose a pixel format")?;
    apply_format(surface, id).with_context(|| format!("failed to apply pixel format {id}"))?;

    let mut context = GlContext::new_shared(surface, &dummy, init)
        .with_context(|| format!("failed to create an OpenGL {} context", init.version))?;
    context.adopt_pixel_format(format).context("failed to record the surface pixel format")?;

    log::info!(
        "frame context ready: OpenGL {} ({}), pixel format {id}",
        context.version(),
        if init.core_profile { "core" } else { "compatibility" },
    );
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{Fault, HeadlessDriver};
    use crate::error::{ContextError, ErrorKind};
    use crate::context::GlVersion;

    #[test]
    fn dummy_context_is_gone_after_bootstrap() {
        let driver = Arc::new(HeadlessDriver::new());
        let dummy = driver.create_surface();
        let surface = driver.create_surface();
        let mut applied = None;

        let context = create_frame_context(
            &driver,
            dummy,
            surface,
            &PixelFormat::default(),
            ContextInit::default(),
            |target, id| {
                applied = Some((target, id));
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(applied, Some((surface, PixelFormatId(1))));
        assert_eq!(context.version(), GlVersion::new(4, 6));
        assert_eq!(context.handles().surface, surface);
        assert_eq!(driver.calls("wglDeleteContext"), 1);
        assert_eq!(driver.current_context(), None);
    }

    #[test]
    fn frame_context_remembers_the_chosen_format() {
        let driver = Arc::new(HeadlessDriver::new());
        let (dummy, surface) = (driver.create_surface(), driver.create_surface());
        let format = PixelFormat {
            double_buffer: false,
            ..PixelFormat::default()
        };

        let context =
            create_frame_context(&driver, dummy, surface, &format, ContextInit::default(), |_, _| Ok(())).unwrap();
        context.present().unwrap();

        assert_eq!(context.pixel_format(), Some(&format));
        assert_eq!(driver.presented(surface), 0);
    }

    #[test]
    fn apply_failure_stops_before_the_shared_context() {
        let driver = Arc::new(HeadlessDriver::new());
        let (dummy, surface) = (driver.create_surface(), driver.create_surface());

        let err = create_frame_context(
            &driver,
            dummy,
            surface,
            &PixelFormat::default(),
            ContextInit::default(),
            |_, _| anyhow::bail!("SetPixelFormat refused"),
        )
        .unwrap_err();

        assert!(err.to_string().contains("failed to apply pixel format #1"));
        assert_eq!(driver.calls("wglCreateContextAttribsARB"), 0);
    }

    #[test]
    fn shared_context_failure_keeps_its_cause() {
        let driver = Arc::new(HeadlessDriver::new());
        let (dummy, surface) = (driver.create_surface(), driver.create_surface());
        driver.inject("wglCreateContextAttribsARB", Fault::Fail);

        let err = create_frame_context(
            &driver,
            dummy,
            surface,
            &PixelFormat::default(),
            ContextInit::default(),
            |_, _| Ok(()),
        )
        .unwrap_err();

        let cause = err.downcast_ref::<ContextError>().unwrap();
        assert_eq!(cause.kind(), ErrorKind::Init);
    }
}
