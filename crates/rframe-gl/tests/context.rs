use std::sync::Arc;

use rframe_gl::context::bootstrap::create_frame_context;
use rframe_gl::driver::{DebugSeverity, Fault, HeadlessDriver, consts};
use rframe_gl::logging::{LoggingConfig, init_logging};
use rframe_gl::{
    BlendMode, CallFailure, ContextError, ContextInit, CullingMode, DepthTestMode, ErrorKind, GlContext,
    GlVersion, MakeCurrent, PixelFormat, PolygonMode, RenderState, Rgb,
};

fn setup() -> Arc<HeadlessDriver> {
    init_logging(LoggingConfig::for_tests());
    Arc::new(HeadlessDriver::new())
}

#[test]
fn shared_context_negotiates_the_requested_version() {
    let driver = setup();
    let legacy = GlContext::new_legacy(Arc::clone(&driver), driver.create_surface()).unwrap();
    let surface = driver.create_surface();

    let shared = GlContext::new_shared(
        surface,
        &legacy,
        ContextInit {
            version: GlVersion::new(4, 6),
            core_profile: true,
        },
    )
    .unwrap();

    assert_eq!(legacy.version(), GlVersion::LEGACY);
    assert_eq!(shared.version().pair(), (4, 6));
    assert_eq!(driver.gl_state(shared.handles().context).unwrap().version, (4, 6));
    assert_eq!(driver.current_context(), None);
}

#[test]
fn compatibility_profile_is_requested_when_asked() {
    let driver = setup();
    let legacy = GlContext::new_legacy(Arc::clone(&driver), driver.create_surface()).unwrap();
    driver.clear_journal();

    let init = ContextInit {
        version: GlVersion::new(3, 3),
        core_profile: false,
    };
    let shared = GlContext::new_shared(driver.create_surface(), &legacy, init).unwrap();

    let expected = format!(
        "{:?}",
        [
            consts::WGL_CONTEXT_MAJOR_VERSION_ARB,
            3,
            consts::WGL_CONTEXT_MINOR_VERSION_ARB,
            3,
            consts::WGL_CONTEXT_PROFILE_MASK_ARB,
            consts::WGL_CONTEXT_COMPATIBILITY_PROFILE_BIT_ARB,
            0,
        ]
    );
    assert!(driver.journal().iter().any(|entry| entry.ends_with(&format!("{expected})"))));
    assert_eq!(shared.version(), GlVersion::new(3, 3));
}

#[test]
fn missing_context_extension_is_function_not_found() {
    let driver = setup();
    let legacy = GlContext::new_legacy(Arc::clone(&driver), driver.create_surface()).unwrap();
    driver.mark_missing("wglCreateContextAttribsARB");

    let err = GlContext::new_shared(driver.create_surface(), &legacy, ContextInit::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FunctionNotFound);
    assert_eq!(driver.current_context(), None);
}

#[test]
fn null_shared_handle_is_an_init_error() {
    let driver = setup();
    let legacy = GlContext::new_legacy(Arc::clone(&driver), driver.create_surface()).unwrap();
    driver.inject("wglCreateContextAttribsARB", Fault::Fail);

    let err = GlContext::new_shared(driver.create_surface(), &legacy, ContextInit::default()).unwrap_err();

    assert_eq!(
        err,
        ContextError::Init(CallFailure::InvalidReturn { call: "wglCreateContextAttribsARB" })
    );
}

#[test]
fn clear_failure_leaves_render_state_alone() {
    let driver = setup();
    let mut context = GlContext::new_legacy(Arc::clone(&driver), driver.create_surface()).unwrap();
    context.set_polygon_mode(PolygonMode::Line).unwrap();
    context.set_culling_mode(CullingMode::BackCulling).unwrap();
    let before = context.render_state();

    context.clear_frame(Rgb::background()).unwrap();
    assert_eq!(driver.pending_errors(), 0);

    driver.inject("glClear", Fault::Error(consts::INVALID_VALUE));
    let err = context.clear_frame(Rgb::background()).unwrap_err();

    assert_eq!(
        err,
        ContextError::ClearFrame(CallFailure::DriverError {
            call: "glClear",
            code: consts::INVALID_VALUE
        })
    );
    assert_eq!(context.render_state(), before);
    assert_eq!(driver.pending_errors(), 0);
}

#[test]
fn every_mode_can_be_set_and_read_back() {
    let driver = setup();
    let mut context = GlContext::new_legacy(Arc::clone(&driver), driver.create_surface()).unwrap();
    assert_eq!(context.render_state(), RenderState::default());

    context.set_polygon_mode(PolygonMode::Point).unwrap();
    context.set_culling_mode(CullingMode::FullCulling).unwrap();
    context.set_depth_test_mode(DepthTestMode::ReadOnly).unwrap();
    context.set_blending_mode(BlendMode::DefaultTransparency).unwrap();

    assert_eq!(
        context.render_state(),
        RenderState {
            polygon_mode: PolygonMode::Point,
            culling_mode: CullingMode::FullCulling,
            depth_test_mode: DepthTestMode::ReadOnly,
            blending_mode: BlendMode::DefaultTransparency,
        }
    );

    let gl = driver.gl_state(context.handles().context).unwrap();
    assert_eq!(gl.polygon_mode, consts::POINT);
    assert_eq!(gl.cull_face, consts::FRONT_AND_BACK);
    assert!(!gl.depth_write);
    assert!(gl.is_enabled(consts::BLEND));
}

#[test]
fn setters_run_against_their_own_context() {
    let driver = setup();
    let mut first = GlContext::new_legacy(Arc::clone(&driver), driver.create_surface()).unwrap();
    let second = GlContext::new_legacy(Arc::clone(&driver), driver.create_surface()).unwrap();

    {
        let _active = MakeCurrent::new(&second).unwrap();
        first.set_blending_mode(BlendMode::DefaultTransparency).unwrap();
        assert_eq!(driver.current_context(), Some(second.handles().context));
    }

    assert!(driver.gl_state(first.handles().context).unwrap().is_enabled(consts::BLEND));
    assert!(!driver.gl_state(second.handles().context).unwrap().is_enabled(consts::BLEND));
}

#[test]
fn bootstrap_then_present() {
    let driver = setup();
    let (dummy, surface) = (driver.create_surface(), driver.create_surface());

    let context = create_frame_context(
        &driver,
        dummy,
        surface,
        &PixelFormat::default(),
        ContextInit::default(),
        |_, _| Ok(()),
    )
    .unwrap();

    context.clear_frame(Rgb::background()).unwrap();
    context.present().unwrap();
    context.present().unwrap();

    assert_eq!(driver.presented(surface), 2);
    assert_eq!(driver.presented(dummy), 0);
}

#[test]
fn no_pixel_format_fails_the_bootstrap() {
    let driver = setup();
    driver.set_available_formats(0);

    let err = create_frame_context(
        &driver,
        driver.create_surface(),
        driver.create_surface(),
        &PixelFormat::default(),
        ContextInit::default(),
        |_, _| Ok(()),
    )
    .unwrap_err();

    let cause = err.downcast_ref::<ContextError>().unwrap();
    assert_eq!(cause, &ContextError::BadPixelFormat(CallFailure::NoMatchingFormat));
}

#[test]
fn dropping_a_context_deletes_it() {
    let driver = setup();
    let context = GlContext::new_legacy(Arc::clone(&driver), driver.create_surface()).unwrap();
    let handle = context.handles().context;
    assert!(driver.is_alive(handle));

    drop(context);

    assert!(!driver.is_alive(handle));
    assert_eq!(driver.current_context(), None);
}

#[cfg(debug_assertions)]
#[test]
fn debug_output_is_installed_on_creation() {
    let driver = setup();
    let context = GlContext::new_legacy(Arc::clone(&driver), driver.create_surface()).unwrap();

    assert!(
        driver
            .gl_state(context.handles().context)
            .unwrap()
            .is_enabled(consts::DEBUG_OUTPUT)
    );
    assert!(driver.emit_debug_message(DebugSeverity::Low, "buffer usage hint ignored"));
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "left unchecked")]
fn unchecked_driver_error_fails_fast() {
    let driver = setup();
    let context = GlContext::new_legacy(Arc::clone(&driver), driver.create_surface()).unwrap();
    let _active = MakeCurrent::new(&context).unwrap();

    // Raised outside the checked wrappers, so nobody consumed it.
    driver.raise_error(consts::INVALID_ENUM);

    let _ = context.clear_frame(Rgb::black());
}
