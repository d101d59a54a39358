use std::sync::Arc;

use anyhow::{Context as _, Result};
use rframe_gl::context::bootstrap::create_frame_context;
use rframe_gl::driver::HeadlessDriver;
use rframe_gl::logging::{LoggingConfig, init_logging};
use rframe_gl::{BlendMode, ContextInit, CullingMode, DepthTestMode, PixelFormat, PolygonMode, Rgb};

/// Frames cleared and presented by the demo.
const FRAMES: u32 = 3;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let driver = Arc::new(HeadlessDriver::new());
    let dummy = driver.create_surface();
    let surface = driver.create_surface();

    let mut context = create_frame_context(
        &driver,
        dummy,
        surface,
        &PixelFormat::default(),
        ContextInit::default(),
        |target, id| {
            log::info!("applying pixel format {id} to {target:?}");
            Ok(())
        },
    )?;

    context.set_polygon_mode(PolygonMode::Fill)?;
    context.set_culling_mode(CullingMode::BackCulling)?;
    context.set_depth_test_mode(DepthTestMode::Enabled)?;
    context.set_blending_mode(BlendMode::DefaultTransparency)?;

    for frame in 0..FRAMES {
        context
            .clear_frame(Rgb::background())
            .with_context(|| format!("frame {frame}: clear failed"))?;
        context
            .present()
            .with_context(|| format!("frame {frame}: present failed"))?;
    }

    let state = context.render_state();
    println!();
    println!("  OpenGL version   {}", context.version());
    println!("  polygon mode     {:?}", state.polygon_mode);
    println!("  culling          {:?}", state.culling_mode);
    println!("  depth test       {:?}", state.depth_test_mode);
    println!("  blending         {:?}", state.blending_mode);
    println!("  frames presented {}", driver.presented(surface));
    println!("  driver calls     {}", driver.journal().len());
    println!();

    Ok(())
}
