use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use orrery_engine::context::RenderContext;
use orrery_engine::control::{FrameCtx, USE_CONTINUOUS_RENDERING, USE_DISPLAY_REFRESH_RATE};
use orrery_engine::delegate::{Animation, FnFrameCallback, Lifecycle, RenderDelegate};
use orrery_engine::logging::{init_logging, LoggingConfig};
use orrery_engine::scene::{Scene, SceneView};
use orrery_engine::surface::{Color, HeadlessSurface, SurfaceConfig, SurfaceSize};
use orrery_engine::task::RenderTask;
use orrery_engine::{RenderControl, RenderControlClient, RenderControlConfig};

/// Orbit angle in radians, stored as `f64` bits so frames and the reporter share it.
#[derive(Default)]
struct Orbit {
    angle_bits: AtomicU64,
}

impl Orbit {
    fn angle(&self) -> f64 {
        f64::from_bits(self.angle_bits.load(Ordering::Relaxed))
    }
}

/// Advances the orbit at a fixed angular speed.
struct Spin {
    orbit: Arc<Orbit>,
    radians_per_second: f64,
}

impl Animation for Spin {
    fn is_playing(&self) -> bool {
        true
    }

    fn update(&self, dt: f64) {
        let next = (self.orbit.angle() + self.radians_per_second * dt) % std::f64::consts::TAU;
        self.orbit.angle_bits.store(next.to_bits(), Ordering::Relaxed);
    }
}

struct SolarSystem {
    delegate: RenderDelegate,
    orbit: Arc<Orbit>,
}

impl Lifecycle for SolarSystem {
    fn render_delegate(&self) -> &RenderDelegate {
        &self.delegate
    }

    fn initialize(&self) -> anyhow::Result<()> {
        self.delegate.add_animation(Arc::new(Spin {
            orbit: self.orbit.clone(),
            radians_per_second: 1.0,
        }));
        log::info!("solar system initialized");
        Ok(())
    }

    fn restore(&self) -> anyhow::Result<()> {
        log::info!("solar system restored for the new context");
        Ok(())
    }

    fn destroy(&self) -> anyhow::Result<()> {
        log::info!("solar system destroyed");
        Ok(())
    }

    fn label(&self) -> &str {
        "solar system"
    }
}

impl Scene for SolarSystem {}

/// Counts the frames it paints; stands in for a camera view of the scene.
struct Viewport {
    name: &'static str,
    delegate: RenderDelegate,
    orbit: Arc<Orbit>,
    painted: AtomicU64,
}

impl Viewport {
    fn new(name: &'static str, orbit: &Arc<Orbit>) -> Arc<Self> {
        Arc::new(Self {
            name,
            delegate: RenderDelegate::new(),
            orbit: orbit.clone(),
            painted: AtomicU64::new(0),
        })
    }
}

impl Lifecycle for Viewport {
    fn render_delegate(&self) -> &RenderDelegate {
        &self.delegate
    }

    fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn label(&self) -> &str {
        self.name
    }
}

impl SceneView for Viewport {
    fn render_frame(&self, ctx: &FrameCtx<'_>) -> anyhow::Result<()> {
        let n = self.painted.fetch_add(1, Ordering::Relaxed);
        if n % 120 == 0 {
            let layer = if ctx.is_back_most() { "back" } else { "overlay" };
            log::debug!(
                "{} ({layer} @ depth {}): frame {} at {:.2} rad on {}, aspect {:.2}",
                self.name,
                ctx.depth_order,
                ctx.time.frame_index,
                self.orbit.angle(),
                ctx.render_context()?,
                ctx.surface_size.aspect_ratio(),
            );
        }
        Ok(())
    }
}

struct Studio;

impl RenderControlClient for Studio {
    fn on_render_control_available(&self, control: &RenderControl, initial_size: SurfaceSize) {
        log::info!(
            "render control available: {initial_size} on {}",
            control
                .current_render_context()
                .map(|c| c.to_string())
                .unwrap_or_else(|e| e.to_string()),
        );
    }

    fn on_surface_size_changed(&self, size: SurfaceSize) {
        log::info!("surface resized to {size}");
    }

    fn on_render_control_unavailable(&self) {
        log::warn!("render control unavailable");
    }
}

fn run_for(what: &str, duration: Duration) {
    log::info!("{what}");
    thread::sleep(duration);
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let surface_config = SurfaceConfig::default().with_display_refresh_rate(60.0);
    surface_config.validate()?;

    let surface = HeadlessSurface::new(surface_config.clone());
    let control = RenderControl::new(
        surface.clone(),
        Arc::new(Studio),
        surface_config
            .render_control_config()
            .with_background_color(Color::from_argb(0xFF_10_10_20)),
    )?;
    control.set_fps_listener(|fps| log::info!("measured {fps:.1} fps"));

    let orbit = Arc::new(Orbit::default());
    let system = Arc::new(SolarSystem {
        delegate: RenderDelegate::new(),
        orbit: orbit.clone(),
    });
    system.delegate.add_frame_callback(Arc::new(
        FnFrameCallback::new()
            .on_start(|dt| log::trace!("frame start, dt = {dt:.4}"))
            .single_frame(),
    ));

    let overview = Viewport::new("overview", &orbit);
    let closeup = Viewport::new("close-up", &orbit);

    control.add_scene(system.clone());
    control.add_scene_view(closeup.clone());
    control.insert_scene_view(overview.clone(), 0);

    surface.start(Arc::new(control.clone()), SurfaceSize::new(1280, 720), RenderContext::OPENGL_ES_3_1)?;
    run_for("rendering at display refresh rate", Duration::from_secs(2));

    control.set_frame_rate(30.0)?;
    run_for("rendering at 30 fps", Duration::from_secs(2));

    control.set_frame_rate(USE_CONTINUOUS_RENDERING)?;
    run_for("rendering continuously", Duration::from_millis(500));
    control.set_frame_rate(USE_DISPLAY_REFRESH_RATE)?;

    surface.resize(SurfaceSize::new(720, 1280));
    surface.lose_context();
    run_for("context lost", Duration::from_millis(300));
    surface.restore_context(RenderContext::OPENGL_ES_3_0);
    run_for("context restored", Duration::from_secs(1));

    surface.pause();
    run_for("paused", Duration::from_millis(300));
    surface.resume();
    run_for("resumed", Duration::from_secs(1));

    control.queue_render_task(
        RenderTask::new({
            let control = control.clone();
            move || {
                log::info!("elapsed since frames started: {:?}", control.frames_elapsed_time());
                Ok(())
            }
        })
        .on_complete(|outcome| log::info!("report task finished: {outcome:?}")),
    );
    control.remove_scene_view(closeup.clone());
    surface.sync();
    surface.run_main_thread_jobs();

    surface.shutdown();

    log::info!(
        "painted {} overview / {} close-up frames; {} frames drawn; last fps {:?}",
        overview.painted.load(Ordering::Relaxed),
        closeup.painted.load(Ordering::Relaxed),
        surface.frames_drawn(),
        control.last_measured_fps(),
    );
    Ok(())
}
