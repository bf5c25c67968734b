//! The mounted forest component.
//!
//! [`ForestCanvas`] owns the scene state explicitly and wires the Surface Manager, Scene
//! Generator, Frame Renderer and Animation Driver to a [`Host`].

use rand::Rng;
use rand::rngs::ThreadRng;

use crate::driver::{AnimationDriver, DriverState};
use crate::foundation::core::{LogicalSize, Rect};
use crate::foundation::error::{WildwoodError, WildwoodResult};
use crate::host::{FrameHandle, Host, HostEvents, ListenerId};
use crate::render::backend::{FrameRGBA, PaintBackend, check_target_size, execute_plan};
use crate::render::cpu::CpuBackend;
use crate::render::frame::FrameRenderer;
use crate::scene::{Scene, generate_scene};
use crate::surface::Surface;

/// Work done by a [`ForestCanvas`] since it was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanvasStats {
    /// Frames rendered and presented.
    pub frames_rendered: u64,
    /// Scene regenerations, including the one at mount.
    pub regenerations: u64,
}

/// Animated generative forest bound to one host for its mounted lifetime.
///
/// `R` is the random source for both scene layout and per-frame variation; production code
/// uses the thread RNG, tests pass seeded generators.
pub struct ForestCanvas<B: PaintBackend = CpuBackend, R: Rng = ThreadRng> {
    surface: Surface,
    scene: Scene,
    scene_rng: R,
    renderer: FrameRenderer<R>,
    driver: AnimationDriver,
    backend: B,
    resize_listener: Option<ListenerId>,
    mounted: bool,
    stats: CanvasStats,
}

impl ForestCanvas<CpuBackend, ThreadRng> {
    pub fn new() -> Self {
        Self::with_parts(CpuBackend::new(), rand::rng(), rand::rng())
    }
}

impl Default for ForestCanvas<CpuBackend, ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: PaintBackend, R: Rng> ForestCanvas<B, R> {
    /// Build an unmounted canvas from a backend and the two random sources.
    pub fn with_parts(backend: B, scene_rng: R, frame_rng: R) -> Self {
        Self {
            surface: Surface::new(),
            scene: Scene::default(),
            scene_rng,
            renderer: FrameRenderer::new(frame_rng),
            driver: AnimationDriver::new(),
            backend,
            resize_listener: None,
            mounted: false,
            stats: CanvasStats::default(),
        }
    }

    /// Size the surface, lay out the forest, subscribe to resizes and start the frame loop.
    pub fn mount<H: Host + ?Sized>(&mut self, host: &mut H) -> WildwoodResult<()> {
        if self.mounted {
            return Err(WildwoodError::validation("forest canvas is already mounted"));
        }
        self.relayout(host);
        self.resize_listener = Some(host.add_resize_listener());
        self.mounted = true;

        let origin_ms = host.now_ms();
        self.driver.start(host, origin_ms);
        tracing::debug!(
            width = self.surface.logical_size().width,
            height = self.surface.logical_size().height,
            "forest canvas mounted"
        );
        Ok(())
    }

    /// Cancel the pending frame and drop the resize subscription. Safe to call repeatedly.
    pub fn unmount<H: Host + ?Sized>(&mut self, host: &mut H) {
        if !self.mounted {
            return;
        }
        self.driver.stop(host);
        if let Some(id) = self.resize_listener.take() {
            host.remove_resize_listener(id);
        }
        self.mounted = false;
        tracing::debug!(
            frames = self.stats.frames_rendered,
            regenerations = self.stats.regenerations,
            "forest canvas unmounted"
        );
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn driver_state(&self) -> DriverState {
        self.driver.state()
    }

    pub fn stats(&self) -> CanvasStats {
        self.stats
    }

    fn relayout<H: Host + ?Sized>(&mut self, host: &H) {
        self.surface.resize(host.container_rect(), host.device_pixel_ratio());
        let size = self.surface.logical_size();
        self.scene.regenerate(size, &mut self.scene_rng);
        self.stats.regenerations += 1;
    }

    fn draw<H: Host + ?Sized>(
        &mut self,
        timestamp_ms: f64,
        origin_ms: f64,
        host: &mut H,
    ) -> WildwoodResult<()> {
        check_target_size(self.surface.backing_width(), self.surface.backing_height())?;
        let elapsed_s = (timestamp_ms - origin_ms) * 0.001;
        let plan = self
            .renderer
            .compose(&self.surface, &self.scene, timestamp_ms, elapsed_s);
        let frame = execute_plan(&mut self.backend, &plan)?;
        host.present(&frame)?;
        self.stats.frames_rendered += 1;
        tracing::trace!(
            timestamp_ms,
            ops = plan.ops.len(),
            frame = self.stats.frames_rendered,
            "frame rendered"
        );
        Ok(())
    }
}

impl<B: PaintBackend, R: Rng> HostEvents for ForestCanvas<B, R> {
    fn on_animation_frame<H: Host + ?Sized>(
        &mut self,
        handle: FrameHandle,
        timestamp_ms: f64,
        host: &mut H,
    ) -> WildwoodResult<()> {
        let Some(origin_ms) = self.driver.accept(handle) else {
            tracing::trace!(handle = handle.0, "ignoring stale frame callback");
            return Ok(());
        };
        self.draw(timestamp_ms, origin_ms, host)?;
        self.driver.reschedule(host);
        Ok(())
    }

    fn on_resize<H: Host + ?Sized>(
        &mut self,
        listener: ListenerId,
        host: &mut H,
    ) -> WildwoodResult<()> {
        if !self.mounted || self.resize_listener != Some(listener) {
            return Ok(());
        }
        self.relayout(host);
        tracing::debug!(
            backing_width = self.surface.backing_width(),
            backing_height = self.surface.backing_height(),
            "forest relaid out after resize"
        );
        Ok(())
    }
}

/// Render one frame of a freshly generated forest, `elapsed_ms` after an imaginary mount.
pub fn render_still(
    size: LogicalSize,
    device_pixel_ratio: f64,
    elapsed_ms: f64,
) -> WildwoodResult<FrameRGBA> {
    let mut surface = Surface::new();
    surface.resize(Rect::new(0.0, 0.0, size.width, size.height), device_pixel_ratio);
    check_target_size(surface.backing_width(), surface.backing_height())?;
    let scene = generate_scene(surface.logical_size(), &mut rand::rng());
    let mut renderer: FrameRenderer = FrameRenderer::default();
    let plan = renderer.compose(&surface, &scene, elapsed_ms, elapsed_ms * 0.001);
    execute_plan(&mut CpuBackend::new(), &plan)
}

#[cfg(test)]
#[path = "../tests/unit/component.rs"]
mod tests;
