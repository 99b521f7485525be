//! Frame Driver
//!
//! [`FrameDriver`] is the per-frame coordinator: it owns the scene, the
//! compiled shaders, the camera and the charge input, and runs one
//! update-then-render pass per call.
//!
//! ```rust,ignore
//! let mut driver = FrameDriver::new(scene, &mut backend, &settings)?;
//! loop {
//!     let stats = driver.tick(&mut backend)?;
//! }
//! ```

use crate::app::input::ChargeController;
use crate::app::settings::EngineSettings;
use crate::errors::Result;
use crate::render::{FrameContext, FrameStats, RenderBackend, ShaderLibrary, render_scene};
use crate::scene::{Camera, Scene};
use crate::utils::Timer;

pub struct FrameDriver {
    pub scene: Scene,
    pub camera: Camera,
    pub charge: ChargeController,
    shaders: ShaderLibrary,
    timer: Timer,
    viewport: (u32, u32),
}

impl FrameDriver {
    /// Compiles every shader program and takes ownership of `scene`.
    pub fn new(scene: Scene, backend: &mut dyn RenderBackend, settings: &EngineSettings) -> Result<Self> {
        let shaders = ShaderLibrary::compile_all(backend, &settings.shaders, &settings.geyser)?;
        Ok(Self::with_shaders(scene, shaders, settings))
    }

    /// Uses an already compiled library.
    #[must_use]
    pub fn with_shaders(scene: Scene, shaders: ShaderLibrary, settings: &EngineSettings) -> Self {
        Self {
            scene,
            camera: Camera::default(),
            charge: ChargeController::new(settings.charge),
            shaders,
            timer: Timer::new(),
            viewport: (1280, 720),
        }
    }

    #[must_use]
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    #[must_use]
    pub fn with_charge(mut self, charge: ChargeController) -> Self {
        self.charge = charge;
        self
    }

    #[must_use]
    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
    }

    /// Seconds on the process clock as of the last [`tick`](Self::tick).
    #[must_use]
    pub fn time(&self) -> f32 {
        self.timer.elapsed_seconds()
    }

    /// One frame at an explicit time: update the scene, then draw it.
    pub fn frame(&mut self, now: f32, backend: &mut dyn RenderBackend) -> Result<FrameStats> {
        self.scene.update(now)?;

        let (width, height) = self.viewport;
        let context = FrameContext {
            projection: self.camera.projection_matrix(width, height),
            view: self.camera.view_matrix(),
            view_vector: self.camera.view_vector(),
            time: now,
            charge_level: self.charge.level(now),
        };

        render_scene(&self.scene, &context, backend, &self.shaders)
    }

    /// One frame at the process clock's current time.
    pub fn tick(&mut self, backend: &mut dyn RenderBackend) -> Result<FrameStats> {
        self.timer.tick();
        let now = self.timer.elapsed_seconds();
        self.frame(now, backend)
    }

    pub fn begin_charge(&mut self, now: f32) {
        self.charge.begin(now);
    }

    /// Releases the charge and dispatches it to every registered target.
    /// Returns the charge, or `None` if no charge was in progress.
    pub fn end_charge(&mut self, now: f32) -> Option<f32> {
        let charge = self.charge.end(now)?;
        self.scene.trigger_charge(now, charge);
        Some(charge)
    }
}
