use crate::api::config::ViewConfig;
use crate::api::types::Rgb;
use crate::bridge::document::{PersistStatus, SceneDocument};
#[cfg(feature = "raster")]
use crate::bridge::export;
use crate::core::rng::Rng;
use crate::core::scene::Scene;
use crate::core::time::{AnimationClock, LoopHandle, LoopToken};
#[cfg(feature = "raster")]
use crate::error::ExportError;
use crate::input::controller::{InputController, InteractionState};
use crate::input::event::InputEvent;
use crate::renderer::camera::{Camera, Viewport};
use crate::renderer::traits::Surface;
use crate::systems::render::render_frame;

/// One orrery view: the scene, the camera looking at it, and the state that
/// drives both between frames.
///
/// The host hands input over as it arrives, where it moves the camera at
/// once, and calls [`OrreryView::tick`] once per display frame. Control setters are called by UI chrome and take effect on
/// the next frame.
pub struct OrreryView {
    scene: Scene,
    camera: Camera,
    viewport: Viewport,
    controller: InputController,
    clock: AnimationClock,
    config: ViewConfig,
    status: PersistStatus,
    frame_loop: Option<LoopHandle>,
}

impl OrreryView {
    pub fn new(config: ViewConfig, width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        let config = config.sanitized();
        let viewport = Viewport::new(width, height, device_pixel_ratio, config.fov_degrees);
        log::info!(
            "orrery view created ({}x{} @{})",
            viewport.width(),
            viewport.height(),
            viewport.device_pixel_ratio()
        );
        Self {
            scene: Scene::new(),
            camera: Camera::default(),
            viewport,
            controller: InputController::new(),
            clock: AnimationClock::new(),
            config,
            status: PersistStatus::Idle,
            frame_loop: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn status(&self) -> PersistStatus {
        self.status
    }

    pub fn interaction(&self) -> InteractionState {
        self.controller.state()
    }

    // ── Frame ────────────────────────────────────────────────────────

    /// Apply one input event to the camera. Nothing is buffered, so events
    /// arriving while no loop runs cost no memory.
    pub fn handle_input(&mut self, event: InputEvent) {
        self.controller.handle(&event, &mut self.camera, &self.config);
    }

    /// Advance the clock by `dt` seconds and paint.
    pub fn tick(&mut self, dt: f64, surface: &mut impl Surface) {
        let time = self.clock.advance(dt);
        render_frame(
            &self.scene,
            &self.camera,
            time,
            &self.viewport,
            &self.config,
            surface,
        );
    }

    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.viewport.resize(width, height, device_pixel_ratio);
        log::info!(
            "orrery view resized to {}x{} @{}",
            self.viewport.width(),
            self.viewport.height(),
            self.viewport.device_pixel_ratio()
        );
    }

    // ── Animation loop ───────────────────────────────────────────────

    /// Start a new loop and return the token the platform scheduler polls.
    /// A previously running loop is cancelled.
    pub fn start_loop(&mut self) -> LoopToken {
        let (handle, token) = LoopHandle::pair();
        if self.frame_loop.replace(handle).is_some() {
            log::debug!("previous animation loop replaced");
        }
        log::info!("animation loop started");
        token
    }

    pub fn stop_loop(&mut self) {
        if let Some(handle) = self.frame_loop.take() {
            handle.cancel();
            log::info!("animation loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.as_ref().is_some_and(LoopHandle::is_live)
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    // ── Controls ─────────────────────────────────────────────────────

    pub fn set_planet_count(&mut self, count: usize) {
        self.scene.set_planet_count(count);
    }

    /// Returns false (and changes nothing) for a malformed color.
    pub fn set_star_color(&mut self, hex: &str) -> bool {
        match Rgb::from_hex(hex) {
            Some(color) => {
                self.scene.star.color = color;
                true
            }
            None => false,
        }
    }

    pub fn set_star_size(&mut self, size: f32) {
        self.scene.star.set_size(size);
    }

    /// Returns false for a malformed color or an orbit index past the end.
    pub fn set_planet_color(&mut self, orbit_index: usize, hex: &str) -> bool {
        match (Rgb::from_hex(hex), self.scene.planet_mut(orbit_index)) {
            (Some(color), Some(planet)) => {
                planet.color = color;
                true
            }
            _ => false,
        }
    }

    pub fn set_planet_size(&mut self, orbit_index: usize, size: f32) {
        if let Some(planet) = self.scene.planet_mut(orbit_index) {
            planet.set_size(size);
        }
    }

    pub fn set_planet_rings(&mut self, orbit_index: usize, has_rings: bool) {
        if let Some(planet) = self.scene.planet_mut(orbit_index) {
            planet.has_rings = has_rings;
        }
    }

    pub fn set_planet_ring_tilt(&mut self, orbit_index: usize, degrees: f32) {
        if let Some(planet) = self.scene.planet_mut(orbit_index) {
            planet.set_ring_tilt(degrees);
        }
    }

    pub fn set_show_orbits(&mut self, show: bool) {
        self.scene.show_orbits = show;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.scene.set_speed(speed);
    }

    pub fn set_label(&mut self, label: &str) {
        self.scene.set_label(label);
    }

    /// Reproducible for a given seed.
    pub fn randomize(&mut self, seed: u64) {
        let mut rng = Rng::new(seed);
        self.scene.randomize(&mut rng);
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
        self.controller.reset();
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Serialize the scene and camera for the external store and mark the
    /// save as in flight.
    pub fn save_document(&mut self, saved_at_ms: u64) -> String {
        self.status = PersistStatus::Saving;
        SceneDocument::capture(&self.scene, &self.camera, saved_at_ms).to_json()
    }

    /// Record the outcome of the save. The scene is never touched.
    pub fn finish_save(&mut self, ok: bool) {
        self.status = if ok {
            PersistStatus::Saved
        } else {
            log::warn!("scene save failed");
            PersistStatus::Error
        };
    }

    /// Replace scene and camera from a stored document. Never fails; unusable
    /// fields fall back to defaults.
    pub fn load_document(&mut self, json: &str) {
        let (scene, camera) = SceneDocument::from_json_lenient(json).apply();
        self.scene = scene;
        self.camera = camera;
        self.controller.reset();
        log::info!("scene loaded ({} planets)", self.scene.planet_count());
    }

    // ── Export ───────────────────────────────────────────────────────

    /// Encode the current frame as PNG.
    #[cfg(feature = "raster")]
    pub fn snapshot_png(&self) -> Result<Vec<u8>, ExportError> {
        let image = export::render_snapshot(
            &self.scene,
            &self.camera,
            self.clock.time(),
            &self.viewport,
            &self.config,
        )?;
        export::encode_png(&image)
    }

    /// Download name for a snapshot taken at `epoch_ms`.
    pub fn snapshot_filename(epoch_ms: u64) -> String {
        format!("orrery-{}.png", epoch_ms)
    }
}

impl Drop for OrreryView {
    fn drop(&mut self) {
        self.stop_loop();
    }
}
