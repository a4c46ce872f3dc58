//! Window, GPU and per-frame orchestration.
//!
//! [`AppState`] is the single owner of everything the running orrery needs:
//! the scene, its asset loader, the camera rig, and (once the window exists)
//! the GPU context and renderer. It implements winit's
//! [`ApplicationHandler`]; [`run`] drives it until the window closes.

use std::sync::Arc;
use std::time::Instant;

use orrery_assets::AssetLoader;
use orrery_config::Config;
use orrery_input::{MouseState, OrbitControls};
use orrery_render::{
    Camera, RenderContext, SceneRenderer, SurfaceError, init_render_context_blocking,
};
use orrery_scene::{AssetCatalog, SceneComposer, SystemConfig};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::config_watch::ConfigWatch;
use crate::error::AppError;
use crate::game_loop::{FpsCounter, GameLoop};
use crate::setup;

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

/// GPU-side state, present only while a window exists.
struct Graphics {
    window: Arc<Window>,
    ctx: RenderContext,
    renderer: SceneRenderer,
}

pub struct AppState {
    config: Config,
    scene: SceneComposer,
    catalog: AssetCatalog,
    loader: AssetLoader,
    camera: Camera,
    controls: OrbitControls,
    mouse: MouseState,
    game_loop: GameLoop,
    fps: FpsCounter,
    config_watch: Option<ConfigWatch>,
    graphics: Option<Graphics>,
}

impl AppState {
    /// Build the scene and start decoding its assets. The window and GPU are
    /// created later, on the first `resumed`.
    pub fn new(config: Config, system: &SystemConfig) -> Result<Self, AppError> {
        let (scene, catalog) = setup::build_scene(&config, system)?;
        let mut loader = AssetLoader::new(
            config.scene.loader_threads as usize,
            config.scene.asset_dir.clone(),
        )?;
        let queued = loader.submit_catalog(&catalog);
        info!(
            "Queued {queued} asset loads on {} workers",
            loader.worker_count()
        );

        Ok(Self {
            camera: setup::camera(&config),
            controls: setup::orbit_controls(&config),
            config,
            scene,
            catalog,
            loader,
            mouse: MouseState::new(),
            game_loop: GameLoop::new(),
            fps: FpsCounter::new(Instant::now()),
            config_watch: None,
            graphics: None,
        })
    }

    /// Pick up edits to `config.ron` while running.
    pub fn with_config_watch(mut self, watch: ConfigWatch) -> Self {
        self.config_watch = Some(watch);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scene(&self) -> &SceneComposer {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Option<Graphics> {
        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                return None;
            }
        };
        let ctx = match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                return None;
            }
        };
        let renderer = SceneRenderer::new(&ctx, setup::renderer_settings(&self.config));
        let (width, height) = ctx.size();
        self.camera.set_viewport(width, height);
        info!("Renderer ready at {width}x{height}");
        Some(Graphics {
            window,
            ctx,
            renderer,
        })
    }

    /// Apply a changed `config.ron`. Render and camera tuning and `show_fps`
    /// take effect at once; window, scene and log level wait for a restart.
    fn poll_config(&mut self, now: Instant) -> bool {
        let Some(config) = self.config_watch.as_mut().and_then(|w| w.poll(now)) else {
            return false;
        };
        if config.window != self.config.window || config.scene != self.config.scene {
            info!("Window and scene changes apply on restart");
        }
        self.controls.set_settings(setup::orbit_settings(&config));
        if let Some(gfx) = &mut self.graphics {
            gfx.renderer.set_settings(setup::renderer_settings(&config));
        }
        self.config = config;
        true
    }

    fn resize(&mut self, width: u32, height: u32) {
        let Some(gfx) = &mut self.graphics else {
            return;
        };
        gfx.ctx.resize(width, height);
        let (width, height) = gfx.ctx.size();
        gfx.renderer.resize(&gfx.ctx.device, width, height);
        self.camera.set_viewport(width, height);
        debug!("Resized to {width}x{height}");
    }

    /// Apply finished loads, step the simulation, and draw one frame.
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_none() {
            return;
        }

        self.poll_config(Instant::now());
        let Some(gfx) = &mut self.graphics else {
            return;
        };
        for result in self.loader.drain() {
            gfx.renderer.apply_load(&gfx.ctx.device, &gfx.ctx.queue, result);
        }

        self.controls.handle_mouse(&self.mouse);
        let scene = &mut self.scene;
        let controls = &mut self.controls;
        self.game_loop.tick(|_dt| {
            scene.tick();
            controls.update();
        });
        self.camera.look_at(self.controls.eye(), self.controls.target());

        match gfx.renderer.render_frame(&gfx.ctx, &self.scene, &self.camera) {
            Ok(()) => {}
            Err(SurfaceError::Lost) => {
                let (width, height) = gfx.ctx.size();
                gfx.ctx.resize(width, height);
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(SurfaceError::Timeout) => warn!("Surface timeout, skipping frame"),
        }

        self.mouse.end_frame();
        if let Some(fps) = self.fps.record(Instant::now())
            && self.config.debug.show_fps
        {
            debug!(
                "{fps:.1} fps, {} draws, {}/{} textures, {} loads pending",
                gfx.renderer.draws().len(),
                gfx.renderer.textures().len(),
                self.catalog.texture_count(),
                self.loader.in_flight()
            );
        }
        gfx.window.request_redraw();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        match self.init_graphics(event_loop) {
            Some(gfx) => {
                gfx.window.request_redraw();
                self.graphics = Some(gfx);
                self.game_loop.reset(Instant::now());
            }
            None => event_loop.exit(),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.graphics.as_ref().map(|g| g.window.inner_size()) {
                    self.resize(size.width, size.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => self.mouse.on_cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => self.mouse.on_scroll(delta),
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.graphics = None;
        self.loader.shutdown();
        info!(
            "Exited after {} frames, {} scene ticks",
            self.game_loop.frame_count(),
            self.scene.ticks()
        );
    }
}

/// Build the application and run the event loop until the window closes.
#[instrument(skip_all)]
pub fn run(
    config: Config,
    system: &SystemConfig,
    config_watch: Option<ConfigWatch>,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, system)?;
    if let Some(watch) = config_watch {
        app = app.with_config_watch(watch);
    }
    event_loop.run_app(&mut app)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.render.sphere_subdivisions = 1;
        config.scene.star_count = 16;
        config.scene.loader_threads = 1;
        config.scene.asset_dir = std::env::temp_dir().join("orrery-missing-assets");
        config
    }

    #[test]
    fn test_app_state_starts_without_graphics() {
        let app = AppState::new(small_config(), &SystemConfig::builtin()).expect("app");
        assert!(app.graphics.is_none());
        assert_eq!(app.scene().ticks(), 0);
        assert_eq!(app.camera().position, glam::Vec3::new(-2.0, 25.0, 350.0));
    }

    #[test]
    fn test_app_state_queues_every_catalog_asset() {
        let mut app = AppState::new(small_config(), &SystemConfig::builtin()).expect("app");
        assert_eq!(app.loader.submit_catalog(&app.catalog), 0);
        app.loader.shutdown();
    }

    #[test]
    fn test_edited_config_updates_renderer_and_controls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let on_disk = small_config();
        on_disk.save(dir.path()).expect("save");
        let start = Instant::now();
        let watch = ConfigWatch::new(
            dir.path().to_path_buf(),
            on_disk.clone(),
            orrery_config::CliArgs::default(),
            start,
        );
        let mut app = AppState::new(on_disk.clone(), &SystemConfig::builtin())
            .expect("app")
            .with_config_watch(watch);
        assert!(!app.poll_config(start + crate::config_watch::POLL_INTERVAL));

        let mut edited = on_disk;
        edited.render.exposure = 2.5;
        edited.render.tone_mapping = false;
        edited.camera.max_distance = 100.0;
        edited.save(dir.path()).expect("save edit");

        assert!(app.poll_config(start + 2 * crate::config_watch::POLL_INTERVAL));
        let settings = setup::renderer_settings(app.config());
        assert_eq!(settings.lighting.exposure, 2.5);
        assert!(!settings.lighting.tone_mapping);
        assert_eq!(app.controls.settings().max_distance, 100.0);
        assert_eq!(app.controls.distance(), 100.0);
        app.loader.shutdown();
    }

    #[test]
    fn test_invalid_system_is_rejected() {
        let mut system = SystemConfig::builtin();
        system.sun.base_radius = -1.0;
        assert!(matches!(
            AppState::new(small_config(), &system),
            Err(AppError::Scene(_))
        ));
    }

    #[test]
    fn test_window_attributes_from_config() {
        let mut config = Config::default();
        config.window.fullscreen = true;
        let _attrs = window_attributes_from_config(&config);
    }
}
