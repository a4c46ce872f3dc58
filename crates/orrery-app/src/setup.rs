//! Turns configuration into a built scene, a camera rig and renderer settings.

use glam::Vec3;
use orrery_config::Config;
use orrery_input::{OrbitControls, OrbitSettings};
use orrery_render::{Camera, LightingSettings, RendererSettings};
use orrery_scene::{
    AssetCatalog, BuildOptions, SceneComposer, SceneError, SceneOptions, StarFieldSettings,
    SystemConfig,
};
use tracing::{info, warn};

/// The system description: the configured RON file, or the built-in catalog.
pub fn load_system(config: &Config) -> Result<SystemConfig, SceneError> {
    match &config.scene.system_file {
        Some(path) => {
            info!("Loading system description from {}", path.display());
            SystemConfig::load(path)
        }
        None => Ok(SystemConfig::builtin()),
    }
}

pub fn scene_options(config: &Config) -> SceneOptions {
    let star_field = (config.scene.star_count > 0).then(|| StarFieldSettings {
        count: config.scene.star_count,
        seed: config.scene.star_seed,
        inner_radius: config.scene.star_inner_radius,
        outer_radius: config.scene.star_outer_radius,
    });
    SceneOptions {
        build: BuildOptions {
            sphere_subdivisions: config.render.sphere_subdivisions,
        },
        show_orbit_paths: config.render.show_orbit_paths,
        star_field,
    }
}

/// Build the scene and collect the assets it references.
pub fn build_scene(
    config: &Config,
    system: &SystemConfig,
) -> Result<(SceneComposer, AssetCatalog), SceneError> {
    let sun_texture = config.scene.resolve_asset(&system.sun.surface_texture);
    if !sun_texture.exists() {
        warn!(
            "{} not found; check scene.asset_dir ({})",
            sun_texture.display(),
            config.scene.asset_dir.display()
        );
    }

    let mut catalog = AssetCatalog::new();
    let scene = SceneComposer::build(system, &scene_options(config), &mut catalog)?;
    info!(
        "Scene ready: {} planets, {} textures, {} meshes requested",
        scene.pivots().len(),
        catalog.texture_count(),
        catalog.mesh_count()
    );
    Ok((scene, catalog))
}

pub fn camera(config: &Config) -> Camera {
    let c = &config.camera;
    Camera::new(Vec3::from(c.position), Vec3::ZERO, c.fov_y_degrees, c.near, c.far)
}

pub fn orbit_settings(config: &Config) -> OrbitSettings {
    let c = &config.camera;
    OrbitSettings {
        damping: c.damping,
        rotate_speed: c.rotate_speed,
        zoom_speed: c.zoom_speed,
        min_distance: c.min_distance,
        max_distance: c.max_distance,
    }
}

pub fn orbit_controls(config: &Config) -> OrbitControls {
    OrbitControls::new(
        Vec3::from(config.camera.position),
        Vec3::ZERO,
        orbit_settings(config),
    )
}

pub fn renderer_settings(config: &Config) -> RendererSettings {
    RendererSettings {
        lighting: LightingSettings {
            ambient_intensity: config.render.ambient_intensity,
            exposure: config.render.exposure,
            tone_mapping: config.render.tone_mapping,
        },
        clear_color: config.render.clear_color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_system_without_file() {
        let system = load_system(&Config::default()).expect("builtin");
        assert_eq!(system.sun.name, "sun");
        assert_eq!(system.planets.len(), 8);
    }

    #[test]
    fn test_system_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("system.ron");
        let mut system = SystemConfig::builtin();
        system.planets.truncate(2);
        std::fs::write(&path, system.to_ron().expect("serialize")).expect("write");

        let mut config = Config::default();
        config.scene.system_file = Some(path);
        let loaded = load_system(&config).expect("load");
        assert_eq!(loaded.planets.len(), 2);
    }

    #[test]
    fn test_missing_system_file_is_an_error() {
        let mut config = Config::default();
        config.scene.system_file = Some("/nonexistent/system.ron".into());
        assert!(matches!(load_system(&config), Err(SceneError::Read { .. })));
    }

    #[test]
    fn test_zero_stars_disables_star_field() {
        let mut config = Config::default();
        config.scene.star_count = 0;
        assert!(scene_options(&config).star_field.is_none());
        assert!(scene_options(&Config::default()).star_field.is_some());
    }

    #[test]
    fn test_build_scene_from_defaults() {
        let mut config = Config::default();
        config.render.sphere_subdivisions = 1;
        config.scene.star_count = 10;
        let (scene, catalog) = build_scene(&config, &SystemConfig::builtin()).expect("build");
        assert_eq!(scene.pivots().len(), 8);
        assert!(catalog.texture_count() > 9);
    }

    #[test]
    fn test_camera_starts_at_configured_position() {
        let config = Config::default();
        let camera = camera(&config);
        assert_eq!(camera.position, Vec3::new(-2.0, 25.0, 350.0));
        assert_eq!(camera.target, Vec3::ZERO);
        let controls = orbit_controls(&config);
        assert!((controls.eye() - camera.position).length() < 1e-3);
    }

    #[test]
    fn test_renderer_settings_follow_config() {
        let mut config = Config::default();
        config.render.tone_mapping = false;
        config.render.exposure = 2.0;
        let settings = renderer_settings(&config);
        assert!(!settings.lighting.tone_mapping);
        assert_eq!(settings.lighting.exposure, 2.0);
    }
}
