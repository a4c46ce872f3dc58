//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Scene content settings.
    pub scene: SceneConfig,
    /// Camera and orbit-control settings.
    pub camera: CameraConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Recursive icosahedron subdivisions used for every sphere shell.
    pub sphere_subdivisions: u32,
    /// Ambient light intensity (the scene's only light).
    pub ambient_intensity: f32,
    /// Apply ACES filmic tone mapping before output.
    pub tone_mapping: bool,
    /// Exposure multiplier applied ahead of tone mapping.
    pub exposure: f32,
    /// Draw the faint circle traced by each orbit.
    pub show_orbit_paths: bool,
    /// Background clear color, linear RGB.
    pub clear_color: [f32; 3],
}

/// Scene content configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Directory that texture and mesh paths are resolved against.
    pub asset_dir: PathBuf,
    /// Optional RON system description replacing the built-in catalog.
    pub system_file: Option<PathBuf>,
    /// Number of background stars.
    pub star_count: u32,
    /// Seed for the star field generator.
    pub star_seed: u64,
    /// Inner radius of the star shell.
    pub star_inner_radius: f32,
    /// Outer radius of the star shell.
    pub star_outer_radius: f32,
    /// Asset decoding threads (0 = one per core, capped at 4).
    pub loader_threads: u32,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial eye position; the camera looks at the origin.
    pub position: [f32; 3],
    /// Fraction of orbit velocity removed each frame (0 = no damping).
    pub damping: f32,
    /// Radians of rotation per pixel of mouse drag.
    pub rotate_speed: f32,
    /// Zoom factor per scroll line.
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log frame statistics once per second.
    pub show_fps: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sphere_subdivisions: 5,
            ambient_intensity: 1.0,
            tone_mapping: true,
            exposure: 1.0,
            show_orbit_paths: true,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets/images"),
            system_file: None,
            star_count: 5000,
            star_seed: 0x5EED,
            star_inner_radius: 1200.0,
            star_outer_radius: 2000.0,
            loader_threads: 0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 5000.0,
            position: [-2.0, 25.0, 350.0],
            damping: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.95,
            min_distance: 5.0,
            max_distance: 1500.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_fps: false,
            log_level: "info".to_string(),
        }
    }
}

impl SceneConfig {
    /// Resolve an asset path against `asset_dir`. Absolute paths pass through.
    pub fn resolve_asset(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_dir.join(path)
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Re-read `config.ron`; `Some` only when the contents differ from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents =
            std::fs::read_to_string(config_dir.join(CONFIG_FILE)).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
