//! Runtime configuration for the orrery.
//!
//! Settings persist to disk as `config.ron`, can be overridden from the
//! command line, and tolerate missing or unknown fields so older files keep
//! loading after new settings are added.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CameraConfig, Config, DebugConfig, RenderConfig, SceneConfig, WindowConfig};
pub use error::ConfigError;

/// Directory name used under the platform config/data directories.
pub const APP_DIR_NAME: &str = "orrery";

/// Default config directory for this platform, if one exists.
pub fn default_config_dir() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME))
}
