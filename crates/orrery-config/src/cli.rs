//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Clone, Debug, Default)]
#[command(name = "orrery", about = "Animated solar system viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Directory containing texture and mesh assets.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// RON file describing the bodies to show instead of the built-in system.
    #[arg(long)]
    pub system: Option<PathBuf>,

    /// Number of background stars.
    #[arg(long)]
    pub stars: Option<u32>,

    /// Draw orbit path circles.
    #[arg(long)]
    pub orbit_paths: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(ref dir) = args.assets {
            self.scene.asset_dir = dir.clone();
        }
        if let Some(ref path) = args.system {
            self.scene.system_file = Some(path.clone());
        }
        if let Some(n) = args.stars {
            self.scene.star_count = n;
        }
        if let Some(show) = args.orbit_paths {
            self.render.show_orbit_paths = show;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
