//! The `orrery` binary: an interactive layered-shell solar system.
//!
//! Configuration is loaded from `config.ron` in the platform config
//! directory and can be overridden with CLI flags, e.g.
//! `orrery --assets ./images --stars 8000`.

use std::time::Instant;

use clap::Parser;
use orrery_app::ConfigWatch;
use orrery_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let on_disk = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    let mut config = on_disk.clone();
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    orrery_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));
    info!("Config directory: {}", config_dir.display());

    let system = match orrery_app::setup::load_system(&config) {
        Ok(system) => system,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let watch = ConfigWatch::new(config_dir, on_disk, args, Instant::now());
    if let Err(e) = orrery_app::run(config, &system, Some(watch)) {
        error!("{e}");
        std::process::exit(1);
    }
}
