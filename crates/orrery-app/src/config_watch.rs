//! Polls `config.ron` for edits while the orrery runs.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use orrery_config::{CliArgs, Config};
use tracing::{info, warn};

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Watches the config directory and re-applies CLI overrides to every
/// reloaded file, so flags keep winning over the file.
pub struct ConfigWatch {
    dir: PathBuf,
    on_disk: Config,
    args: CliArgs,
    last_poll: Instant,
}

impl ConfigWatch {
    /// `on_disk` is the config as read from `dir`, before CLI overrides.
    pub fn new(dir: PathBuf, on_disk: Config, args: CliArgs, now: Instant) -> Self {
        Self {
            dir,
            on_disk,
            args,
            last_poll: now,
        }
    }

    /// Re-read the file at most once per [`POLL_INTERVAL`]. Returns the new
    /// effective config when the file changed.
    pub fn poll(&mut self, now: Instant) -> Option<Config> {
        if now.duration_since(self.last_poll) < POLL_INTERVAL {
            return None;
        }
        self.last_poll = now;

        match self.on_disk.reload(&self.dir) {
            Ok(Some(config)) => {
                info!("Reloaded {}", self.dir.join("config.ron").display());
                self.on_disk = config.clone();
                let mut effective = config;
                effective.apply_cli_overrides(&self.args);
                Some(effective)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Ignoring config edit: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watched(dir: &std::path::Path, args: CliArgs, start: Instant) -> ConfigWatch {
        let config = Config::load_or_create(dir).expect("create config");
        ConfigWatch::new(dir.to_path_buf(), config, args, start)
    }

    #[test]
    fn test_unchanged_file_yields_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let start = Instant::now();
        let mut watch = watched(dir.path(), CliArgs::default(), start);
        assert!(watch.poll(start + POLL_INTERVAL).is_none());
    }

    #[test]
    fn test_edit_is_seen_after_interval_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let start = Instant::now();
        let mut watch = watched(dir.path(), CliArgs::default(), start);

        let mut edited = Config::default();
        edited.render.exposure = 1.8;
        edited.save(dir.path()).expect("save");

        assert!(watch.poll(start + Duration::from_millis(200)).is_none());
        let reloaded = watch.poll(start + POLL_INTERVAL).expect("edit detected");
        assert_eq!(reloaded.render.exposure, 1.8);
        assert!(watch.poll(start + 2 * POLL_INTERVAL).is_none());
    }

    #[test]
    fn test_cli_overrides_survive_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let start = Instant::now();
        let args = CliArgs {
            orbit_paths: Some(false),
            ..Default::default()
        };
        let mut watch = watched(dir.path(), args, start);

        let mut edited = Config::default();
        edited.camera.rotate_speed = 0.02;
        edited.save(dir.path()).expect("save");

        let reloaded = watch.poll(start + POLL_INTERVAL).expect("edit detected");
        assert_eq!(reloaded.camera.rotate_speed, 0.02);
        assert!(!reloaded.render.show_orbit_paths);
    }

    #[test]
    fn test_broken_edit_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let start = Instant::now();
        let mut watch = watched(dir.path(), CliArgs::default(), start);
        std::fs::write(dir.path().join("config.ron"), "(render: (").expect("write");
        assert!(watch.poll(start + POLL_INTERVAL).is_none());
    }
}
