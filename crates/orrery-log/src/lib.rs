//! Structured logging for the orrery.
//!
//! Console output goes through `tracing-subscriber` with an uptime timer and
//! module targets. Debug builds additionally write JSON lines to
//! `orrery.log` in the log directory. `RUST_LOG` always wins over the level
//! stored in `config.ron`.

use std::path::Path;

use orrery_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Noisy GPU crates are held at `warn` unless `RUST_LOG` says otherwise.
const GPU_QUIET: &str = "wgpu=warn,naga=warn";

/// Log file written in debug builds.
pub const LOG_FILE_NAME: &str = "orrery.log";

/// Filter directives derived from the config's `debug.log_level`.
///
/// A bare level such as `"debug"` keeps the GPU crates quiet; a level that
/// already carries per-target directives is used verbatim.
pub fn filter_directives(config: Option<&Config>) -> String {
    let level = config
        .map(|c| c.debug.log_level.trim())
        .filter(|l| !l.is_empty())
        .unwrap_or("info");

    if level.contains('=') {
        level.to_string()
    } else {
        format!("{level},{GPU_QUIET}")
    }
}

/// Install the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - enables the JSON file layer
/// * `config` - source of the default log level
///
/// ```no_run
/// let config = orrery_config::Config::default();
/// orrery_log::init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let directives = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true) // asset workers are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// The filter used when no config is available.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(filter_directives(None))
}
