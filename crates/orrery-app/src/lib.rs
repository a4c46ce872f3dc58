//! Orrery application: window, event loop, fixed-step simulation and the
//! wiring between configuration, scene, assets and renderer.

pub mod config_watch;
pub mod error;
pub mod game_loop;
pub mod setup;
pub mod window;

pub use config_watch::ConfigWatch;
pub use error::AppError;
pub use window::{AppState, run};
