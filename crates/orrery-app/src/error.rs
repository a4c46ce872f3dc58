use orrery_assets::AssetError;
use orrery_scene::SceneError;

/// Fatal startup and event-loop failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to build scene: {0}")]
    Scene(#[from] SceneError),

    #[error("failed to start asset loader: {0}")]
    Assets(#[from] AssetError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
