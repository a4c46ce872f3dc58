//! Scene construction errors.

use std::path::PathBuf;

/// A body configuration that cannot be turned into geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BodyError {
    #[error("body `{body}`: base radius must be positive, got {radius}")]
    NonPositiveRadius { body: String, radius: f32 },

    #[error("body `{body}`: display scale must be non-negative, got {scale}")]
    NegativeScale { body: String, scale: f32 },

    /// Shell radii must grow from the surface outward.
    #[error("body `{body}`: layer `{layer}` radius factor {factor} must exceed {previous}")]
    LayerOrder {
        body: String,
        layer: String,
        factor: f32,
        previous: f32,
    },

    #[error("body `{body}`: layer `{layer}` opacity {opacity} is outside [0, 1]")]
    InvalidOpacity {
        body: String,
        layer: String,
        opacity: f32,
    },

    #[error("body `{body}`: ring needs 0 < inner ({inner}) < outer ({outer})")]
    InvalidRing { body: String, inner: f32, outer: f32 },

    #[error("body `{body}`: moon `{moon}` needs a positive radius and distance")]
    InvalidMoon { body: String, moon: String },
}

/// Errors raised while loading a system description or composing the scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Body(#[from] BodyError),

    #[error("duplicate body name `{0}`")]
    DuplicateBody(String),

    #[error("failed to read system file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse system file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("failed to serialize system: {0}")]
    Serialize(#[from] ron::Error),
}
