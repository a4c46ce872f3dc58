use std::path::PathBuf;

/// Failure to load a single asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to import glTF {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    /// The glTF file parsed but holds no triangles.
    #[error("glTF {0} contains no mesh primitives")]
    EmptyMesh(PathBuf),

    #[error("failed to spawn asset worker: {0}")]
    Spawn(#[source] std::io::Error),
}
