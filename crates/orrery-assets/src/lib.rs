//! Asynchronous asset loading.
//!
//! Texture and mesh requests recorded in an [`orrery_scene::AssetCatalog`]
//! are decoded on worker threads; the main thread collects finished results
//! once per frame without blocking.

mod decode;
mod error;
mod loader;

pub use decode::{DecodedImage, decode_mesh, decode_texture};
pub use error::AssetError;
pub use loader::{AssetLoader, LoadRequest, LoadResult};
