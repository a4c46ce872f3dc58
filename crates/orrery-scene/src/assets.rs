//! Asset requests issued while building the scene.
//!
//! Building a body never blocks on I/O: each texture or mesh path is turned
//! into a handle immediately, and the loader resolves the handles later.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Identifies a texture requested through an [`AssetCatalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(u32);

/// Identifies an external mesh requested through an [`AssetCatalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(u32);

impl TextureHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl MeshHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Registry of requested asset paths, deduplicated by path.
#[derive(Debug, Default)]
pub struct AssetCatalog {
    textures: Vec<PathBuf>,
    meshes: Vec<PathBuf>,
    texture_ids: HashMap<PathBuf, TextureHandle>,
    mesh_ids: HashMap<PathBuf, MeshHandle>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the texture at `path`, registering it on first request.
    pub fn texture(&mut self, path: impl AsRef<Path>) -> TextureHandle {
        let path = path.as_ref();
        if let Some(&handle) = self.texture_ids.get(path) {
            return handle;
        }
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(path.to_path_buf());
        self.texture_ids.insert(path.to_path_buf(), handle);
        log::trace!("Requested texture {} as {handle:?}", path.display());
        handle
    }

    /// Handle for the mesh at `path`, registering it on first request.
    pub fn mesh(&mut self, path: impl AsRef<Path>) -> MeshHandle {
        let path = path.as_ref();
        if let Some(&handle) = self.mesh_ids.get(path) {
            return handle;
        }
        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(path.to_path_buf());
        self.mesh_ids.insert(path.to_path_buf(), handle);
        handle
    }

    pub fn texture_path(&self, handle: TextureHandle) -> Option<&Path> {
        self.textures.get(handle.index()).map(PathBuf::as_path)
    }

    pub fn mesh_path(&self, handle: MeshHandle) -> Option<&Path> {
        self.meshes.get(handle.index()).map(PathBuf::as_path)
    }

    /// All texture requests in registration order.
    pub fn textures(&self) -> impl Iterator<Item = (TextureHandle, &Path)> {
        self.textures
            .iter()
            .enumerate()
            .map(|(i, p)| (TextureHandle(i as u32), p.as_path()))
    }

    /// All mesh requests in registration order.
    pub fn meshes(&self) -> impl Iterator<Item = (MeshHandle, &Path)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, p)| (MeshHandle(i as u32), p.as_path()))
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}
