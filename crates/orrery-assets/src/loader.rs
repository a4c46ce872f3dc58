//! Worker-pool asset loader.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use orrery_scene::{AssetCatalog, MeshData, MeshHandle, TextureHandle};

use crate::decode::{DecodedImage, decode_mesh, decode_texture};
use crate::error::AssetError;

/// Upper bound on automatically sized worker pools.
const MAX_AUTO_WORKERS: usize = 4;

/// One asset to decode, with its path already resolved.
#[derive(Clone, Debug)]
pub enum LoadRequest {
    Texture { handle: TextureHandle, path: PathBuf },
    Mesh { handle: MeshHandle, path: PathBuf },
}

/// A finished load, successful or not.
#[derive(Debug)]
pub enum LoadResult {
    Texture {
        handle: TextureHandle,
        result: Result<DecodedImage, AssetError>,
    },
    Mesh {
        handle: MeshHandle,
        result: Result<MeshData, AssetError>,
    },
}

/// Decodes catalog requests on background threads.
///
/// [`submit_catalog`](Self::submit_catalog) queues every request not yet
/// submitted; [`drain`](Self::drain) collects whatever has finished. Results
/// arrive in no particular order. Dropping the loader closes the request
/// channel and joins the workers.
pub struct AssetLoader {
    request_sender: Option<crossbeam_channel::Sender<LoadRequest>>,
    result_receiver: crossbeam_channel::Receiver<LoadResult>,
    workers: Vec<JoinHandle<()>>,
    root: PathBuf,
    submitted_textures: usize,
    submitted_meshes: usize,
    in_flight: Arc<AtomicUsize>,
}

impl AssetLoader {
    /// Spawn `worker_count` decoding threads (0 picks one per core, up to
    /// four). Relative request paths are resolved against `root`.
    pub fn new(worker_count: usize, root: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let worker_count = match worker_count {
            0 => num_cpus::get().clamp(1, MAX_AUTO_WORKERS),
            n => n,
        };
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            let flight = Arc::clone(&in_flight);

            let handle = std::thread::Builder::new()
                .name(format!("asset-worker-{i}"))
                .spawn(move || {
                    while let Ok(request) = rx.recv() {
                        let result = load(request);
                        flight.fetch_sub(1, Ordering::Relaxed);
                        let _ = tx.send(result);
                    }
                })
                .map_err(AssetError::Spawn)?;
            workers.push(handle);
        }

        let root = root.into();
        log::info!(
            "Asset loader started: {worker_count} workers, root {}",
            root.display()
        );

        Ok(Self {
            request_sender: Some(request_tx),
            result_receiver: result_rx,
            workers,
            root,
            submitted_textures: 0,
            submitted_meshes: 0,
            in_flight,
        })
    }

    /// Queue every catalog entry registered since the previous call.
    /// Returns the number of newly queued requests.
    pub fn submit_catalog(&mut self, catalog: &AssetCatalog) -> usize {
        let textures: Vec<_> = catalog
            .textures()
            .skip(self.submitted_textures)
            .map(|(handle, path)| LoadRequest::Texture {
                handle,
                path: self.root.join(path),
            })
            .collect();
        let meshes: Vec<_> = catalog
            .meshes()
            .skip(self.submitted_meshes)
            .map(|(handle, path)| LoadRequest::Mesh {
                handle,
                path: self.root.join(path),
            })
            .collect();

        self.submitted_textures = catalog.texture_count();
        self.submitted_meshes = catalog.mesh_count();

        let mut queued = 0;
        for request in textures.into_iter().chain(meshes) {
            if self.submit(request) {
                queued += 1;
            }
        }
        if queued > 0 {
            log::debug!("Queued {queued} asset loads");
        }
        queued
    }

    /// Queue a single request. Returns `false` after shutdown.
    pub fn submit(&self, request: LoadRequest) -> bool {
        let Some(sender) = &self.request_sender else {
            return false;
        };
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if sender.send(request).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Collect every finished load without blocking.
    pub fn drain(&self) -> Vec<LoadResult> {
        self.result_receiver.try_iter().collect()
    }

    /// Requests queued or being decoded.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Close the request channel and join the workers. Queued requests are
    /// still decoded before the workers exit.
    pub fn shutdown(&mut self) {
        self.request_sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn load(request: LoadRequest) -> LoadResult {
    match request {
        LoadRequest::Texture { handle, path } => {
            let result = decode_texture(&path);
            match &result {
                Ok(image) => log::debug!(
                    "Decoded {} ({}x{})",
                    path.display(),
                    image.width,
                    image.height
                ),
                Err(e) => log::warn!("{e}"),
            }
            LoadResult::Texture { handle, result }
        }
        LoadRequest::Mesh { handle, path } => {
            let result = decode_mesh(&path);
            match &result {
                Ok(mesh) => log::debug!(
                    "Imported {} ({} triangles)",
                    path.display(),
                    mesh.triangle_count()
                ),
                Err(e) => log::warn!("{e}"),
            }
            LoadResult::Mesh { handle, result }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(loader: &AssetLoader, expected: usize) -> Vec<LoadResult> {
        let start = Instant::now();
        let mut results = Vec::new();
        while results.len() < expected {
            results.extend(loader.drain());
            assert!(
                start.elapsed() < Duration::from_secs(10),
                "timed out with {} of {expected} results",
                results.len()
            );
            std::thread::sleep(Duration::from_millis(5));
        }
        results
    }

    #[test]
    fn test_loads_texture_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 255, 255]))
            .save(dir.path().join("blue.png"))
            .unwrap();

        let mut catalog = AssetCatalog::new();
        let handle = catalog.texture("blue.png");
        let mut loader = AssetLoader::new(2, dir.path()).unwrap();
        assert_eq!(loader.submit_catalog(&catalog), 1);

        let results = wait_for(&loader, 1);
        match &results[0] {
            LoadResult::Texture { handle: h, result } => {
                assert_eq!(*h, handle);
                assert_eq!(result.as_ref().unwrap().width, 8);
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn test_missing_file_reports_error_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = AssetCatalog::new();
        catalog.texture("absent.jpg");
        catalog.mesh("absent.glb");

        let mut loader = AssetLoader::new(1, dir.path()).unwrap();
        loader.submit_catalog(&catalog);
        let results = wait_for(&loader, 2);
        assert!(results.iter().all(|r| match r {
            LoadResult::Texture { result, .. } => result.is_err(),
            LoadResult::Mesh { result, .. } => result.is_err(),
        }));
    }

    #[test]
    fn test_submit_catalog_only_queues_new_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = AssetCatalog::new();
        catalog.texture("a.png");
        let mut loader = AssetLoader::new(1, dir.path()).unwrap();
        assert_eq!(loader.submit_catalog(&catalog), 1);
        assert_eq!(loader.submit_catalog(&catalog), 0);

        catalog.texture("b.png");
        catalog.texture("a.png");
        assert_eq!(loader.submit_catalog(&catalog), 1);
    }

    #[test]
    fn test_submit_after_shutdown_is_rejected() {
        let mut loader = AssetLoader::new(1, ".").unwrap();
        loader.shutdown();
        let request = LoadRequest::Texture {
            handle: AssetCatalog::new().texture("x.png"),
            path: PathBuf::from("x.png"),
        };
        assert!(!loader.submit(request));
        assert_eq!(loader.worker_count(), 0);
    }

    #[test]
    fn test_auto_worker_count_is_bounded() {
        let loader = AssetLoader::new(0, ".").unwrap();
        assert!((1..=MAX_AUTO_WORKERS).contains(&loader.worker_count()));
    }
}
