//! Blocking decoders run on the worker threads.

use std::path::Path;

use glam::Vec3;
use orrery_scene::MeshData;

use crate::error::AssetError;

/// An RGBA8 image ready for upload.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decode a PNG or JPEG file to RGBA8.
pub fn decode_texture(path: &Path) -> Result<DecodedImage, AssetError> {
    let image = image::open(path)
        .map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}

/// Import every triangle primitive of a glTF file as one unit-sized mesh.
///
/// Missing normals are rebuilt from the faces; missing texture coordinates
/// default to zero.
pub fn decode_mesh(path: &Path) -> Result<MeshData, AssetError> {
    let (document, buffers, _images) = gltf::import(path).map_err(|source| AssetError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;

    let mut mesh = MeshData::default();
    let mut has_normals = true;

    for primitive in document.meshes().flat_map(|m| m.primitives()) {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            continue;
        };

        let base = mesh.positions.len() as u32;
        mesh.positions.extend(positions.map(Vec3::from_array));
        let count = mesh.positions.len() - base as usize;

        match reader.read_normals() {
            Some(normals) => mesh.normals.extend(normals.map(Vec3::from_array)),
            None => {
                has_normals = false;
                mesh.normals.extend(std::iter::repeat_n(Vec3::ZERO, count));
            }
        }
        match reader.read_tex_coords(0) {
            Some(uvs) => mesh.uvs.extend(uvs.into_f32()),
            None => mesh.uvs.extend(std::iter::repeat_n([0.0; 2], count)),
        }
        match reader.read_indices() {
            Some(indices) => mesh.indices.extend(indices.into_u32().map(|i| i + base)),
            None => mesh.indices.extend(base..base + count as u32),
        }
    }

    if mesh.triangle_count() == 0 {
        return Err(AssetError::EmptyMesh(path.to_path_buf()));
    }
    if !has_normals {
        rebuild_normals(&mut mesh);
    }
    mesh.normalize_to_unit();
    Ok(mesh)
}

/// Area-weighted smooth normals.
fn rebuild_normals(mesh: &mut MeshData) {
    let mut normals = vec![Vec3::ZERO; mesh.positions.len()];
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let face = (mesh.positions[b] - mesh.positions[a]).cross(mesh.positions[c] - mesh.positions[a]);
        for i in [a, b, c] {
            normals[i] += face;
        }
    }
    mesh.normals = normals.into_iter().map(|n| n.normalize_or_zero()).collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One triangle, positions only, buffer embedded as a data URI.
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAAEAAAAAA"
        }],
        "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 2.0, 0.0]
        }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }]
    }"#;

    #[test]
    fn test_decode_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let decoded = decode_texture(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 2));
        assert_eq!(decoded.rgba.len(), 4 * 2 * 4);
        assert_eq!(&decoded.rgba[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_missing_texture_is_image_error() {
        let err = decode_texture(Path::new("/nonexistent/2k_sun.jpg")).unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }));
        assert!(err.to_string().contains("2k_sun.jpg"));
    }

    #[test]
    fn test_decode_gltf_triangle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.gltf");
        std::fs::write(&path, TRIANGLE_GLTF).unwrap();

        let mesh = decode_mesh(&path).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        // Farthest vertex (0, 2, 0) is scaled to unit length.
        assert!((mesh.positions[2] - Vec3::Y).length() < 1e-6);
        // Counter-clockwise in XY: rebuilt normal faces +Z.
        assert!((mesh.normals[0] - Vec3::Z).length() < 1e-6);
        assert_eq!(mesh.uvs.len(), 3);
    }

    #[test]
    fn test_invalid_gltf_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.gltf");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(decode_mesh(&path), Err(AssetError::Gltf { .. })));
    }
}
