//! Procedural geometry: icospheres, textured ring annuli, and orbit circles.

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::assets::MeshHandle;

/// CPU-side triangle mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Uniformly rescale so the farthest vertex sits at distance 1.
    ///
    /// Imported meshes come in arbitrary units; normalizing lets a moon's
    /// configured radius mean the same thing for spheres and assets.
    pub fn normalize_to_unit(&mut self) {
        let extent = self
            .positions
            .iter()
            .map(|p| p.length())
            .fold(0.0_f32, f32::max);
        if extent > 0.0 {
            for p in &mut self.positions {
                *p /= extent;
            }
        }
    }
}

/// Shape of a mesh node.
///
/// Spheres and imported meshes are unit-sized and scaled by `radius` at draw
/// time so that every sphere shell shares one vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Sphere {
        radius: f32,
        subdivisions: u32,
    },
    Ring {
        inner_radius: f32,
        outer_radius: f32,
        theta_segments: u32,
        phi_segments: u32,
    },
    Imported {
        mesh: MeshHandle,
        radius: f32,
    },
}

impl Shape {
    /// Uniform scale applied to the unit mesh returned by [`Shape::build`].
    pub fn radius_scale(&self) -> f32 {
        match *self {
            Shape::Sphere { radius, .. } | Shape::Imported { radius, .. } => radius,
            Shape::Ring { .. } => 1.0,
        }
    }

    /// Generate vertex data. Imported shapes are produced by the asset loader
    /// instead and return `None`.
    pub fn build(&self) -> Option<MeshData> {
        match *self {
            Shape::Sphere { subdivisions, .. } => Some(unit_sphere(subdivisions)),
            Shape::Ring {
                inner_radius,
                outer_radius,
                theta_segments,
                phi_segments,
            } => Some(ring_mesh(
                inner_radius,
                outer_radius,
                theta_segments,
                phi_segments,
            )),
            Shape::Imported { .. } => None,
        }
    }
}

/// Icosphere on the unit sphere with equirectangular UVs.
///
/// Each subdivision level quadruples the triangle count (level 5 is ~20k
/// triangles). Triangles straddling the texture seam get duplicated vertices
/// with `u > 1`, so samplers must repeat on U.
pub fn unit_sphere(subdivisions: u32) -> MeshData {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let mut positions: Vec<Vec3> = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Vec3::new(x, y, z).normalize())
    .collect();

    let mut indices: Vec<u32> = vec![
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7,
        1, 8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9,
        8, 1,
    ];

    for _ in 0..subdivisions {
        split_triangles(&mut positions, &mut indices);
    }

    let uvs = positions.iter().map(|p| sphere_uv(*p)).collect();
    let mut mesh = MeshData {
        normals: positions.clone(),
        positions,
        uvs,
        indices,
    };
    fix_uv_seam(&mut mesh);
    mesh
}

/// Equirectangular texture coordinate of a unit direction; v = 0 at +Y.
fn sphere_uv(p: Vec3) -> [f32; 2] {
    let u = 0.5 + p.z.atan2(p.x) / TAU;
    let v = 0.5 - p.y.clamp(-1.0, 1.0).asin() / PI;
    [u, v]
}

fn split_triangles(positions: &mut Vec<Vec3>, indices: &mut Vec<u32>) {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut next = Vec::with_capacity(indices.len() * 4);

    let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
        let key = (a.min(b), a.max(b));
        *midpoints.entry(key).or_insert_with(|| {
            positions.push((positions[a as usize] + positions[b as usize]).normalize());
            (positions.len() - 1) as u32
        })
    };

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let ab = midpoint(a, b, positions);
        let bc = midpoint(b, c, positions);
        let ca = midpoint(c, a, positions);
        next.extend_from_slice(&[a, ab, ca, b, bc, ab, c, ca, bc, ab, bc, ca]);
    }

    *indices = next;
}

/// Duplicate low-u vertices of triangles that wrap around the seam.
fn fix_uv_seam(mesh: &mut MeshData) {
    let mut wrapped: HashMap<u32, u32> = HashMap::new();

    for tri in 0..mesh.triangle_count() {
        let us = [0, 1, 2].map(|k| mesh.uvs[mesh.indices[tri * 3 + k] as usize][0]);
        if u_span(us) <= 0.5 {
            continue;
        }

        for k in 0..3 {
            let original = mesh.indices[tri * 3 + k];
            let [u, v] = mesh.uvs[original as usize];
            if u >= 0.5 {
                continue;
            }
            let duplicate = match wrapped.get(&original) {
                Some(&d) => d,
                None => {
                    let d = mesh.positions.len() as u32;
                    mesh.positions.push(mesh.positions[original as usize]);
                    mesh.normals.push(mesh.normals[original as usize]);
                    mesh.uvs.push([u + 1.0, v]);
                    wrapped.insert(original, d);
                    d
                }
            };
            mesh.indices[tri * 3 + k] = duplicate;
        }
    }
}

fn u_span(us: [f32; 3]) -> f32 {
    us.iter().copied().fold(f32::MIN, f32::max) - us.iter().copied().fold(f32::MAX, f32::min)
}

/// Texture coordinate of a ring vertex as `(u, v)`.
///
/// `v` is the normalized distance from the centre (0 at `inner`, 1 at
/// `outer`) and `u` the polar angle mapped to [0, 1]. Not guarded: a
/// degenerate ring with `outer == inner` yields NaN.
pub fn ring_uv(position: Vec3, inner: f32, outer: f32) -> (f32, f32) {
    let v = (Vec2::new(position.x, position.y).length() - inner) / (outer - inner);
    let u = (position.y.atan2(position.x) + PI) / TAU;
    (u, v)
}

/// Flat annulus in the XY plane facing +Z.
///
/// The stored texture coordinate is `(v, u)` from [`ring_uv`], so a ring
/// texture's horizontal axis runs from the inner to the outer edge.
pub fn ring_mesh(inner: f32, outer: f32, theta_segments: u32, phi_segments: u32) -> MeshData {
    let theta_segments = theta_segments.max(3);
    let phi_segments = phi_segments.max(1);
    let ring_vertices = (theta_segments + 1) as usize * (phi_segments + 1) as usize;

    let mut mesh = MeshData {
        positions: Vec::with_capacity(ring_vertices),
        normals: vec![Vec3::Z; ring_vertices],
        uvs: Vec::with_capacity(ring_vertices),
        indices: Vec::with_capacity((theta_segments * phi_segments * 6) as usize),
    };

    let step = (outer - inner) / phi_segments as f32;
    for j in 0..=phi_segments {
        let radius = inner + j as f32 * step;
        for i in 0..=theta_segments {
            let angle = i as f32 / theta_segments as f32 * TAU;
            let p = Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0);
            let (u, v) = ring_uv(p, inner, outer);
            mesh.positions.push(p);
            mesh.uvs.push([v, u]);
        }
    }

    for j in 0..phi_segments {
        let level = j * (theta_segments + 1);
        for i in 0..theta_segments {
            let a = level + i;
            let b = a + theta_segments + 1;
            let c = a + theta_segments + 2;
            let d = a + 1;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    mesh
}

/// Closed circle of `segments + 1` points in the XY plane.
pub fn orbit_circle(radius: f32, segments: u32) -> Vec<Vec3> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let angle = i as f32 / segments as f32 * TAU;
            Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
        })
        .collect()
}
