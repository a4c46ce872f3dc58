//! Vertex layouts and GPU buffers for scene geometry.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use orrery_scene::{MeshData, MeshHandle, Shape};
use wgpu::util::DeviceExt;

/// Vertex for textured shells: position, normal, uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct ShellVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl ShellVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Vertex for orbit lines and stars: position and colour.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleave a CPU mesh; missing normals or uvs are zero-filled.
pub fn shell_vertices(mesh: &MeshData) -> Vec<ShellVertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, p)| ShellVertex {
            position: p.to_array(),
            normal: mesh.normals.get(i).copied().unwrap_or(Vec3::ZERO).to_array(),
            uv: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

pub fn color_vertices(positions: &[Vec3], colors: impl Fn(usize) -> Vec3) -> Vec<ColorVertex> {
    positions
        .iter()
        .enumerate()
        .map(|(i, p)| ColorVertex {
            position: p.to_array(),
            color: colors(i).to_array(),
        })
        .collect()
}

/// Indexed triangle mesh on the GPU.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    pub fn new(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&shell_vertices(mesh)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Non-indexed line strip or point list on the GPU.
pub struct VertexBuffer {
    pub buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl VertexBuffer {
    pub fn new(device: &wgpu::Device, label: &str, vertices: &[ColorVertex]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_vertex_buffer(0, self.buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

/// Identifies a GPU mesh. Spheres share one buffer per subdivision level;
/// rings are keyed by their exact dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshKey {
    Sphere(u32),
    Ring([u32; 4]),
    Imported(MeshHandle),
}

impl MeshKey {
    pub fn of(shape: &Shape) -> Self {
        match *shape {
            Shape::Sphere { subdivisions, .. } => MeshKey::Sphere(subdivisions),
            Shape::Ring {
                inner_radius,
                outer_radius,
                theta_segments,
                phi_segments,
            } => MeshKey::Ring([
                inner_radius.to_bits(),
                outer_radius.to_bits(),
                theta_segments,
                phi_segments,
            ]),
            Shape::Imported { mesh, .. } => MeshKey::Imported(mesh),
        }
    }
}

/// GPU meshes by key. Procedural shapes are built on first use; imported
/// meshes appear once their decode finishes.
#[derive(Default)]
pub struct MeshCache {
    meshes: HashMap<MeshKey, MeshBuffer>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a buffer exists for `shape`. Returns false when the shape is an
    /// imported mesh that has not arrived yet.
    pub fn prepare(&mut self, device: &wgpu::Device, shape: &Shape) -> bool {
        let key = MeshKey::of(shape);
        if self.meshes.contains_key(&key) {
            return true;
        }
        let Some(data) = shape.build() else {
            return false;
        };
        log::debug!(
            "Built {key:?}: {} vertices, {} triangles",
            data.vertex_count(),
            data.triangle_count()
        );
        self.meshes
            .insert(key, MeshBuffer::new(device, &format!("{key:?}"), &data));
        true
    }

    pub fn insert_imported(&mut self, device: &wgpu::Device, handle: MeshHandle, data: &MeshData) {
        let label = format!("imported-mesh-{}", handle.index());
        self.meshes
            .insert(MeshKey::Imported(handle), MeshBuffer::new(device, &label, data));
    }

    pub fn get(&self, key: &MeshKey) -> Option<&MeshBuffer> {
        self.meshes.get(key)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
