//! Draws a [`SceneComposer`] each frame.
//!
//! [`SceneRenderer::prepare`] walks the scene graph once per frame and turns
//! every drawable node into a [`DrawItem`] whose uniforms live at a dynamic
//! offset in one shared buffer. Opaque items are drawn in traversal order,
//! translucent ones afterwards from farthest to nearest.

use std::cmp::Ordering;
use std::collections::HashMap;

use glam::{Mat4, Vec3};
use orrery_assets::LoadResult;
use orrery_scene::{Material, Node, NodeContent, SceneComposer};

use crate::camera::Camera;
use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::mesh::{MeshCache, MeshKey, VertexBuffer, color_vertices};
use crate::pipeline::{SceneLayouts, ScenePipelines, ShellKey, ShellPipelines};
use crate::texture::{TextureKey, TextureManager};
use crate::uniforms::{FrameUniform, LightingSettings, NodeUniform, align_to};

const INITIAL_NODE_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererSettings {
    pub lighting: LightingSettings,
    /// Linear RGB.
    pub clear_color: [f32; 3],
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            lighting: LightingSettings::default(),
            clear_color: [0.0; 3],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawKind {
    Shell {
        pipeline: ShellKey,
        mesh: MeshKey,
        texture: TextureKey,
    },
    Glow {
        mesh: MeshKey,
    },
    /// Index into the renderer's line buffers.
    Line(usize),
    /// Index into the renderer's point buffers.
    Points(usize),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    pub kind: DrawKind,
    /// Byte offset of this item's [`NodeUniform`].
    pub offset: u32,
    pub translucent: bool,
    /// View-space distance of the node origin.
    pub depth: f32,
}

/// Opaque items first, in submission order; then translucent items back to
/// front.
pub fn order_draws(draws: &mut [DrawItem]) {
    draws.sort_by(|a, b| match (a.translucent, b.translucent) {
        (false, false) => Ordering::Equal,
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => b.depth.total_cmp(&a.depth),
    });
}

/// Static vertex buffers keyed by node name.
#[derive(Default)]
struct NamedBuffers {
    index: HashMap<String, usize>,
    buffers: Vec<VertexBuffer>,
}

impl NamedBuffers {
    fn get_or_insert_with(&mut self, name: &str, build: impl FnOnce() -> VertexBuffer) -> usize {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        self.buffers.push(build());
        let i = self.buffers.len() - 1;
        self.index.insert(name.to_string(), i);
        i
    }
}

pub struct SceneRenderer {
    layouts: SceneLayouts,
    textures: TextureManager,
    meshes: MeshCache,
    shells: ShellPipelines,
    pipelines: ScenePipelines,
    depth: DepthBuffer,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    node_buffer: wgpu::Buffer,
    node_bind_group: wgpu::BindGroup,
    node_capacity: usize,
    node_stride: u64,
    lines: NamedBuffers,
    points: NamedBuffers,
    draws: Vec<DrawItem>,
    settings: RendererSettings,
}

impl SceneRenderer {
    pub fn new(ctx: &RenderContext, settings: RendererSettings) -> Self {
        let device = &ctx.device;
        let layouts = SceneLayouts::new(device);
        let textures = TextureManager::new(device, &ctx.queue);
        let shells = ShellPipelines::new(
            device,
            &layouts,
            textures.bind_group_layout(),
            ctx.surface_format,
        );
        let pipelines = ScenePipelines::new(device, &layouts, ctx.surface_format);
        let (width, height) = ctx.size();
        let depth = DepthBuffer::new(device, width, height);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bind-group"),
            layout: &layouts.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let node_stride = align_to(
            std::mem::size_of::<NodeUniform>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let (node_buffer, node_bind_group) =
            create_node_buffer(device, &layouts, node_stride, INITIAL_NODE_CAPACITY);

        Self {
            layouts,
            textures,
            meshes: MeshCache::new(),
            shells,
            pipelines,
            depth,
            frame_buffer,
            frame_bind_group,
            node_buffer,
            node_bind_group,
            node_capacity: INITIAL_NODE_CAPACITY,
            node_stride,
            lines: NamedBuffers::default(),
            points: NamedBuffers::default(),
            draws: Vec::new(),
            settings,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
    }

    pub fn set_settings(&mut self, settings: RendererSettings) {
        self.settings = settings;
    }

    /// Hand a finished asset load to the GPU. Failures keep the placeholder.
    pub fn apply_load(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, result: LoadResult) {
        match result {
            LoadResult::Texture {
                handle,
                result: Ok(image),
            } => {
                if let Err(e) = self.textures.insert(device, queue, handle, &image) {
                    log::warn!("Texture {} rejected: {e}", handle.index());
                }
            }
            LoadResult::Texture {
                handle,
                result: Err(e),
            } => log::warn!("Texture {} failed to load: {e}", handle.index()),
            LoadResult::Mesh {
                handle,
                result: Ok(mesh),
            } => {
                log::debug!(
                    "Uploaded mesh {} ({} triangles)",
                    handle.index(),
                    mesh.triangle_count()
                );
                self.meshes.insert_imported(device, handle, &mesh);
            }
            LoadResult::Mesh {
                handle,
                result: Err(e),
            } => log::warn!("Mesh {} failed to load: {e}", handle.index()),
        }
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    pub fn draws(&self) -> &[DrawItem] {
        &self.draws
    }

    /// Build this frame's draw list and upload its uniforms.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneComposer,
        camera: &Camera,
    ) {
        let frame = FrameUniform::new(
            camera.view_projection(),
            camera.position,
            &self.settings.lighting,
        );
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        let mut uniforms: Vec<NodeUniform> = Vec::new();
        let mut draws: Vec<DrawItem> = Vec::new();
        let stride = self.node_stride;

        let meshes = &mut self.meshes;
        let textures = &mut self.textures;
        let shells = &mut self.shells;
        let lines = &mut self.lines;
        let points = &mut self.points;

        scene.walk(&mut |world: &Mat4, node: &Node| {
            let origin_depth = camera.view_depth(world.transform_point3(Vec3::ZERO));
            let (kind, uniform, translucent) = match &node.content {
                NodeContent::Empty => return,
                NodeContent::Mesh(mesh) => {
                    if !meshes.prepare(device, &mesh.shape) {
                        return;
                    }
                    let mesh_key = MeshKey::of(&mesh.shape);
                    let model = *world * Mat4::from_scale(Vec3::splat(mesh.shape.radius_scale()));
                    match &mesh.material {
                        Material::Standard(material) => {
                            let pipeline = ShellKey::of(material);
                            shells.prepare(device, pipeline);
                            let texture = textures.resolve(material.map, material.wrap);
                            textures.prepare(device, texture);
                            (
                                DrawKind::Shell {
                                    pipeline,
                                    mesh: mesh_key,
                                    texture,
                                },
                                NodeUniform::new(model, material.diffuse_color(), material.opacity),
                                material.is_translucent(),
                            )
                        }
                        Material::Fresnel(material) => (
                            DrawKind::Glow { mesh: mesh_key },
                            NodeUniform::fresnel(model, material),
                            true,
                        ),
                    }
                }
                NodeContent::Polyline(line) => {
                    let index = lines.get_or_insert_with(&node.name, || {
                        let vertices = color_vertices(&line.points, |_| Vec3::ONE);
                        VertexBuffer::new(device, &node.name, &vertices)
                    });
                    (
                        DrawKind::Line(index),
                        NodeUniform::new(*world, line.color, 1.0),
                        false,
                    )
                }
                NodeContent::Points(cloud) => {
                    let index = points.get_or_insert_with(&node.name, || {
                        let vertices = color_vertices(&cloud.positions, |i| {
                            cloud.colors.get(i).copied().unwrap_or(Vec3::ONE)
                        });
                        VertexBuffer::new(device, &node.name, &vertices)
                    });
                    (
                        DrawKind::Points(index),
                        NodeUniform::new(*world, Vec3::ONE, 1.0),
                        false,
                    )
                }
            };
            draws.push(DrawItem {
                kind,
                offset: (uniforms.len() as u64 * stride) as u32,
                translucent,
                depth: origin_depth,
            });
            uniforms.push(uniform);
        });

        order_draws(&mut draws);
        self.upload_node_uniforms(device, queue, &uniforms);
        self.draws = draws;
    }

    fn upload_node_uniforms(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        uniforms: &[NodeUniform],
    ) {
        if uniforms.len() > self.node_capacity {
            let capacity = uniforms.len().next_power_of_two();
            log::debug!("Growing node uniform buffer to {capacity} entries");
            let (buffer, bind_group) =
                create_node_buffer(device, &self.layouts, self.node_stride, capacity);
            self.node_buffer = buffer;
            self.node_bind_group = bind_group;
            self.node_capacity = capacity;
        }
        if uniforms.is_empty() {
            return;
        }
        let stride = self.node_stride as usize;
        let size = std::mem::size_of::<NodeUniform>();
        let mut bytes = vec![0u8; uniforms.len() * stride];
        for (i, uniform) in uniforms.iter().enumerate() {
            bytes[i * stride..i * stride + size].copy_from_slice(bytemuck::bytes_of(uniform));
        }
        queue.write_buffer(&self.node_buffer, 0, &bytes);
    }

    /// Record the prepared draw list into `pass`.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for item in &self.draws {
            pass.set_bind_group(1, &self.node_bind_group, &[item.offset]);
            match item.kind {
                DrawKind::Shell {
                    pipeline,
                    mesh,
                    texture,
                } => {
                    let (Some(pipeline), Some(bind_group), Some(mesh)) = (
                        self.shells.get(&pipeline),
                        self.textures.bind_group(&texture),
                        self.meshes.get(&mesh),
                    ) else {
                        continue;
                    };
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(2, bind_group, &[]);
                    mesh.draw(pass);
                }
                DrawKind::Glow { mesh } => {
                    let Some(mesh) = self.meshes.get(&mesh) else {
                        continue;
                    };
                    pass.set_pipeline(&self.pipelines.glow);
                    mesh.draw(pass);
                }
                DrawKind::Line(index) => {
                    pass.set_pipeline(&self.pipelines.lines);
                    self.lines.buffers[index].draw(pass);
                }
                DrawKind::Points(index) => {
                    pass.set_pipeline(&self.pipelines.stars);
                    self.points.buffers[index].draw(pass);
                }
            }
        }
    }

    /// Prepare, encode and present one frame.
    pub fn render_frame(
        &mut self,
        ctx: &RenderContext,
        scene: &SceneComposer,
        camera: &Camera,
    ) -> Result<(), SurfaceError> {
        let frame = ctx.get_current_texture()?;
        self.prepare(&ctx.device, &ctx.queue, scene, camera);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        let [r, g, b] = self.settings.clear_color;
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            self.draw(&mut pass);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_node_buffer(
    device: &wgpu::Device,
    layouts: &SceneLayouts,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("node-uniforms"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("node-bind-group"),
        layout: &layouts.node,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<NodeUniform>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(translucent: bool, depth: f32, offset: u32) -> DrawItem {
        DrawItem {
            kind: DrawKind::Line(0),
            offset,
            translucent,
            depth,
        }
    }

    #[test]
    fn test_opaque_items_come_first_in_submission_order() {
        let mut draws = vec![
            item(true, 10.0, 0),
            item(false, 50.0, 1),
            item(false, 5.0, 2),
            item(true, 30.0, 3),
        ];
        order_draws(&mut draws);
        let offsets: Vec<u32> = draws.iter().map(|d| d.offset).collect();
        assert_eq!(offsets, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_translucent_items_sorted_back_to_front() {
        let mut draws = vec![item(true, 1.0, 0), item(true, 100.0, 1), item(true, 20.0, 2)];
        order_draws(&mut draws);
        let depths: Vec<f32> = draws.iter().map(|d| d.depth).collect();
        assert_eq!(depths, vec![100.0, 20.0, 1.0]);
    }

    #[test]
    fn test_named_buffers_dedupe_by_name() {
        let Some((device, _queue)) = crate::test_support::create_test_device_queue() else {
            return;
        };
        let mut buffers = NamedBuffers::default();
        let vertices = color_vertices(&[Vec3::ZERO, Vec3::X], |_| Vec3::ONE);
        let a = buffers.get_or_insert_with("earth-path", || VertexBuffer::new(&device, "a", &vertices));
        let b = buffers.get_or_insert_with("earth-path", || VertexBuffer::new(&device, "b", &vertices));
        let c = buffers.get_or_insert_with("mars-path", || VertexBuffer::new(&device, "c", &vertices));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(buffers.buffers.len(), 2);
    }
}
