//! Render pipelines for the scene: textured shells, fresnel glow, orbit
//! lines and stars.
//!
//! Every pipeline shares group 0 (frame uniform) and group 1 (per-node
//! uniform, dynamic offset). Shells add the texture bind group at group 2.

use std::collections::HashMap;
use std::num::NonZeroU64;

use orrery_scene::{Blending, Side, StandardMaterial};

use crate::depth::DepthBuffer;
use crate::mesh::{ColorVertex, ShellVertex};
use crate::uniforms::{FrameUniform, NodeUniform};

pub const SHELL_SHADER_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/shell.wgsl")
);
pub const GLOW_SHADER_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/glow.wgsl")
);
pub const UNLIT_SHADER_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/unlit.wgsl")
);

/// `src × alpha + dst`: layers brighten whatever is behind them.
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent::OVER,
};

/// Bind group layouts shared by all scene pipelines.
pub struct SceneLayouts {
    pub frame: wgpu::BindGroupLayout,
    pub node: wgpu::BindGroupLayout,
}

impl SceneLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<FrameUniform>() as u64),
                },
                count: None,
            }],
        });
        let node = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("node-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<NodeUniform>() as u64),
                },
                count: None,
            }],
        });
        Self { frame, node }
    }
}

/// The state a textured shell pipeline is specialised on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShellKey {
    pub blending: Blending,
    pub side: Side,
    pub depth_write: bool,
}

impl ShellKey {
    pub fn of(material: &StandardMaterial) -> Self {
        Self {
            blending: material.blending,
            side: material.side,
            depth_write: material.depth_write,
        }
    }

    fn blend(&self) -> wgpu::BlendState {
        match self.blending {
            Blending::Normal => wgpu::BlendState::ALPHA_BLENDING,
            Blending::Additive => ADDITIVE_BLEND,
        }
    }

    fn cull_mode(&self) -> Option<wgpu::Face> {
        match self.side {
            Side::Front => Some(wgpu::Face::Back),
            Side::Double => None,
        }
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    layout: &'a wgpu::PipelineLayout,
    vertex: wgpu::VertexBufferLayout<'static>,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    blend: wgpu::BlendState,
    depth_write: bool,
    surface_format: wgpu::TextureFormat,
}

fn create_pipeline(device: &wgpu::Device, desc: PipelineDesc) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: Some("vs_main"),
            buffers: &[desc.vertex],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(DepthBuffer::stencil_state(desc.depth_write)),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.surface_format,
                blend: Some(desc.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

fn create_shader(device: &wgpu::Device, label: &str, source: &'static str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

/// Textured shell pipelines, created on first use per [`ShellKey`].
pub struct ShellPipelines {
    shader: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    pipelines: HashMap<ShellKey, wgpu::RenderPipeline>,
}

impl ShellPipelines {
    pub fn new(
        device: &wgpu::Device,
        layouts: &SceneLayouts,
        texture_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shell-pipeline-layout"),
            bind_group_layouts: &[&layouts.frame, &layouts.node, texture_layout],
            immediate_size: 0,
        });
        Self {
            shader: create_shader(device, "shell-shader", SHELL_SHADER_SOURCE),
            layout,
            surface_format,
            pipelines: HashMap::new(),
        }
    }

    pub fn prepare(&mut self, device: &wgpu::Device, key: ShellKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        log::debug!("Creating shell pipeline {key:?}");
        let pipeline = create_pipeline(
            device,
            PipelineDesc {
                label: "shell-pipeline",
                shader: &self.shader,
                layout: &self.layout,
                vertex: ShellVertex::layout(),
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: key.cull_mode(),
                blend: key.blend(),
                depth_write: key.depth_write,
                surface_format: self.surface_format,
            },
        );
        self.pipelines.insert(key, pipeline);
    }

    pub fn get(&self, key: &ShellKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

/// Fixed pipelines: fresnel glow, orbit lines and star points.
pub struct ScenePipelines {
    pub glow: wgpu::RenderPipeline,
    pub lines: wgpu::RenderPipeline,
    pub stars: wgpu::RenderPipeline,
}

impl ScenePipelines {
    pub fn new(
        device: &wgpu::Device,
        layouts: &SceneLayouts,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene-pipeline-layout"),
            bind_group_layouts: &[&layouts.frame, &layouts.node],
            immediate_size: 0,
        });
        let glow_shader = create_shader(device, "glow-shader", GLOW_SHADER_SOURCE);
        let unlit_shader = create_shader(device, "unlit-shader", UNLIT_SHADER_SOURCE);

        let glow = create_pipeline(
            device,
            PipelineDesc {
                label: "glow-pipeline",
                shader: &glow_shader,
                layout: &layout,
                vertex: ShellVertex::layout(),
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                blend: ADDITIVE_BLEND,
                depth_write: false,
                surface_format,
            },
        );
        let lines = create_pipeline(
            device,
            PipelineDesc {
                label: "orbit-line-pipeline",
                shader: &unlit_shader,
                layout: &layout,
                vertex: ColorVertex::layout(),
                topology: wgpu::PrimitiveTopology::LineStrip,
                cull_mode: None,
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: true,
                surface_format,
            },
        );
        let stars = create_pipeline(
            device,
            PipelineDesc {
                label: "star-pipeline",
                shader: &unlit_shader,
                layout: &layout,
                vertex: ColorVertex::layout(),
                topology: wgpu::PrimitiveTopology::PointList,
                cull_mode: None,
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
                surface_format,
            },
        );

        Self { glow, lines, stars }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_device_queue;
    use crate::texture::TextureManager;
    use orrery_scene::{AssetCatalog, Blending, Side};

    #[test]
    fn test_shader_sources_have_entry_points() {
        for source in [SHELL_SHADER_SOURCE, GLOW_SHADER_SOURCE, UNLIT_SHADER_SOURCE] {
            assert!(source.contains("fn vs_main"));
            assert!(source.contains("fn fs_main"));
            assert!(source.contains("struct FrameUniform"));
        }
    }

    #[test]
    fn test_shell_key_from_ring_material() {
        let mut catalog = AssetCatalog::new();
        let mut material = StandardMaterial::textured(catalog.texture("ring.png"));
        material.side = Side::Double;
        material.depth_write = false;
        let key = ShellKey::of(&material);
        assert_eq!(key.cull_mode(), None);
        assert!(!key.depth_write);
        assert_eq!(key.blend(), wgpu::BlendState::ALPHA_BLENDING);
    }

    #[test]
    fn test_additive_key_adds_onto_destination() {
        let key = ShellKey {
            blending: Blending::Additive,
            side: Side::Front,
            depth_write: true,
        };
        assert_eq!(key.blend().color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(key.cull_mode(), Some(wgpu::Face::Back));
    }

    #[test]
    fn test_pipelines_compile() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let layouts = SceneLayouts::new(&device);
        let textures = TextureManager::new(&device, &queue);
        let format = wgpu::TextureFormat::Bgra8UnormSrgb;
        let _fixed = ScenePipelines::new(&device, &layouts, format);

        let mut shells = ShellPipelines::new(&device, &layouts, textures.bind_group_layout(), format);
        let key = ShellKey {
            blending: Blending::Additive,
            side: Side::Front,
            depth_write: true,
        };
        shells.prepare(&device, key);
        shells.prepare(&device, key);
        assert_eq!(shells.len(), 1);
        assert!(shells.get(&key).is_some());
    }
}
