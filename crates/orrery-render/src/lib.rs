//! wgpu renderer for the layered-shell solar system: GPU context, reverse-Z
//! depth, textures by catalog handle, shell/glow/line/star pipelines and the
//! per-frame scene draw list.

pub mod camera;
pub mod depth;
pub mod gpu;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod texture;
pub mod uniforms;

pub use camera::Camera;
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use mesh::{ColorVertex, MeshBuffer, MeshCache, MeshKey, ShellVertex};
pub use pipeline::{SceneLayouts, ScenePipelines, ShellKey, ShellPipelines};
pub use renderer::{DrawItem, DrawKind, RendererSettings, SceneRenderer, order_draws};
pub use texture::{TextureError, TextureManager};
pub use uniforms::{FrameUniform, LightingSettings, NodeUniform};

/// Headless device for GPU tests; `None` when no adapter is available.
#[cfg(test)]
pub(crate) mod test_support {
    pub fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok()?;

            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }
}
