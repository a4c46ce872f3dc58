//! GPU textures keyed by catalog handle.
//!
//! Until a texture's decode finishes, draws that reference it bind a white
//! 1x1 placeholder. Bind groups are built lazily per `(texture, wrap)` pair
//! and dropped when the texture behind them is replaced.

use std::collections::HashMap;

use orrery_assets::DecodedImage;
use orrery_scene::{TextureHandle, TextureWrap};
use wgpu::util::DeviceExt;

/// Texture format for colour maps; decoded images are sRGB-encoded RGBA8.
pub const COLOR_MAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
}

/// Bind group key: `None` selects the placeholder.
pub type TextureKey = (Option<TextureHandle>, TextureWrap);

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    dimensions: (u32, u32),
}

pub struct TextureManager {
    bind_group_layout: wgpu::BindGroupLayout,
    sampler_repeat_u: wgpu::Sampler,
    sampler_clamp: wgpu::Sampler,
    placeholder: GpuTexture,
    textures: HashMap<TextureHandle, GpuTexture>,
    bind_groups: HashMap<TextureKey, wgpu::BindGroup>,
}

impl TextureManager {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let sampler_repeat_u = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-repeat-u"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let sampler_clamp = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-clamp"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let placeholder = upload(device, queue, "placeholder-white", 1, 1, &[255; 4]);

        Self {
            bind_group_layout,
            sampler_repeat_u,
            sampler_clamp,
            placeholder,
            textures: HashMap::new(),
            bind_groups: HashMap::new(),
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Upload a decoded image for `handle`, replacing any earlier upload.
    pub fn insert(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        handle: TextureHandle,
        image: &DecodedImage,
    ) -> Result<(), TextureError> {
        validate(image)?;
        let label = format!("texture-{}", handle.index());
        let texture = upload(device, queue, &label, image.width, image.height, &image.rgba);
        self.bind_groups.retain(|(key, _), _| *key != Some(handle));
        self.textures.insert(handle, texture);
        log::debug!(
            "Uploaded texture {} ({}x{})",
            handle.index(),
            image.width,
            image.height
        );
        Ok(())
    }

    pub fn contains(&self, handle: TextureHandle) -> bool {
        self.textures.contains_key(&handle)
    }

    pub fn dimensions(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&handle).map(|t| t.dimensions)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// The key a draw should bind this frame: the handle once uploaded,
    /// otherwise the placeholder.
    pub fn resolve(&self, handle: Option<TextureHandle>, wrap: TextureWrap) -> TextureKey {
        match handle {
            Some(h) if self.textures.contains_key(&h) => (Some(h), wrap),
            _ => (None, wrap),
        }
    }

    /// Build the bind group for `key` if it does not exist yet.
    pub fn prepare(&mut self, device: &wgpu::Device, key: TextureKey) {
        if self.bind_groups.contains_key(&key) {
            return;
        }
        let view = match key.0.and_then(|h| self.textures.get(&h)) {
            Some(texture) => &texture.view,
            None => &self.placeholder.view,
        };
        let sampler = match key.1 {
            TextureWrap::RepeatU => &self.sampler_repeat_u,
            TextureWrap::Clamp => &self.sampler_clamp,
        };
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        self.bind_groups.insert(key, bind_group);
    }

    pub fn bind_group(&self, key: &TextureKey) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(key)
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> GpuTexture {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_MAP_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        rgba,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture {
        _texture: texture,
        view,
        dimensions: (width, height),
    }
}

fn validate(image: &DecodedImage) -> Result<(), TextureError> {
    if image.width == 0 || image.height == 0 {
        return Err(TextureError::ZeroDimensions {
            width: image.width,
            height: image.height,
        });
    }
    let expected = image.width as usize * image.height as usize * 4;
    if image.rgba.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: image.rgba.len(),
            expected,
            width: image.width,
            height: image.height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_device_queue;
    use orrery_scene::AssetCatalog;

    fn image(width: u32, height: u32, len: usize) -> DecodedImage {
        DecodedImage {
            width,
            height,
            rgba: vec![128; len],
        }
    }

    #[test]
    fn test_validate_rejects_zero_dimensions() {
        assert!(matches!(
            validate(&image(0, 4, 0)),
            Err(TextureError::ZeroDimensions { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_size_mismatch() {
        assert!(matches!(
            validate(&image(2, 2, 15)),
            Err(TextureError::DataSizeMismatch { expected: 16, .. })
        ));
        assert!(validate(&image(2, 2, 16)).is_ok());
    }

    #[test]
    fn test_unloaded_handle_resolves_to_placeholder() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut catalog = AssetCatalog::new();
        let handle = catalog.texture("earth.jpg");
        let mut textures = TextureManager::new(&device, &queue);

        let key = textures.resolve(Some(handle), TextureWrap::RepeatU);
        assert_eq!(key, (None, TextureWrap::RepeatU));

        textures.prepare(&device, key);
        assert!(textures.bind_group(&key).is_some());
    }

    #[test]
    fn test_insert_switches_resolution_to_texture() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut catalog = AssetCatalog::new();
        let handle = catalog.texture("ring.png");
        let mut textures = TextureManager::new(&device, &queue);

        textures
            .insert(&device, &queue, handle, &image(4, 2, 32))
            .expect("valid image");
        assert!(textures.contains(handle));
        assert_eq!(textures.dimensions(handle), Some((4, 2)));
        assert_eq!(
            textures.resolve(Some(handle), TextureWrap::Clamp),
            (Some(handle), TextureWrap::Clamp)
        );
    }

    #[test]
    fn test_reupload_invalidates_bind_group() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut catalog = AssetCatalog::new();
        let handle = catalog.texture("sun.jpg");
        let mut textures = TextureManager::new(&device, &queue);
        textures
            .insert(&device, &queue, handle, &image(1, 1, 4))
            .expect("valid image");
        let key = (Some(handle), TextureWrap::RepeatU);
        textures.prepare(&device, key);
        assert!(textures.bind_group(&key).is_some());

        textures
            .insert(&device, &queue, handle, &image(2, 1, 8))
            .expect("valid image");
        assert!(textures.bind_group(&key).is_none());
        assert_eq!(textures.len(), 1);
    }
}
