//! Uniform blocks shared by the scene shaders (`shaders/common.wgsl`).

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use orrery_scene::FresnelMaterial;

/// Per-frame data at group 0.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye position.
    pub camera_pos: [f32; 4],
    /// x = ambient intensity, y = exposure, z = tone mapping on (1) / off (0).
    pub lighting: [f32; 4],
}

/// Lighting controls applied to every textured shell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightingSettings {
    pub ambient_intensity: f32,
    pub exposure: f32,
    pub tone_mapping: bool,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            ambient_intensity: 1.0,
            exposure: 1.0,
            tone_mapping: true,
        }
    }
}

impl FrameUniform {
    pub fn new(view_proj: Mat4, camera_pos: Vec3, lighting: &LightingSettings) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera_pos.extend(1.0).to_array(),
            lighting: [
                lighting.ambient_intensity,
                lighting.exposure,
                if lighting.tone_mapping { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// Per-draw data at group 1, bound with a dynamic offset.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`; glow shells are stretched non-uniformly.
    pub normal_matrix: [[f32; 4]; 4],
    /// rgb = linear colour, a = opacity.
    pub color: [f32; 4],
    /// Fresnel rim colour (rgb).
    pub rim_color: [f32; 4],
    /// Fresnel facing colour (rgb).
    pub facing_color: [f32; 4],
    /// x = bias, y = scale, z = power.
    pub fresnel: [f32; 4],
}

impl NodeUniform {
    pub fn new(model: Mat4, color: Vec3, opacity: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: color.extend(opacity).to_array(),
            rim_color: [0.0; 4],
            facing_color: [0.0; 4],
            fresnel: [0.0; 4],
        }
    }

    pub fn fresnel(model: Mat4, material: &FresnelMaterial) -> Self {
        Self {
            rim_color: material.rim_color.extend(1.0).to_array(),
            facing_color: material.facing_color.extend(1.0).to_array(),
            fresnel: [material.bias, material.scale, material.power, 0.0],
            ..Self::new(model, Vec3::ONE, 1.0)
        }
    }
}

/// Round `size` up to a multiple of `alignment` (a power of two).
pub fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_scene::FresnelParams;

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<NodeUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<FrameUniform>(), 96);
        assert_eq!(std::mem::size_of::<NodeUniform>(), 192);
    }

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(192, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }

    #[test]
    fn test_tone_mapping_flag_encoding() {
        let off = LightingSettings {
            tone_mapping: false,
            ..Default::default()
        };
        assert_eq!(FrameUniform::new(Mat4::IDENTITY, Vec3::ZERO, &off).lighting[2], 0.0);
        let on = LightingSettings::default();
        assert_eq!(FrameUniform::new(Mat4::IDENTITY, Vec3::ZERO, &on).lighting[2], 1.0);
    }

    #[test]
    fn test_fresnel_draw_carries_parameters() {
        let material = FresnelMaterial::from(FresnelParams::default());
        let node = NodeUniform::fresnel(Mat4::IDENTITY, &material);
        assert_eq!(node.fresnel[..3], [0.1, 1.0, 4.0]);
        assert_eq!(node.rim_color[..3], material.rim_color.to_array());
    }

    #[test]
    fn test_normal_matrix_of_stretch_is_inverse_scale() {
        let node = NodeUniform::new(Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)), Vec3::ONE, 1.0);
        assert!((node.normal_matrix[0][0] - 0.5).abs() < 1e-6);
        assert_eq!(node.color, [1.0, 1.0, 1.0, 1.0]);
    }
}
