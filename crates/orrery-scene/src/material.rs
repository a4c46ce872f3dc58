//! Surface materials for shell meshes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::assets::TextureHandle;
use crate::fresnel::FresnelMaterial;

/// How a layer combines with what is already drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Blending {
    /// Source-over alpha blending.
    #[default]
    Normal,
    /// Colour is added to the destination; used for bump, lights, fire and glow.
    Additive,
}

/// Which triangle faces are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Sampler addressing for a material's map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    /// Repeat on U, clamp on V; sphere maps cross the seam with u > 1.
    #[default]
    RepeatU,
    Clamp,
}

/// Textured, ambient-lit material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StandardMaterial {
    pub map: Option<TextureHandle>,
    /// Linear RGB multiplier.
    pub color: Vec3,
    pub opacity: f32,
    pub transparent: bool,
    pub blending: Blending,
    pub side: Side,
    pub depth_write: bool,
    /// Share of the diffuse response lost to metallic reflection. Only ambient
    /// light reaches the scene, so nothing is reflected back.
    pub metalness: f32,
    pub wrap: TextureWrap,
}

impl StandardMaterial {
    /// Opaque, front-faced material sampling `map`.
    pub fn textured(map: TextureHandle) -> Self {
        Self {
            map: Some(map),
            color: Vec3::ONE,
            opacity: 1.0,
            transparent: false,
            blending: Blending::Normal,
            side: Side::Front,
            depth_write: true,
            metalness: 0.0,
            wrap: TextureWrap::RepeatU,
        }
    }

    /// Whether the layer must be drawn after opaque geometry.
    pub fn is_translucent(&self) -> bool {
        self.transparent || self.blending == Blending::Additive
    }

    /// Colour multiplier seen under ambient light.
    pub fn diffuse_color(&self) -> Vec3 {
        self.color * (1.0 - self.metalness.clamp(0.0, 1.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    Standard(StandardMaterial),
    Fresnel(FresnelMaterial),
}

impl Material {
    pub fn is_translucent(&self) -> bool {
        match self {
            Material::Standard(m) => m.is_translucent(),
            Material::Fresnel(_) => true,
        }
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        match self {
            Material::Standard(m) => m.map,
            Material::Fresnel(_) => None,
        }
    }
}

/// Convert a `0xRRGGBB` sRGB colour to linear RGB.
pub fn hex_to_linear(hex: u32) -> Vec3 {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    Vec3::new(channel(16), channel(8), channel(0))
}
