//! Fresnel glow material: a rim that brightens toward the silhouette.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::material::hex_to_linear;

/// Glow parameters as authored, colours as `0xRRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FresnelParams {
    pub rim_color: u32,
    pub facing_color: u32,
    pub bias: f32,
    pub scale: f32,
    pub power: f32,
}

impl Default for FresnelParams {
    fn default() -> Self {
        Self {
            rim_color: 0x0088ff,
            facing_color: 0x000000,
            bias: 0.1,
            scale: 1.0,
            power: 4.0,
        }
    }
}

/// GPU-ready fresnel material with linear colours.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FresnelMaterial {
    pub rim_color: Vec3,
    pub facing_color: Vec3,
    pub bias: f32,
    pub scale: f32,
    pub power: f32,
}

impl From<FresnelParams> for FresnelMaterial {
    fn from(p: FresnelParams) -> Self {
        Self {
            rim_color: hex_to_linear(p.rim_color),
            facing_color: hex_to_linear(p.facing_color),
            bias: p.bias,
            scale: p.scale,
            power: p.power,
        }
    }
}

impl FresnelMaterial {
    /// Opacity at a surface point; mirrors `glow.wgsl`.
    ///
    /// `incident` points from the eye toward the surface, `normal` is the
    /// outward world normal. Both must be normalized.
    pub fn reflection_factor(&self, incident: Vec3, normal: Vec3) -> f32 {
        let facing = (1.0 + incident.dot(normal)).max(0.0);
        (self.bias + self.scale * facing.powf(self.power)).clamp(0.0, 1.0)
    }

    /// Output colour for a given reflection factor.
    pub fn color_at(&self, factor: f32) -> Vec3 {
        self.facing_color.lerp(self.rim_color, factor.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun_glow() -> FresnelMaterial {
        FresnelParams {
            rim_color: 0xf19504,
            facing_color: 0x000000,
            bias: 0.4,
            scale: 0.2,
            power: 4.0,
        }
        .into()
    }

    #[test]
    fn test_facing_point_uses_bias() {
        let glow = sun_glow();
        let f = glow.reflection_factor(Vec3::NEG_Z, Vec3::Z);
        assert!((f - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_silhouette_is_brighter_than_centre() {
        let glow = sun_glow();
        let centre = glow.reflection_factor(Vec3::NEG_Z, Vec3::Z);
        let edge = glow.reflection_factor(Vec3::NEG_Z, Vec3::X);
        assert!((edge - 0.6).abs() < 1e-6);
        assert!(edge > centre);
    }

    #[test]
    fn test_factor_is_clamped() {
        let hot = FresnelMaterial::from(FresnelParams {
            bias: 0.9,
            scale: 5.0,
            ..FresnelParams::default()
        });
        assert_eq!(hot.reflection_factor(Vec3::NEG_Z, Vec3::X), 1.0);
    }

    #[test]
    fn test_colour_blends_facing_to_rim() {
        let glow = sun_glow();
        assert_eq!(glow.color_at(0.0), Vec3::ZERO);
        assert!((glow.color_at(1.0) - glow.rim_color).length() < 1e-6);
    }

    #[test]
    fn test_default_params() {
        let p = FresnelParams::default();
        assert_eq!(p.rim_color, 0x0088ff);
        assert_eq!(p.power, 4.0);
    }
}
