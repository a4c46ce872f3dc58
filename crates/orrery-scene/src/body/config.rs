//! Body description records, loadable from RON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BodyError;
use crate::fresnel::FresnelParams;
use crate::material::Blending;

/// Radius factor of the surface sphere; every other layer must exceed it.
const SURFACE_FACTOR: f32 = 1.0;

fn one() -> f32 {
    1.0
}

fn yes() -> bool {
    true
}

fn additive() -> Blending {
    Blending::Additive
}

fn unit_stretch() -> [f32; 3] {
    [1.0; 3]
}

fn ring_theta_segments() -> u32 {
    64
}

fn ring_phi_segments() -> u32 {
    8
}

fn ring_metalness() -> f32 {
    0.2
}

fn moon_bump_opacity() -> f32 {
    0.4
}

/// Everything needed to build one body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub name: String,
    /// Radius of the surface sphere before `display_scale`.
    pub base_radius: f32,
    /// Uniform scale of the whole group.
    #[serde(default = "one")]
    pub display_scale: f32,
    /// Tilt of the spin axis, applied as a rotation about Z.
    #[serde(default)]
    pub axial_tilt_deg: f32,
    /// Rotation added about Y on every tick.
    #[serde(default)]
    pub spin_rate: f32,
    pub surface_texture: PathBuf,
    /// Translucent layers, innermost first.
    #[serde(default)]
    pub shells: Vec<ShellConfig>,
    #[serde(default)]
    pub glow: Option<GlowConfig>,
    #[serde(default)]
    pub ring: Option<RingConfig>,
    #[serde(default)]
    pub moons: Vec<MoonConfig>,
}

/// A translucent sphere layered over the surface (bump, clouds, lights, fire).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShellConfig {
    pub name: String,
    pub texture: PathBuf,
    /// Shell radius relative to `base_radius`.
    pub radius_factor: f32,
    pub opacity: f32,
    #[serde(default = "additive")]
    pub blending: Blending,
    #[serde(default = "yes")]
    pub transparent: bool,
    /// Extra rotation about Y per tick on top of the body's spin.
    #[serde(default)]
    pub spin_rate: f32,
}

/// Fresnel glow shell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlowConfig {
    pub radius_factor: f32,
    /// Per-axis scale of the glow mesh.
    #[serde(default = "unit_stretch")]
    pub stretch: [f32; 3],
    #[serde(default)]
    pub fresnel: FresnelParams,
}

/// Flat textured ring around the equator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingConfig {
    pub inner_radius_factor: f32,
    pub outer_radius_factor: f32,
    pub texture: PathBuf,
    pub opacity: f32,
    #[serde(default = "ring_theta_segments")]
    pub theta_segments: u32,
    #[serde(default = "ring_phi_segments")]
    pub phi_segments: u32,
    #[serde(default = "ring_metalness")]
    pub metalness: f32,
}

/// A moon carried on its own pivot inside the parent's group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoonConfig {
    pub name: String,
    pub radius: f32,
    /// Distance from the parent's centre along +X.
    pub distance: f32,
    pub texture: PathBuf,
    #[serde(default)]
    pub bump_texture: Option<PathBuf>,
    #[serde(default = "moon_bump_opacity")]
    pub bump_opacity: f32,
    #[serde(default)]
    pub axial_tilt_deg: f32,
    /// Rotation of the moon's pivot about Y per tick.
    #[serde(default)]
    pub orbit_rate: f32,
    /// glTF mesh replacing the procedural sphere.
    #[serde(default)]
    pub mesh: Option<PathBuf>,
}

impl BodyConfig {
    /// A bare textured sphere; layers are added by filling in the fields.
    pub fn sphere(name: impl Into<String>, base_radius: f32, surface_texture: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base_radius,
            display_scale: 1.0,
            axial_tilt_deg: 0.0,
            spin_rate: 0.0,
            surface_texture: surface_texture.into(),
            shells: Vec::new(),
            glow: None,
            ring: None,
            moons: Vec::new(),
        }
    }

    pub fn axial_tilt(&self) -> f32 {
        self.axial_tilt_deg.to_radians()
    }

    /// Every texture the body uses: surface, shells, ring, then moons.
    pub fn texture_paths(&self) -> Vec<&Path> {
        let mut paths = vec![self.surface_texture.as_path()];
        paths.extend(self.shells.iter().map(|s| s.texture.as_path()));
        paths.extend(self.ring.iter().map(|r| r.texture.as_path()));
        for moon in &self.moons {
            paths.push(&moon.texture);
            paths.extend(moon.bump_texture.as_deref());
        }
        paths
    }

    /// Check the invariants the builder relies on.
    pub fn validate(&self) -> Result<(), BodyError> {
        let body = || self.name.clone();

        if !positive(self.base_radius) {
            return Err(BodyError::NonPositiveRadius {
                body: body(),
                radius: self.base_radius,
            });
        }
        if !(self.display_scale.is_finite() && self.display_scale >= 0.0) {
            return Err(BodyError::NegativeScale {
                body: body(),
                scale: self.display_scale,
            });
        }

        let mut previous = SURFACE_FACTOR;
        let layers = self
            .shells
            .iter()
            .map(|s| (s.name.as_str(), s.radius_factor))
            .chain(self.glow.iter().map(|g| ("glow", g.radius_factor)));
        for (layer, factor) in layers {
            if !(factor.is_finite() && factor > previous) {
                return Err(BodyError::LayerOrder {
                    body: body(),
                    layer: layer.to_string(),
                    factor,
                    previous,
                });
            }
            previous = factor;
        }

        let opacities = self
            .shells
            .iter()
            .map(|s| (s.name.as_str(), s.opacity))
            .chain(self.ring.iter().map(|r| ("ring", r.opacity)));
        for (layer, opacity) in opacities {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(BodyError::InvalidOpacity {
                    body: body(),
                    layer: layer.to_string(),
                    opacity,
                });
            }
        }

        if let Some(ring) = &self.ring {
            let (inner, outer) = (ring.inner_radius_factor, ring.outer_radius_factor);
            if !(positive(inner) && outer.is_finite() && outer > inner) {
                return Err(BodyError::InvalidRing {
                    body: body(),
                    inner,
                    outer,
                });
            }
        }

        if let Some(moon) = self
            .moons
            .iter()
            .find(|m| !(positive(m.radius) && positive(m.distance)))
        {
            return Err(BodyError::InvalidMoon {
                body: body(),
                moon: moon.name.clone(),
            });
        }

        Ok(())
    }
}

fn positive(x: f32) -> bool {
    x.is_finite() && x > 0.0
}
