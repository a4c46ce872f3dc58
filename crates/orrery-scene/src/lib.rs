//! Scene description for the orrery: the scene graph, procedural geometry,
//! materials, the data-driven celestial body builder, and the composer that
//! places bodies on orbit pivots and advances them every tick.
//!
//! Nothing here touches the GPU. Textures and external meshes are referred to
//! by handles issued from an [`AssetCatalog`]; the renderer resolves them once
//! the asynchronous loads finish.

mod assets;
mod body;
mod catalog;
mod composer;
mod error;
mod fresnel;
mod geometry;
mod graph;
mod material;
mod starfield;
mod system;
mod transform;

pub use assets::{AssetCatalog, MeshHandle, TextureHandle};
pub use body::{
    BodyConfig, BuildOptions, CelestialBody, GlowConfig, MoonConfig, RingConfig, ShellConfig,
};
pub use catalog::solar_system;
pub use composer::{OrbitPivot, SceneComposer, SceneOptions};
pub use error::{BodyError, SceneError};
pub use fresnel::{FresnelMaterial, FresnelParams};
pub use geometry::{MeshData, Shape, orbit_circle, ring_uv, ring_mesh, unit_sphere};
pub use graph::{Mesh, Node, NodeContent, NodePath, PointCloud, Polyline};
pub use material::{Blending, Material, Side, StandardMaterial, TextureWrap, hex_to_linear};
pub use starfield::{StarFieldGenerator, StarFieldSettings, StarPoint, hsl_to_rgb};
pub use system::{OrbitConfig, PlanetConfig, SystemConfig};
pub use transform::Transform;
