//! Turns a [`BodyConfig`] into a scene-graph group and animates it.

use glam::Vec3;

use super::config::{BodyConfig, MoonConfig, RingConfig, ShellConfig};
use crate::assets::AssetCatalog;
use crate::error::BodyError;
use crate::geometry::Shape;
use crate::graph::{Node, NodePath};
use crate::material::{Blending, Material, Side, StandardMaterial, TextureWrap};

/// Radius factor of a moon's bump layer.
const MOON_BUMP_FACTOR: f32 = 1.01;

/// Geometry detail shared by every body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildOptions {
    pub sphere_subdivisions: u32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            sphere_subdivisions: 5,
        }
    }
}

/// A constructed body: its visual group plus the handles needed to animate it.
///
/// Group children, in order: `surface`, each shell, `glow`, `ring`, then one
/// pivot per moon.
#[derive(Clone, Debug)]
pub struct CelestialBody {
    name: String,
    spin_rate: f32,
    group: Node,
    spinning_layers: Vec<(NodePath, f32)>,
    moon_pivots: Vec<(NodePath, f32)>,
}

impl CelestialBody {
    /// Validate `config` and build its group. Textures and meshes are
    /// requested from `assets`; nothing is loaded here.
    pub fn construct(
        config: &BodyConfig,
        options: &BuildOptions,
        assets: &mut AssetCatalog,
    ) -> Result<Self, BodyError> {
        config.validate()?;
        let detail = options.sphere_subdivisions;

        let mut group = Node::group(&config.name);
        group.transform.rotation.z = config.axial_tilt();
        group.transform.scale = Vec3::splat(config.display_scale);

        let surface = StandardMaterial::textured(assets.texture(&config.surface_texture));
        group.add_child(Node::mesh(
            "surface",
            sphere(config.base_radius, detail),
            Material::Standard(surface),
        ));

        let mut spinning_layers = Vec::new();
        for shell in &config.shells {
            let index = group.add_child(shell_node(shell, config.base_radius, detail, assets));
            if shell.spin_rate != 0.0 {
                spinning_layers.push((NodePath::root().child(index), shell.spin_rate));
            }
        }

        if let Some(glow) = &config.glow {
            let mut node = Node::mesh(
                "glow",
                sphere(config.base_radius * glow.radius_factor, detail),
                Material::Fresnel(glow.fresnel.into()),
            );
            node.transform.scale = Vec3::from_array(glow.stretch);
            group.add_child(node);
        }

        if let Some(ring) = &config.ring {
            group.add_child(ring_node(ring, config.base_radius, assets));
        }

        let mut moon_pivots = Vec::new();
        for moon in &config.moons {
            let index = group.add_child(moon_pivot(moon, detail, assets));
            moon_pivots.push((NodePath::root().child(index), moon.orbit_rate));
        }

        log::debug!(
            "Built {} with {} meshes ({} shells, {} moons)",
            config.name,
            group.mesh_count(),
            config.shells.len(),
            config.moons.len()
        );

        Ok(Self {
            name: config.name.clone(),
            spin_rate: config.spin_rate,
            group,
            spinning_layers,
            moon_pivots,
        })
    }

    /// Spin the body by `delta_angle` radians about its local Y axis.
    ///
    /// Layers with their own spin (clouds) and moon pivots advance by their
    /// configured rates. Angles accumulate without wrapping.
    pub fn advance(&mut self, delta_angle: f32) {
        self.group.transform.rotation.y += delta_angle;
        for (path, rate) in self.spinning_layers.iter().chain(&self.moon_pivots) {
            if let Some(node) = self.group.get_mut(path) {
                node.transform.rotation.y += *rate;
            }
        }
    }

    /// Set the group's uniform scale. Absolute, not cumulative; negative
    /// factors clamp to zero.
    pub fn rescale(&mut self, factor: f32) {
        self.group.transform.scale = Vec3::splat(factor.max(0.0));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-tick spin from the body's config.
    pub fn spin_rate(&self) -> f32 {
        self.spin_rate
    }

    pub fn group(&self) -> &Node {
        &self.group
    }

    pub fn rotation(&self) -> Vec3 {
        self.group.transform.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.group.transform.scale
    }

    pub fn translation(&self) -> Vec3 {
        self.group.transform.translation
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.group.transform.translation = translation;
    }

    /// Node of the group by name, e.g. `"clouds"`, `"ring"` or `"moon"`.
    /// Searches depth first, so the body's own layers win over a moon's.
    pub fn layer(&self, name: &str) -> Option<&Node> {
        self.group.find(name)
    }
}

fn sphere(radius: f32, subdivisions: u32) -> Shape {
    Shape::Sphere {
        radius,
        subdivisions,
    }
}

fn shell_node(
    shell: &ShellConfig,
    base_radius: f32,
    detail: u32,
    assets: &mut AssetCatalog,
) -> Node {
    let material = StandardMaterial {
        opacity: shell.opacity,
        transparent: shell.transparent,
        blending: shell.blending,
        ..StandardMaterial::textured(assets.texture(&shell.texture))
    };
    Node::mesh(
        shell.name.as_str(),
        sphere(base_radius * shell.radius_factor, detail),
        Material::Standard(material),
    )
}

fn ring_node(ring: &RingConfig, base_radius: f32, assets: &mut AssetCatalog) -> Node {
    let material = StandardMaterial {
        opacity: ring.opacity,
        transparent: true,
        side: Side::Double,
        depth_write: false,
        metalness: ring.metalness,
        wrap: TextureWrap::Clamp,
        ..StandardMaterial::textured(assets.texture(&ring.texture))
    };
    let shape = Shape::Ring {
        inner_radius: base_radius * ring.inner_radius_factor,
        outer_radius: base_radius * ring.outer_radius_factor,
        theta_segments: ring.theta_segments,
        phi_segments: ring.phi_segments,
    };
    let mut node = Node::mesh("ring", shape, Material::Standard(material));
    // Lay the XY annulus into the equatorial plane.
    node.transform.rotation.x = std::f32::consts::FRAC_PI_2;
    node
}

fn moon_pivot(moon: &MoonConfig, detail: u32, assets: &mut AssetCatalog) -> Node {
    let shape = match &moon.mesh {
        Some(path) => Shape::Imported {
            mesh: assets.mesh(path),
            radius: moon.radius,
        },
        None => sphere(moon.radius, detail),
    };

    let mut body = Node::group(moon.name.as_str());
    body.transform.translation.x = moon.distance;
    body.transform.rotation.z = moon.axial_tilt_deg.to_radians();
    body.add_child(Node::mesh(
        "surface",
        shape,
        Material::Standard(StandardMaterial::textured(assets.texture(&moon.texture))),
    ));

    if let Some(bump) = &moon.bump_texture {
        let material = StandardMaterial {
            opacity: moon.bump_opacity,
            transparent: true,
            blending: Blending::Additive,
            ..StandardMaterial::textured(assets.texture(bump))
        };
        body.add_child(Node::mesh(
            "bump",
            sphere(moon.radius * MOON_BUMP_FACTOR, detail),
            Material::Standard(material),
        ));
    }

    let mut pivot = Node::group(format!("{}-orbit", moon.name));
    pivot.add_child(body);
    pivot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::solar_system;
    use crate::graph::{Mesh, NodeContent};

    fn build(name: &str) -> (CelestialBody, AssetCatalog) {
        let system = solar_system();
        let config = std::iter::once(&system.sun)
            .chain(system.planets.iter().map(|p| &p.body))
            .find(|b| b.name == name)
            .unwrap()
            .clone();
        let mut assets = AssetCatalog::new();
        let body = CelestialBody::construct(&config, &BuildOptions::default(), &mut assets).unwrap();
        (body, assets)
    }

    fn shape_of<'a>(body: &'a CelestialBody, layer: &str) -> &'a Shape {
        match &body.layer(layer).unwrap().content {
            NodeContent::Mesh(mesh) => &mesh.shape,
            other => panic!("{layer} is not a mesh: {other:?}"),
        }
    }

    #[test]
    fn test_sun_has_unit_scale_shells_and_glow() {
        let (sun, _) = build("sun");
        assert_eq!(sun.scale(), Vec3::ONE);
        assert!(sun.group().mesh_count() >= 3);
        assert!(sun.layer("glow").is_some());
        assert_eq!(
            *shape_of(&sun, "surface"),
            Shape::Sphere {
                radius: 50.0,
                subdivisions: 5
            }
        );
    }

    #[test]
    fn test_rescale_is_absolute() {
        let (mut mars, _) = build("mars");
        mars.rescale(2.0);
        mars.rescale(3.0);
        assert_eq!(mars.scale(), Vec3::splat(3.0));
    }

    #[test]
    fn test_negative_rescale_clamps_to_zero() {
        let (mut mars, _) = build("mars");
        mars.rescale(-2.0);
        assert_eq!(mars.scale(), Vec3::ZERO);
    }

    #[test]
    fn test_layer_finds_moon_below_its_pivot() {
        let (earth, _) = build("earth");
        let moon = earth.layer("moon").unwrap();
        assert_eq!(moon.transform.translation, Vec3::new(1.5, 0.0, 0.0));
        // The planet's own bump shell is found before the moon's.
        let bump = earth.layer("bump").unwrap();
        assert!(bump.children().is_empty());
        assert!(matches!(
            bump.content,
            NodeContent::Mesh(Mesh { shape: Shape::Sphere { radius, .. }, .. }) if radius > 0.9
        ));
    }

    #[test]
    fn test_advance_accumulates_without_wrapping() {
        let (mut mercury, _) = build("mercury");
        for _ in 0..2000 {
            mercury.advance(0.005);
        }
        assert!((mercury.rotation().y - 10.0).abs() < 1e-2);
    }

    #[test]
    fn test_advance_spins_clouds_faster_than_surface() {
        let (mut earth, _) = build("earth");
        earth.advance(0.005);
        let clouds = earth.layer("clouds").unwrap();
        let surface = earth.layer("surface").unwrap();
        assert!(clouds.transform.rotation.y > 0.0);
        assert_eq!(surface.transform.rotation.y, 0.0);
        assert!((earth.rotation().y - 0.005).abs() < 1e-7);
    }

    #[test]
    fn test_moon_rides_its_own_pivot() {
        let (mut earth, _) = build("earth");
        let before = earth.layer("moon-orbit").unwrap().transform.rotation.y;
        earth.advance(0.0);
        let pivot = earth.layer("moon-orbit").unwrap();
        assert!(pivot.transform.rotation.y > before);
        let moon = &pivot.children()[0];
        assert_eq!(moon.transform.translation, Vec3::new(1.5, 0.0, 0.0));
        assert_eq!(moon.children().len(), 2);
    }

    #[test]
    fn test_saturn_ring_radii_and_orientation() {
        let (saturn, _) = build("saturn");
        match *shape_of(&saturn, "ring") {
            Shape::Ring {
                inner_radius,
                outer_radius,
                ..
            } => {
                assert!((inner_radius - 9.35).abs() < 1e-4);
                assert!((outer_radius - 19.55).abs() < 1e-4);
            }
            other => panic!("unexpected ring shape {other:?}"),
        }
        let ring = saturn.layer("ring").unwrap();
        assert!((ring.transform.rotation.x - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((saturn.rotation().z - 25f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_ring_material_is_double_sided_without_depth_write() {
        let (uranus, _) = build("uranus");
        let NodeContent::Mesh(mesh) = &uranus.layer("ring").unwrap().content else {
            panic!("ring is not a mesh");
        };
        let Material::Standard(m) = mesh.material else {
            panic!("ring is not a standard material");
        };
        assert_eq!(m.side, Side::Double);
        assert!(!m.depth_write);
        assert!((m.opacity - 0.5).abs() < 1e-6);
        assert!((m.diffuse_color() - Vec3::splat(0.8)).length() < 1e-6);
    }

    #[test]
    fn test_glow_stretch_applied() {
        let (mercury, _) = build("mercury");
        let glow = mercury.layer("glow").unwrap();
        assert_eq!(glow.transform.scale, Vec3::new(1.0, 1.05, 1.05));
    }

    #[test]
    fn test_textures_requested_once_per_path() {
        let (_, assets) = build("earth");
        let config = solar_system()
            .planets
            .into_iter()
            .find(|p| p.body.name == "earth")
            .unwrap()
            .body;
        assert_eq!(assets.texture_count(), config.texture_paths().len());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = BodyConfig::sphere("void", 1.0, "void.jpg");
        config.base_radius = -1.0;
        let result =
            CelestialBody::construct(&config, &BuildOptions::default(), &mut AssetCatalog::new());
        assert!(matches!(result, Err(BodyError::NonPositiveRadius { .. })));
    }

    #[test]
    fn test_imported_moon_mesh_requested() {
        let mut config = BodyConfig::sphere("mars", 0.49, "mars.jpg");
        config.moons.push(MoonConfig {
            name: "phobos".into(),
            radius: 0.05,
            distance: 0.9,
            texture: "phobos.jpg".into(),
            bump_texture: None,
            bump_opacity: 0.4,
            axial_tilt_deg: 0.0,
            orbit_rate: 0.02,
            mesh: Some("phobos.glb".into()),
        });
        let mut assets = AssetCatalog::new();
        let mars = CelestialBody::construct(&config, &BuildOptions::default(), &mut assets).unwrap();
        assert_eq!(assets.mesh_count(), 1);
        let moon = &mars.layer("phobos-orbit").unwrap().children()[0];
        let NodeContent::Mesh(mesh) = &moon.children()[0].content else {
            panic!("moon surface is not a mesh");
        };
        assert!(matches!(mesh.shape, Shape::Imported { radius, .. } if radius == 0.05));
    }
}
