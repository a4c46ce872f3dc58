//! Composes the sun, orbit pivots, orbit paths and star field into one scene
//! and advances it once per tick.

use std::collections::HashSet;

use glam::{Mat4, Vec3};

use crate::assets::AssetCatalog;
use crate::body::{BuildOptions, CelestialBody};
use crate::error::SceneError;
use crate::geometry::orbit_circle;
use crate::graph::{Node, NodeContent, Polyline};
use crate::material::hex_to_linear;
use crate::starfield::{StarFieldGenerator, StarFieldSettings};
use crate::system::SystemConfig;
use crate::transform::Transform;

const ORBIT_PATH_SEGMENTS: u32 = 100;
const ORBIT_PATH_COLOR: u32 = 0x444444;

/// Optional scene furniture and geometry detail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneOptions {
    pub build: BuildOptions,
    pub show_orbit_paths: bool,
    pub star_field: Option<StarFieldSettings>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            build: BuildOptions::default(),
            show_orbit_paths: true,
            star_field: None,
        }
    }
}

/// Invisible transform at the origin whose Y rotation carries one body
/// around the sun.
#[derive(Clone, Debug)]
pub struct OrbitPivot {
    pub transform: Transform,
    /// Revolution per tick, in radians.
    pub rate: f32,
    pub body: CelestialBody,
}

impl OrbitPivot {
    /// Distance of the body from the sun's centre.
    pub fn radius(&self) -> f32 {
        self.body.translation().length()
    }

    /// World position of the body's centre.
    pub fn body_position(&self) -> Vec3 {
        self.transform.matrix().transform_point3(self.body.translation())
    }
}

pub struct SceneComposer {
    sun: CelestialBody,
    pivots: Vec<OrbitPivot>,
    backdrop: Node,
    ticks: u64,
}

impl SceneComposer {
    /// Build every body of `system` and place the planets on their orbits.
    pub fn build(
        system: &SystemConfig,
        options: &SceneOptions,
        assets: &mut AssetCatalog,
    ) -> Result<Self, SceneError> {
        let mut names = HashSet::new();
        for body in system.bodies() {
            if !names.insert(body.name.as_str()) {
                return Err(SceneError::DuplicateBody(body.name.clone()));
            }
        }

        let sun = CelestialBody::construct(&system.sun, &options.build, assets)?;
        let sun_radius = system.sun.base_radius * system.sun.display_scale;

        let mut backdrop = Node::group("backdrop");
        if let Some(settings) = options.star_field {
            backdrop.add_child(StarFieldGenerator::new(settings).build_node());
        }

        let mut pivots = Vec::with_capacity(system.planets.len());
        for planet in &system.planets {
            let mut body = CelestialBody::construct(&planet.body, &options.build, assets)?;
            let distance = planet.orbit.base_distance + sun_radius;
            body.set_translation(Vec3::X * distance);

            if options.show_orbit_paths {
                backdrop.add_child(orbit_path(&planet.body.name, distance));
            }

            pivots.push(OrbitPivot {
                transform: Transform::IDENTITY,
                rate: planet.orbit.rate,
                body,
            });
        }

        log::info!(
            "Composed scene: sun + {} planets, {} textures requested",
            pivots.len(),
            assets.texture_count()
        );

        Ok(Self {
            sun,
            pivots,
            backdrop,
            ticks: 0,
        })
    }

    /// Advance one frame: spin the sun, revolve every pivot, spin every planet.
    pub fn tick(&mut self) {
        let sun_spin = self.sun.spin_rate();
        self.sun.advance(sun_spin);
        for pivot in &mut self.pivots {
            pivot.transform.rotation.y += pivot.rate;
            let spin = pivot.body.spin_rate();
            pivot.body.advance(spin);
        }
        self.ticks += 1;
    }

    /// Visit every node in the scene with its world matrix.
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&Mat4, &Node),
    {
        self.backdrop.walk(&Mat4::IDENTITY, visit);
        self.sun.group().walk(&Mat4::IDENTITY, visit);
        for pivot in &self.pivots {
            pivot.body.group().walk(&pivot.transform.matrix(), visit);
        }
    }

    pub fn sun(&self) -> &CelestialBody {
        &self.sun
    }

    pub fn pivots(&self) -> &[OrbitPivot] {
        &self.pivots
    }

    /// Look up the sun or a planet by name.
    pub fn body(&self, name: &str) -> Option<&CelestialBody> {
        std::iter::once(&self.sun)
            .chain(self.pivots.iter().map(|p| &p.body))
            .find(|b| b.name() == name)
    }

    pub fn body_mut(&mut self, name: &str) -> Option<&mut CelestialBody> {
        std::iter::once(&mut self.sun)
            .chain(self.pivots.iter_mut().map(|p| &mut p.body))
            .find(|b| b.name() == name)
    }

    pub fn pivot(&self, name: &str) -> Option<&OrbitPivot> {
        self.pivots.iter().find(|p| p.body.name() == name)
    }

    /// Ticks applied since the scene was built.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn orbit_path(name: &str, radius: f32) -> Node {
    let mut node = Node::with_content(
        format!("{name}-path"),
        NodeContent::Polyline(Polyline {
            points: orbit_circle(radius, ORBIT_PATH_SEGMENTS),
            color: hex_to_linear(ORBIT_PATH_COLOR),
        }),
    );
    // Lay the XY circle into the orbital (XZ) plane.
    node.transform.rotation.x = std::f32::consts::FRAC_PI_2;
    node
}
