//! Deterministic background star field.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::graph::{Node, NodeContent, PointCloud};

/// Star colours share one pale blue hue and vary only in lightness.
const STAR_HUE: f32 = 0.6;
const STAR_SATURATION: f32 = 0.2;

/// A single background star.
#[derive(Clone, Debug, PartialEq)]
pub struct StarPoint {
    pub position: Vec3,
    /// Linear RGB.
    pub color: Vec3,
}

/// Star field parameters taken from the scene configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarFieldSettings {
    pub count: u32,
    pub seed: u64,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

/// Scatters stars uniformly by direction inside a spherical shell.
pub struct StarFieldGenerator {
    settings: StarFieldSettings,
}

impl StarFieldGenerator {
    pub fn new(settings: StarFieldSettings) -> Self {
        Self { settings }
    }

    /// Generate the stars. Identical seeds give identical fields.
    pub fn generate(&self) -> Vec<StarPoint> {
        let StarFieldSettings {
            count,
            seed,
            inner_radius,
            outer_radius,
        } = self.settings;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        (0..count)
            .map(|_| {
                let theta = rng.random::<f32>() * std::f32::consts::TAU;
                let phi = (1.0 - 2.0 * rng.random::<f32>()).acos();
                let direction =
                    Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
                let radius = inner_radius + rng.random::<f32>() * (outer_radius - inner_radius);
                let lightness = rng.random::<f32>();
                StarPoint {
                    position: direction * radius,
                    color: Vec3::from_array(hsl_to_rgb(STAR_HUE, STAR_SATURATION, lightness)),
                }
            })
            .collect()
    }

    /// Generate the stars as a scene node.
    pub fn build_node(&self) -> Node {
        let stars = self.generate();
        let cloud = PointCloud {
            positions: stars.iter().map(|s| s.position).collect(),
            colors: stars.iter().map(|s| s.color).collect(),
        };
        Node::with_content("stars", NodeContent::Points(cloud))
    }
}

/// HSL (all components in [0, 1]) to RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s == 0.0 {
        return [l; 3];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(seed: u64, count: u32) -> StarFieldSettings {
        StarFieldSettings {
            count,
            seed,
            inner_radius: 1200.0,
            outer_radius: 2000.0,
        }
    }

    #[test]
    fn test_star_count() {
        assert_eq!(StarFieldGenerator::new(settings(42, 5000)).generate().len(), 5000);
    }

    #[test]
    fn test_stars_lie_in_shell() {
        for star in StarFieldGenerator::new(settings(42, 2000)).generate() {
            let r = star.position.length();
            assert!((1199.9..=2000.1).contains(&r), "radius {r}");
        }
    }

    #[test]
    fn test_distribution_covers_every_octant() {
        let mut octants = [0u32; 8];
        for star in StarFieldGenerator::new(settings(7, 4000)).generate() {
            let p = star.position;
            let i = (p.x >= 0.0) as usize | ((p.y >= 0.0) as usize) << 1 | ((p.z >= 0.0) as usize) << 2;
            octants[i] += 1;
        }
        assert!(octants.iter().all(|&n| (250..=750).contains(&n)), "{octants:?}");
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = StarFieldGenerator::new(settings(123, 500)).generate();
        let b = StarFieldGenerator::new(settings(123, 500)).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_field() {
        let a = StarFieldGenerator::new(settings(1, 500)).generate();
        let b = StarFieldGenerator::new(settings(2, 500)).generate();
        let differing = a
            .iter()
            .zip(&b)
            .filter(|(x, y)| (x.position - y.position).length() > 1.0)
            .count();
        assert!(differing > 450);
    }

    #[test]
    fn test_colors_are_bluish_and_in_range() {
        for star in StarFieldGenerator::new(settings(9, 1000)).generate() {
            let c = star.color;
            assert!(c.min_element() >= 0.0 && c.max_element() <= 1.0);
            assert!(c.z >= c.x - 1e-6, "hue 0.6 should not be redder than blue: {c}");
        }
    }

    #[test]
    fn test_hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-6 && red[1].abs() < 1e-6 && red[2].abs() < 1e-6);
        assert_eq!(hsl_to_rgb(0.3, 0.0, 0.25), [0.25; 3]);
    }

    #[test]
    fn test_build_node_holds_points() {
        let node = StarFieldGenerator::new(settings(3, 64)).build_node();
        match node.content {
            NodeContent::Points(cloud) => {
                assert_eq!(cloud.positions.len(), 64);
                assert_eq!(cloud.colors.len(), 64);
            }
            other => panic!("unexpected content {other:?}"),
        }
    }
}
