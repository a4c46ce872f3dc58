//! The built-in system: the sun and eight planets.
//!
//! Radii, distances and rates are hand-tuned for appearance, not to scale.

use std::path::PathBuf;

use crate::body::{BodyConfig, GlowConfig, MoonConfig, RingConfig, ShellConfig};
use crate::fresnel::FresnelParams;
use crate::material::Blending;
use crate::system::{OrbitConfig, PlanetConfig, SystemConfig};

fn shell(name: &str, texture: &str, radius_factor: f32, opacity: f32) -> ShellConfig {
    ShellConfig {
        name: name.to_string(),
        texture: PathBuf::from(texture),
        radius_factor,
        opacity,
        blending: Blending::Additive,
        transparent: true,
        spin_rate: 0.0,
    }
}

fn glow(radius_factor: f32, stretch: [f32; 3], fresnel: FresnelParams) -> Option<GlowConfig> {
    Some(GlowConfig {
        radius_factor,
        stretch,
        fresnel,
    })
}

fn rim(rim_color: u32, bias: f32, scale: f32, power: f32) -> FresnelParams {
    FresnelParams {
        rim_color,
        facing_color: 0x000000,
        bias,
        scale,
        power,
    }
}

fn ring(inner: f32, outer: f32, texture: &str, opacity: f32) -> Option<RingConfig> {
    Some(RingConfig {
        inner_radius_factor: inner,
        outer_radius_factor: outer,
        texture: PathBuf::from(texture),
        opacity,
        theta_segments: 64,
        phi_segments: 8,
        metalness: 0.2,
    })
}

fn planet(body: BodyConfig, base_distance: f32, rate: f32) -> PlanetConfig {
    PlanetConfig {
        body,
        orbit: OrbitConfig {
            base_distance,
            rate,
        },
    }
}

fn sun() -> BodyConfig {
    BodyConfig {
        spin_rate: 0.002,
        shells: vec![shell("fire", "sunmap.jpg", 1.01, 0.7)],
        glow: glow(1.02, [1.2; 3], rim(0xf19504, 0.4, 0.2, 4.0)),
        ..BodyConfig::sphere("sun", 50.0, "2k_sun.jpg")
    }
}

fn mercury() -> BodyConfig {
    BodyConfig {
        spin_rate: 0.002,
        shells: vec![shell("bump", "mercurybump.jpg", 1.01, 0.3)],
        glow: glow(1.02, [1.0, 1.05, 1.05], rim(0xe9edde, 0.4, 0.3, 4.0)),
        ..BodyConfig::sphere("mercury", 0.35, "2k_mercury.jpg")
    }
}

fn venus() -> BodyConfig {
    BodyConfig {
        spin_rate: 0.002,
        shells: vec![shell("bump", "venusbump.jpg", 1.01, 0.2)],
        glow: glow(1.04, [1.0, 1.05, 1.05], rim(0xf2b70e, 0.4, 0.3, 4.0)),
        ..BodyConfig::sphere("venus", 0.87, "2k_venus_surface.jpg")
    }
}

fn earth() -> BodyConfig {
    let lights = ShellConfig {
        transparent: false,
        ..shell("lights", "2k_earth_nightmap.jpg", 1.02, 1.0)
    };
    let clouds = ShellConfig {
        spin_rate: 0.005_000_1,
        ..shell("clouds", "2k_earth_clouds.jpg", 1.03, 0.6)
    };
    let moon = MoonConfig {
        name: "moon".to_string(),
        radius: 0.18,
        distance: 1.5,
        texture: PathBuf::from("moonmap4k.jpg"),
        bump_texture: Some(PathBuf::from("moonbump4k.jpg")),
        bump_opacity: 0.4,
        axial_tilt_deg: 50.0,
        orbit_rate: 0.015,
        mesh: None,
    };
    BodyConfig {
        axial_tilt_deg: 25.0,
        spin_rate: 0.005,
        shells: vec![shell("bump", "earthbump1k.jpg", 1.01, 0.4), lights, clouds],
        glow: glow(1.04, [1.0; 3], rim(0x0088ff, 0.4, 0.3, 4.0)),
        moons: vec![moon],
        ..BodyConfig::sphere("earth", 0.92, "2k_earth_daymap.jpg")
    }
}

fn mars() -> BodyConfig {
    BodyConfig {
        spin_rate: 0.002,
        shells: vec![shell("bump", "mars_1k_topo.jpg", 1.01, 0.3)],
        glow: glow(1.02, [1.0; 3], rim(0xf2b70e, 0.4, 0.3, 4.0)),
        ..BodyConfig::sphere("mars", 0.49, "2k_mars.jpg")
    }
}

fn jupiter() -> BodyConfig {
    BodyConfig {
        spin_rate: 0.002,
        glow: glow(1.01, [1.01; 3], rim(0xecebd6, 0.2, 0.3, 4.0)),
        ..BodyConfig::sphere("jupiter", 10.2, "jupiter2_4k.jpg")
    }
}

fn saturn() -> BodyConfig {
    BodyConfig {
        axial_tilt_deg: 25.0,
        spin_rate: 0.01,
        glow: glow(1.02, [1.01; 3], rim(0xecebd6, 0.4, 0.2, 2.0)),
        ring: ring(1.1, 2.3, "2k_saturn_ring_alpha.png", 0.8),
        ..BodyConfig::sphere("saturn", 8.5, "2k_saturn.jpg")
    }
}

fn uranus() -> BodyConfig {
    BodyConfig {
        spin_rate: 0.002,
        glow: glow(1.02, [1.01; 3], rim(0x71e6ec, 0.4, 0.2, 2.0)),
        ring: ring(1.4, 1.7, "uranusringcolour.jpg", 0.5),
        ..BodyConfig::sphere("uranus", 3.7, "2k_uranus.jpg")
    }
}

fn neptune() -> BodyConfig {
    BodyConfig {
        spin_rate: 0.002,
        glow: glow(1.02, [1.01; 3], rim(0x5cbdc2, 0.5, 0.3, 4.0)),
        ..BodyConfig::sphere("neptune", 3.6, "2k_neptune.jpg")
    }
}

/// The sun and the eight planets, innermost first.
pub fn solar_system() -> SystemConfig {
    SystemConfig {
        sun: sun(),
        planets: vec![
            planet(mercury(), 4.1, 0.008),
            planet(venus(), 7.7, 0.007),
            planet(earth(), 10.7, 0.006),
            planet(mars(), 16.3, 0.005),
            planet(jupiter(), 55.8, 0.003),
            planet(saturn(), 102.4, 0.0025),
            planet(uranus(), 204.9, 0.002),
            planet(neptune(), 319.7, 0.0015),
        ],
    }
}
