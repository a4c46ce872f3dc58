//! Data-driven celestial bodies.
//!
//! Every body in the scene, sun included, is produced by the same
//! [`CelestialBody::construct`] from a [`BodyConfig`] record.

mod builder;
mod config;

pub use builder::{BuildOptions, CelestialBody};
pub use config::{BodyConfig, GlowConfig, MoonConfig, RingConfig, ShellConfig};
