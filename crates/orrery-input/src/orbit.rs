//! Orbit camera controller with damping.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use winit::event::MouseButton;

use crate::mouse::MouseState;

/// Keeps the camera off the poles, where yaw becomes degenerate.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitSettings {
    /// Fraction of rotation velocity applied (and removed) per update.
    /// Zero disables damping: drags apply immediately.
    pub damping: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// Distance multiplier per scroll line toward the target.
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            damping: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.95,
            min_distance: 1.0,
            max_distance: 2000.0,
        }
    }
}

/// Spherical-coordinate camera rig orbiting a target point.
///
/// Left-drag rotates, the wheel zooms. With damping the rotation keeps
/// gliding after the drag ends and decays geometrically.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    target: Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
    velocity: Vec2,
    settings: OrbitSettings,
}

impl OrbitControls {
    /// Start at `eye`, looking at `target`.
    pub fn new(eye: Vec3, target: Vec3, settings: OrbitSettings) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(f32::EPSILON);
        let mut controls = Self {
            target,
            distance: distance.clamp(settings.min_distance, settings.max_distance),
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            velocity: Vec2::ZERO,
            settings,
        };
        controls.pitch = controls.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        controls
    }

    /// Feed one frame of mouse input.
    pub fn handle_mouse(&mut self, mouse: &MouseState) {
        if mouse.is_pressed(MouseButton::Left) {
            self.rotate(mouse.delta());
        }
        if mouse.scroll() != 0.0 {
            self.zoom(mouse.scroll());
        }
    }

    /// Queue rotation from a drag of `pixels`.
    pub fn rotate(&mut self, pixels: Vec2) {
        // Dragging right swings the camera left around the target.
        self.velocity += Vec2::new(-pixels.x, pixels.y) * self.settings.rotate_speed;
    }

    /// Zoom by `lines` wheel lines; positive moves toward the target.
    pub fn zoom(&mut self, lines: f32) {
        self.distance = (self.distance * self.settings.zoom_speed.powf(lines))
            .clamp(self.settings.min_distance, self.settings.max_distance);
    }

    /// Apply queued rotation. Call once per frame.
    pub fn update(&mut self) {
        let damping = self.settings.damping.clamp(0.0, 1.0);
        let step = if damping > 0.0 {
            self.velocity * damping
        } else {
            self.velocity
        };

        self.yaw += step.x;
        self.pitch = (self.pitch + step.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        if damping > 0.0 {
            self.velocity *= 1.0 - damping;
        } else {
            self.velocity = Vec2::ZERO;
        }
    }

    /// Camera position.
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    /// Swap in new tuning, keeping the current pose within the new distance
    /// bounds.
    pub fn set_settings(&mut self, settings: OrbitSettings) {
        self.distance = self
            .distance
            .clamp(settings.min_distance, settings.max_distance);
        self.settings = settings;
    }
}
