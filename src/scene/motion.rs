//! Node animation behaviours
//!
//! A node either keeps the local matrix it was built with ([`Motion::Static`])
//! or has it recomputed from the incoming time on every update. The
//! procedural motions integrate over the time elapsed since their previous
//! update, so they are advanced exactly once per frame by the transform
//! system.

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::animation::{Playback, TransformTrack, TrsCursor};
use crate::math::{rotate, translate};

/// Ballistic hop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HopSettings {
    /// Downward acceleration, units per time unit².
    pub gravity: f32,
    /// Yaw speed while airborne, degrees per time unit.
    pub spin_speed: f32,
    /// Launch impulse is `charge / (launch_damping * height + 1)`.
    pub launch_damping: f32,
    /// How far back the subtree clock starts before the first launch.
    pub restart_offset: f32,
    /// Playback speed of the subtree animation.
    pub animation_time_scale: f32,
}

impl Default for HopSettings {
    fn default() -> Self {
        Self {
            gravity: 98.1,
            spin_speed: 30.0,
            launch_damping: 0.1,
            restart_offset: 10.0,
            animation_time_scale: 3.0,
        }
    }
}

impl HopSettings {
    /// Subtree clock for a hopping node created at `now`: starts
    /// `restart_offset` in the past and runs `animation_time_scale` times
    /// faster. A launch restarts it.
    #[must_use]
    pub fn clock(&self, now: f32) -> Playback {
        Playback::offset(now - self.restart_offset, self.animation_time_scale)
    }
}

/// Circular flight path parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    /// Degrees per time unit around the Y axis.
    pub angular_speed: f32,
    pub distance: f32,
    pub base_height: f32,
    pub amplitude: f32,
    /// Length of one up/down cycle, also the subtree animation period.
    pub period: f32,
    /// Phase of the height cosine, radians.
    pub phase: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            angular_speed: 20.0,
            distance: 40.0,
            base_height: 20.0,
            amplitude: 7.0,
            period: 5.0,
            phase: -0.5,
        }
    }
}

impl OrbitSettings {
    /// Subtree clock looping once per bobbing cycle.
    #[must_use]
    pub fn clock(&self) -> Playback {
        Playback::looping(self.period)
    }
}

/// Vertical jumps with a yaw spin while airborne.
///
/// Local transform is `R_y(angle) · T(0, height, 0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct HopMotion {
    pub settings: HopSettings,
    pub height: f32,
    pub velocity: f32,
    /// Accumulated yaw, degrees.
    pub angle: f32,
    last_time: Option<f32>,
}

impl HopMotion {
    #[must_use]
    pub fn new(settings: HopSettings) -> Self {
        Self {
            settings,
            height: 0.0,
            velocity: 0.0,
            angle: 0.0,
            last_time: None,
        }
    }

    /// Integrates up to `time` and returns the local matrix.
    pub fn update(&mut self, time: f32) -> Mat4 {
        let dt = self.last_time.map_or(0.0, |last| (time - last).max(0.0));
        self.last_time = Some(time);

        self.velocity -= self.settings.gravity * dt;
        self.height += self.velocity * dt;
        if self.height < 0.0 {
            self.height = 0.0;
            self.velocity = 0.0;
        } else {
            self.angle += self.settings.spin_speed * dt;
        }

        self.matrix()
    }

    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        rotate(Vec3::Y, self.angle) * translate(Vec3::new(0.0, self.height, 0.0))
    }

    /// Adds an upward impulse; higher hops receive less.
    pub fn launch(&mut self, charge: f32) {
        self.velocity += charge / (self.settings.launch_damping * self.height + 1.0);
    }

    #[must_use]
    pub fn is_airborne(&self) -> bool {
        self.height > 0.0 || self.velocity > 0.0
    }
}

/// Circles the parent origin while bobbing up and down.
///
/// Local transform is `R_y(angle) · T(distance, height, 0)` with
/// `height = base + amplitude · cos(phase + (t mod period) · 2π / period)`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitMotion {
    pub settings: OrbitSettings,
    /// Accumulated yaw, degrees.
    pub angle: f32,
    last_time: Option<f32>,
}

impl OrbitMotion {
    #[must_use]
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            settings,
            angle: 0.0,
            last_time: None,
        }
    }

    #[must_use]
    pub fn height_at(&self, time: f32) -> f32 {
        let s = &self.settings;
        if s.period <= 0.0 {
            return s.base_height + s.amplitude * s.phase.cos();
        }
        let cycle = time.rem_euclid(s.period);
        s.base_height + s.amplitude * (s.phase + cycle * TAU / s.period).cos()
    }

    pub fn update(&mut self, time: f32) -> Mat4 {
        let dt = self.last_time.map_or(0.0, |last| (time - last).max(0.0));
        self.last_time = Some(time);
        self.angle += self.settings.angular_speed * dt;

        rotate(Vec3::Y, self.angle)
            * translate(Vec3::new(self.settings.distance, self.height_at(time), 0.0))
    }
}

/// Per-node animation behaviour, dispatched by the transform system.
#[derive(Debug, Clone, Default)]
pub enum Motion {
    /// Local matrix set at construction and left alone.
    #[default]
    Static,
    /// Local matrix sampled from a shared T·R·S track.
    Keyframed {
        track: Arc<TransformTrack>,
        cursor: TrsCursor,
    },
    Hop(HopMotion),
    Orbit(OrbitMotion),
}

impl Motion {
    #[must_use]
    pub fn keyframed(track: Arc<TransformTrack>) -> Self {
        Motion::Keyframed {
            track,
            cursor: TrsCursor::default(),
        }
    }

    /// New local matrix for `time`, `None` for static nodes.
    pub fn resolve(&mut self, time: f32) -> Option<Mat4> {
        match self {
            Motion::Static => None,
            Motion::Keyframed { track, cursor } => Some(track.value_with_cursor(time, cursor)),
            Motion::Hop(hop) => Some(hop.update(time)),
            Motion::Orbit(orbit) => Some(orbit.update(time)),
        }
    }

    #[must_use]
    pub fn track(&self) -> Option<&Arc<TransformTrack>> {
        match self {
            Motion::Keyframed { track, .. } => Some(track),
            _ => None,
        }
    }
}
