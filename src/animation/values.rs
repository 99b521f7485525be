use glam::{Quat, Vec3, Vec4};

use crate::math::slerp_shortest;

/// Values that can be blended between two keyframes.
pub trait Interpolatable: Copy + Clone + Sized {
    /// Blends `start` towards `end` by `t` in `[0, 1]`.
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Vec4 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

/// Quaternions blend spherically along the shortest arc.
impl Interpolatable for Quat {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        slerp_shortest(start, end, t)
    }
}
