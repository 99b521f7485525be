//! Transform algebra
//!
//! Homogeneous 4×4 builders and quaternion helpers on top of glam.
//! Angles are given in degrees, matching the asset and scene-building code.
//! All functions are pure.

use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};

/// Below this dot product distance slerp falls back to normalized lerp.
const SLERP_LINEAR_THRESHOLD: f32 = 1e-6;

#[inline]
#[must_use]
pub fn identity() -> Mat4 {
    Mat4::IDENTITY
}

#[inline]
#[must_use]
pub fn translate(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

#[inline]
#[must_use]
pub fn scale(factors: Vec3) -> Mat4 {
    Mat4::from_scale(factors)
}

#[inline]
#[must_use]
pub fn uniform_scale(factor: f32) -> Mat4 {
    Mat4::from_scale(Vec3::splat(factor))
}

/// Rotation of `degrees` around `axis`. A zero axis yields the identity.
#[must_use]
pub fn rotate(axis: Vec3, degrees: f32) -> Mat4 {
    Mat4::from_quat(quaternion(axis, degrees))
}

/// Unit quaternion for a rotation of `degrees` around `axis`.
#[must_use]
pub fn quaternion(axis: Vec3, degrees: f32) -> Quat {
    let Some(axis) = axis.try_normalize() else {
        return Quat::IDENTITY;
    };
    Quat::from_axis_angle(axis, degrees.to_radians())
}

/// Quaternion from XYZ Euler angles in degrees.
#[must_use]
pub fn quaternion_from_euler(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        x.to_radians(),
        y.to_radians(),
        z.to_radians(),
    )
}

/// Rotation matrix of a (possibly non-normalized) quaternion.
#[inline]
#[must_use]
pub fn quaternion_matrix(q: Quat) -> Mat4 {
    Mat4::from_quat(q.normalize())
}

/// T · R · S composition. The order is fixed.
#[inline]
#[must_use]
pub fn compose_trs(translation: Vec3, rotation: Quat, scale_factors: Vec3) -> Mat4 {
    translate(translation) * quaternion_matrix(rotation) * scale(scale_factors)
}

#[inline]
#[must_use]
pub fn lerp(start: f32, end: f32, fraction: f32) -> f32 {
    start + (end - start) * fraction
}

/// Spherical interpolation along the shortest arc.
///
/// The end quaternion is negated when the two inputs lie in opposite
/// hemispheres, so playback never takes the long way round.
#[must_use]
pub fn slerp_shortest(start: Quat, end: Quat, fraction: f32) -> Quat {
    let q0 = Vec4::from(start.normalize());
    let mut q1 = Vec4::from(end.normalize());

    let mut dot = q0.dot(q1);
    if dot < 0.0 {
        q1 = -q1;
        dot = -dot;
    }

    if dot > 1.0 - SLERP_LINEAR_THRESHOLD {
        return Quat::from_vec4(q0.lerp(q1, fraction).normalize());
    }

    let theta_0 = dot.clamp(-1.0, 1.0).acos();
    let theta = theta_0 * fraction;
    let sin_theta_0 = theta_0.sin();

    let s1 = theta.sin() / sin_theta_0;
    let s0 = theta.cos() - dot * s1;

    Quat::from_vec4((q0 * s0 + q1 * s1).normalize())
}

/// OpenGL-style perspective projection, `fovy` in degrees.
#[must_use]
pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fovy.to_radians(), aspect, near, far)
}

/// OpenGL-style frustum projection.
#[must_use]
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let dx = right - left;
    let dy = top - bottom;
    let dz = far - near;
    Mat4::from_cols(
        Vec4::new(2.0 * near / dx, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near / dy, 0.0, 0.0),
        Vec4::new((right + left) / dx, (top + bottom) / dy, -(far + near) / dz, -1.0),
        Vec4::new(0.0, 0.0, -2.0 * near * far / dz, 0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rotate_zero_axis_is_identity() {
        assert_eq!(rotate(Vec3::ZERO, 45.0), Mat4::IDENTITY);
    }

    #[test]
    fn rotate_uses_degrees() {
        let m = rotate(Vec3::Y, 90.0);
        let expected = Mat4::from_rotation_y(FRAC_PI_2);
        assert!(m.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn frustum_matches_perspective_for_symmetric_volume() {
        let near = 0.1;
        let far = 100.0;
        let top = near * (30.0_f32).to_radians().tan();
        let f = frustum(-top, top, -top, top, near, far);
        let p = perspective(60.0, 1.0, near, far);
        assert!(f.abs_diff_eq(p, 1e-4));
    }

    #[test]
    fn slerp_opposite_hemisphere_takes_short_arc() {
        let q0 = Quat::from_rotation_z(0.1);
        let q1 = -Quat::from_rotation_z(0.3);
        let mid = slerp_shortest(q0, q1, 0.5);
        let expected = Quat::from_rotation_z(0.2);
        assert!(mid.angle_between(expected) < 1e-4);
    }
}
