use glam::{Mat4, Vec3};

use crate::math::perspective;

/// A perspective camera looking at a target point.
///
/// Produces the projection and view matrices handed to every draw, plus the
/// view vector used as the Lambertian light direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: String,

    // === Projection ===
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,

    // === Placement ===
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov: f32, near: f32, far: f32) -> Self {
        Self {
            name: "Camera".to_string(),
            fov,
            near,
            far,
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }

    #[must_use]
    pub fn looking_at(mut self, eye: Vec3, target: Vec3) -> Self {
        self.eye = eye;
        self.target = target;
        self
    }

    /// Projection for a viewport of `width × height` pixels.
    #[must_use]
    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        perspective(self.fov, aspect, self.near, self.far)
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Unit vector from the target towards the eye.
    #[must_use]
    pub fn view_vector(&self) -> Vec3 {
        (self.eye - self.target).try_normalize().unwrap_or(Vec3::Z)
    }

    /// Rotates the eye around the target: `yaw` about `up`, `pitch` about the
    /// camera's right axis, both in degrees.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.eye - self.target;
        let right = offset.cross(self.up).try_normalize().unwrap_or(Vec3::X);
        let rotation = glam::Quat::from_axis_angle(self.up, yaw.to_radians())
            * glam::Quat::from_axis_angle(right, pitch.to_radians());
        self.eye = self.target + rotation * offset;
    }

    /// Moves the eye along the view direction, keeping the distance in `[min, max]`.
    pub fn zoom(&mut self, delta: f32, min: f32, max: f32) {
        let offset = self.eye - self.target;
        let distance = (offset.length() - delta).clamp(min, max);
        self.eye = self.target + offset.normalize_or(Vec3::Z) * distance;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_perspective(35.0, 0.1, 2000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_vector_points_at_eye() {
        let camera = Camera::default().looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        assert!((camera.view_vector() - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn zoom_respects_bounds() {
        let mut camera = Camera::default().looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        camera.zoom(100.0, 1.0, 50.0);
        assert!(((camera.eye - camera.target).length() - 1.0).abs() < 1e-5);
    }
}
