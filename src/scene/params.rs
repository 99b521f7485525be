use glam::{Vec3, Vec4};

use crate::render::ShaderKind;

/// Inheritable draw parameters.
///
/// A node's own fields override what it inherits; unset fields fall through.
/// Descendants see the merged result, never a replacement, so a colour set
/// at the root reaches every leaf unless a node below redefines it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawParams {
    /// RGBA colour for shaders that take one (Lambertian).
    pub color: Option<Vec4>,
    /// Eye/light direction for Lambertian shading.
    pub view_vector: Option<Vec3>,
    /// Program override for every leaf below.
    pub shader: Option<ShaderKind>,
    /// Fixed time for this subtree, replacing the frame time.
    pub time: Option<f32>,
}

impl DrawParams {
    pub const NONE: Self = Self {
        color: None,
        view_vector: None,
        shader: None,
        time: None,
    };

    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = Some(color);
        self
    }

    /// Colour from 8-bit style components (`0..=255`) or unit floats.
    ///
    /// Values above one are treated as bytes and divided by 255.
    #[must_use]
    pub fn with_rgb(self, r: f32, g: f32, b: f32) -> Self {
        let rgb = Vec3::new(r, g, b);
        let rgb = if rgb.max_element() > 1.0 { rgb / 255.0 } else { rgb };
        self.with_color(rgb.extend(1.0))
    }

    #[must_use]
    pub fn with_view_vector(mut self, view_vector: Vec3) -> Self {
        self.view_vector = Some(view_vector);
        self
    }

    #[must_use]
    pub fn with_shader(mut self, shader: ShaderKind) -> Self {
        self.shader = Some(shader);
        self
    }

    #[must_use]
    pub fn with_time(mut self, time: f32) -> Self {
        self.time = Some(time);
        self
    }

    /// `own` layered over `self`, field by field.
    #[must_use]
    pub fn merged(&self, own: &DrawParams) -> DrawParams {
        DrawParams {
            color: own.color.or(self.color),
            view_vector: own.view_vector.or(self.view_vector),
            shader: own.shader.or(self.shader),
            time: own.time.or(self.time),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}
