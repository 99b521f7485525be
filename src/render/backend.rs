//! Rendering backend boundary
//!
//! The scene never talks to a graphics API directly. Leaves call the
//! operations below by uniform name; the names in [`uniforms`](super::uniforms)
//! form the contract with the shader sources.

use std::path::Path;

use glam::{Mat4, Vec3, Vec4};

use crate::errors::Result;
use crate::resources::Geometry;

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a backend-specific identifier.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            #[must_use]
            pub const fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

opaque_handle!(
    /// A compiled and linked shader program, as returned by
    /// [`RenderBackend::compile_program`].
    ProgramHandle
);

opaque_handle!(
    /// An uploaded vertex/index buffer set.
    GeometryHandle
);

opaque_handle!(
    /// An uploaded texture.
    TextureHandle
);

/// Operations the scene needs from the graphics API.
pub trait RenderBackend {
    /// Compiles and links a program. Failures carry the backend log.
    fn compile_program(&mut self, label: &str, vertex: &str, fragment: &str) -> Result<ProgramHandle>;

    fn upload_geometry(&mut self, geometry: &Geometry) -> GeometryHandle;

    /// Loads a texture file, `None` when it cannot be read.
    fn load_texture(&mut self, path: &Path) -> Option<TextureHandle>;

    fn use_program(&mut self, program: ProgramHandle);

    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4);

    fn set_uniform_vec3(&mut self, name: &str, value: Vec3);

    fn set_uniform_vec4(&mut self, name: &str, value: Vec4);

    fn set_uniform_f32(&mut self, name: &str, value: f32);

    fn set_uniform_i32(&mut self, name: &str, value: i32);

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Indexed triangle draw of the whole geometry.
    fn draw_indexed(&mut self, geometry: GeometryHandle);

    fn set_depth_write(&mut self, enabled: bool);

    fn set_blending(&mut self, enabled: bool);
}
