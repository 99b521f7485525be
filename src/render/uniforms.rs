//! Uniform names shared with the shader sources.
//!
//! These strings are the wire contract between the scene and the GLSL
//! templates under `src/render/shaders`; renaming one requires the matching
//! template change.

pub const MODEL_VIEW_PROJECTION: &str = "modelviewprojection";
pub const PROJECTION: &str = "projection";
pub const VIEW: &str = "view";
pub const MODEL_MATRIX: &str = "modelMatrix";
pub const VIEW_MATRIX: &str = "viewMatrix";
pub const PROJ_MATRIX: &str = "projMatrix";
/// Eye direction for Lambertian shading (a `vec3`, distinct program from [`VIEW`]).
pub const VIEW_VECTOR: &str = "view";
pub const COLOR: &str = "color";
pub const DIFFUSE_MAP: &str = "diffuseMap";
pub const TIME: &str = "time";
pub const HEIGHT_GEYSER: &str = "height_geyser";
pub const CHARGE: &str = "charge";
pub const ID_PARTICLE: &str = "id_particle";

/// Name of the `index`-th element of the bone matrix array.
#[must_use]
pub fn bone_matrix(index: usize) -> String {
    format!("boneMatrix[{index}]")
}
