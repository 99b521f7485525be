//! CPU-side resources
//!
//! - [`Geometry`]: vertex attributes, skin influences and indices
//! - [`Mesh`]: an uploaded geometry paired with a material, shared by key

pub mod geometry;
pub mod mesh;

pub use geometry::{Geometry, SkinInfluence, VertexAttribute, MAX_VERTEX_BONES};
pub use mesh::{Mesh, MeshMaterial};
