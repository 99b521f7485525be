//! Scene graph
//!
//! Manages the node hierarchy and the drawables hanging off it:
//! - [`Node`]: local/world matrices, inheritable [`DrawParams`], a [`Motion`]
//! - [`Scene`]: arenas for nodes, meshes, skinned meshes and emitters
//! - [`transform_system`]: per-frame propagation and render-list extraction
//! - [`SkinnedMesh`]: bone matrices from bone nodes' world transforms
//! - [`GeyserEmitter`]: timed particle emissions
//! - [`procedural`]: vegetation and demo hierarchies sharing one mesh

pub mod camera;
pub mod emitter;
pub mod motion;
pub mod node;
pub mod params;
pub mod procedural;
pub mod scene;
pub mod skeleton;
pub mod transform_system;

pub use camera::Camera;
pub use emitter::{Emission, EmissionId, EmissionPhase, GeyserEmitter, GeyserSettings};
pub use motion::{HopMotion, HopSettings, Motion, OrbitMotion, OrbitSettings};
pub use node::{Leaf, Node};
pub use params::DrawParams;
pub use scene::{ChargeTarget, NodeBuilder, Scene};
pub use skeleton::{MAX_BONES, SkinnedMesh};
pub use transform_system::RenderItem;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct SkinKey;
    pub struct EmitterKey;
}
