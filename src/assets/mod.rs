//! Asset loading
//!
//! - [`raw`]: serde-typed records a loader produces
//! - [`loader`]: the [`SceneLoader`] seam and its JSON implementation
//! - [`import`]: records → scene nodes, meshes and skinned meshes

pub mod import;
pub mod loader;
pub mod raw;

pub use import::{AssetImporter, Imported};
pub use loader::{JsonSceneLoader, SceneLoader};
pub use raw::{RawAnimation, RawMesh, RawNode, RawScene};
