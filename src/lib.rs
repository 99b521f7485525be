#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod app;
pub mod assets;
pub mod errors;
pub mod math;
pub mod render;
pub mod resources;
pub mod scene;
pub mod utils;

pub use animation::{AnimationClip, Interpolation, KeyframeTrack, LoopMode, Playback, TransformTrack};
pub use app::{ChargeController, ChargePolicy, EngineSettings, FrameDriver, LinearRamp};
pub use assets::{AssetImporter, Imported, JsonSceneLoader, SceneLoader};
pub use errors::{Result, SceneError};
pub use render::{FrameContext, FrameStats, RecordingBackend, RenderBackend, ShaderKind, ShaderLibrary, render_scene};
pub use resources::{Geometry, Mesh, MeshMaterial, SkinInfluence};
pub use scene::{Camera, DrawParams, GeyserEmitter, Leaf, Node, NodeHandle, Scene, SkinnedMesh};
