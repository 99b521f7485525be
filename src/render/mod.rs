//! Rendering boundary
//!
//! - [`backend`]: the [`RenderBackend`] trait and opaque handles
//! - [`uniforms`]: uniform names shared with the GLSL sources
//! - [`shader_manager`]: templated shaders and the compiled [`ShaderLibrary`]
//! - [`state`]: scoped blend state
//! - [`draw`]: leaf submission for an updated scene
//! - [`recording`]: headless backend that records calls

pub mod backend;
pub mod draw;
pub mod recording;
pub mod shader_manager;
pub mod state;
pub mod uniforms;

pub use backend::{GeometryHandle, ProgramHandle, RenderBackend, TextureHandle};
pub use draw::{FrameContext, FrameStats, render_scene};
pub use recording::{RecordingBackend, RenderCommand};
pub use shader_manager::{ShaderKind, ShaderLibrary, ShaderSettings};
pub use state::BlendScope;
