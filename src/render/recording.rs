//! Headless backend
//!
//! [`RecordingBackend`] implements [`RenderBackend`] by appending every call
//! to a command list. It hands out sequential handles, tracks the blend and
//! depth-write state, and can be told to reject specific programs so the
//! failure paths of the shader library are reachable without a GPU.

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3, Vec4};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{Result, SceneError};
use crate::render::backend::{GeometryHandle, ProgramHandle, RenderBackend, TextureHandle};
use crate::resources::Geometry;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    CompileProgram { label: String, program: ProgramHandle },
    /// `attributes` holds `(location, byte length)` per planar buffer.
    UploadGeometry {
        geometry: GeometryHandle,
        vertices: usize,
        indices: usize,
        attributes: Vec<(u32, usize)>,
        index_bytes: usize,
    },
    LoadTexture { path: PathBuf, texture: TextureHandle },
    UseProgram(ProgramHandle),
    UniformMat4 { name: String, value: Mat4 },
    UniformVec3 { name: String, value: Vec3 },
    UniformVec4 { name: String, value: Vec4 },
    UniformF32 { name: String, value: f32 },
    UniformI32 { name: String, value: i32 },
    BindTexture { unit: u32, texture: TextureHandle },
    /// An indexed draw with the state it was issued under.
    Draw {
        program: Option<ProgramHandle>,
        geometry: GeometryHandle,
        depth_write: bool,
        blending: bool,
    },
    DepthWrite(bool),
    Blending(bool),
}

#[derive(Debug)]
pub struct RecordingBackend {
    commands: Vec<RenderCommand>,
    next_handle: u64,
    failing_programs: FxHashSet<String>,
    programs: FxHashMap<String, ProgramHandle>,
    current_program: Option<ProgramHandle>,
    depth_write: bool,
    blending: bool,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            next_handle: 1,
            failing_programs: FxHashSet::default(),
            programs: FxHashMap::default(),
            current_program: None,
            depth_write: true,
            blending: false,
        }
    }

    /// Makes the program labelled `label` fail to compile.
    #[must_use]
    pub fn failing_program(mut self, label: &str) -> Self {
        self.failing_programs.insert(label.to_string());
        self
    }

    fn next(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Forgets recorded commands, keeping handles and state.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    #[must_use]
    pub fn program(&self, label: &str) -> Option<ProgramHandle> {
        self.programs.get(label).copied()
    }

    #[must_use]
    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    #[must_use]
    pub fn blending(&self) -> bool {
        self.blending
    }

    /// Number of draw commands recorded.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, RenderCommand::Draw { .. }))
            .count()
    }

    /// Last value written to the matrix uniform `name`.
    #[must_use]
    pub fn last_mat4(&self, name: &str) -> Option<Mat4> {
        self.commands.iter().rev().find_map(|command| match command {
            RenderCommand::UniformMat4 { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }

    /// Every value written to the scalar uniform `name`, in order.
    #[must_use]
    pub fn f32_values(&self, name: &str) -> Vec<f32> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::UniformF32 { name: n, value } if n == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Names of every uniform set, in order, duplicates included.
    #[must_use]
    pub fn uniform_names(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::UniformMat4 { name, .. }
                | RenderCommand::UniformVec3 { name, .. }
                | RenderCommand::UniformVec4 { name, .. }
                | RenderCommand::UniformF32 { name, .. }
                | RenderCommand::UniformI32 { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn compile_program(&mut self, label: &str, vertex: &str, fragment: &str) -> Result<ProgramHandle> {
        if self.failing_programs.contains(label) {
            return Err(SceneError::ShaderCompile {
                label: label.to_string(),
                stage: "vertex",
                log: format!("rejected ({} + {} bytes)", vertex.len(), fragment.len()),
            });
        }

        let program = ProgramHandle::new(self.next());
        self.programs.insert(label.to_string(), program);
        self.commands.push(RenderCommand::CompileProgram {
            label: label.to_string(),
            program,
        });
        Ok(program)
    }

    fn upload_geometry(&mut self, geometry: &Geometry) -> GeometryHandle {
        let handle = GeometryHandle::new(self.next());
        self.commands.push(RenderCommand::UploadGeometry {
            geometry: handle,
            vertices: geometry.vertex_count(),
            indices: geometry.indices.len(),
            attributes: geometry
                .attributes()
                .iter()
                .map(|attribute| (attribute.location, attribute.data.len()))
                .collect(),
            index_bytes: geometry.index_bytes().len(),
        });
        handle
    }

    fn load_texture(&mut self, path: &Path) -> Option<TextureHandle> {
        if !path.is_file() {
            return None;
        }
        let texture = TextureHandle::new(self.next());
        self.commands.push(RenderCommand::LoadTexture {
            path: path.to_path_buf(),
            texture,
        });
        Some(texture)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.current_program = Some(program);
        self.commands.push(RenderCommand::UseProgram(program));
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4) {
        self.commands.push(RenderCommand::UniformMat4 {
            name: name.to_string(),
            value: *value,
        });
    }

    fn set_uniform_vec3(&mut self, name: &str, value: Vec3) {
        self.commands.push(RenderCommand::UniformVec3 {
            name: name.to_string(),
            value,
        });
    }

    fn set_uniform_vec4(&mut self, name: &str, value: Vec4) {
        self.commands.push(RenderCommand::UniformVec4 {
            name: name.to_string(),
            value,
        });
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        self.commands.push(RenderCommand::UniformF32 {
            name: name.to_string(),
            value,
        });
    }

    fn set_uniform_i32(&mut self, name: &str, value: i32) {
        self.commands.push(RenderCommand::UniformI32 {
            name: name.to_string(),
            value,
        });
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.commands.push(RenderCommand::BindTexture { unit, texture });
    }

    fn draw_indexed(&mut self, geometry: GeometryHandle) {
        self.commands.push(RenderCommand::Draw {
            program: self.current_program,
            geometry,
            depth_write: self.depth_write,
            blending: self.blending,
        });
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
        self.commands.push(RenderCommand::DepthWrite(enabled));
    }

    fn set_blending(&mut self, enabled: bool) {
        self.blending = enabled;
        self.commands.push(RenderCommand::Blending(enabled));
    }
}
