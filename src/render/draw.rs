//! Leaf submission
//!
//! Turns the render list of an updated [`Scene`] into backend calls. Opaque
//! leaves go first in traversal order; blended leaves (emitters, overlay
//! quads) follow inside a [`BlendScope`], so they blend against a complete
//! depth buffer without writing to it.

use glam::{Mat4, Vec3, Vec4};

use crate::errors::Result;
use crate::render::backend::RenderBackend;
use crate::render::shader_manager::{ShaderKind, ShaderLibrary};
use crate::render::state::BlendScope;
use crate::render::uniforms;
use crate::resources::Mesh;
use crate::scene::emitter::GeyserEmitter;
use crate::scene::skeleton::SkinnedMesh;
use crate::scene::{Leaf, RenderItem, Scene};

/// Colour used by Lambertian meshes when no node sets one.
pub const DEFAULT_COLOR: Vec4 = Vec4::ONE;

/// Per-frame inputs shared by every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub projection: Mat4,
    pub view: Mat4,
    /// Default Lambertian direction when no node sets one.
    pub view_vector: Vec3,
    pub time: f32,
    /// Normalised charge in `[0, 1]` for the overlay gauge.
    pub charge_level: f32,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            view_vector: Vec3::Z,
            time: 0.0,
            charge_level: 0.0,
        }
    }
}

/// What a frame submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub opaque_items: usize,
    pub blended_items: usize,
    pub skinned_meshes: usize,
    /// Emissions drawn, over every emitter.
    pub emissions: usize,
    pub draw_calls: usize,
}

/// Submits every leaf collected by the last [`Scene::update`].
pub fn render_scene(
    scene: &Scene,
    frame: &FrameContext,
    backend: &mut dyn RenderBackend,
    shaders: &ShaderLibrary,
) -> Result<FrameStats> {
    let mut stats = FrameStats::default();
    let items = scene.render_list();

    for item in items.iter().filter(|item| !is_blended(scene, item)) {
        draw_item(scene, item, frame, backend, shaders, &mut stats)?;
        stats.opaque_items += 1;
    }

    if items.iter().any(|item| is_blended(scene, item)) {
        let mut blend = BlendScope::begin(backend);
        for item in items.iter().filter(|item| is_blended(scene, item)) {
            draw_item(scene, item, frame, &mut *blend, shaders, &mut stats)?;
            stats.blended_items += 1;
        }
    }

    Ok(stats)
}

fn is_blended(scene: &Scene, item: &RenderItem) -> bool {
    match item.leaf {
        Leaf::Mesh(key) => scene
            .meshes
            .get(key)
            .is_some_and(|mesh| mesh.material.is_blended()),
        Leaf::Skinned(_) => false,
        Leaf::Emitter(_) => true,
    }
}

fn draw_item(
    scene: &Scene,
    item: &RenderItem,
    frame: &FrameContext,
    backend: &mut dyn RenderBackend,
    shaders: &ShaderLibrary,
    stats: &mut FrameStats,
) -> Result<()> {
    match item.leaf {
        Leaf::Mesh(key) => {
            if let Some(mesh) = scene.meshes.get(key).filter(|mesh| mesh.visible) {
                draw_mesh(mesh, item, frame, backend, shaders)?;
                stats.draw_calls += 1;
            }
        }
        Leaf::Skinned(key) => {
            if let Some(skin) = scene.skins.get(key) {
                draw_skinned(skin, frame, backend, shaders)?;
                stats.skinned_meshes += 1;
                stats.draw_calls += 1;
            }
        }
        Leaf::Emitter(key) => {
            if let Some(emitter) = scene.emitters.get(key) {
                let now = scene.last_update().unwrap_or(frame.time);
                let (emissions, draws) = draw_emitter(emitter, now, item, frame, backend, shaders)?;
                stats.emissions += emissions;
                stats.draw_calls += draws;
            }
        }
    }
    Ok(())
}

fn set_transform_uniforms(backend: &mut dyn RenderBackend, kind: ShaderKind, frame: &FrameContext, model: &Mat4) {
    match kind {
        ShaderKind::Color | ShaderKind::Textured | ShaderKind::Skybox => {
            let mvp = frame.projection * frame.view * *model;
            backend.set_uniform_mat4(uniforms::MODEL_VIEW_PROJECTION, &mvp);
        }
        ShaderKind::Lambertian | ShaderKind::Geyser => {
            backend.set_uniform_mat4(uniforms::MODEL_MATRIX, model);
            backend.set_uniform_mat4(uniforms::VIEW_MATRIX, &frame.view);
            backend.set_uniform_mat4(uniforms::PROJ_MATRIX, &frame.projection);
        }
        ShaderKind::Skinning => {
            backend.set_uniform_mat4(uniforms::PROJECTION, &frame.projection);
            backend.set_uniform_mat4(uniforms::VIEW, &frame.view);
        }
        // Already in clip space.
        ShaderKind::Overlay => {}
    }
}

/// Static, textured, skybox and overlay meshes.
pub fn draw_mesh(
    mesh: &Mesh,
    item: &RenderItem,
    frame: &FrameContext,
    backend: &mut dyn RenderBackend,
    shaders: &ShaderLibrary,
) -> Result<()> {
    let kind = item.params.shader.unwrap_or(mesh.material.default_shader());
    let program = shaders.require(kind)?;

    backend.use_program(program);
    set_transform_uniforms(backend, kind, frame, &item.world);

    if let Some(texture) = mesh.material.texture() {
        backend.bind_texture(0, texture);
        backend.set_uniform_i32(uniforms::DIFFUSE_MAP, 0);
    }

    match kind {
        ShaderKind::Lambertian => {
            let view_vector = item.params.view_vector.unwrap_or(frame.view_vector);
            backend.set_uniform_vec3(uniforms::VIEW_VECTOR, view_vector);
            backend.set_uniform_vec4(uniforms::COLOR, item.params.color.unwrap_or(DEFAULT_COLOR));
        }
        ShaderKind::Overlay => {
            backend.set_uniform_f32(uniforms::CHARGE, frame.charge_level);
        }
        _ => {}
    }

    backend.draw_indexed(mesh.geometry);
    Ok(())
}

/// Skinned meshes always use the skinning program; their bone matrices are
/// already in world space, so the owning node's matrix is not applied.
pub fn draw_skinned(
    skin: &SkinnedMesh,
    frame: &FrameContext,
    backend: &mut dyn RenderBackend,
    shaders: &ShaderLibrary,
) -> Result<()> {
    let program = shaders.require(ShaderKind::Skinning)?;

    backend.use_program(program);
    set_transform_uniforms(backend, ShaderKind::Skinning, frame, &Mat4::IDENTITY);
    for (i, matrix) in skin.bone_matrices().iter().enumerate() {
        backend.set_uniform_mat4(&uniforms::bone_matrix(i), matrix);
    }

    backend.draw_indexed(skin.geometry);
    Ok(())
}

/// Draws every live emission of `emitter`, one call per particle.
///
/// Emissions are stamped, retired and drawn on the scene's frame time.
/// Subtree clocks and time overrides above the emitter node do not apply.
///
/// Returns `(emissions, draw calls)`.
pub fn draw_emitter(
    emitter: &GeyserEmitter,
    now: f32,
    item: &RenderItem,
    frame: &FrameContext,
    backend: &mut dyn RenderBackend,
    shaders: &ShaderLibrary,
) -> Result<(usize, usize)> {
    let mut emissions = 0;
    let mut draws = 0;

    for (emission, elapsed) in emitter.active(now) {
        if emissions == 0 {
            let program = shaders.require(ShaderKind::Geyser)?;
            backend.use_program(program);
            set_transform_uniforms(backend, ShaderKind::Geyser, frame, &item.world);
        }

        backend.set_uniform_f32(uniforms::TIME, elapsed);
        backend.set_uniform_f32(uniforms::HEIGHT_GEYSER, emission.charge);
        backend.set_uniform_f32(uniforms::CHARGE, emission.charge);

        for particle in 0..emitter.settings.particle_count {
            backend.set_uniform_f32(uniforms::ID_PARTICLE, particle as f32);
            backend.draw_indexed(emitter.particle);
            draws += 1;
        }
        emissions += 1;
    }

    Ok((emissions, draws))
}
