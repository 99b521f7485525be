//! Shader Template Manager
//!
//! GLSL sources live under `src/render/shaders` as minijinja templates,
//! embedded in the binary with `rust-embed`. Limits such as the bone count
//! and the geyser particle constants are injected at render time so the
//! Rust side and the shader side never disagree.
//!
//! [`ShaderLibrary`] compiles every [`ShaderKind`] once through the backend
//! and hands out program handles. A program that fails to compile is logged
//! with its numbered source and left out of the library; drawables asking
//! for it get [`SceneError::MissingProgram`].

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, Error, context};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SceneError};
use crate::render::backend::{ProgramHandle, RenderBackend};
use crate::resources::MAX_VERTEX_BONES;
use crate::scene::emitter::GeyserSettings;
use crate::scene::skeleton::MAX_BONES;

#[derive(RustEmbed)]
#[folder = "src/render/shaders"]
struct ShaderAssets;

/// Program families, also used as the shader-set reference in draw parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderKind {
    Color,
    Lambertian,
    Skinning,
    Textured,
    Skybox,
    Geyser,
    Overlay,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 7] = [
        ShaderKind::Color,
        ShaderKind::Lambertian,
        ShaderKind::Skinning,
        ShaderKind::Textured,
        ShaderKind::Skybox,
        ShaderKind::Geyser,
        ShaderKind::Overlay,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ShaderKind::Color => "color",
            ShaderKind::Lambertian => "lambertian",
            ShaderKind::Skinning => "skinning",
            ShaderKind::Textured => "texture",
            ShaderKind::Skybox => "skybox",
            ShaderKind::Geyser => "geyser",
            ShaderKind::Overlay => "overlay",
        }
    }

    /// `(vertex, fragment)` template names.
    #[must_use]
    pub fn templates(self) -> (&'static str, &'static str) {
        match self {
            ShaderKind::Color => ("color.vert.glsl", "color.frag.glsl"),
            ShaderKind::Lambertian => ("lambertian.vert.glsl", "lambertian.frag.glsl"),
            ShaderKind::Skinning => ("skinning.vert.glsl", "color.frag.glsl"),
            ShaderKind::Textured => ("texture.vert.glsl", "texture.frag.glsl"),
            ShaderKind::Skybox => ("skybox.vert.glsl", "skybox.frag.glsl"),
            ShaderKind::Geyser => ("geyser.vert.glsl", "geyser.frag.glsl"),
            ShaderKind::Overlay => ("overlay.vert.glsl", "overlay.frag.glsl"),
        }
    }
}

/// Limits forwarded to the skinning template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderSettings {
    pub max_bones: usize,
    pub max_vertex_bones: usize,
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            max_bones: MAX_BONES,
            max_vertex_bones: MAX_VERTEX_BONES,
        }
    }
}

fn shader_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    Ok(ShaderAssets::get(name).map(|file| String::from_utf8_lossy(&file.data).into_owned()))
}

fn build_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();

    let syntax = SyntaxConfig::builder()
        .block_delimiters("{$", "$}")
        .variable_delimiters("{{", "}}")
        .line_statement_prefix("$$")
        .build()?;

    env.set_syntax(syntax);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
    env.set_loader(shader_loader);

    Ok(env)
}

/// Renders the `(vertex, fragment)` sources of `kind`.
pub fn render_sources(
    kind: ShaderKind,
    shaders: &ShaderSettings,
    geyser: &GeyserSettings,
) -> Result<(String, String)> {
    let env = build_env()?;
    render_with(&env, kind, shaders, geyser)
}

fn render_with(
    env: &Environment<'static>,
    kind: ShaderKind,
    shaders: &ShaderSettings,
    geyser: &GeyserSettings,
) -> Result<(String, String)> {
    let ctx = context! {
        max_bones => shaders.max_bones,
        max_vertex_bones => shaders.max_vertex_bones,
        particle_count => geyser.particle_count,
        particles_per_time => geyser.particles_per_time,
        time_rising => geyser.time_rising,
    };

    let (vs_name, fs_name) = kind.templates();
    let vertex = env.get_template(vs_name)?.render(&ctx)?;
    let fragment = env.get_template(fs_name)?.render(&ctx)?;
    Ok((vertex, fragment))
}

fn numbered(source: &str) -> String {
    source
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{:3}: {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compiled programs by kind.
#[derive(Debug, Default, Clone)]
pub struct ShaderLibrary {
    programs: FxHashMap<ShaderKind, ProgramHandle>,
}

impl ShaderLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles every kind. Template errors abort; compile/link failures are
    /// logged and the kind stays absent.
    pub fn compile_all(
        backend: &mut dyn RenderBackend,
        shaders: &ShaderSettings,
        geyser: &GeyserSettings,
    ) -> Result<Self> {
        let env = build_env()?;
        let mut library = Self::new();

        for kind in ShaderKind::ALL {
            let (vertex, fragment) = render_with(&env, kind, shaders, geyser)?;
            match backend.compile_program(kind.label(), &vertex, &fragment) {
                Ok(program) => {
                    library.programs.insert(kind, program);
                }
                Err(err) => {
                    let source = match &err {
                        SceneError::ShaderCompile { stage: "vertex", .. } => numbered(&vertex),
                        SceneError::ShaderCompile { .. } => numbered(&fragment),
                        _ => format!("{}\n{}", numbered(&vertex), numbered(&fragment)),
                    };
                    log::error!("{err}\n{source}");
                }
            }
        }

        log::info!(
            "Shader library ready: {}/{} programs",
            library.programs.len(),
            ShaderKind::ALL.len()
        );
        Ok(library)
    }

    pub fn insert(&mut self, kind: ShaderKind, program: ProgramHandle) {
        self.programs.insert(kind, program);
    }

    #[must_use]
    pub fn get(&self, kind: ShaderKind) -> Option<ProgramHandle> {
        self.programs.get(&kind).copied()
    }

    pub fn require(&self, kind: ShaderKind) -> Result<ProgramHandle> {
        self.get(kind).ok_or(SceneError::MissingProgram(kind))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skinning_template_receives_limits() {
        let (vertex, _) = render_sources(
            ShaderKind::Skinning,
            &ShaderSettings::default(),
            &GeyserSettings::default(),
        )
        .unwrap();
        assert!(vertex.contains("MAX_VERTEX_BONES = 4"));
        assert!(vertex.contains("MAX_BONES = 128"));
        assert!(vertex.contains("boneMatrix[MAX_BONES]"));
    }

    #[test]
    fn geyser_template_receives_particle_constants() {
        let (vertex, fragment) = render_sources(
            ShaderKind::Geyser,
            &ShaderSettings::default(),
            &GeyserSettings::default(),
        )
        .unwrap();
        assert!(vertex.contains("float(200)"));
        assert!(!vertex.contains("{{"));
        assert!(!fragment.contains("{{"));
        assert!(vertex.contains("height_geyser"));
    }

    #[test]
    fn numbered_prefixes_lines() {
        assert_eq!(numbered("a\nb"), "  1: a\n  2: b");
    }
}
