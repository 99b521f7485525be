use crate::render::{GeometryHandle, ShaderKind, TextureHandle};

/// Surface description of a static mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshMaterial {
    /// Per-vertex colour, `modelviewprojection` only.
    Color,
    /// Lambertian shading with a view vector.
    Lambertian,
    /// Diffuse texture on unit 0.
    Textured(TextureHandle),
    /// Textured sky sphere.
    Skybox(TextureHandle),
    /// 2D charge gauge drawn in normalized device coordinates.
    Overlay,
}

impl MeshMaterial {
    /// Program used when no shader override is inherited.
    #[must_use]
    pub fn default_shader(&self) -> ShaderKind {
        match self {
            MeshMaterial::Color => ShaderKind::Color,
            MeshMaterial::Lambertian => ShaderKind::Lambertian,
            MeshMaterial::Textured(_) => ShaderKind::Textured,
            MeshMaterial::Skybox(_) => ShaderKind::Skybox,
            MeshMaterial::Overlay => ShaderKind::Overlay,
        }
    }

    /// Blended materials are submitted after every opaque draw.
    #[must_use]
    pub fn is_blended(&self) -> bool {
        matches!(self, MeshMaterial::Overlay)
    }

    #[must_use]
    pub fn texture(&self) -> Option<TextureHandle> {
        match self {
            MeshMaterial::Textured(texture) | MeshMaterial::Skybox(texture) => Some(*texture),
            _ => None,
        }
    }
}

/// An uploaded geometry with its material.
///
/// Meshes live in the scene's mesh arena; nodes refer to them by key, so one
/// mesh can back thousands of procedurally generated nodes without copies.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub geometry: GeometryHandle,
    pub material: MeshMaterial,
    pub visible: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: GeometryHandle, material: MeshMaterial) -> Self {
        Self {
            name: "Mesh".to_string(),
            geometry,
            material,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
