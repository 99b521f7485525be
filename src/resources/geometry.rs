use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use smallvec::SmallVec;

/// Bone influences per vertex addressed by the skinning shader.
pub const MAX_VERTEX_BONES: usize = 4;

const WEIGHT_EPSILON: f32 = 1e-8;

/// Up to four `(bone id, weight)` pairs for one vertex.
///
/// Unused slots carry zero weight and never contribute to the blend.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SkinInfluence {
    pub bone_ids: [u32; MAX_VERTEX_BONES],
    pub weights: [f32; MAX_VERTEX_BONES],
}

impl SkinInfluence {
    #[must_use]
    pub fn new(bone_ids: [u32; MAX_VERTEX_BONES], weights: [f32; MAX_VERTEX_BONES]) -> Self {
        Self { bone_ids, weights }
    }

    /// Keeps the strongest [`MAX_VERTEX_BONES`] influences, zero padded.
    pub fn from_weights<I>(influences: I) -> Self
    where
        I: IntoIterator<Item = (u32, f32)>,
    {
        let mut sorted: SmallVec<[(u32, f32); 8]> = influences
            .into_iter()
            .filter(|(_, weight)| *weight > 0.0)
            .collect();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut result = Self::default();
        for (slot, (bone, weight)) in sorted.into_iter().take(MAX_VERTEX_BONES).enumerate() {
            result.bone_ids[slot] = bone;
            result.weights[slot] = weight;
        }
        result
    }

    /// Weights rescaled to sum to one. All-zero weights stay zero.
    #[must_use]
    pub fn normalized_weights(&self) -> [f32; MAX_VERTEX_BONES] {
        let sum: f32 = self.weights.iter().sum();
        if sum <= WEIGHT_EPSILON {
            return [0.0; MAX_VERTEX_BONES];
        }
        self.weights.map(|w| w / sum)
    }

    /// Linear blend of the referenced bone matrices with normalized weights.
    #[must_use]
    pub fn blend_matrix(&self, bone_matrices: &[Mat4]) -> Mat4 {
        let weights = self.normalized_weights();
        let mut blended = Mat4::ZERO;
        for (&bone, &weight) in self.bone_ids.iter().zip(weights.iter()) {
            if weight <= 0.0 {
                continue;
            }
            if let Some(matrix) = bone_matrices.get(bone as usize) {
                blended += *matrix * weight;
            }
        }
        blended
    }
}

/// One planar vertex attribute ready for upload.
#[derive(Debug, Clone)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub data: Vec<u8>,
}

impl VertexAttribute {
    fn new_planar<T: Pod>(location: u32, components: u32, data: &[T]) -> Self {
        Self {
            location,
            components,
            data: bytemuck::cast_slice(data).to_vec(),
        }
    }
}

/// CPU-side vertex and index data.
///
/// Attribute locations follow the shader convention: 0 position, 1 surface
/// attribute (colour, else normal, else uv), 2 bone ids, 3 bone weights.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub colors: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    pub skin: Option<Vec<SkinInfluence>>,
    pub indices: Vec<u32>,
}

impl Geometry {
    #[must_use]
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: Vec<Vec3>) -> Self {
        self.colors = Some(colors);
        self
    }

    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    #[must_use]
    pub fn with_skin(mut self, skin: Vec<SkinInfluence>) -> Self {
        self.skin = Some(skin);
        self
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Planar attribute buffers in location order.
    #[must_use]
    pub fn attributes(&self) -> Vec<VertexAttribute> {
        let mut attributes = vec![VertexAttribute::new_planar(0, 3, &self.positions)];

        if let Some(colors) = &self.colors {
            attributes.push(VertexAttribute::new_planar(1, 3, colors));
        } else if let Some(normals) = &self.normals {
            attributes.push(VertexAttribute::new_planar(1, 3, normals));
        } else if let Some(uvs) = &self.uvs {
            attributes.push(VertexAttribute::new_planar(1, 2, uvs));
        }

        if let Some(skin) = &self.skin {
            // The shader reads ids as floats.
            let ids: Vec<[f32; MAX_VERTEX_BONES]> = skin
                .iter()
                .map(|influence| influence.bone_ids.map(|id| id as f32))
                .collect();
            let weights: Vec<[f32; MAX_VERTEX_BONES]> =
                skin.iter().map(|influence| influence.weights).collect();
            attributes.push(VertexAttribute::new_planar(2, 4, &ids));
            attributes.push(VertexAttribute::new_planar(3, 4, &weights));
        }

        attributes
    }

    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Open cylinder along X: `sections` rings of `quarters` vertices, centred on the origin.
    #[must_use]
    pub fn cylinder(sections: u32, quarters: u32) -> Self {
        let mut positions = Vec::with_capacity(((sections + 1) * quarters) as usize);
        for x in 0..=sections {
            for angle in 0..quarters {
                let (sin, cos) = (360.0 * angle as f32 / quarters as f32).to_radians().sin_cos();
                positions.push(Vec3::new(x as f32 - sections as f32 / 2.0, cos, sin));
            }
        }

        let mut indices = Vec::with_capacity((sections * quarters * 6) as usize);
        for x in 0..sections {
            for angle in 0..quarters {
                let r0c0 = x * quarters + angle;
                let r1c0 = (x + 1) * quarters + angle;
                let r0c1 = x * quarters + (angle + 1) % quarters;
                let r1c1 = (x + 1) * quarters + (angle + 1) % quarters;
                indices.extend_from_slice(&[r0c0, r0c1, r1c1, r0c0, r1c1, r1c0]);
            }
        }

        Self::new(positions, indices)
    }

    /// Unit quad in the XY plane, base on the X axis, facing +Z.
    #[must_use]
    pub fn plane() -> Self {
        let positions = vec![
            Vec3::new(-0.5, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(0.5, 1.0, 0.0),
            Vec3::new(-0.5, 1.0, 0.0),
        ];
        let uvs = vec![
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        Self::new(positions, vec![0, 1, 2, 0, 2, 3])
            .with_normals(vec![Vec3::Z; 4])
            .with_uvs(uvs)
    }

    /// Cube with corners at ±1, used as the geyser particle.
    #[must_use]
    pub fn cube() -> Self {
        let positions = vec![
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 7, 6, 3, 6, 2, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        Self::new(positions, indices)
    }

    /// Screen-space rectangle in normalized device coordinates.
    ///
    /// The overlay shader compares `charge` against the red channel, so a
    /// horizontal red ramp from 0 to 1 turns the quad into a fill gauge.
    #[must_use]
    pub fn overlay_quad(min: Vec2, max: Vec2) -> Self {
        let positions = vec![
            Vec3::new(min.x, min.y, 0.0),
            Vec3::new(max.x, min.y, 0.0),
            Vec3::new(max.x, max.y, 0.0),
            Vec3::new(min.x, max.y, 0.0),
        ];
        let colors = vec![
            Vec3::new(0.0, 0.4, 0.9),
            Vec3::new(1.0, 0.4, 0.9),
            Vec3::new(1.0, 0.4, 0.9),
            Vec3::new(0.0, 0.4, 0.9),
        ];
        Self::new(positions, vec![0, 1, 2, 0, 2, 3]).with_colors(colors)
    }
}
