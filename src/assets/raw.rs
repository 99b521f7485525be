//! Typed import records
//!
//! What a [`SceneLoader`](super::SceneLoader) produces: a node tree, flat
//! mesh and material lists, and raw per-node animation keys. Matrices are
//! written row by row, as asset tools print them.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::quaternion_from_euler;

fn identity_rows() -> [[f32; 4]; 4] {
    Mat4::IDENTITY.transpose().to_cols_array_2d()
}

fn one() -> f32 {
    1.0
}

/// Converts a row-major 4×4 into a glam matrix.
#[must_use]
pub fn matrix_from_rows(rows: &[[f32; 4]; 4]) -> Mat4 {
    Mat4::from_cols_array_2d(rows).transpose()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawScene {
    #[serde(default)]
    pub root: RawNode,
    #[serde(default)]
    pub meshes: Vec<RawMesh>,
    #[serde(default)]
    pub materials: Vec<RawMaterial>,
    #[serde(default)]
    pub animations: Vec<RawAnimation>,
}

impl RawScene {
    /// Number of nodes in the tree, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.faces.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(default)]
    pub name: String,
    #[serde(default = "identity_rows")]
    pub transform: [[f32; 4]; 4],
    /// Indices into [`RawScene::meshes`].
    #[serde(default)]
    pub meshes: Vec<usize>,
    #[serde(default)]
    pub children: Vec<RawNode>,
}

impl Default for RawNode {
    fn default() -> Self {
        Self {
            name: "root".to_string(),
            transform: identity_rows(),
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }
}

impl RawNode {
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        matrix_from_rows(&self.transform)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMesh {
    #[serde(default)]
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    #[serde(default)]
    pub colors: Vec<[f32; 3]>,
    /// Raster-order texture coordinates (v grows downwards).
    #[serde(default)]
    pub uvs: Vec<[f32; 2]>,
    pub faces: Vec<[u32; 3]>,
    #[serde(default)]
    pub bones: Vec<RawBone>,
    /// Index into [`RawScene::materials`].
    #[serde(default)]
    pub material: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBone {
    /// Name of the node driving this bone.
    pub name: String,
    #[serde(default = "identity_rows")]
    pub offset: [[f32; 4]; 4],
    #[serde(default)]
    pub weights: Vec<RawWeight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawWeight {
    pub vertex: u32,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMaterial {
    #[serde(default)]
    pub name: String,
    /// Texture file name, resolved against the asset directory.
    #[serde(default)]
    pub texture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnimation {
    #[serde(default)]
    pub name: String,
    /// Key times are in ticks; dividing by this gives time units.
    #[serde(default = "one")]
    pub ticks_per_second: f32,
    #[serde(default)]
    pub channels: Vec<RawChannel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChannel {
    /// Name of the animated node.
    pub node: String,
    #[serde(default)]
    pub position_keys: Vec<RawKey<[f32; 3]>>,
    #[serde(default)]
    pub rotation_keys: Vec<RawKey<RawRotation>>,
    #[serde(default)]
    pub scaling_keys: Vec<RawKey<RawScale>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawKey<T> {
    pub time: f32,
    pub value: T,
}

/// A rotation key: quaternion `[w, x, y, z]` or XYZ Euler angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRotation {
    Quaternion([f32; 4]),
    Euler([f32; 3]),
}

impl RawRotation {
    #[must_use]
    pub fn to_quat(self) -> Quat {
        match self {
            RawRotation::Quaternion([w, x, y, z]) => Quat::from_xyzw(x, y, z, w).normalize(),
            RawRotation::Euler([x, y, z]) => quaternion_from_euler(x, y, z),
        }
    }
}

/// A scale key: uniform factor or per-axis factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScale {
    Uniform(f32),
    Vector([f32; 3]),
}

impl RawScale {
    #[must_use]
    pub fn to_vec3(self) -> Vec3 {
        match self {
            RawScale::Uniform(factor) => Vec3::splat(factor),
            RawScale::Vector(factors) => Vec3::from_array(factors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_keys_accept_both_forms() {
        let quat: RawRotation = serde_json::from_str("[1.0, 0.0, 0.0, 0.0]").unwrap();
        assert_eq!(quat.to_quat(), Quat::IDENTITY);

        let euler: RawRotation = serde_json::from_str("[90.0, 0.0, 0.0]").unwrap();
        let expected = Quat::from_rotation_x(90f32.to_radians());
        assert!(euler.to_quat().angle_between(expected) < 1e-5);
    }

    #[test]
    fn scale_keys_accept_scalar() {
        let scale: RawScale = serde_json::from_str("2.0").unwrap();
        assert_eq!(scale.to_vec3(), Vec3::splat(2.0));
    }

    #[test]
    fn rows_are_transposed() {
        let rows = [
            [1.0, 0.0, 0.0, 5.0],
            [0.0, 1.0, 0.0, 6.0],
            [0.0, 0.0, 1.0, 7.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let m = matrix_from_rows(&rows);
        assert_eq!(m.w_axis.truncate(), Vec3::new(5.0, 6.0, 7.0));
    }
}
