use glam::Mat4;
use slotmap::SlotMap;

use crate::errors::{Result, SceneError};
use crate::render::GeometryHandle;
use crate::scene::{Node, NodeHandle};

/// Size of the `boneMatrix` uniform array in the skinning shader.
pub const MAX_BONES: usize = 128;

/// A mesh deformed by the world matrices of bone nodes.
///
/// `bones[i]` is paired with `offsets[i]` (the inverse bind pose) and with
/// `boneMatrix[i]` in the shader. Bones are observed, never owned: they stay
/// in the scene's node arena and the mesh only holds their handles.
#[derive(Debug, Clone)]
pub struct SkinnedMesh {
    pub name: String,
    pub geometry: GeometryHandle,
    bones: Vec<NodeHandle>,
    offsets: Vec<Mat4>,

    // Runtime data, rewritten every frame before the mesh is drawn.
    bone_matrices: Vec<Mat4>,
}

impl SkinnedMesh {
    pub fn new(
        name: impl Into<String>,
        geometry: GeometryHandle,
        bones: Vec<NodeHandle>,
        offsets: Vec<Mat4>,
    ) -> Result<Self> {
        let name = name.into();
        if bones.len() != offsets.len() {
            return Err(SceneError::BoneOffsetMismatch {
                mesh: name,
                bones: bones.len(),
                offsets: offsets.len(),
            });
        }
        if bones.len() > MAX_BONES {
            return Err(SceneError::TooManyBones {
                mesh: name,
                count: bones.len(),
                limit: MAX_BONES,
            });
        }

        let count = bones.len();
        Ok(Self {
            name,
            geometry,
            bones,
            offsets,
            bone_matrices: vec![Mat4::IDENTITY; count],
        })
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[NodeHandle] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn offsets(&self) -> &[Mat4] {
        &self.offsets
    }

    /// Matrices from the last [`compute_bone_matrices`](Self::compute_bone_matrices).
    #[inline]
    #[must_use]
    pub fn bone_matrices(&self) -> &[Mat4] {
        &self.bone_matrices
    }

    /// `bone_matrices[i] = bones[i].world × offsets[i]`.
    ///
    /// Reads whatever world matrix each bone node holds, so it must run after
    /// the hierarchy update of the same frame.
    pub fn compute_bone_matrices(&mut self, nodes: &SlotMap<NodeHandle, Node>) -> Result<&[Mat4]> {
        for (i, &bone_handle) in self.bones.iter().enumerate() {
            let Some(bone) = nodes.get(bone_handle) else {
                return Err(SceneError::MissingBone {
                    mesh: self.name.clone(),
                    bone: format!("#{i}"),
                });
            };
            self.bone_matrices[i] = bone.world_matrix * self.offsets[i];
        }
        Ok(&self.bone_matrices)
    }

    /// Checks that every bone exists and publishes its world matrix.
    pub fn validate(&self, nodes: &SlotMap<NodeHandle, Node>) -> Result<()> {
        for (i, &bone_handle) in self.bones.iter().enumerate() {
            let Some(bone) = nodes.get(bone_handle) else {
                return Err(SceneError::MissingBone {
                    mesh: self.name.clone(),
                    bone: format!("#{i}"),
                });
            };
            if !bone.publishes_world {
                return Err(SceneError::BoneNotPublished(bone.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_offsets_are_rejected() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let bone = nodes.insert(Node::skinning_control("bone", None));

        let result = SkinnedMesh::new("mesh", GeometryHandle::new(1), vec![bone], vec![]);
        assert!(matches!(
            result,
            Err(SceneError::BoneOffsetMismatch { bones: 1, offsets: 0, .. })
        ));
    }

    #[test]
    fn removed_bone_is_reported() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let bone = nodes.insert(Node::skinning_control("bone", None));
        let mut mesh =
            SkinnedMesh::new("mesh", GeometryHandle::new(1), vec![bone], vec![Mat4::IDENTITY]).unwrap();

        nodes.remove(bone);
        assert!(matches!(
            mesh.compute_bone_matrices(&nodes),
            Err(SceneError::MissingBone { .. })
        ));
    }
}
