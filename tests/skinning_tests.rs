//! Skinned mesh tests
//!
//! Tests for:
//! - Bone matrix = bone world × offset
//! - Bone matrices refreshed every frame from the same frame's transforms
//! - Validation: missing bones, unpublished bones, offset count, bone limit
//! - Influence trimming and normalisation
//! - The two-bone demo cylinder

use std::sync::Arc;

use dinoscene::animation::TransformTrack;
use dinoscene::errors::SceneError;
use dinoscene::math::{quaternion_from_euler, rotate, translate};
use dinoscene::render::GeometryHandle;
use dinoscene::resources::{MAX_VERTEX_BONES, SkinInfluence};
use dinoscene::scene::procedural::{skinned_cylinder, skinned_cylinder_geometry};
use dinoscene::scene::{Leaf, MAX_BONES, Node, Scene, SkinnedMesh};
use glam::{Mat4, Quat, Vec3};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn mat4_approx(a: &Mat4, b: &Mat4) -> bool {
    a.abs_diff_eq(*b, EPSILON)
}

fn spin_track() -> Arc<TransformTrack> {
    Arc::new(
        TransformTrack::from_keys(
            [(0.0, Vec3::ZERO), (4.0, Vec3::new(0.0, 4.0, 0.0))],
            [(0.0, Quat::IDENTITY), (4.0, quaternion_from_euler(0.0, 0.0, 90.0))],
            [(0.0, Vec3::ONE)],
        )
        .unwrap(),
    )
}

// ============================================================================
// Bone Matrices
// ============================================================================

#[test]
fn bone_matrix_is_world_times_offset() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::skinning_control("root", None).with_local(translate(Vec3::X * 2.0)));
    let bone = scene
        .add_to_parent(
            Node::skinning_control("bone", None).with_local(rotate(Vec3::Z, 30.0)),
            root,
        )
        .unwrap();

    let offsets = vec![translate(-Vec3::X * 2.0), Mat4::from_scale(Vec3::splat(0.5))];
    let skin = scene
        .add_skinned_mesh(SkinnedMesh::new("body", GeometryHandle::new(1), vec![root, bone], offsets.clone()).unwrap())
        .unwrap();
    scene.add_leaf(root, Leaf::Skinned(skin)).unwrap();

    scene.update(0.0).unwrap();

    let matrices = scene.skins[skin].bone_matrices();
    assert!(mat4_approx(&matrices[0], &(scene.world_matrix(root).unwrap() * offsets[0])));
    assert!(mat4_approx(&matrices[1], &(scene.world_matrix(bone).unwrap() * offsets[1])));
    // Root offset cancels its own translation.
    assert!(mat4_approx(&matrices[0], &Mat4::IDENTITY));
}

#[test]
fn bone_matrices_are_never_stale() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::skinning_control("root", None));
    // Leaf sits on a node visited before the animated bone.
    let holder = scene.add_to_parent(Node::new("holder"), root).unwrap();
    let bone = scene
        .add_to_parent(Node::skinning_control("bone", Some(spin_track())), root)
        .unwrap();
    let skin = scene
        .add_skinned_mesh(SkinnedMesh::new("tail", GeometryHandle::new(1), vec![bone], vec![Mat4::IDENTITY]).unwrap())
        .unwrap();
    scene.add_leaf(holder, Leaf::Skinned(skin)).unwrap();

    for t in [0.0, 1.0, 2.0, 4.0, 3.0] {
        scene.update(t).unwrap();
        let expected = spin_track().value(t);
        assert!(
            mat4_approx(&scene.skins[skin].bone_matrices()[0], &expected),
            "bone matrix lags at t = {t}"
        );
    }
}

#[test]
fn compute_bone_matrices_reports_removed_bone() {
    let mut scene = Scene::new();
    let bone = scene.add_node(Node::skinning_control("bone", None));
    let mut skin = SkinnedMesh::new("m", GeometryHandle::new(1), vec![bone], vec![Mat4::IDENTITY]).unwrap();
    scene.remove_node(bone);

    let result = skin.compute_bone_matrices(&scene.nodes);
    assert!(matches!(result, Err(SceneError::MissingBone { .. })));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn unpublished_bone_is_rejected() {
    let mut scene = Scene::new();
    let plain = scene.add_node(Node::new("plain"));
    let skin = SkinnedMesh::new("m", GeometryHandle::new(1), vec![plain], vec![Mat4::IDENTITY]).unwrap();

    let result = scene.add_skinned_mesh(skin);
    assert!(matches!(result, Err(SceneError::BoneNotPublished(name)) if name == "plain"));
}

#[test]
fn offset_count_must_match_bones() {
    let mut scene = Scene::new();
    let bone = scene.add_node(Node::skinning_control("bone", None));
    let result = SkinnedMesh::new("m", GeometryHandle::new(1), vec![bone], vec![]);
    assert!(matches!(
        result,
        Err(SceneError::BoneOffsetMismatch { bones: 1, offsets: 0, .. })
    ));
}

#[test]
fn bone_limit_is_enforced() {
    let mut scene = Scene::new();
    let bone = scene.add_node(Node::skinning_control("bone", None));
    let count = MAX_BONES + 1;
    let result = SkinnedMesh::new("m", GeometryHandle::new(1), vec![bone; count], vec![Mat4::IDENTITY; count]);
    assert!(matches!(result, Err(SceneError::TooManyBones { limit: MAX_BONES, .. })));
}

// ============================================================================
// Influences
// ============================================================================

#[test]
fn influences_keep_strongest_four() {
    let influence = SkinInfluence::from_weights([(0, 0.05), (1, 0.4), (2, 0.1), (3, 0.3), (4, 0.15)]);
    assert_eq!(influence.bone_ids, [1, 3, 4, 2]);
    assert!(approx(influence.weights[0], 0.4));
    assert_eq!(influence.weights.len(), MAX_VERTEX_BONES);
}

#[test]
fn influences_are_zero_padded_and_normalised() {
    let influence = SkinInfluence::from_weights([(7, 2.0), (9, 2.0)]);
    assert_eq!(influence.weights[2], 0.0);
    assert_eq!(influence.weights[3], 0.0);

    let normalized = influence.normalized_weights();
    assert!(approx(normalized.iter().sum::<f32>(), 1.0));
    assert!(approx(normalized[0], 0.5));
}

#[test]
fn blend_matrix_mixes_bones_by_weight() {
    let bones = [translate(Vec3::X * 10.0), Mat4::IDENTITY];
    let influence = SkinInfluence::new([0, 1, 0, 0], [0.7, 0.3, 0.0, 0.0]);
    let p = influence.blend_matrix(&bones).transform_point3(Vec3::ZERO);
    assert!(approx(p.x, 7.0));
}

// ============================================================================
// Demo Cylinder
// ============================================================================

#[test]
fn cylinder_weights_follow_sections() {
    let geometry = skinned_cylinder_geometry(4, 8);
    let skin = geometry.skin.as_ref().unwrap();
    assert_eq!(skin.len(), geometry.vertex_count());
    assert!(approx(skin[0].weights[0], 0.7));
    assert!(approx(skin[skin.len() - 1].weights[0], 0.2));
    assert!(approx(skin[skin.len() - 1].weights[1], 0.8));
}

#[test]
fn cylinder_forearm_bends_at_two() {
    let mut scene = Scene::new();
    let cylinder = skinned_cylinder(&mut scene, GeometryHandle::new(1), None).unwrap();

    scene.update(2.0).unwrap();
    let matrices = scene.skins[cylinder.skin].bone_matrices();
    assert!(mat4_approx(&matrices[0], &Mat4::IDENTITY));
    assert!(mat4_approx(&matrices[1], &Mat4::from_quat(quaternion_from_euler(90.0, 0.0, 0.0))));

    scene.update(4.0).unwrap();
    assert!(mat4_approx(&scene.skins[cylinder.skin].bone_matrices()[1], &Mat4::IDENTITY));
}
