//! Procedural builder tests
//!
//! Tests for:
//! - Grass tufts: recursion depth, blade angle and the shared blade mesh
//! - Grass placement matrix
//! - Seeded meadows and trees

use dinoscene::math::{rotate, translate, uniform_scale};
use dinoscene::render::GeometryHandle;
use dinoscene::resources::{Mesh, MeshMaterial};
use dinoscene::scene::procedural::{
    GRASS_BLADE_ANGLE, GRASS_DEPTH, TreeSettings, grass_tuft, grow_tree, plant_grass, plant_meadow,
};
use dinoscene::scene::{Leaf, MeshKey, NodeHandle, Scene};
use glam::{Mat4, Vec3};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-4;

fn mat4_approx(a: &Mat4, b: &Mat4) -> bool {
    a.abs_diff_eq(*b, EPSILON)
}

fn scene_with_blade() -> (Scene, MeshKey) {
    let mut scene = Scene::new();
    let blade = scene.add_mesh(Mesh::new(GeometryHandle::new(3), MeshMaterial::Lambertian));
    (scene, blade)
}

fn subtree_size(scene: &Scene, root: NodeHandle) -> usize {
    let mut count = 0;
    let mut stack = vec![root];
    while let Some(handle) = stack.pop() {
        count += 1;
        stack.extend(scene.get_node(handle).unwrap().children());
    }
    count
}

fn world_matrices(scene: &Scene) -> Vec<Mat4> {
    scene.render_list().iter().map(|item| item.world).collect()
}

// ============================================================================
// Grass
// ============================================================================

#[test]
fn tuft_nests_blades_at_fixed_angle() {
    let (mut scene, blade) = scene_with_blade();
    let tuft = grass_tuft(&mut scene, blade, None, 15.0, GRASS_DEPTH).unwrap();

    assert_eq!(subtree_size(&scene, tuft), GRASS_DEPTH as usize + 1);

    scene.update(0.0).unwrap();
    let worlds = world_matrices(&scene);
    assert_eq!(worlds.len(), GRASS_DEPTH as usize + 1);
    for (i, world) in worlds.iter().enumerate() {
        let expected = rotate(Vec3::Z, 15.0 + GRASS_BLADE_ANGLE * i as f32);
        assert!(mat4_approx(world, &expected), "blade {i}");
    }
}

#[test]
fn tuft_blades_share_one_mesh() {
    let (mut scene, blade) = scene_with_blade();
    grass_tuft(&mut scene, blade, None, 0.0, 5).unwrap();
    scene.update(0.0).unwrap();

    assert_eq!(scene.meshes.len(), 1);
    assert!(scene.render_list().iter().all(|item| item.leaf == Leaf::Mesh(blade)));
}

#[test]
fn planted_grass_uses_trs_placement() {
    let (mut scene, blade) = scene_with_blade();
    let position = Vec3::new(3.0, 0.0, -2.0);
    let base = plant_grass(&mut scene, blade, None, position, 0.5, 45.0).unwrap();

    scene.update(0.0).unwrap();
    let expected = translate(position) * rotate(Vec3::Y, 45.0) * rotate(Vec3::X, 90.0) * uniform_scale(0.5);
    assert!(mat4_approx(&scene.world_matrix(base).unwrap(), &expected));

    // The base carries no leaf; the first blade sits exactly on it.
    assert!(mat4_approx(&scene.render_list()[0].world, &expected));
}

#[test]
fn meadow_is_deterministic_per_seed() {
    let (mut a, blade_a) = scene_with_blade();
    let (mut b, blade_b) = scene_with_blade();
    plant_meadow(&mut a, blade_a, None, 20, 50.0, 42).unwrap();
    plant_meadow(&mut b, blade_b, None, 20, 50.0, 42).unwrap();
    a.update(0.0).unwrap();
    b.update(0.0).unwrap();

    assert_eq!(a.render_list().len(), 20 * (GRASS_DEPTH as usize + 1));
    assert_eq!(world_matrices(&a), world_matrices(&b));

    for item in a.render_list() {
        let origin = item.world.transform_point3(Vec3::ZERO);
        assert!(origin.x.abs() <= 50.0 && origin.z.abs() <= 50.0);
    }
}

// ============================================================================
// Trees
// ============================================================================

#[test]
fn tree_respects_depth_and_branching() {
    let (mut scene, segment) = scene_with_blade();
    let settings = TreeSettings {
        depth: 3,
        min_children: 2,
        max_children: 2,
        ..TreeSettings::default()
    };
    let trunk = grow_tree(&mut scene, segment, None, Mat4::IDENTITY, &settings).unwrap();

    // 1 + 2 + 4 + 8
    assert_eq!(subtree_size(&scene, trunk), 15);
}

#[test]
fn tree_shape_depends_only_on_seed() {
    let settings = TreeSettings::default();
    let (mut a, seg_a) = scene_with_blade();
    let (mut b, seg_b) = scene_with_blade();
    grow_tree(&mut a, seg_a, None, Mat4::IDENTITY, &settings).unwrap();
    grow_tree(&mut b, seg_b, None, Mat4::IDENTITY, &settings).unwrap();
    a.update(0.0).unwrap();
    b.update(0.0).unwrap();
    assert_eq!(world_matrices(&a), world_matrices(&b));

    let (mut c, seg_c) = scene_with_blade();
    grow_tree(&mut c, seg_c, None, Mat4::IDENTITY, &TreeSettings { seed: 8, ..settings }).unwrap();
    c.update(0.0).unwrap();
    assert_ne!(world_matrices(&a), world_matrices(&c));
}

#[test]
fn branches_start_at_parent_tip() {
    let (mut scene, segment) = scene_with_blade();
    let settings = TreeSettings {
        depth: 1,
        segment_length: 2.0,
        ..TreeSettings::default()
    };
    let trunk = grow_tree(&mut scene, segment, None, Mat4::IDENTITY, &settings).unwrap();
    scene.update(0.0).unwrap();

    for &branch in scene.get_node(trunk).unwrap().children() {
        let origin = scene.world_matrix(branch).unwrap().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), EPSILON));
    }
}
