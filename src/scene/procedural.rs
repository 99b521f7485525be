//! Procedural hierarchies
//!
//! Builders that grow node trees around one shared primitive. Every segment
//! node holds a [`Leaf::Mesh`] pointing at the same [`MeshKey`], so a meadow
//! of thousands of blades keeps a single mesh in the pool.
//!
//! None of these builders add per-frame behaviour except
//! [`skinned_cylinder`], whose forearm bone is keyframed.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::animation::TransformTrack;
use crate::errors::Result;
use crate::math::{quaternion_from_euler, rotate, translate, uniform_scale};
use crate::render::GeometryHandle;
use crate::resources::{Geometry, SkinInfluence};
use crate::scene::node::{Leaf, Node};
use crate::scene::skeleton::SkinnedMesh;
use crate::scene::{MeshKey, NodeHandle, Scene, SkinKey};

/// Rotation between successive blades of a tuft, degrees about Z.
pub const GRASS_BLADE_ANGLE: f32 = 60.0;
/// Blades stacked under the first one.
pub const GRASS_DEPTH: u32 = 3;

/// One blade rotated by `angle_z` with `depth` more blades nested below it.
///
/// Returns the handle of the outermost blade node, inserted under `parent`
/// (or as a root).
pub fn grass_tuft(
    scene: &mut Scene,
    blade: MeshKey,
    parent: Option<NodeHandle>,
    angle_z: f32,
    depth: u32,
) -> Result<NodeHandle> {
    let node = Node::new("grass")
        .with_local(rotate(Vec3::Z, angle_z))
        .with_leaf(Leaf::Mesh(blade));
    let mut handle = insert(scene, node, parent)?;
    let first = handle;

    for _ in 0..depth {
        let node = Node::new("grass")
            .with_local(rotate(Vec3::Z, GRASS_BLADE_ANGLE))
            .with_leaf(Leaf::Mesh(blade));
        handle = scene.add_to_parent(node, handle)?;
    }

    Ok(first)
}

/// Places a tuft at `position`: `T(position) · R_y(yaw) · R_x(90) · S(size)`.
pub fn plant_grass(
    scene: &mut Scene,
    blade: MeshKey,
    parent: Option<NodeHandle>,
    position: Vec3,
    size: f32,
    yaw: f32,
) -> Result<NodeHandle> {
    let local = translate(position)
        * rotate(Vec3::Y, yaw)
        * rotate(Vec3::X, 90.0)
        * uniform_scale(size);
    let base = insert(scene, Node::new("grass-base").with_local(local), parent)?;
    grass_tuft(scene, blade, Some(base), 0.0, GRASS_DEPTH)?;
    Ok(base)
}

/// Scatters `count` tufts over a square of half-size `extent` on the XZ plane.
pub fn plant_meadow(
    scene: &mut Scene,
    blade: MeshKey,
    parent: Option<NodeHandle>,
    count: usize,
    extent: f32,
    seed: u64,
) -> Result<Vec<NodeHandle>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let extent = extent.abs().max(f32::EPSILON);
    (0..count)
        .map(|_| {
            let position = Vec3::new(
                rng.random_range(-extent..extent),
                0.0,
                rng.random_range(-extent..extent),
            );
            let size = rng.random_range(0.5..1.5);
            let yaw = rng.random_range(0.0..360.0);
            plant_grass(scene, blade, parent, position, size, yaw)
        })
        .collect()
}

/// Branching parameters for [`grow_tree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    /// Levels of branches below the trunk.
    pub depth: u32,
    pub min_children: u32,
    pub max_children: u32,
    /// Tilt away from the parent axis, degrees.
    pub min_tilt: f32,
    pub max_tilt: f32,
    /// Child segment size relative to its parent.
    pub shrink: f32,
    /// Length of a unit segment along its local Y axis.
    pub segment_length: f32,
    pub seed: u64,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            depth: 4,
            min_children: 2,
            max_children: 4,
            min_tilt: 20.0,
            max_tilt: 50.0,
            shrink: 0.7,
            segment_length: 1.0,
            seed: 7,
        }
    }
}

/// Grows a randomized tree of `segment` instances.
///
/// Each segment spawns between `min_children` and `max_children` children
/// at the tip of its parent, rotated by a random yaw and tilt, until the
/// depth budget runs out. The shape is deterministic for a given seed.
pub fn grow_tree(
    scene: &mut Scene,
    segment: MeshKey,
    parent: Option<NodeHandle>,
    base: Mat4,
    settings: &TreeSettings,
) -> Result<NodeHandle> {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let trunk = Node::new("trunk")
        .with_local(base)
        .with_leaf(Leaf::Mesh(segment));
    let trunk = insert(scene, trunk, parent)?;

    let mut pending = vec![(trunk, settings.depth)];
    while let Some((parent, depth)) = pending.pop() {
        if depth == 0 {
            continue;
        }
        let children = rng.random_range(settings.min_children..=settings.max_children.max(settings.min_children));
        for _ in 0..children {
            let yaw = rng.random_range(0.0..360.0);
            let tilt = rng.random_range(settings.min_tilt..=settings.max_tilt.max(settings.min_tilt));
            let local = translate(Vec3::new(0.0, settings.segment_length, 0.0))
                * rotate(Vec3::Y, yaw)
                * rotate(Vec3::Z, tilt)
                * uniform_scale(settings.shrink);
            let branch = Node::new("branch")
                .with_local(local)
                .with_leaf(Leaf::Mesh(segment));
            let branch = scene.add_to_parent(branch, parent)?;
            pending.push((branch, depth - 1));
        }
    }

    Ok(trunk)
}

/// Geometry of the two-bone demo cylinder.
///
/// Vertices in the first half weigh 0.7 on bone 0 and 0.3 on bone 1, the
/// rest 0.2 / 0.8. The weights double as vertex colours.
#[must_use]
pub fn skinned_cylinder_geometry(sections: u32, quarters: u32) -> Geometry {
    let geometry = Geometry::cylinder(sections, quarters);

    let half = sections as f32 / 2.0;
    let mut colors = Vec::with_capacity(geometry.vertex_count());
    let mut skin = Vec::with_capacity(geometry.vertex_count());
    for x in 0..=sections {
        let weight = if x as f32 <= half { 0.7 } else { 0.2 };
        for _ in 0..quarters {
            colors.push(Vec3::new(weight, 1.0 - weight, 0.0));
            skin.push(SkinInfluence::new([0, 1, 0, 0], [weight, 1.0 - weight, 0.0, 0.0]));
        }
    }

    geometry.with_colors(colors).with_skin(skin)
}

/// Nodes and mesh created by [`skinned_cylinder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkinnedCylinder {
    pub arm: NodeHandle,
    pub forearm: NodeHandle,
    pub skin: SkinKey,
}

/// Two-bone demo: a static arm bone and a forearm bone rotating
/// 0° → 90° → 0° about X over keys at 0, 2 and 4.
///
/// `geometry` is the uploaded [`skinned_cylinder_geometry`].
pub fn skinned_cylinder(
    scene: &mut Scene,
    geometry: GeometryHandle,
    parent: Option<NodeHandle>,
) -> Result<SkinnedCylinder> {
    let rest = TransformTrack::from_keys(
        [(0.0, Vec3::ZERO)],
        [(0.0, Quat::IDENTITY)],
        [(0.0, Vec3::ONE)],
    )?;
    let bend = TransformTrack::from_keys(
        [(0.0, Vec3::ZERO)],
        [
            (0.0, Quat::IDENTITY),
            (2.0, quaternion_from_euler(90.0, 0.0, 0.0)),
            (4.0, Quat::IDENTITY),
        ],
        [(0.0, Vec3::ONE)],
    )?;

    let arm = insert(
        scene,
        Node::skinning_control("arm", Some(Arc::new(rest))),
        parent,
    )?;
    let forearm = scene.add_to_parent(Node::skinning_control("forearm", Some(Arc::new(bend))), arm)?;

    let mesh = SkinnedMesh::new(
        "skinned-cylinder",
        geometry,
        vec![arm, forearm],
        vec![Mat4::IDENTITY, Mat4::IDENTITY],
    )?;
    let skin = scene.add_skinned_mesh(mesh)?;
    scene.add_leaf(arm, Leaf::Skinned(skin))?;

    Ok(SkinnedCylinder { arm, forearm, skin })
}

fn insert(scene: &mut Scene, node: Node, parent: Option<NodeHandle>) -> Result<NodeHandle> {
    match parent {
        Some(parent) => scene.add_to_parent(node, parent),
        None => Ok(scene.add_node(node)),
    }
}
