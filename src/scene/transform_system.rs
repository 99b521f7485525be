//! Transform System
//!
//! Hierarchy update decoupled from [`Scene`](crate::scene::Scene) so it only
//! borrows the node arena and the root list.
//!
//! One depth-first pass per frame:
//! 1. resolve the node's local matrix from its motion at the incoming time
//! 2. `world = parent_world × local`
//! 3. merge draw parameters and remap time for the subtree
//! 4. emit one [`RenderItem`] per leaf of a visible node
//!
//! Every world matrix, bones included, is final before any leaf is drawn, so
//! skinned meshes never observe a bone from the previous frame whatever the
//! child order is.

use glam::Mat4;
use slotmap::SlotMap;

use crate::scene::node::{Leaf, Node};
use crate::scene::params::DrawParams;
use crate::scene::NodeHandle;

/// A leaf ready for submission, with everything its node resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderItem {
    pub node: NodeHandle,
    pub leaf: Leaf,
    pub world: Mat4,
    pub params: DrawParams,
    /// Time after every clock and override above the leaf.
    pub time: f32,
}

struct StackEntry {
    handle: NodeHandle,
    parent_world: Mat4,
    params: DrawParams,
    time: f32,
    visible: bool,
}

/// Updates every node reachable from `roots` and collects render items.
///
/// Uses an explicit stack instead of recursion so deep procedural trees
/// cannot overflow. Children are visited in insertion order.
pub fn update_hierarchy(
    nodes: &mut SlotMap<NodeHandle, Node>,
    roots: &[NodeHandle],
    base_world: Mat4,
    base_params: DrawParams,
    time: f32,
    render_list: &mut Vec<RenderItem>,
) {
    render_list.clear();

    let mut stack: Vec<StackEntry> = Vec::with_capacity(64);
    for &root in roots.iter().rev() {
        stack.push(StackEntry {
            handle: root,
            parent_world: base_world,
            params: base_params,
            time,
            visible: true,
        });
    }

    while let Some(entry) = stack.pop() {
        let Some(node) = nodes.get_mut(entry.handle) else {
            continue;
        };

        let params = entry.params.merged(&node.params);
        let node_time = params.time.unwrap_or(entry.time);

        if let Some(local) = node.motion.resolve(node_time) {
            node.local_matrix = local;
        }
        let world = entry.parent_world * node.local_matrix;
        node.world_matrix = world;

        let subtree_time = node.clock.map_or(node_time, |clock| clock.local_time(node_time));
        let visible = entry.visible && node.visible;

        if visible {
            render_list.extend(node.leaves.iter().map(|&leaf| RenderItem {
                node: entry.handle,
                leaf,
                world,
                params,
                time: subtree_time,
            }));
        }

        // Children see the remapped time, not the override of this node.
        let child_params = DrawParams {
            time: None,
            ..params
        };
        for &child in node.children.iter().rev() {
            stack.push(StackEntry {
                handle: child,
                parent_world: world,
                params: child_params,
                time: subtree_time,
                visible,
            });
        }
    }
}

/// Recomputes world matrices below `root` without touching motions.
///
/// Used after structural edits between frames; the parent's last world
/// matrix is taken as the starting point.
pub fn refresh_subtree(nodes: &mut SlotMap<NodeHandle, Node>, root: NodeHandle) {
    let parent_world = nodes
        .get(root)
        .and_then(|node| node.parent)
        .and_then(|parent| nodes.get(parent))
        .map_or(Mat4::IDENTITY, |parent| parent.world_matrix);

    let mut stack = vec![(root, parent_world)];
    while let Some((handle, parent_world)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };
        node.world_matrix = parent_world * node.local_matrix;
        let world = node.world_matrix;
        stack.extend(node.children.iter().rev().map(|&child| (child, world)));
    }
}
