use glam::Mat4;
use slotmap::SlotMap;

use crate::animation::Playback;
use crate::errors::{Result, SceneError};
use crate::resources::Mesh;
use crate::scene::emitter::GeyserEmitter;
use crate::scene::motion::Motion;
use crate::scene::node::{Leaf, Node};
use crate::scene::params::DrawParams;
use crate::scene::skeleton::SkinnedMesh;
use crate::scene::transform_system::{self, RenderItem};
use crate::scene::{EmitterKey, MeshKey, NodeHandle, SkinKey};

/// Something that reacts to a charge release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeTarget {
    /// Starts a new emission.
    Emitter(EmitterKey),
    /// Launches a node whose motion is a hop and restarts its clock.
    Hop(NodeHandle),
}

/// Scene graph container.
///
/// Nodes, meshes, skinned meshes and emitters live in slot-map arenas and
/// refer to each other by key. A mesh can be referenced by any number of
/// nodes; it is never copied.
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== Resource pools ====
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub skins: SlotMap<SkinKey, SkinnedMesh>,
    pub emitters: SlotMap<EmitterKey, GeyserEmitter>,

    /// Matrix every root is composed onto.
    pub root_transform: Mat4,
    /// Parameters every root inherits.
    pub root_params: DrawParams,

    charge_targets: Vec<ChargeTarget>,
    render_list: Vec<RenderItem>,
    last_update: Option<f32>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            skins: SlotMap::with_key(),
            emitters: SlotMap::with_key(),
            root_transform: Mat4::IDENTITY,
            root_params: DrawParams::default(),
            charge_targets: Vec::new(),
            render_list: Vec::new(),
            last_update: None,
        }
    }

    /// Starts building a node.
    pub fn build_node(&mut self, name: &str) -> NodeBuilder<'_> {
        NodeBuilder::new(self, name)
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Adds a node as a new root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Adds a node under `parent`.
    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> Result<NodeHandle> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(format!("{parent:?}")));
        }

        child.parent = Some(parent);
        let handle = self.nodes.insert(child);
        self.nodes[parent].children.push(handle);
        Ok(handle)
    }

    /// Moves `child` (and its subtree) under `parent`.
    ///
    /// Fails without changing anything when either node is missing or when
    /// `parent` lies inside `child`'s subtree.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()> {
        if !self.nodes.contains_key(child) {
            return Err(SceneError::NodeNotFound(format!("{child:?}")));
        }
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(format!("{parent:?}")));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::HierarchyCycle {
                child: self.nodes[child].name.clone(),
                parent: self.nodes[parent].name.clone(),
            });
        }

        self.detach(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        transform_system::refresh_subtree(&mut self.nodes, child);
        Ok(())
    }

    /// Makes `child` a root again.
    pub fn detach_to_root(&mut self, child: NodeHandle) -> Result<()> {
        if !self.nodes.contains_key(child) {
            return Err(SceneError::NodeNotFound(format!("{child:?}")));
        }
        self.detach(child);
        self.root_nodes.push(child);
        Ok(())
    }

    /// Unlinks `child` from its parent or from the root list.
    fn detach(&mut self, child: NodeHandle) {
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    /// Removes a node and its whole subtree.
    ///
    /// Shared meshes stay in the pool. Skinned meshes and emitters referenced
    /// only by leaves of the removed nodes are left for the caller to drop.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach(handle);

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
            }
        }
        self.charge_targets.retain(|target| match target {
            ChargeTarget::Hop(node) => self.nodes.contains_key(*node),
            ChargeTarget::Emitter(_) => true,
        });
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// First node with the given name, depth-first from the roots.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        let mut stack: Vec<NodeHandle> = self.root_nodes.iter().rev().copied().collect();
        while let Some(handle) = stack.pop() {
            let node = self.nodes.get(handle)?;
            if node.name == name {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// World matrix from the most recent update.
    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Mat4> {
        self.nodes.get(handle).map(|node| node.world_matrix)
    }

    // ========================================================================
    // Resources & leaves
    // ========================================================================

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshKey {
        self.meshes.insert(mesh)
    }

    /// Attaches a drawable to an existing node.
    pub fn add_leaf(&mut self, node: NodeHandle, leaf: Leaf) -> Result<()> {
        let Some(node) = self.nodes.get_mut(node) else {
            return Err(SceneError::NodeNotFound(format!("{node:?}")));
        };
        node.leaves.push(leaf);
        Ok(())
    }

    /// Registers a skinned mesh after checking its bones.
    pub fn add_skinned_mesh(&mut self, skin: SkinnedMesh) -> Result<SkinKey> {
        skin.validate(&self.nodes)?;
        Ok(self.skins.insert(skin))
    }

    pub fn add_emitter(&mut self, emitter: GeyserEmitter) -> EmitterKey {
        self.emitters.insert(emitter)
    }

    // ========================================================================
    // Charge dispatch
    // ========================================================================

    pub fn register_charge_target(&mut self, target: ChargeTarget) {
        if !self.charge_targets.contains(&target) {
            self.charge_targets.push(target);
        }
    }

    #[must_use]
    pub fn charge_targets(&self) -> &[ChargeTarget] {
        &self.charge_targets
    }

    /// Activates every registered emitter and launches every registered hop
    /// node. Returns how many targets reacted.
    pub fn trigger_charge(&mut self, now: f32, charge: f32) -> usize {
        let mut reacted = 0;
        for target in &self.charge_targets {
            match *target {
                ChargeTarget::Emitter(key) => {
                    if let Some(emitter) = self.emitters.get_mut(key) {
                        emitter.activate(now, charge);
                        reacted += 1;
                    }
                }
                ChargeTarget::Hop(handle) => {
                    let Some(node) = self.nodes.get_mut(handle) else {
                        continue;
                    };
                    if let Motion::Hop(hop) = &mut node.motion {
                        hop.launch(charge);
                        if let Some(clock) = &mut node.clock {
                            clock.restart(now);
                        }
                        reacted += 1;
                    }
                }
            }
        }
        log::debug!("Charge {charge} at t={now} reached {reacted} target(s)");
        reacted
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Propagates transforms at `time`, retires expired emissions and
    /// recomputes the bone matrices of every skinned mesh that will be drawn.
    pub fn update(&mut self, time: f32) -> Result<()> {
        transform_system::update_hierarchy(
            &mut self.nodes,
            &self.root_nodes,
            self.root_transform,
            self.root_params,
            time,
            &mut self.render_list,
        );

        for emitter in self.emitters.values_mut() {
            emitter.advance(time);
        }

        for item in &self.render_list {
            if let Leaf::Skinned(key) = item.leaf
                && let Some(skin) = self.skins.get_mut(key)
            {
                skin.compute_bone_matrices(&self.nodes)?;
            }
        }

        self.last_update = Some(time);
        Ok(())
    }

    /// Leaves collected by the last [`update`](Self::update), in traversal order.
    #[must_use]
    pub fn render_list(&self) -> &[RenderItem] {
        &self.render_list
    }

    #[must_use]
    pub fn last_update(&self) -> Option<f32> {
        self.last_update
    }
}

/// Chained node construction, in the style of `scene.build_node("x").with_…().build()`.
pub struct NodeBuilder<'a> {
    scene: &'a mut Scene,
    node: Node,
    parent: Option<NodeHandle>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(scene: &'a mut Scene, name: &str) -> Self {
        Self {
            scene,
            node: Node::new(name),
            parent: None,
        }
    }

    #[must_use]
    pub fn with_local(mut self, local: Mat4) -> Self {
        self.node.local_matrix = local;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: DrawParams) -> Self {
        self.node.params = params;
        self
    }

    #[must_use]
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.node.motion = motion;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Playback) -> Self {
        self.node.clock = Some(clock);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: MeshKey) -> Self {
        self.node.leaves.push(Leaf::Mesh(mesh));
        self
    }

    #[must_use]
    pub fn publishing_world(mut self) -> Self {
        self.node.publishes_world = true;
        self
    }

    /// Inserts the node, under its parent when one was given.
    pub fn build(self) -> Result<NodeHandle> {
        match self.parent {
            Some(parent) => self.scene.add_to_parent(self.node, parent),
            None => Ok(self.scene.add_node(self.node)),
        }
    }
}
