use std::sync::Arc;

use glam::Mat4;

use crate::animation::{Playback, TransformTrack};
use crate::scene::motion::{HopMotion, HopSettings, Motion, OrbitMotion, OrbitSettings};
use crate::scene::params::DrawParams;
use crate::scene::{EmitterKey, MeshKey, NodeHandle, SkinKey};

/// A drawable attached to a node, referring to a resource owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaf {
    Mesh(MeshKey),
    Skinned(SkinKey),
    Emitter(EmitterKey),
}

/// A scene node.
///
/// # Hierarchy
///
/// Nodes form a tree through `parent` / `children` handles kept in sync by
/// [`Scene`](crate::scene::Scene). A node appears under at most one parent
/// and attaching never creates a cycle.
///
/// # Transform
///
/// `local_matrix` is either fixed or, when `motion` is time driven, replaced
/// on every update. `world_matrix` is the parent's world matrix times the
/// local matrix, refreshed by the transform system each frame.
///
/// # Bones
///
/// A node that publishes its world matrix may be referenced as a bone by any
/// number of skinned meshes. The flag is part of the node's contract with
/// those meshes; world matrices of other nodes are still computed but are not
/// meant to be consumed outside the traversal.
#[derive(Debug, Clone)]
pub struct Node {
    /// Diagnostic name, also used to bind animation channels on import.
    pub name: String,

    // === Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Spatial ===
    pub local_matrix: Mat4,
    pub(crate) world_matrix: Mat4,

    // === Behaviour ===
    pub params: DrawParams,
    pub motion: Motion,
    /// Remaps the time seen by this node's leaves and children.
    pub clock: Option<Playback>,
    pub(crate) publishes_world: bool,

    // === Content ===
    pub leaves: Vec<Leaf>,
    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local_matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
            params: DrawParams::default(),
            motion: Motion::Static,
            clock: None,
            publishes_world: false,
            leaves: Vec::new(),
            visible: true,
        }
    }

    /// A node whose local matrix follows `track`.
    #[must_use]
    pub fn keyframed(name: impl Into<String>, track: Arc<TransformTrack>) -> Self {
        Self::new(name).with_motion(Motion::keyframed(track))
    }

    /// A node usable as a skinning bone, keyframed when a track is given.
    #[must_use]
    pub fn skinning_control(name: impl Into<String>, track: Option<Arc<TransformTrack>>) -> Self {
        let node = Self::new(name).publishing_world();
        match track {
            Some(track) => node.with_motion(Motion::keyframed(track)),
            None => node,
        }
    }

    /// A hopping node created at `now`, with its subtree clock.
    #[must_use]
    pub fn hopping(name: impl Into<String>, settings: HopSettings, now: f32) -> Self {
        Self::new(name)
            .with_motion(Motion::Hop(HopMotion::new(settings)))
            .with_clock(settings.clock(now))
    }

    #[must_use]
    pub fn orbiting(name: impl Into<String>, settings: OrbitSettings) -> Self {
        Self::new(name)
            .with_motion(Motion::Orbit(OrbitMotion::new(settings)))
            .with_clock(settings.clock())
    }

    #[must_use]
    pub fn with_local(mut self, local: Mat4) -> Self {
        self.local_matrix = local;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: DrawParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Playback) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub fn with_leaf(mut self, leaf: Leaf) -> Self {
        self.leaves.push(leaf);
        self
    }

    #[must_use]
    pub fn publishing_world(mut self) -> Self {
        self.publishes_world = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// World matrix from the most recent update.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    #[inline]
    #[must_use]
    pub fn publishes_world(&self) -> bool {
        self.publishes_world
    }

    /// Time seen by this node's leaves and children for an incoming `time`.
    #[must_use]
    pub fn subtree_time(&self, time: f32) -> f32 {
        let time = self.params.time.unwrap_or(time);
        self.clock.map_or(time, |clock| clock.local_time(time))
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}
