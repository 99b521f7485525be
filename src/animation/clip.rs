use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::transform_track::TransformTrack;

/// A named set of per-node transform channels.
///
/// Channels are keyed by node name and shared via `Arc`, so every node
/// instantiated from the same asset observes one immutable track.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    channels: FxHashMap<String, Arc<TransformTrack>>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: String, channels: FxHashMap<String, TransformTrack>) -> Self {
        let duration = channels
            .values()
            .map(TransformTrack::end_time)
            .fold(0.0_f32, f32::max);

        Self {
            name,
            duration,
            channels: channels
                .into_iter()
                .map(|(node, track)| (node, Arc::new(track)))
                .collect(),
        }
    }

    /// Track driving the node called `node_name`, if any.
    #[must_use]
    pub fn channel(&self, node_name: &str) -> Option<Arc<TransformTrack>> {
        self.channels.get(node_name).cloned()
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
