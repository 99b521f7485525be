//! Keyframe animation
//!
//! - [`KeyframeTrack`]: ordered time → value samples with clamped interpolation
//! - [`TransformTrack`]: translation/rotation/scale tracks composed as T·R·S
//! - [`AnimationClip`]: per-node transform tracks loaded from an asset
//! - [`Playback`]: wall time → animation time remapping

pub mod clip;
pub mod playback;
pub mod tracks;
pub mod transform_track;
pub mod values;

pub use clip::AnimationClip;
pub use playback::{LoopMode, Playback};
pub use tracks::{Interpolation, KeyframeCursor, KeyframeTrack};
pub use transform_track::{TransformTrack, TrsCursor};
pub use values::Interpolatable;
