use glam::{Mat4, Quat, Vec3};

use crate::animation::tracks::{Interpolation, KeyframeCursor, KeyframeTrack};
use crate::errors::{Result, SceneError};
use crate::math::compose_trs;

/// Per-channel cursors for sequential sampling of a [`TransformTrack`].
#[derive(Debug, Clone, Default)]
pub struct TrsCursor {
    pub translation: KeyframeCursor,
    pub rotation: KeyframeCursor,
    pub scale: KeyframeCursor,
}

/// Three independent keyframe channels combined into one matrix per sample.
///
/// `value(t) = T(translation(t)) · R(rotation(t)) · S(scale(t))`.
#[derive(Debug, Clone)]
pub struct TransformTrack {
    pub translation: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scale: KeyframeTrack<Vec3>,
}

impl TransformTrack {
    #[must_use]
    pub fn new(
        translation: KeyframeTrack<Vec3>,
        rotation: KeyframeTrack<Quat>,
        scale: KeyframeTrack<Vec3>,
    ) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Builds linear/slerp channels from unordered key sets.
    pub fn from_keys<T, R, S>(translation: T, rotation: R, scale: S) -> Result<Self>
    where
        T: IntoIterator<Item = (f32, Vec3)>,
        R: IntoIterator<Item = (f32, Quat)>,
        S: IntoIterator<Item = (f32, Vec3)>,
    {
        let translation = KeyframeTrack::from_keys(translation, Interpolation::Linear)
            .map_err(|e| SceneError::channel("translation", e))?;
        let rotation = KeyframeTrack::from_keys(rotation, Interpolation::Linear)
            .map_err(|e| SceneError::channel("rotation", e))?;
        let scale = KeyframeTrack::from_keys(scale, Interpolation::Linear)
            .map_err(|e| SceneError::channel("scale", e))?;

        Ok(Self::new(translation, rotation, scale))
    }

    /// A track holding one fixed pose.
    #[must_use]
    pub fn fixed(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self::new(
            KeyframeTrack::constant(translation),
            KeyframeTrack::constant(rotation),
            KeyframeTrack::constant(scale),
        )
    }

    /// Sampled channel values at `time`.
    #[must_use]
    pub fn sample_trs(&self, time: f32) -> (Vec3, Quat, Vec3) {
        (
            self.translation.value(time),
            self.rotation.value(time),
            self.scale.value(time),
        )
    }

    /// Composite matrix at `time`.
    #[must_use]
    pub fn value(&self, time: f32) -> Mat4 {
        let (t, r, s) = self.sample_trs(time);
        compose_trs(t, r, s)
    }

    /// Composite matrix at `time`, sampling through per-channel cursors.
    pub fn value_with_cursor(&self, time: f32, cursor: &mut TrsCursor) -> Mat4 {
        let t = self.translation.sample_with_cursor(time, &mut cursor.translation);
        let r = self.rotation.sample_with_cursor(time, &mut cursor.rotation);
        let s = self.scale.sample_with_cursor(time, &mut cursor.scale);
        compose_trs(t, r, s)
    }

    /// Latest key time across the three channels.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.translation
            .end_time()
            .max(self.rotation.end_time())
            .max(self.scale.end_time())
    }
}
