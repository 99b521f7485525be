// src/animation/tracks.rs
use std::fmt;

use crate::animation::values::Interpolatable;
use crate::errors::{Result, SceneError};

/// Blending function between two neighbouring keys.
pub type InterpolateFn<T> = fn(T, T, f32) -> T;

/// How a track blends between its two bounding keys.
#[derive(Clone, Copy)]
pub enum Interpolation<T> {
    /// Per-type linear blend (lerp for vectors, shortest-arc slerp for quaternions).
    Linear,
    /// Holds the earlier key until the next one is reached.
    Step,
    /// Caller supplied blend.
    Custom(InterpolateFn<T>),
}

impl<T> fmt::Debug for Interpolation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpolation::Linear => f.write_str("Linear"),
            Interpolation::Step => f.write_str("Step"),
            Interpolation::Custom(_) => f.write_str("Custom"),
        }
    }
}

const MAX_SCAN_OFFSET: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Ordered time → value mapping with an interpolation rule.
///
/// Invariants (checked at construction): at least one key, finite times,
/// strictly increasing. Immutable once built.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
    interpolation: Interpolation<T>,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a track from parallel, already sorted, time and value lists.
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: Interpolation<T>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(SceneError::MismatchedKeyframes {
                times: times.len(),
                values: values.len(),
            });
        }
        if times.is_empty() {
            return Err(SceneError::EmptyKeyframes);
        }
        if let Some(&bad) = times.iter().find(|t| !t.is_finite()) {
            return Err(SceneError::NonFiniteKeyTime(bad));
        }
        if let Some(index) = times.windows(2).position(|w| w[0] >= w[1]) {
            return Err(SceneError::UnsortedKeyTimes { index: index + 1 });
        }

        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    /// Builds a track from an unordered collection of `(time, value)` keys.
    pub fn from_keys<I>(keys: I, interpolation: Interpolation<T>) -> Result<Self>
    where
        I: IntoIterator<Item = (f32, T)>,
    {
        let mut keys: Vec<(f32, T)> = keys.into_iter().collect();
        if keys.is_empty() {
            return Err(SceneError::EmptyKeyframes);
        }
        if let Some(&(bad, _)) = keys.iter().find(|(t, _)| !t.is_finite()) {
            return Err(SceneError::NonFiniteKeyTime(bad));
        }

        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(w) = keys.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(SceneError::DuplicateKeyTime(w[0].0));
        }

        let (times, values) = keys.into_iter().unzip();
        Self::new(times, values, interpolation)
    }

    /// Linear track from unordered keys.
    pub fn linear<I>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f32, T)>,
    {
        Self::from_keys(keys, Interpolation::Linear)
    }

    /// Single-key track that always yields `value`.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self {
            times: vec![0.0],
            values: vec![value],
            interpolation: Interpolation::Linear,
        }
    }

    #[inline]
    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false: empty tracks cannot be constructed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[must_use]
    pub fn start_time(&self) -> f32 {
        self.times[0]
    }

    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times[self.times.len() - 1]
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation<T> {
        self.interpolation
    }

    /// Interpolated value at `time`, clamped to the first/last key outside the key range.
    #[must_use]
    pub fn value(&self, time: f32) -> T {
        let last = self.times.len() - 1;
        // NaN samples the first key.
        if time.is_nan() || time <= self.times[0] {
            return self.values[0];
        }
        if time >= self.times[last] {
            return self.values[last];
        }

        // Rightmost key with t <= time. Both clamps above guarantee 1 <= next_idx <= last.
        let next_idx = self.times.partition_point(|&t| t <= time);
        self.sample_at_frame(next_idx - 1, time)
    }

    /// Same result as [`value`](Self::value), reusing the cursor from the
    /// previous sample so sequential playback avoids the binary search.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        let len = self.times.len();
        if len == 1 || time.is_nan() || time <= self.times[0] {
            cursor.last_index = 0;
            return self.values[0];
        }
        if time >= self.times[len - 1] {
            cursor.last_index = len - 1;
            return self.values[len - 1];
        }

        let i = cursor.last_index.min(len - 1);

        let found_index = if time >= self.times[i] {
            // Forward playback: scan a few intervals ahead.
            (0..=MAX_SCAN_OFFSET)
                .map(|offset| i + offset)
                .take_while(|&idx| idx < len - 1)
                .find(|&idx| time < self.times[idx + 1])
        } else {
            // Backward playback or loop reset: scan a few intervals behind.
            (0..=MAX_SCAN_OFFSET)
                .take_while(|&offset| offset <= i)
                .map(|offset| i - offset)
                .find(|&idx| time >= self.times[idx])
        };

        let index = found_index.unwrap_or_else(|| {
            // Large jump: fall back to the binary search.
            self.times.partition_point(|&t| t <= time) - 1
        });

        cursor.last_index = index;
        self.sample_at_frame(index, time)
    }

    /// Blends keys `index` and `index + 1`; requires `times[index] <= time < times[index + 1]`.
    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let t0 = self.times[index];
        let t1 = self.times[index + 1];
        let fraction = ((time - t0) / (t1 - t0)).clamp(0.0, 1.0);

        let v0 = self.values[index];
        if fraction == 0.0 {
            return v0;
        }
        let v1 = self.values[index + 1];

        match self.interpolation {
            Interpolation::Linear => T::interpolate_linear(v0, v1, fraction),
            Interpolation::Step => v0,
            Interpolation::Custom(blend) => blend(v0, v1, fraction),
        }
    }
}
