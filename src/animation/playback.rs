/// How local time behaves past the end of the clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Clamp to `[0, duration]`.
    Once,
    /// Wrap around modulo the duration.
    Loop,
    /// Play forward then backward.
    PingPong,
}

/// Maps incoming (wall) time onto a subtree-local animation time.
///
/// `local = (now - start) * time_scale`, then folded by the loop mode when
/// a positive duration is known. Without a duration the time is only offset
/// and scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub start: f32,
    pub time_scale: f32,
    pub loop_mode: LoopMode,
    pub duration: Option<f32>,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            start: 0.0,
            time_scale: 1.0,
            loop_mode: LoopMode::Once,
            duration: None,
        }
    }
}

impl Playback {
    /// Offset and scale only.
    #[must_use]
    pub fn offset(start: f32, time_scale: f32) -> Self {
        Self {
            start,
            time_scale,
            ..Self::default()
        }
    }

    /// Repeats every `period` time units.
    #[must_use]
    pub fn looping(period: f32) -> Self {
        Self {
            loop_mode: LoopMode::Loop,
            duration: Some(period),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode, duration: f32) -> Self {
        self.loop_mode = loop_mode;
        self.duration = Some(duration);
        self
    }

    /// Restarts playback so that `now` maps to local time zero.
    pub fn restart(&mut self, now: f32) {
        self.start = now;
    }

    #[must_use]
    pub fn local_time(&self, now: f32) -> f32 {
        let time = (now - self.start) * self.time_scale;

        let Some(duration) = self.duration.filter(|d| *d > 0.0) else {
            return time;
        };

        match self.loop_mode {
            LoopMode::Once => time.clamp(0.0, duration),
            LoopMode::Loop => time.rem_euclid(duration),
            LoopMode::PingPong => {
                let t = time.rem_euclid(duration * 2.0);
                if t > duration { duration * 2.0 - t } else { t }
            }
        }
    }
}
