use std::time::{Duration, Instant};

/// Seconds since the driver started, sampled once per frame.
///
/// [`FrameDriver::tick`](crate::app::FrameDriver::tick) is the only reader.
/// Scene code never sees an `Instant`, only the `f32` this produces.
#[derive(Debug, Clone)]
pub struct Timer {
    origin: Instant,
    sampled: Duration,
    frames: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            sampled: Duration::ZERO,
            frames: 0,
        }
    }

    pub fn tick(&mut self) {
        self.sampled = self.origin.elapsed();
        self.frames += 1;
    }

    /// Scene time as of the last [`tick`](Self::tick); zero before the first.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.sampled.as_secs_f32()
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_only_on_tick() {
        let mut timer = Timer::new();
        assert_eq!(timer.elapsed_seconds(), 0.0);

        timer.tick();
        let first = timer.elapsed_seconds();
        timer.tick();
        assert!(timer.elapsed_seconds() >= first);
        assert_eq!(timer.frames(), 2);
    }
}
