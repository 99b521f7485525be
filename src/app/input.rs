use std::fmt;

use serde::{Deserialize, Serialize};

/// Hold-to-charge parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeSettings {
    /// Charge gained per time unit of holding.
    pub rate: f32,
    pub min_charge: f32,
    pub max_charge: f32,
}

impl Default for ChargeSettings {
    fn default() -> Self {
        Self {
            rate: 250.0,
            min_charge: 20.0,
            max_charge: 70.0,
        }
    }
}

/// Maps how long the input was held to a charge.
pub trait ChargePolicy {
    fn charge(&self, held: f32) -> f32;
}

impl<F> ChargePolicy for F
where
    F: Fn(f32) -> f32,
{
    fn charge(&self, held: f32) -> f32 {
        self(held)
    }
}

/// `clamp(rate · held, min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRamp {
    pub rate: f32,
    pub min: f32,
    pub max: f32,
}

impl From<ChargeSettings> for LinearRamp {
    fn from(settings: ChargeSettings) -> Self {
        Self {
            rate: settings.rate,
            min: settings.min_charge,
            max: settings.max_charge,
        }
    }
}

impl ChargePolicy for LinearRamp {
    fn charge(&self, held: f32) -> f32 {
        (self.rate * held.max(0.0)).clamp(self.min, self.max)
    }
}

/// Turns begin/end input events into a charge value.
pub struct ChargeController {
    settings: ChargeSettings,
    policy: Box<dyn ChargePolicy>,
    pressed_at: Option<f32>,
}

impl fmt::Debug for ChargeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChargeController")
            .field("settings", &self.settings)
            .field("pressed_at", &self.pressed_at)
            .finish_non_exhaustive()
    }
}

impl Default for ChargeController {
    fn default() -> Self {
        Self::new(ChargeSettings::default())
    }
}

impl ChargeController {
    /// A controller using [`LinearRamp`] over `settings`.
    #[must_use]
    pub fn new(settings: ChargeSettings) -> Self {
        Self {
            settings,
            policy: Box::new(LinearRamp::from(settings)),
            pressed_at: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: impl ChargePolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &ChargeSettings {
        &self.settings
    }

    /// Input pressed. A second press while charging keeps the first.
    pub fn begin(&mut self, now: f32) {
        if self.pressed_at.is_none() {
            self.pressed_at = Some(now);
        }
    }

    /// Input released. `None` if no charge was in progress.
    pub fn end(&mut self, now: f32) -> Option<f32> {
        let pressed_at = self.pressed_at.take()?;
        let charge = self.policy.charge(now - pressed_at);
        log::debug!("Charge released after {:.3}: {charge}", now - pressed_at);
        Some(charge)
    }

    #[must_use]
    pub fn is_charging(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Charge the policy would give if released at `now`.
    #[must_use]
    pub fn progress(&self, now: f32) -> Option<f32> {
        self.pressed_at.map(|pressed_at| self.policy.charge(now - pressed_at))
    }

    /// In-progress charge normalised to `[0, 1]` over the clamp range; zero
    /// when idle.
    #[must_use]
    pub fn level(&self, now: f32) -> f32 {
        let Some(charge) = self.progress(now) else {
            return 0.0;
        };
        let span = self.settings.max_charge - self.settings.min_charge;
        if span <= 0.0 {
            return 1.0;
        }
        ((charge - self.settings.min_charge) / span).clamp(0.0, 1.0)
    }
}
