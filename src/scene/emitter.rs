//! Geyser emitter
//!
//! Each activation appends an [`Emission`] carrying its spawn time and a
//! clamped charge. Emissions are independent: overlapping ones coexist and
//! are drawn separately, and each is retired on its own once more than
//! `lifetime` time units have elapsed since it spawned.
//!
//! ```text
//! activate(charge) ──► Rising ──(elapsed > lifetime)──► Expired (removed)
//! ```

use serde::{Deserialize, Serialize};

use crate::render::GeometryHandle;

/// Geyser configuration shared by the emitter and the particle shader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeyserSettings {
    /// Time units an emission stays alive.
    pub lifetime: f32,
    pub min_charge: f32,
    pub max_charge: f32,
    /// Particles drawn per emission.
    pub particle_count: u32,
    /// Particles released per time unit.
    pub particles_per_time: f32,
    /// Time for a particle to reach its peak.
    pub time_rising: f32,
}

impl Default for GeyserSettings {
    fn default() -> Self {
        Self {
            lifetime: 5.0,
            min_charge: 20.0,
            max_charge: 70.0,
            particle_count: 200,
            particles_per_time: 400.0,
            time_rising: 0.401,
        }
    }
}

/// Opaque identity of one emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmissionId(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    pub id: EmissionId,
    pub spawn_time: f32,
    pub charge: f32,
}

impl Emission {
    #[inline]
    #[must_use]
    pub fn elapsed(&self, now: f32) -> f32 {
        now - self.spawn_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionPhase {
    Rising,
    Expired,
}

/// A particle geyser with any number of concurrent emissions.
#[derive(Debug, Clone)]
pub struct GeyserEmitter {
    pub name: String,
    pub settings: GeyserSettings,
    /// Particle geometry, drawn once per particle per emission.
    pub particle: GeometryHandle,
    emissions: Vec<Emission>,
    next_id: u64,
}

impl GeyserEmitter {
    #[must_use]
    pub fn new(particle: GeometryHandle, settings: GeyserSettings) -> Self {
        Self {
            name: "Geyser".to_string(),
            settings,
            particle,
            emissions: Vec::new(),
            next_id: 0,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn clamp_charge(&self, charge: f32) -> f32 {
        charge.clamp(self.settings.min_charge, self.settings.max_charge)
    }

    /// Starts a new emission at `now`.
    pub fn activate(&mut self, now: f32, charge: f32) -> EmissionId {
        let id = EmissionId(self.next_id);
        self.next_id += 1;

        let charge = self.clamp_charge(charge);
        self.emissions.push(Emission {
            id,
            spawn_time: now,
            charge,
        });
        log::debug!("{}: emission {:?} at t={now} with charge {charge}", self.name, id);
        id
    }

    #[must_use]
    pub fn phase(&self, emission: &Emission, now: f32) -> EmissionPhase {
        if emission.elapsed(now) > self.settings.lifetime {
            EmissionPhase::Expired
        } else {
            EmissionPhase::Rising
        }
    }

    /// Drops every expired emission. Survivors keep their order and identity.
    ///
    /// Returns the number removed.
    pub fn advance(&mut self, now: f32) -> usize {
        let lifetime = self.settings.lifetime;
        let before = self.emissions.len();
        self.emissions.retain(|emission| emission.elapsed(now) <= lifetime);

        let removed = before - self.emissions.len();
        if removed > 0 {
            log::debug!("{}: retired {removed} emission(s) at t={now}", self.name);
        }
        removed
    }

    #[must_use]
    pub fn emissions(&self) -> &[Emission] {
        &self.emissions
    }

    #[must_use]
    pub fn get(&self, id: EmissionId) -> Option<&Emission> {
        self.emissions.iter().find(|emission| emission.id == id)
    }

    /// Emissions alive at `now` with their elapsed time.
    ///
    /// Emissions spawned after `now` are skipped, as are expired ones that
    /// have not been advanced away yet.
    pub fn active(&self, now: f32) -> impl Iterator<Item = (&Emission, f32)> {
        let lifetime = self.settings.lifetime;
        self.emissions.iter().filter_map(move |emission| {
            let elapsed = emission.elapsed(now);
            (0.0..=lifetime).contains(&elapsed).then_some((emission, elapsed))
        })
    }

    /// Time left before `id` expires, `None` once it is gone.
    #[must_use]
    pub fn remaining(&self, id: EmissionId, now: f32) -> Option<f32> {
        self.get(id)
            .map(|emission| self.settings.lifetime - emission.elapsed(now))
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.emissions.is_empty()
    }
}
