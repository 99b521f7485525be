//! Geyser emitter tests
//!
//! Tests for:
//! - Charge clamping on activation
//! - Emission lifetime boundaries
//! - Independence of overlapping emissions
//! - Emitters advanced by the scene update
//! - ChargeController and charge policies

use dinoscene::app::{ChargeController, ChargePolicy, ChargeSettings, LinearRamp};
use dinoscene::render::GeometryHandle;
use dinoscene::scene::{EmissionPhase, GeyserEmitter, GeyserSettings, Leaf, Node, Scene};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn geyser() -> GeyserEmitter {
    GeyserEmitter::new(GeometryHandle::new(9), GeyserSettings::default())
}

// ============================================================================
// Charge Clamp
// ============================================================================

#[test]
fn activation_clamps_charge() {
    let mut emitter = geyser();
    for (input, expected) in [(5.0, 20.0), (20.0, 20.0), (45.0, 45.0), (70.0, 70.0), (500.0, 70.0), (-3.0, 20.0)] {
        let id = emitter.activate(0.0, input);
        assert!(approx(emitter.get(id).unwrap().charge, expected), "{input} -> {expected}");
    }
}

// ============================================================================
// Lifetime
// ============================================================================

#[test]
fn emission_survives_until_lifetime() {
    let mut emitter = geyser();
    let id = emitter.activate(0.0, 30.0);

    emitter.advance(4.9);
    assert!(emitter.get(id).is_some());
    assert_eq!(emitter.active(4.9).count(), 1);

    emitter.advance(5.1);
    assert!(emitter.get(id).is_none());
    assert!(emitter.is_idle());
}

#[test]
fn emission_at_exact_lifetime_is_still_alive() {
    let mut emitter = geyser();
    let id = emitter.activate(1.0, 30.0);
    assert_eq!(emitter.advance(6.0), 0);
    assert_eq!(emitter.phase(emitter.get(id).unwrap(), 6.0), EmissionPhase::Rising);
    assert_eq!(emitter.phase(emitter.get(id).unwrap(), 6.01), EmissionPhase::Expired);
}

#[test]
fn active_skips_expired_and_future_emissions() {
    let mut emitter = geyser();
    emitter.activate(0.0, 30.0);
    emitter.activate(10.0, 40.0);

    // Not advanced yet: the first is expired, the second not born.
    assert_eq!(emitter.active(7.0).count(), 0);

    let active: Vec<f32> = emitter.active(12.0).map(|(_, elapsed)| elapsed).collect();
    assert_eq!(active.len(), 1);
    assert!(approx(active[0], 2.0));
}

#[test]
fn remaining_counts_down() {
    let mut emitter = geyser();
    let id = emitter.activate(2.0, 30.0);
    assert!(approx(emitter.remaining(id, 4.5).unwrap(), 2.5));
}

// ============================================================================
// Concurrent Emissions
// ============================================================================

#[test]
fn overlapping_emissions_are_independent() {
    let mut emitter = geyser();
    let first = emitter.activate(0.0, 25.0);
    let second = emitter.activate(3.0, 60.0);
    assert_ne!(first, second);

    emitter.advance(4.0);
    let elapsed: Vec<(f32, f32)> = emitter.active(4.0).map(|(e, t)| (e.charge, t)).collect();
    assert_eq!(elapsed.len(), 2);
    assert!(approx(elapsed[0].0, 25.0) && approx(elapsed[0].1, 4.0));
    assert!(approx(elapsed[1].0, 60.0) && approx(elapsed[1].1, 1.0));

    // The first one expiring leaves the second untouched.
    assert_eq!(emitter.advance(5.5), 1);
    assert!(emitter.get(first).is_none());
    let survivor = emitter.get(second).unwrap();
    assert!(approx(survivor.spawn_time, 3.0));
    assert!(approx(survivor.charge, 60.0));

    emitter.advance(8.01);
    assert!(emitter.is_idle());
}

#[test]
fn custom_lifetime_is_respected() {
    let settings = GeyserSettings {
        lifetime: 1.0,
        ..GeyserSettings::default()
    };
    let mut emitter = GeyserEmitter::new(GeometryHandle::new(1), settings);
    emitter.activate(0.0, 30.0);
    assert_eq!(emitter.advance(1.5), 1);
}

// ============================================================================
// Scene Integration
// ============================================================================

#[test]
fn scene_update_retires_expired_emissions() {
    let mut scene = Scene::new();
    let key = scene.add_emitter(geyser());
    scene.add_node(Node::new("geyser").with_leaf(Leaf::Emitter(key)));
    scene.emitters[key].activate(0.0, 50.0);

    scene.update(4.9).unwrap();
    assert_eq!(scene.emitters[key].emissions().len(), 1);
    scene.update(5.1).unwrap();
    assert!(scene.emitters[key].is_idle());
}

// ============================================================================
// Charge Input
// ============================================================================

#[test]
fn controller_ramps_and_clamps() {
    let mut controller = ChargeController::new(ChargeSettings::default());
    assert!(!controller.is_charging());

    controller.begin(1.0);
    assert!(controller.is_charging());
    assert!(approx(controller.progress(1.125).unwrap(), 31.25));
    assert!(approx(controller.level(1.0), 0.0));
    assert!(approx(controller.level(10.0), 1.0));

    assert!(approx(controller.end(1.25).unwrap(), 62.5));
    assert!(!controller.is_charging());
    assert!(approx(controller.level(1.3), 0.0));
}

#[test]
fn second_press_keeps_first_timestamp() {
    let mut controller = ChargeController::default();
    controller.begin(0.0);
    controller.begin(0.125);
    assert!(approx(controller.end(0.25).unwrap(), 62.5));
}

#[test]
fn linear_ramp_matches_settings() {
    let ramp = LinearRamp::from(ChargeSettings {
        rate: 10.0,
        min_charge: 1.0,
        max_charge: 5.0,
    });
    assert!(approx(ramp.charge(0.0), 1.0));
    assert!(approx(ramp.charge(0.3), 3.0));
    assert!(approx(ramp.charge(2.0), 5.0));
}
