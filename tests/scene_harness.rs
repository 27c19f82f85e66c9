//! Headless tests driving both scenes through the Bevy harness.
//!
//! These tests use [`MinimalPlugins`] (no window, no rendering, no input
//! plugin) and feed characters straight into [`PendingKeys`], so they run fast
//! and deterministically in CI.  Frame time is pinned with
//! [`TimeUpdateStrategy::ManualDuration`].
//!
//! Covered scenarios:
//! 1. Platform `w` reaches every corner through the key pipeline.
//! 2. Keys a scene ignores fall through to the harness (`p` pause toggle).
//! 3. Space on a running scene pauses it after exactly one frame.
//! 4. Wall starts paused; keys still reach it, space steps exactly one frame.
//! 5. Wall `r` re-lays a scattered wall without touching the masses.
//! 6. Escape requests an app exit.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use physics_scenes::harness::{PendingKeys, ScenePlugin, SimulationControl, ESCAPE};
use physics_scenes::scenes::wall::FireState;
use physics_scenes::scenes::{PlatformScene, WallScene};
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a headless app running scene `S` with a fixed 16 ms frame.
///
/// One update is run so the Startup schedule builds the scene.
fn headless_app<S: physics_scenes::harness::DemoScene>() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, ScenePlugin::<S>::default()))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
    app.update();
    app
}

fn press(app: &mut App, keys: &str) {
    app.world_mut()
        .resource_mut::<PendingKeys>()
        .0
        .extend(keys.chars());
    app.update();
}

fn set_paused(app: &mut App, paused: bool) {
    app.world_mut().resource_mut::<SimulationControl>().paused = paused;
}

// ── Platform ──────────────────────────────────────────────────────────────────

/// `w` overwrites every corner velocity with exactly (0, 4, 0).
#[test]
fn platform_w_sets_corner_velocities() {
    let mut app = headless_app::<PlatformScene>();
    assert!(!app.world().resource::<SimulationControl>().paused);

    set_paused(&mut app, true);
    press(&mut app, "w");

    let scene = app.world().resource::<PlatformScene>();
    assert_eq!(scene.corner_velocities(), [Vec3::new(0.0, 4.0, 0.0); 4]);
    assert!(app.world().resource::<PendingKeys>().0.is_empty());
}

/// The platform ignores `p`, so the harness toggles pause.
#[test]
fn unhandled_key_falls_through_to_harness() {
    let mut app = headless_app::<PlatformScene>();
    press(&mut app, "p");
    assert!(app.world().resource::<SimulationControl>().paused);

    let before = app.world().resource::<PlatformScene>().corner_velocities();
    app.update();
    let after = app.world().resource::<PlatformScene>().corner_velocities();
    assert_eq!(before, after, "paused scene must not advance");

    press(&mut app, "p");
    assert!(!app.world().resource::<SimulationControl>().paused);
}

/// Running frames keeps every rod at its length.
#[test]
fn platform_rods_hold_through_the_harness() {
    let mut app = headless_app::<PlatformScene>();
    for _ in 0..120 {
        app.update();
    }
    let scene = app.world().resource::<PlatformScene>();
    for rod in scene.rods() {
        let error = (rod.current_length(scene.particles()) - rod.length).abs();
        assert!(error < 1.0e-2, "rod {:?} off by {error}", rod.particles);
    }
}

/// Space while running advances one frame and leaves the scene paused.
#[test]
fn space_while_running_steps_then_pauses() {
    let mut app = headless_app::<PlatformScene>();
    assert!(!app.world().resource::<SimulationControl>().paused);

    let before = app.world().resource::<PlatformScene>().corner_velocities();
    press(&mut app, " ");
    let stepped = app.world().resource::<PlatformScene>().corner_velocities();
    assert_ne!(before, stepped, "space must run one frame");

    let control = *app.world().resource::<SimulationControl>();
    assert!(control.paused);
    assert!(!control.step_once);

    app.update();
    let later = app.world().resource::<PlatformScene>().corner_velocities();
    assert_eq!(stepped, later, "scene must stay paused after the step");
}

// ── Wall ──────────────────────────────────────────────────────────────────────

/// The wall starts paused and stays put until stepped.
#[test]
fn wall_starts_paused() {
    let mut app = headless_app::<WallScene>();
    assert!(app.world().resource::<SimulationControl>().paused);
    for _ in 0..10 {
        app.update();
    }
    let scene = app.world().resource::<WallScene>();
    assert_eq!(scene.fire_state(), FireState::Armed);
    assert_eq!(
        scene.projectile().body().position,
        Vec3::new(-1.0, 6.0, 4.0)
    );
}

/// Fire is accepted while paused; space then advances exactly one frame.
#[test]
fn wall_fire_then_single_step() {
    let mut app = headless_app::<WallScene>();
    press(&mut app, "f");
    {
        let scene = app.world().resource::<WallScene>();
        assert!(matches!(scene.fire_state(), FireState::Flight { .. }));
        assert_eq!(scene.projectile().body().position.z, 4.0);
        assert!(scene.projectile().body().velocity.z < -49.0);
    }

    press(&mut app, " ");
    let z_after_step = app.world().resource::<WallScene>().projectile().body().position.z;
    assert!(z_after_step < 4.0, "space must advance one frame");
    assert!(!app.world().resource::<SimulationControl>().step_once);

    app.update();
    let z_later = app.world().resource::<WallScene>().projectile().body().position.z;
    assert_eq!(z_after_step, z_later, "only one frame may run per space press");
}

/// Mass keys flow through the pipeline.
#[test]
fn wall_mass_keys() {
    let mut app = headless_app::<WallScene>();
    press(&mut app, "+++-");
    assert_eq!(app.world().resource::<WallScene>().projectile_mass(), 350.0);
}

/// `r` falls through to the harness: every box goes back to its grid slot,
/// asleep, and keeps the mass it had.
#[test]
fn wall_r_relays_boxes_and_keeps_masses() {
    let mut app = headless_app::<WallScene>();
    let masses: Vec<f32> = app
        .world()
        .resource::<WallScene>()
        .boxes()
        .iter()
        .map(|b| b.body().mass())
        .collect();

    set_paused(&mut app, false);
    press(&mut app, "f");
    for _ in 0..40 {
        app.update();
    }
    let scattered = app
        .world()
        .resource::<WallScene>()
        .boxes()
        .iter()
        .any(|b| b.body().velocity != Vec3::ZERO || b.body().is_awake());
    assert!(scattered, "the shot should disturb the wall");

    set_paused(&mut app, true);
    press(&mut app, "r");

    let scene = app.world().resource::<WallScene>();
    for (index, wall_box) in scene.boxes().iter().enumerate() {
        let body = wall_box.body();
        let slot = Vec3::new(
            -6.0 + 3.0 * (index % 4) as f32,
            1.5 + 3.0 * (index / 4) as f32,
            -5.0,
        );
        assert_eq!(body.position, slot, "box {index}");
        assert_eq!(body.velocity, Vec3::ZERO, "box {index}");
        assert!(!body.is_awake(), "box {index}");
        assert_eq!(body.mass(), masses[index], "box {index}");
    }
}

// ── Harness ───────────────────────────────────────────────────────────────────

#[test]
fn escape_requests_exit() {
    let mut app = headless_app::<PlatformScene>();
    assert!(app.should_exit().is_none());
    press(&mut app, &ESCAPE.to_string());
    assert_eq!(app.should_exit(), Some(AppExit::Success));
}
