//! Bevy harness: frame loop, keyboard routing and drawing for one demo scene.
//!
//! ## Pipeline (chained, every `Update` frame)
//!
//! 1. [`keyboard_to_pending_keys_system`]: translates pressed keys into
//!    characters queued in [`PendingKeys`].
//! 2. [`scene_key_system`]: hands each queued character to the scene. Keys
//!    the scene ignores fall through to the harness defaults (`p` pause,
//!    space pause and single-step, `r` reset, Escape quit).
//! 3. [`scene_update_system`]: advances the scene by the frame time unless
//!    paused.
//! 4. [`scene_gizmo_system`]: lets the scene draw its current poses (skipped
//!    in headless apps without gizmo support).
//!
//! The character queue is the input abstraction layer: tests push characters
//! into [`PendingKeys`] directly instead of synthesising keyboard messages.

use crate::config::SceneConfig;
use bevy::gizmos::config::GizmoConfigStore;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::time::Real;
use std::marker::PhantomData;
use std::time::Duration;

/// Character used for the Escape key in [`PendingKeys`].
pub const ESCAPE: char = '\u{1b}';

/// Whether a scene consumed a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    /// Not mapped by the scene; the harness applies its own default.
    Ignored,
}

/// One interactive scene driven by the harness.
///
/// `clock` is wall-clock time since the app started.  Scenes never read time
/// themselves, which keeps timed behaviour reproducible in tests.
pub trait DemoScene: Resource {
    fn from_config(config: &SceneConfig, clock: Duration) -> Self
    where
        Self: Sized;

    fn title(&self) -> &'static str;

    /// Advance by `duration` seconds (always > 0).
    fn update(&mut self, duration: f32, clock: Duration);

    fn key(&mut self, key: char, clock: Duration) -> KeyOutcome;

    /// Emit gizmos for the current poses.  Must not mutate physics state.
    fn draw(&self, gizmos: &mut Gizmos);

    /// Harness-level reset (`r`).
    fn reset(&mut self, _clock: Duration) {}

    fn starts_paused(&self) -> bool {
        false
    }
}

/// Characters typed since the last frame, oldest first.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingKeys(pub Vec<char>);

/// Pause state owned by the harness.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimulationControl {
    pub paused: bool,
    /// Advance exactly one frame, then stay paused.
    pub step_once: bool,
}

/// Registers the harness systems for scene type `S`.
pub struct ScenePlugin<S>(PhantomData<fn() -> S>);

impl<S> Default for ScenePlugin<S> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<S: DemoScene> Plugin for ScenePlugin<S> {
    fn build(&self, app: &mut App) {
        // Headless apps (MinimalPlugins) have no InputPlugin; registering the
        // message here is a no-op when it already exists.
        app.add_message::<KeyboardInput>()
            .init_resource::<SceneConfig>()
            .init_resource::<PendingKeys>()
            .init_resource::<SimulationControl>()
            .add_systems(Startup, spawn_scene_system::<S>)
            .add_systems(
                Update,
                (
                    keyboard_to_pending_keys_system,
                    scene_key_system::<S>,
                    scene_update_system::<S>,
                    scene_gizmo_system::<S>.run_if(resource_exists::<GizmoConfigStore>),
                )
                    .chain()
                    .run_if(resource_exists::<S>),
            );
    }
}

/// Map a logical key to the character the scenes understand.
pub fn key_to_char(key: &Key) -> Option<char> {
    match key {
        Key::Character(text) => text.chars().next().map(|c| c.to_ascii_lowercase()),
        Key::Space => Some(' '),
        Key::Escape => Some(ESCAPE),
        _ => None,
    }
}

/// Startup system: build the scene from the (already loaded) config.
pub fn spawn_scene_system<S: DemoScene>(
    mut commands: Commands,
    config: Res<SceneConfig>,
    real: Res<Time<Real>>,
    mut control: ResMut<SimulationControl>,
) {
    let scene = S::from_config(&config, real.elapsed());
    control.paused = scene.starts_paused();
    if control.paused {
        info!("Scene '{}' ready (paused, press 'p' to start)", scene.title());
    } else {
        info!("Scene '{}' ready", scene.title());
    }
    commands.insert_resource(scene);
}

pub fn keyboard_to_pending_keys_system(
    mut events: MessageReader<KeyboardInput>,
    mut pending: ResMut<PendingKeys>,
) {
    for event in events.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        if let Some(c) = key_to_char(&event.logical_key) {
            pending.0.push(c);
        }
    }
}

pub fn scene_key_system<S: DemoScene>(
    mut pending: ResMut<PendingKeys>,
    mut scene: ResMut<S>,
    mut control: ResMut<SimulationControl>,
    real: Res<Time<Real>>,
    mut exit: MessageWriter<AppExit>,
) {
    let clock = real.elapsed();
    for key in pending.0.drain(..) {
        if scene.key(key, clock) == KeyOutcome::Handled {
            continue;
        }
        match key {
            'p' => {
                control.paused = !control.paused;
                info!("Simulation {}", if control.paused { "paused" } else { "running" });
            }
            ' ' => {
                control.paused = true;
                control.step_once = true;
            }
            'r' => scene.reset(clock),
            ESCAPE => {
                exit.write(AppExit::Success);
            }
            _ => {}
        }
    }
}

pub fn scene_update_system<S: DemoScene>(
    time: Res<Time>,
    real: Res<Time<Real>>,
    config: Res<SceneConfig>,
    mut control: ResMut<SimulationControl>,
    mut scene: ResMut<S>,
) {
    if control.paused {
        if !control.step_once {
            return;
        }
        control.step_once = false;
    }

    let duration = time.delta_secs().min(config.harness.max_frame_secs);
    if duration <= 0.0 {
        return;
    }
    scene.update(duration, real.elapsed());
}

pub fn scene_gizmo_system<S: DemoScene>(scene: Res<S>, mut gizmos: Gizmos) {
    scene.draw(&mut gizmos);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn characters_are_lowercased() {
        assert_eq!(key_to_char(&Key::Character("N".into())), Some('n'));
        assert_eq!(key_to_char(&Key::Character("+".into())), Some('+'));
    }

    #[test]
    fn space_and_escape_are_mapped() {
        assert_eq!(key_to_char(&Key::Space), Some(' '));
        assert_eq!(key_to_char(&Key::Escape), Some(ESCAPE));
        assert_eq!(key_to_char(&Key::Shift), None);
    }
}
