use bevy::prelude::*;
use bevy::window::WindowResolution;
use physics_scenes::config::{self, SceneConfig};
use physics_scenes::graphics;
use physics_scenes::harness::{spawn_scene_system, DemoScene, ScenePlugin};
use physics_scenes::scenes::{PlatformScene, SceneKind, WallScene, SCENE_ENV_VAR};
use std::env;

/// Register the harness for scene `S`, building it only once the config file
/// has been read.
fn add_scene<S: DemoScene>(app: &mut App) {
    app.add_plugins(ScenePlugin::<S>::default()).add_systems(
        Startup,
        config::load_scene_config.before(spawn_scene_system::<S>),
    );
}

fn main() {
    let arg = env::args().nth(1);
    let from_env = env::var(SCENE_ENV_VAR).ok();
    let kind = SceneKind::select(arg.as_deref(), from_env.as_deref()).unwrap_or_else(|err| {
        eprintln!("{err}; running the default scene");
        SceneKind::default()
    });

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: kind.title().into(),
            resolution: WindowResolution::new(1200, 680),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(kind.clear_color()))
    // Compiled defaults; load_scene_config overwrites them from
    // assets/scenes.toml (if present) in the Startup schedule.
    .insert_resource(SceneConfig::default())
    .insert_resource(kind)
    .add_systems(Startup, graphics::setup_camera);

    match kind {
        SceneKind::Platform => add_scene::<PlatformScene>(&mut app),
        SceneKind::Wall => add_scene::<WallScene>(&mut app),
    }

    app.run();
}
