//! The two demo scenes and the name used to pick one at launch.

pub mod platform;
pub mod wall;

use crate::error::{SceneError, SceneResult};
use bevy::prelude::{Color, Resource};
use std::str::FromStr;

pub use platform::PlatformScene;
pub use wall::WallScene;

/// Environment variable consulted when no scene is named on the command line.
pub const SCENE_ENV_VAR: &str = "PHYSICS_SCENE";

/// Which scene the app runs.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SceneKind {
    Platform,
    #[default]
    Wall,
}

impl SceneKind {
    /// Pick a scene from the first command-line argument, else from the
    /// environment, else the default.
    pub fn select(arg: Option<&str>, env: Option<&str>) -> SceneResult<Self> {
        match arg.or(env) {
            Some(name) => name.parse(),
            None => Ok(Self::default()),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SceneKind::Platform => platform::TITLE,
            SceneKind::Wall => wall::TITLE,
        }
    }

    pub fn clear_color(self) -> Color {
        match self {
            SceneKind::Platform => Color::srgb(0.5, 0.5, 0.5),
            SceneKind::Wall => Color::srgb(0.9, 0.95, 1.0),
        }
    }
}

impl FromStr for SceneKind {
    type Err = SceneError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "platform" => Ok(SceneKind::Platform),
            "wall" => Ok(SceneKind::Wall),
            _ => Err(SceneError::UnknownScene {
                name: name.to_string(),
            }),
        }
    }
}
