use crate::scenes::SceneKind;
use bevy::prelude::*;

/// Where the camera sits and what it looks at for each scene.
pub fn camera_transform(kind: SceneKind) -> Transform {
    match kind {
        SceneKind::Platform => {
            Transform::from_xyz(0.0, 7.0, 10.0).looking_at(Vec3::new(0.0, 4.0, 0.0), Vec3::Y)
        }
        SceneKind::Wall => {
            Transform::from_xyz(12.0, 9.0, 16.0).looking_at(Vec3::new(0.0, 4.0, -5.0), Vec3::Y)
        }
    }
}

/// Setup camera for 3D gizmo rendering
pub fn setup_camera(mut commands: Commands, kind: Res<SceneKind>) {
    commands.spawn((Camera3d::default(), camera_transform(*kind)));
    info!("Camera spawned for {}", kind.title());
}
