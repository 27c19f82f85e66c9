//! Gizmo drawing for the wall: grey bricks, a black projectile and a floor grid.

use super::state::WallBox;
use super::WallScene;
use bevy::prelude::*;

const BOX_COLOR: Color = Color::srgb(0.5, 0.5, 0.5);
const PROJECTILE_COLOR: Color = Color::BLACK;
const FLOOR_COLOR: Color = Color::srgb(0.75, 0.75, 0.75);
const FLOOR_HALF_EXTENT: i32 = 20;
const FLOOR_SPACING: f32 = 2.0;

fn box_transform(wall_box: &WallBox) -> Transform {
    let body = wall_box.body();
    Transform::from_translation(body.position)
        .with_rotation(body.orientation)
        .with_scale(wall_box.shape.half_size * 2.0)
}

fn draw_floor(gizmos: &mut Gizmos) {
    let extent = FLOOR_HALF_EXTENT as f32 * FLOOR_SPACING;
    for i in -FLOOR_HALF_EXTENT..=FLOOR_HALF_EXTENT {
        let offset = i as f32 * FLOOR_SPACING;
        gizmos.line(
            Vec3::new(offset, 0.0, -extent),
            Vec3::new(offset, 0.0, extent),
            FLOOR_COLOR,
        );
        gizmos.line(
            Vec3::new(-extent, 0.0, offset),
            Vec3::new(extent, 0.0, offset),
            FLOOR_COLOR,
        );
    }
}

impl WallScene {
    pub(super) fn draw_gizmos(&self, gizmos: &mut Gizmos) {
        draw_floor(gizmos);
        for wall_box in &self.boxes {
            gizmos.cuboid(box_transform(wall_box), BOX_COLOR);
        }
        gizmos.cuboid(box_transform(&self.projectile), PROJECTILE_COLOR);
    }
}
