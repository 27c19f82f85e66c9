//! Per-frame contact generation for the wall.
//!
//! Body indices in the generated contacts are the box indices, with the
//! projectile at `boxes.len()`; [`resolve_contacts`] builds the body slice in
//! the same order.

use super::state::WallBox;
use crate::config::{PairScan, WallConfig};
use crate::engine::{
    box_and_box, box_and_half_space, CollisionData, CollisionPlane, ContactResolver, RigidBody,
};
use std::iter;

/// Refill `data` for this frame.
///
/// For each box in index order: floor, then the projectile, then (budget
/// permitting) the other boxes.  Generation stops as soon as the budget is
/// spent, so later boxes lose their contacts first.
pub fn generate_contacts(
    data: &mut CollisionData,
    boxes: &[WallBox],
    projectile: &WallBox,
    config: &WallConfig,
) {
    data.reset(config.max_contacts);
    data.friction = config.friction;
    data.restitution = config.restitution;
    data.tolerance = config.tolerance;

    let projectile_id = boxes.len();
    for (i, wall_box) in boxes.iter().enumerate() {
        box_and_half_space(&wall_box.shape, i, &CollisionPlane::FLOOR, data);
        box_and_box(&projectile.shape, projectile_id, &wall_box.shape, i, data);
        if !data.has_more_contacts() {
            return;
        }

        let first = match config.pair_scan {
            PairScan::Full => 0,
            PairScan::Unordered => i + 1,
        };
        for (j, other) in boxes.iter().enumerate().skip(first) {
            if i == j {
                continue;
            }
            if !data.has_more_contacts() {
                return;
            }
            box_and_box(&wall_box.shape, i, &other.shape, j, data);
        }
    }
}

/// Resolve this frame's contacts against the boxes and the projectile.
pub fn resolve_contacts(
    resolver: &ContactResolver,
    data: &CollisionData,
    boxes: &mut [WallBox],
    projectile: &mut WallBox,
    duration: f32,
) {
    if data.is_empty() {
        return;
    }
    let mut bodies: Vec<&mut RigidBody> = boxes
        .iter_mut()
        .map(WallBox::body_mut)
        .chain(iter::once(projectile.body_mut()))
        .collect();
    resolver.resolve_contacts(data.contacts(), &mut bodies, duration);
}
