//! Per-box state and the projectile fire cycle.

use crate::engine::{CollisionBox, RigidBody};
use bevy::math::{Quat, Vec3};
use std::time::Duration;

/// Where the projectile is in its fire cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FireState {
    /// Scene still under construction.
    #[default]
    Idle,
    /// At the spawn pose, ready to fire.
    Armed,
    /// Fired; returns to `Armed` once the flight time has elapsed.
    Flight { fired_at: Duration },
}

impl FireState {
    pub fn is_armed(self) -> bool {
        matches!(self, FireState::Armed)
    }

    /// `true` once a flight that started at `fired_at` has lasted `flight`.
    pub fn flight_over(self, now: Duration, flight: Duration) -> bool {
        match self {
            FireState::Flight { fired_at } => now.saturating_sub(fired_at) >= flight,
            _ => false,
        }
    }
}

/// A wall brick or the projectile.
#[derive(Debug, Clone, PartialEq)]
pub struct WallBox {
    pub shape: CollisionBox,
    /// Seed-derived component of the randomised mass.
    pub base_mass: f32,
    /// Angular velocity added at the start of the next update, then cleared.
    pub pending_rotation: Vec3,
}

impl WallBox {
    pub fn new(half_size: Vec3) -> Self {
        Self {
            shape: CollisionBox::new(half_size),
            base_mass: 1.0,
            pending_rotation: Vec3::ZERO,
        }
    }

    #[inline]
    pub fn body(&self) -> &RigidBody {
        &self.shape.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut RigidBody {
        &mut self.shape.body
    }

    /// Put the box at `position`, upright and motionless, with an inertia
    /// tensor matching its current mass.  Leaves it asleep.
    pub fn place(&mut self, position: Vec3, damping: f32) {
        let half_size = self.shape.half_size;
        let body = &mut self.shape.body;
        body.position = position;
        body.orientation = Quat::IDENTITY;
        body.velocity = Vec3::ZERO;
        body.rotation = Vec3::ZERO;
        let mass = body.mass();
        body.set_block_inertia_tensor(half_size, mass);
        body.linear_damping = damping;
        body.angular_damping = damping;
        body.calculate_derived_data();
        body.set_can_sleep(true);
        body.set_awake(false);
    }

    /// Apply and clear the staged rotation.
    pub fn apply_pending_rotation(&mut self) {
        if self.pending_rotation != Vec3::ZERO {
            self.shape.body.add_rotation(self.pending_rotation);
            self.pending_rotation = Vec3::ZERO;
        }
    }
}
