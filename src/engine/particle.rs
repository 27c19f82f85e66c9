//! Point-mass state and integration.

use bevy::math::Vec3;

/// A point mass integrated with semi-implicit Euler and exponential damping.
///
/// Infinite mass is represented by a zero inverse mass; such particles are
/// never moved by [`Particle::integrate`] and act as fixed anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Constant acceleration (usually gravity) applied every step.
    pub acceleration: Vec3,
    /// Per-second velocity retention, `1.0` means no damping.
    pub damping: f32,
    inverse_mass: f32,
    force_accum: Vec3,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            damping: 1.0,
            inverse_mass: 0.0,
            force_accum: Vec3::ZERO,
        }
    }
}

impl Particle {
    /// A particle with infinite mass resting at `position`.
    pub fn anchor(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Set a finite mass.  Non-positive masses are treated as infinite.
    pub fn set_mass(&mut self, mass: f32) {
        self.inverse_mass = if mass > 0.0 { mass.recip() } else { 0.0 };
    }

    pub fn mass(&self) -> f32 {
        if self.inverse_mass == 0.0 {
            f32::INFINITY
        } else {
            self.inverse_mass.recip()
        }
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    #[inline]
    pub fn has_finite_mass(&self) -> bool {
        self.inverse_mass > 0.0
    }

    pub fn add_force(&mut self, force: Vec3) {
        self.force_accum += force;
    }

    pub fn clear_accumulator(&mut self) {
        self.force_accum = Vec3::ZERO;
    }

    /// Advance the particle by `duration` seconds and clear the force accumulator.
    pub fn integrate(&mut self, duration: f32) {
        if !self.has_finite_mass() || duration <= 0.0 {
            return;
        }

        self.position += self.velocity * duration;

        let resulting_acc = self.acceleration + self.force_accum * self.inverse_mass;
        self.velocity += resulting_acc * duration;
        self.velocity *= self.damping.powf(duration);

        self.clear_accumulator();
    }
}
