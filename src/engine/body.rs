//! Rigid-body state, integration and the sleep lifecycle.

use crate::constants::SLEEP_EPSILON;
use bevy::math::{Mat3, Quat, Vec3};

/// Whether the integrator currently advances a body.
///
/// `ForcedAwake` marks a wake requested by input.  Repeating the request is a
/// no-op, and the body is demoted to `Awake` after its next integration step
/// so the motion-based sleep heuristic takes over again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SleepState {
    Asleep,
    #[default]
    Awake,
    ForcedAwake,
}

impl SleepState {
    #[inline]
    pub fn is_awake(self) -> bool {
        !matches!(self, SleepState::Asleep)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    /// Angular velocity (world space, rad/s).
    pub rotation: Vec3,
    /// Constant acceleration (gravity) applied while awake.
    pub acceleration: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub can_sleep: bool,
    inverse_mass: f32,
    inverse_inertia_tensor: Mat3,
    inverse_inertia_tensor_world: Mat3,
    last_frame_acceleration: Vec3,
    motion: f32,
    sleep: SleepState,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            linear_damping: 1.0,
            angular_damping: 1.0,
            can_sleep: true,
            inverse_mass: 1.0,
            inverse_inertia_tensor: Mat3::IDENTITY,
            inverse_inertia_tensor_world: Mat3::IDENTITY,
            last_frame_acceleration: Vec3::ZERO,
            motion: 2.0 * SLEEP_EPSILON,
            sleep: SleepState::Awake,
        }
    }
}

impl RigidBody {
    /// Set a finite, positive mass.  Non-positive values are ignored.
    pub fn set_mass(&mut self, mass: f32) {
        if mass > 0.0 {
            self.inverse_mass = mass.recip();
        }
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

    pub fn set_inertia_tensor(&mut self, inertia: Mat3) {
        self.inverse_inertia_tensor = inertia.inverse();
        self.calculate_derived_data();
    }

    /// Inertia tensor of a solid cuboid with the given half-extents and mass.
    pub fn set_block_inertia_tensor(&mut self, half_size: Vec3, mass: f32) {
        let squares = half_size * half_size;
        let k = 0.3 * mass;
        self.set_inertia_tensor(Mat3::from_diagonal(Vec3::new(
            k * (squares.y + squares.z),
            k * (squares.x + squares.z),
            k * (squares.x + squares.y),
        )));
    }

    #[inline]
    pub fn inverse_inertia_tensor_world(&self) -> Mat3 {
        self.inverse_inertia_tensor_world
    }

    #[inline]
    pub fn last_frame_acceleration(&self) -> Vec3 {
        self.last_frame_acceleration
    }

    /// Normalise the orientation and refresh the world-space inertia tensor.
    pub fn calculate_derived_data(&mut self) {
        self.orientation = self.orientation.normalize();
        let rotation = Mat3::from_quat(self.orientation);
        self.inverse_inertia_tensor_world =
            rotation * self.inverse_inertia_tensor * rotation.transpose();
    }

    /// Rotate a body-space direction into world space.
    #[inline]
    pub fn transform_direction(&self, local: Vec3) -> Vec3 {
        self.orientation * local
    }

    /// Map a body-space point into world space.
    #[inline]
    pub fn point_to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.orientation * local
    }

    pub fn add_velocity(&mut self, delta: Vec3) {
        self.velocity += delta;
    }

    pub fn add_rotation(&mut self, delta: Vec3) {
        self.rotation += delta;
    }

    /// Rotate the orientation by `rotation * scale` (small-angle update).
    pub fn add_scaled_rotation(&mut self, rotation: Vec3, scale: f32) {
        let spin = Quat::from_xyzw(rotation.x * scale, rotation.y * scale, rotation.z * scale, 0.0);
        self.orientation = self.orientation + spin * self.orientation * 0.5;
    }

    #[inline]
    pub fn sleep_state(&self) -> SleepState {
        self.sleep
    }

    #[inline]
    pub fn is_awake(&self) -> bool {
        self.sleep.is_awake()
    }

    /// Engine-side wake or sleep.  Sleeping zeroes both velocities.
    pub fn set_awake(&mut self, awake: bool) {
        if awake {
            if self.sleep == SleepState::Asleep {
                self.sleep = SleepState::Awake;
                self.motion = 2.0 * SLEEP_EPSILON;
            }
        } else {
            self.sleep = SleepState::Asleep;
            self.velocity = Vec3::ZERO;
            self.rotation = Vec3::ZERO;
        }
    }

    /// Input-driven wake.  Idempotent until the next integration step.
    pub fn force_wake(&mut self) {
        if self.sleep != SleepState::ForcedAwake {
            self.sleep = SleepState::ForcedAwake;
            self.motion = 2.0 * SLEEP_EPSILON;
        }
    }

    pub fn set_can_sleep(&mut self, can_sleep: bool) {
        self.can_sleep = can_sleep;
        if !can_sleep && !self.is_awake() {
            self.set_awake(true);
        }
    }

    /// Advance an awake body by `duration` seconds.
    pub fn integrate(&mut self, duration: f32) {
        if !self.is_awake() || duration <= 0.0 {
            return;
        }

        self.last_frame_acceleration = self.acceleration;
        self.velocity += self.last_frame_acceleration * duration;

        self.velocity *= self.linear_damping.powf(duration);
        self.rotation *= self.angular_damping.powf(duration);

        self.position += self.velocity * duration;
        self.add_scaled_rotation(self.rotation, duration);

        self.calculate_derived_data();

        if self.sleep == SleepState::ForcedAwake {
            self.sleep = SleepState::Awake;
        }

        if self.can_sleep {
            let current_motion = self.velocity.length_squared() + self.rotation.length_squared();
            let bias = 0.5_f32.powf(duration);
            self.motion = bias * self.motion + (1.0 - bias) * current_motion;

            if self.motion < SLEEP_EPSILON {
                self.set_awake(false);
            } else if self.motion > 10.0 * SLEEP_EPSILON {
                self.motion = 10.0 * SLEEP_EPSILON;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleeping_body_is_not_integrated() {
        let mut body = RigidBody::default();
        body.acceleration = Vec3::NEG_Y;
        body.set_awake(false);
        body.integrate(1.0);
        assert_eq!(body.position, Vec3::ZERO);
        assert_eq!(body.sleep_state(), SleepState::Asleep);
    }

    #[test]
    fn awake_body_follows_its_constant_acceleration() {
        let mut body = RigidBody {
            acceleration: Vec3::new(0.0, -9.81, 0.0),
            can_sleep: false,
            ..Default::default()
        };
        body.integrate(0.5);
        assert_eq!(body.last_frame_acceleration(), body.acceleration);
        assert!((body.velocity.y + 4.905).abs() < 1e-5);
        assert_eq!(body.rotation, Vec3::ZERO);
    }

    #[test]
    fn falling_asleep_zeroes_velocity() {
        let mut body = RigidBody::default();
        body.velocity = Vec3::X;
        body.rotation = Vec3::Y;
        body.set_awake(false);
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.rotation, Vec3::ZERO);
    }

    #[test]
    fn forced_wake_is_idempotent_and_demoted_after_step() {
        let mut body = RigidBody::default();
        body.set_awake(false);
        body.force_wake();
        body.force_wake();
        assert_eq!(body.sleep_state(), SleepState::ForcedAwake);

        body.velocity = Vec3::new(0.0, 0.0, -10.0);
        body.integrate(1.0 / 60.0);
        assert_eq!(body.sleep_state(), SleepState::Awake);
    }

    #[test]
    fn resting_body_eventually_sleeps() {
        let mut body = RigidBody::default();
        for _ in 0..600 {
            body.integrate(1.0 / 60.0);
        }
        assert_eq!(body.sleep_state(), SleepState::Asleep);
    }

    #[test]
    fn transform_direction_follows_orientation() {
        let body = RigidBody {
            orientation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ..Default::default()
        };
        // A quarter turn about +Y maps local -Z onto world -X.
        let world = body.transform_direction(Vec3::new(0.0, 0.0, -50.0));
        assert!((world - Vec3::new(-50.0, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn block_inertia_matches_cuboid_formula() {
        let mut body = RigidBody::default();
        body.set_block_inertia_tensor(Vec3::splat(1.5), 100.0);
        // I = 0.3 * m * (y² + z²) = 0.3 * 100 * 4.5 = 135.
        let expected = 1.0 / 135.0;
        let diag = body.inverse_inertia_tensor_world();
        assert!((diag.x_axis.x - expected).abs() < 1e-6);
        assert!((diag.z_axis.z - expected).abs() < 1e-6);
    }
}
