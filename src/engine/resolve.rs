//! Sequential contact resolver for rigid bodies.
//!
//! Resolution runs in two phases over the whole contact set:
//!
//! 1. **Positions**: repeatedly pick the deepest contact, split its
//!    penetration between linear and angular motion of the bodies in
//!    proportion to their inertia, then update every contact sharing a body.
//! 2. **Velocities**: repeatedly pick the contact needing the largest
//!    velocity change, apply an impulse (with planar Coulomb friction when the
//!    contact has friction), then update the contact velocities of every
//!    contact sharing a body.
//!
//! Sleeping bodies touched by an awake body are woken before they are moved.

use super::body::RigidBody;
use super::collide::Contact;
use crate::constants::{
    ANGULAR_MOVE_LIMIT, POSITION_EPSILON, RESTING_VELOCITY_LIMIT, VELOCITY_EPSILON,
};
use bevy::math::{Mat3, Vec3};

/// Per-contact data derived once per resolve call.
#[derive(Debug, Clone, Copy)]
struct PreparedContact {
    contact: Contact,
    contact_to_world: Mat3,
    /// Closing velocity expressed in contact coordinates (x along the normal).
    contact_velocity: Vec3,
    desired_delta_velocity: f32,
    relative_position: [Vec3; 2],
}

#[derive(Debug, Clone, Copy)]
pub struct ContactResolver {
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    pub velocity_epsilon: f32,
    pub position_epsilon: f32,
}

impl ContactResolver {
    pub fn new(iterations: usize) -> Self {
        Self {
            velocity_iterations: iterations,
            position_iterations: iterations,
            velocity_epsilon: VELOCITY_EPSILON,
            position_epsilon: POSITION_EPSILON,
        }
    }

    /// Resolve `contacts` against `bodies`.  Contact body indices refer to
    /// positions in `bodies`.
    pub fn resolve_contacts(
        &self,
        contacts: &[Contact],
        bodies: &mut [&mut RigidBody],
        duration: f32,
    ) {
        if contacts.is_empty() || duration <= 0.0 {
            return;
        }

        let mut prepared: Vec<PreparedContact> = contacts
            .iter()
            .map(|c| PreparedContact::new(*c, &*bodies, duration))
            .collect();

        self.adjust_positions(&mut prepared, bodies);
        self.adjust_velocities(&mut prepared, bodies, duration);
    }

    fn adjust_positions(&self, contacts: &mut [PreparedContact], bodies: &mut [&mut RigidBody]) {
        for _ in 0..self.position_iterations {
            let mut max = self.position_epsilon;
            let mut index = None;
            for (i, c) in contacts.iter().enumerate() {
                if c.contact.penetration > max {
                    max = c.contact.penetration;
                    index = Some(i);
                }
            }
            let Some(index) = index else {
                break;
            };

            contacts[index].match_awake_state(bodies);
            let (linear_change, angular_change) =
                contacts[index].apply_position_change(bodies, max);
            let moved = contacts[index].body_ids();

            for c in contacts.iter_mut() {
                for (slot, id) in c.body_ids().into_iter().enumerate() {
                    let Some(id) = id else { continue };
                    for d in 0..2 {
                        if moved[d] == Some(id) {
                            let delta = linear_change[d]
                                + angular_change[d].cross(c.relative_position[slot]);
                            let sign = if slot == 1 { 1.0 } else { -1.0 };
                            c.contact.penetration += delta.dot(c.contact.normal) * sign;
                        }
                    }
                }
            }
        }
    }

    fn adjust_velocities(
        &self,
        contacts: &mut [PreparedContact],
        bodies: &mut [&mut RigidBody],
        duration: f32,
    ) {
        for _ in 0..self.velocity_iterations {
            let mut max = self.velocity_epsilon;
            let mut index = None;
            for (i, c) in contacts.iter().enumerate() {
                if c.desired_delta_velocity > max {
                    max = c.desired_delta_velocity;
                    index = Some(i);
                }
            }
            let Some(index) = index else {
                break;
            };

            contacts[index].match_awake_state(bodies);
            let (velocity_change, rotation_change) = contacts[index].apply_velocity_change(bodies);
            let moved = contacts[index].body_ids();

            for c in contacts.iter_mut() {
                for (slot, id) in c.body_ids().into_iter().enumerate() {
                    let Some(id) = id else { continue };
                    for d in 0..2 {
                        if moved[d] == Some(id) {
                            let delta = velocity_change[d]
                                + rotation_change[d].cross(c.relative_position[slot]);
                            let sign = if slot == 1 { -1.0 } else { 1.0 };
                            c.contact_velocity += c.contact_to_world.transpose() * delta * sign;
                            c.calculate_desired_delta_velocity(bodies, duration);
                        }
                    }
                }
            }
        }
    }
}

/// Orthonormal basis whose X axis is the contact normal.
fn contact_basis(normal: Vec3) -> Mat3 {
    // Seed the first tangent from whichever world axis is furthest from the normal.
    let tangent_y = if normal.x.abs() > normal.y.abs() {
        let s = (normal.z * normal.z + normal.x * normal.x).sqrt().recip();
        Vec3::new(normal.z * s, 0.0, -normal.x * s)
    } else {
        let s = (normal.z * normal.z + normal.y * normal.y).sqrt().recip();
        Vec3::new(0.0, -normal.z * s, normal.y * s)
    };
    Mat3::from_cols(normal, tangent_y, normal.cross(tangent_y))
}

/// Matrix form of `v × _`.
fn skew_symmetric(v: Vec3) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(0.0, v.z, -v.y),
        Vec3::new(-v.z, 0.0, v.x),
        Vec3::new(v.y, -v.x, 0.0),
    )
}

impl PreparedContact {
    fn new(contact: Contact, bodies: &[&mut RigidBody], duration: f32) -> Self {
        let mut prepared = Self {
            contact,
            contact_to_world: contact_basis(contact.normal),
            contact_velocity: Vec3::ZERO,
            desired_delta_velocity: 0.0,
            relative_position: [Vec3::ZERO; 2],
        };

        prepared.relative_position[0] = contact.point - bodies[contact.body].position;
        prepared.contact_velocity = prepared.local_velocity(0, bodies, duration);
        if let Some(other) = contact.other {
            prepared.relative_position[1] = contact.point - bodies[other].position;
            prepared.contact_velocity -= prepared.local_velocity(1, bodies, duration);
        }

        prepared.calculate_desired_delta_velocity(bodies, duration);
        prepared
    }

    #[inline]
    fn body_ids(&self) -> [Option<usize>; 2] {
        [Some(self.contact.body), self.contact.other]
    }

    fn local_velocity(&self, slot: usize, bodies: &[&mut RigidBody], duration: f32) -> Vec3 {
        let Some(id) = self.body_ids()[slot] else {
            return Vec3::ZERO;
        };
        let body = &bodies[id];
        let world_to_contact = self.contact_to_world.transpose();

        let velocity = body.rotation.cross(self.relative_position[slot]) + body.velocity;
        let mut contact_velocity = world_to_contact * velocity;

        // Planar velocity gained from acceleration this frame; the normal
        // component is handled by the desired-velocity calculation.
        let mut acc_velocity = world_to_contact * (body.last_frame_acceleration() * duration);
        acc_velocity.x = 0.0;
        contact_velocity += acc_velocity;
        contact_velocity
    }

    fn calculate_desired_delta_velocity(&mut self, bodies: &[&mut RigidBody], duration: f32) {
        let mut velocity_from_acc = 0.0;
        let first = &bodies[self.contact.body];
        if first.is_awake() {
            velocity_from_acc += (first.last_frame_acceleration() * duration).dot(self.contact.normal);
        }
        if let Some(other) = self.contact.other {
            let second = &bodies[other];
            if second.is_awake() {
                velocity_from_acc -=
                    (second.last_frame_acceleration() * duration).dot(self.contact.normal);
            }
        }

        let restitution = if self.contact_velocity.x.abs() < RESTING_VELOCITY_LIMIT {
            0.0
        } else {
            self.contact.restitution
        };

        self.desired_delta_velocity =
            -self.contact_velocity.x - restitution * (self.contact_velocity.x - velocity_from_acc);
    }

    /// Wake a sleeping body that is touched by an awake one.
    fn match_awake_state(&self, bodies: &mut [&mut RigidBody]) {
        let Some(other) = self.contact.other else {
            return;
        };
        let first_awake = bodies[self.contact.body].is_awake();
        let second_awake = bodies[other].is_awake();
        if first_awake != second_awake {
            if first_awake {
                bodies[other].set_awake(true);
            } else {
                bodies[self.contact.body].set_awake(true);
            }
        }
    }

    fn frictionless_impulse(&self, inverse_inertia: &[Mat3; 2], bodies: &[&mut RigidBody]) -> Vec3 {
        let normal = self.contact.normal;
        let mut delta_velocity = 0.0;
        for (slot, id) in self.body_ids().into_iter().enumerate() {
            let Some(id) = id else { continue };
            let rel = self.relative_position[slot];
            let delta_vel_world = (inverse_inertia[slot] * rel.cross(normal)).cross(rel);
            delta_velocity += delta_vel_world.dot(normal) + bodies[id].inverse_mass();
        }
        Vec3::new(self.desired_delta_velocity / delta_velocity, 0.0, 0.0)
    }

    fn friction_impulse(&self, inverse_inertia: &[Mat3; 2], bodies: &[&mut RigidBody]) -> Vec3 {
        let mut inverse_mass = 0.0;
        let mut delta_vel_world = Mat3::ZERO;
        for (slot, id) in self.body_ids().into_iter().enumerate() {
            let Some(id) = id else { continue };
            let impulse_to_torque = skew_symmetric(self.relative_position[slot]);
            delta_vel_world -= impulse_to_torque * inverse_inertia[slot] * impulse_to_torque;
            inverse_mass += bodies[id].inverse_mass();
        }

        let delta_velocity = self.contact_to_world.transpose() * delta_vel_world * self.contact_to_world
            + Mat3::from_diagonal(Vec3::splat(inverse_mass));
        let impulse_matrix = delta_velocity.inverse();

        let vel_kill = Vec3::new(
            self.desired_delta_velocity,
            -self.contact_velocity.y,
            -self.contact_velocity.z,
        );
        let mut impulse = impulse_matrix * vel_kill;

        let planar = (impulse.y * impulse.y + impulse.z * impulse.z).sqrt();
        let friction = self.contact.friction;
        if planar > impulse.x * friction {
            // Dynamic friction: clamp the planar impulse to the friction cone.
            impulse.y /= planar;
            impulse.z /= planar;
            let normal_response = delta_velocity.x_axis.x
                + delta_velocity.y_axis.x * friction * impulse.y
                + delta_velocity.z_axis.x * friction * impulse.z;
            impulse.x = self.desired_delta_velocity / normal_response;
            impulse.y *= friction * impulse.x;
            impulse.z *= friction * impulse.x;
        }
        impulse
    }

    fn apply_velocity_change(&self, bodies: &mut [&mut RigidBody]) -> ([Vec3; 2], [Vec3; 2]) {
        let mut inverse_inertia = [Mat3::ZERO; 2];
        for (slot, id) in self.body_ids().into_iter().enumerate() {
            if let Some(id) = id {
                inverse_inertia[slot] = bodies[id].inverse_inertia_tensor_world();
            }
        }

        let impulse_contact = if self.contact.friction == 0.0 {
            self.frictionless_impulse(&inverse_inertia, bodies)
        } else {
            self.friction_impulse(&inverse_inertia, bodies)
        };
        let impulse = self.contact_to_world * impulse_contact;

        let mut velocity_change = [Vec3::ZERO; 2];
        let mut rotation_change = [Vec3::ZERO; 2];

        let first = &mut bodies[self.contact.body];
        rotation_change[0] = inverse_inertia[0] * self.relative_position[0].cross(impulse);
        velocity_change[0] = impulse * first.inverse_mass();
        first.add_velocity(velocity_change[0]);
        first.add_rotation(rotation_change[0]);

        if let Some(other) = self.contact.other {
            let second = &mut bodies[other];
            rotation_change[1] = inverse_inertia[1] * impulse.cross(self.relative_position[1]);
            velocity_change[1] = impulse * -second.inverse_mass();
            second.add_velocity(velocity_change[1]);
            second.add_rotation(rotation_change[1]);
        }

        (velocity_change, rotation_change)
    }

    fn apply_position_change(
        &self,
        bodies: &mut [&mut RigidBody],
        penetration: f32,
    ) -> ([Vec3; 2], [Vec3; 2]) {
        let normal = self.contact.normal;
        let ids = self.body_ids();

        let mut angular_inertia = [0.0; 2];
        let mut linear_inertia = [0.0; 2];
        let mut total_inertia = 0.0;
        for (slot, id) in ids.into_iter().enumerate() {
            let Some(id) = id else { continue };
            let rel = self.relative_position[slot];
            let angular_inertia_world =
                (bodies[id].inverse_inertia_tensor_world() * rel.cross(normal)).cross(rel);
            angular_inertia[slot] = angular_inertia_world.dot(normal);
            linear_inertia[slot] = bodies[id].inverse_mass();
            total_inertia += angular_inertia[slot] + linear_inertia[slot];
        }

        let mut linear_change = [Vec3::ZERO; 2];
        let mut angular_change = [Vec3::ZERO; 2];
        if total_inertia <= 0.0 {
            return (linear_change, angular_change);
        }

        for (slot, id) in ids.into_iter().enumerate() {
            let Some(id) = id else { continue };
            let sign = if slot == 0 { 1.0 } else { -1.0 };
            let rel = self.relative_position[slot];

            let mut angular_move = sign * penetration * (angular_inertia[slot] / total_inertia);
            let mut linear_move = sign * penetration * (linear_inertia[slot] / total_inertia);

            // Large rotations from small lever arms look wrong; shift the
            // excess into linear motion.
            let projection = rel - normal * rel.dot(normal);
            let max_magnitude = ANGULAR_MOVE_LIMIT * projection.length();
            if angular_move.abs() > max_magnitude {
                let total_move = angular_move + linear_move;
                angular_move = max_magnitude.copysign(angular_move);
                linear_move = total_move - angular_move;
            }

            if angular_move != 0.0 {
                let target_direction = rel.cross(normal);
                angular_change[slot] = bodies[id].inverse_inertia_tensor_world()
                    * target_direction
                    * (angular_move / angular_inertia[slot]);
            }
            linear_change[slot] = normal * linear_move;

            let body = &mut bodies[id];
            body.position += linear_change[slot];
            body.add_scaled_rotation(angular_change[slot], 1.0);
            if !body.is_awake() {
                body.calculate_derived_data();
            }
        }

        (linear_change, angular_change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::collide::{box_and_half_space, CollisionBox, CollisionData, CollisionPlane};

    #[test]
    fn contact_basis_is_orthonormal() {
        for normal in [Vec3::Y, Vec3::X, Vec3::new(0.3, -0.8, 0.52).normalize()] {
            let basis = contact_basis(normal);
            let identity = basis.transpose() * basis;
            assert!(identity.abs_diff_eq(Mat3::IDENTITY, 1e-5), "basis for {normal:?}");
            assert_eq!(basis.x_axis, normal);
        }
    }

    #[test]
    fn skew_matches_cross_product() {
        let a = Vec3::new(1.0, -2.0, 0.5);
        let b = Vec3::new(0.3, 4.0, -1.0);
        assert!((skew_symmetric(a) * b - a.cross(b)).length() < 1e-5);
    }

    #[test]
    fn sinking_box_is_pushed_out_and_stopped() {
        let mut shape = CollisionBox::new(Vec3::splat(1.5));
        shape.body.set_mass(10.0);
        shape.body.set_block_inertia_tensor(shape.half_size, 10.0);
        shape.body.position = Vec3::new(0.0, 1.3, 0.0);
        shape.body.velocity = Vec3::new(0.0, -2.0, 0.0);
        shape.body.calculate_derived_data();

        let mut data = CollisionData::new(8);
        data.friction = 0.9;
        data.restitution = 0.1;
        box_and_half_space(&shape, 0, &CollisionPlane::FLOOR, &mut data);
        assert_eq!(data.len(), 4);

        let resolver = ContactResolver::new(64);
        let mut bodies = [&mut shape.body];
        resolver.resolve_contacts(data.contacts(), &mut bodies, 1.0 / 60.0);

        assert!(shape.body.position.y > 1.4, "box still sunk: {:?}", shape.body.position);
        assert!(shape.body.velocity.y > -0.1, "box still falling: {:?}", shape.body.velocity);
    }
}
