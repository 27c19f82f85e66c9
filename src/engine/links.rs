//! Hard particle constraints and the contacts they produce.
//!
//! A rod never exerts a force.  Every step it compares its endpoints'
//! separation against its length and, when they differ, emits a
//! [`ParticleContact`] that the [`ParticleContactResolver`] resolves with
//! zero restitution: the velocity along the rod is removed and the endpoints
//! are projected back onto the exact length.

use super::particle::Particle;
use bevy::math::Vec3;

/// A contact between two particles, normal pointing from the first particle's
/// point of view (the direction the first particle must move to resolve it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleContact {
    pub particles: [usize; 2],
    pub restitution: f32,
    pub normal: Vec3,
    pub penetration: f32,
}

impl ParticleContact {
    pub fn separating_velocity(&self, particles: &[Particle]) -> f32 {
        let [a, b] = self.particles;
        (particles[a].velocity - particles[b].velocity).dot(self.normal)
    }

    /// Resolve velocity then interpenetration.  Returns how far each particle moved.
    fn resolve(&self, particles: &mut [Particle], duration: f32) -> [Vec3; 2] {
        self.resolve_velocity(particles, duration);
        self.resolve_interpenetration(particles)
    }

    fn total_inverse_mass(&self, particles: &[Particle]) -> f32 {
        let [a, b] = self.particles;
        particles[a].inverse_mass() + particles[b].inverse_mass()
    }

    fn resolve_velocity(&self, particles: &mut [Particle], duration: f32) {
        let separating = self.separating_velocity(particles);
        if separating > 0.0 {
            return;
        }

        let [a, b] = self.particles;
        let mut new_separating = -separating * self.restitution;

        // Velocity built up from acceleration alone this step is not bounced.
        let acc_caused =
            (particles[a].acceleration - particles[b].acceleration).dot(self.normal) * duration;
        if acc_caused < 0.0 {
            new_separating = (new_separating + self.restitution * acc_caused).max(0.0);
        }

        let total_inverse_mass = self.total_inverse_mass(particles);
        if total_inverse_mass <= 0.0 {
            return;
        }

        let impulse_per_imass = self.normal * ((new_separating - separating) / total_inverse_mass);
        particles[a].velocity += impulse_per_imass * particles[a].inverse_mass();
        particles[b].velocity -= impulse_per_imass * particles[b].inverse_mass();
    }

    fn resolve_interpenetration(&self, particles: &mut [Particle]) -> [Vec3; 2] {
        let total_inverse_mass = self.total_inverse_mass(particles);
        if self.penetration <= 0.0 || total_inverse_mass <= 0.0 {
            return [Vec3::ZERO; 2];
        }

        let [a, b] = self.particles;
        let move_per_imass = self.normal * (self.penetration / total_inverse_mass);
        let moves = [
            move_per_imass * particles[a].inverse_mass(),
            move_per_imass * -particles[b].inverse_mass(),
        ];
        particles[a].position += moves[0];
        particles[b].position += moves[1];
        moves
    }
}

/// Produces particle contacts each step (rods, cables, ground planes...).
pub trait ParticleContactGenerator: Send + Sync {
    /// Append at most `limit` contacts to `out` and return how many were written.
    fn add_contact(
        &self,
        particles: &[Particle],
        out: &mut Vec<ParticleContact>,
        limit: usize,
    ) -> usize;
}

/// Fixed-length connector between two particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRod {
    pub particles: [usize; 2],
    pub length: f32,
}

impl ParticleRod {
    pub fn new(a: usize, b: usize, length: f32) -> Self {
        Self {
            particles: [a, b],
            length,
        }
    }

    pub fn current_length(&self, particles: &[Particle]) -> f32 {
        let [a, b] = self.particles;
        particles[a].position.distance(particles[b].position)
    }
}

impl ParticleContactGenerator for ParticleRod {
    fn add_contact(
        &self,
        particles: &[Particle],
        out: &mut Vec<ParticleContact>,
        limit: usize,
    ) -> usize {
        if limit == 0 {
            return 0;
        }
        let current = self.current_length(particles);
        if current == self.length {
            return 0;
        }

        let [a, b] = self.particles;
        let normal = (particles[b].position - particles[a].position).normalize_or_zero();
        let (normal, penetration) = if current > self.length {
            (normal, current - self.length)
        } else {
            (-normal, self.length - current)
        };

        out.push(ParticleContact {
            particles: self.particles,
            restitution: 0.0,
            normal,
            penetration,
        });
        1
    }
}

/// Resolves particle contacts in order of severity.
#[derive(Debug, Clone, Copy)]
pub struct ParticleContactResolver {
    /// Iteration cap; `0` means two iterations per contact.
    pub iterations: usize,
    /// Penetrations at or below this are considered resolved.
    pub tolerance: f32,
}

impl ParticleContactResolver {
    pub fn new(iterations: usize, tolerance: f32) -> Self {
        Self {
            iterations,
            tolerance,
        }
    }

    pub fn resolve_contacts(
        &self,
        contacts: &mut [ParticleContact],
        particles: &mut [Particle],
        duration: f32,
    ) {
        let iterations = if self.iterations == 0 {
            contacts.len() * 2
        } else {
            self.iterations
        };

        for _ in 0..iterations {
            // Most negative separating velocity first.
            let mut worst = f32::MAX;
            let mut worst_index = None;
            for (i, contact) in contacts.iter().enumerate() {
                let separating = contact.separating_velocity(particles);
                if separating < worst
                    && (separating < 0.0 || contact.penetration > self.tolerance)
                {
                    worst = separating;
                    worst_index = Some(i);
                }
            }
            let Some(index) = worst_index else {
                break;
            };

            let moved = contacts[index].particles;
            let moves = contacts[index].resolve(particles, duration);

            for contact in contacts.iter_mut() {
                for (slot, &id) in contact.particles.iter().enumerate() {
                    let sign = if slot == 0 { -1.0 } else { 1.0 };
                    for (m, &moved_id) in moved.iter().enumerate() {
                        if id == moved_id {
                            contact.penetration += sign * moves[m].dot(contact.normal);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_particles(separation: f32) -> Vec<Particle> {
        let mut a = Particle::default();
        a.set_mass(1.0);
        let mut b = a;
        b.position = Vec3::new(separation, 0.0, 0.0);
        vec![a, b]
    }

    #[test]
    fn rod_at_length_emits_nothing() {
        let particles = two_particles(2.0);
        let mut out = Vec::new();
        assert_eq!(ParticleRod::new(0, 1, 2.0).add_contact(&particles, &mut out, 4), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn rod_respects_limit() {
        let particles = two_particles(3.0);
        let mut out = Vec::new();
        assert_eq!(ParticleRod::new(0, 1, 2.0).add_contact(&particles, &mut out, 0), 0);
    }

    #[test]
    fn overextended_rod_is_projected_back() {
        let mut particles = two_particles(3.0);
        let rod = ParticleRod::new(0, 1, 2.0);
        let mut contacts = Vec::new();
        rod.add_contact(&particles, &mut contacts, 1);
        assert!((contacts[0].penetration - 1.0).abs() < 1e-6);

        ParticleContactResolver::new(0, 0.0).resolve_contacts(&mut contacts, &mut particles, 0.016);
        assert!((rod.current_length(&particles) - 2.0).abs() < 1e-5);
        // Equal masses share the correction.
        assert!((particles[0].position.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn compressed_rod_is_pushed_apart_and_stops_closing() {
        let mut particles = two_particles(1.0);
        particles[0].velocity = Vec3::new(1.0, 0.0, 0.0);
        let rod = ParticleRod::new(0, 1, 2.0);
        let mut contacts = Vec::new();
        rod.add_contact(&particles, &mut contacts, 1);

        ParticleContactResolver::new(0, 0.0).resolve_contacts(&mut contacts, &mut particles, 0.016);
        assert!((rod.current_length(&particles) - 2.0).abs() < 1e-5);
        let closing = particles[0].velocity.x - particles[1].velocity.x;
        assert!(closing.abs() < 1e-5, "rod must remove relative velocity, got {closing}");
    }
}
