//! Container running one mass-aggregate physics step.

use super::force::{ForceRegistry, ParticleForceGenerator};
use super::links::{ParticleContact, ParticleContactGenerator, ParticleContactResolver};
use super::particle::Particle;

/// Particles plus the forces and hard constraints acting on them.
///
/// A step is: apply registered forces, integrate every particle, then
/// repeatedly regenerate constraint contacts from the new positions and
/// resolve them until every remaining penetration is within the resolver
/// tolerance or `max_passes` is spent.
pub struct ParticleWorld {
    particles: Vec<Particle>,
    registry: ForceRegistry,
    links: Vec<Box<dyn ParticleContactGenerator>>,
    resolver: ParticleContactResolver,
    contacts: Vec<ParticleContact>,
    max_contacts: usize,
    max_passes: usize,
}

impl ParticleWorld {
    pub fn new(particles: Vec<Particle>, tolerance: f32, max_passes: usize) -> Self {
        let max_contacts = particles.len() * 10;
        Self {
            particles,
            registry: ForceRegistry::default(),
            links: Vec::new(),
            resolver: ParticleContactResolver::new(0, tolerance),
            contacts: Vec::with_capacity(max_contacts),
            max_contacts,
            max_passes: max_passes.max(1),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn register_force(&mut self, particle: usize, generator: Box<dyn ParticleForceGenerator>) {
        self.registry.add(particle, generator);
    }

    pub fn register_link(&mut self, link: Box<dyn ParticleContactGenerator>) {
        self.links.push(link);
    }

    pub fn force_count(&self) -> usize {
        self.registry.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Clear every force accumulator ahead of a new frame.
    pub fn start_frame(&mut self) {
        for particle in &mut self.particles {
            particle.clear_accumulator();
        }
    }

    pub fn run_physics(&mut self, duration: f32) {
        if duration <= 0.0 {
            return;
        }

        self.registry.update_forces(&mut self.particles, duration);
        for particle in &mut self.particles {
            particle.integrate(duration);
        }

        for _ in 0..self.max_passes {
            self.generate_contacts();
            let worst = self
                .contacts
                .iter()
                .map(|c| c.penetration)
                .fold(0.0_f32, f32::max);
            if worst <= self.resolver.tolerance {
                break;
            }
            self.resolver
                .resolve_contacts(&mut self.contacts, &mut self.particles, duration);
        }
    }

    fn generate_contacts(&mut self) {
        self.contacts.clear();
        for link in &self.links {
            let remaining = self.max_contacts.saturating_sub(self.contacts.len());
            if remaining == 0 {
                break;
            }
            link.add_contact(&self.particles, &mut self.contacts, remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::links::ParticleRod;
    use bevy::math::Vec3;

    #[test]
    fn falling_pair_keeps_rod_length() {
        let mut a = Particle::default();
        a.set_mass(1.0);
        a.acceleration = Vec3::new(0.0, -9.81, 0.0);
        let mut b = a;
        b.position = Vec3::new(2.0, 0.0, 0.0);
        b.velocity = Vec3::new(3.0, 1.0, 0.0);

        let mut world = ParticleWorld::new(vec![a, b], 1.0e-4, 16);
        world.register_link(Box::new(ParticleRod::new(0, 1, 2.0)));

        for _ in 0..120 {
            world.start_frame();
            world.run_physics(1.0 / 60.0);
            let d = world.particles()[0]
                .position
                .distance(world.particles()[1].position);
            assert!((d - 2.0).abs() < 1.0e-3, "rod length drifted to {d}");
        }
    }

    #[test]
    fn zero_duration_is_a_no_op() {
        let mut p = Particle::default();
        p.set_mass(1.0);
        p.velocity = Vec3::X;
        let mut world = ParticleWorld::new(vec![p], 1.0e-4, 4);
        world.run_physics(0.0);
        assert_eq!(world.particles()[0].position, Vec3::ZERO);
    }
}
