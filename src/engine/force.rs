//! Force generators and the registry that applies them every step.

use super::particle::Particle;

/// Contributes a force to one particle each physics step.
///
/// Generators receive the whole particle slice so they can read other
/// particles (spring anchors) while writing only `particles[target]`.
pub trait ParticleForceGenerator: Send + Sync {
    fn update_force(&self, target: usize, particles: &mut [Particle], duration: f32);
}

/// Hooke spring between the target particle and a second particle.
///
/// Only the target receives a force; the other end is treated as an anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpring {
    pub other: usize,
    pub spring_constant: f32,
    pub rest_length: f32,
}

impl ParticleSpring {
    pub fn new(other: usize, spring_constant: f32, rest_length: f32) -> Self {
        Self {
            other,
            spring_constant,
            rest_length,
        }
    }
}

impl ParticleForceGenerator for ParticleSpring {
    fn update_force(&self, target: usize, particles: &mut [Particle], _duration: f32) {
        let other = particles[self.other].position;
        let particle = &mut particles[target];

        let offset = particle.position - other;
        let length = offset.length();
        if length <= f32::EPSILON {
            return;
        }
        let magnitude = (length - self.rest_length) * self.spring_constant;
        particle.add_force(offset / length * -magnitude);
    }
}

/// Registrations of (particle, generator) pairs.
#[derive(Default)]
pub struct ForceRegistry {
    registrations: Vec<(usize, Box<dyn ParticleForceGenerator>)>,
}

impl ForceRegistry {
    pub fn add(&mut self, particle: usize, generator: Box<dyn ParticleForceGenerator>) {
        self.registrations.push((particle, generator));
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Call every registered generator once.
    pub fn update_forces(&self, particles: &mut [Particle], duration: f32) {
        for (target, generator) in &self.registrations {
            generator.update_force(*target, particles, duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;

    fn pair(length: f32) -> Vec<Particle> {
        let anchor = Particle::anchor(Vec3::ZERO);
        let mut moving = Particle::default();
        moving.set_mass(1.0);
        moving.position = Vec3::new(0.0, -length, 0.0);
        vec![anchor, moving]
    }

    #[test]
    fn stretched_spring_pulls_towards_anchor() {
        let mut particles = pair(3.0);
        ParticleSpring::new(0, 10.0, 2.0).update_force(1, &mut particles, 0.1);
        particles[1].integrate(1.0);
        // 10 N upward on a 1 kg particle for one second.
        assert!((particles[1].velocity.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn compressed_spring_pushes_away() {
        let mut particles = pair(1.0);
        ParticleSpring::new(0, 10.0, 2.0).update_force(1, &mut particles, 0.1);
        particles[1].integrate(1.0);
        assert!(particles[1].velocity.y < 0.0);
    }

    #[test]
    fn registry_leaves_anchor_untouched() {
        let mut particles = pair(3.0);
        let mut registry = ForceRegistry::default();
        registry.add(1, Box::new(ParticleSpring::new(0, 10.0, 2.0)));
        registry.update_forces(&mut particles, 0.1);
        particles[0].integrate(1.0);
        assert_eq!(particles[0].velocity, Vec3::ZERO);
        assert_eq!(registry.len(), 1);
    }
}
