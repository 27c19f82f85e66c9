//! A square platform hung from four fixed points by spring cables.
//!
//! Particles `0..4` are the anchors, `4..8` the platform corners, each corner
//! directly below its anchor.  The corners are held in shape by six rods (four
//! edges, two diagonals).  The cables on the `x < 0` side are softer than the
//! ones on the `x > 0` side, so the platform settles tilted.
//!
//! `w`/`a`/`s`/`d` overwrite the velocity of every corner.

use crate::config::{PlatformConfig, SceneConfig};
use crate::constants::GRAVITY;
use crate::engine::{Particle, ParticleRod, ParticleSpring, ParticleWorld};
use crate::harness::{DemoScene, KeyOutcome};
use bevy::prelude::*;
use std::time::Duration;

pub const TITLE: &str = "Platform";

const ANCHOR_COUNT: usize = 4;
const CORNER_COUNT: usize = 4;

/// Corner footprint in units of half width / half depth, in particle order.
const FOOTPRINT: [(f32, f32); CORNER_COUNT] = [(-1.0, 1.0), (1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)];

/// Which corners hang from soft cables.  Both sit on the `x < 0` edge.
const SOFT_CORNERS: [bool; CORNER_COUNT] = [true, false, false, true];

const PLANE_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);
const CABLE_COLOR: Color = Color::srgb(0.0, 1.0, 0.0);
const PARTICLE_COLOR: Color = Color::BLACK;
const PARTICLE_RADIUS: f32 = 0.1;

#[derive(Resource)]
pub struct PlatformScene {
    world: ParticleWorld,
    rods: Vec<ParticleRod>,
    nudge_speed: f32,
}

impl PlatformScene {
    pub fn new(config: &PlatformConfig) -> Self {
        let half_width = config.width * 0.5;
        let half_depth = config.depth * 0.5;

        let mut particles = Vec::with_capacity(ANCHOR_COUNT + CORNER_COUNT);
        for &(x, z) in &FOOTPRINT {
            particles.push(Particle::anchor(Vec3::new(
                x * half_width,
                config.anchor_height,
                z * half_depth,
            )));
        }
        for &(x, z) in &FOOTPRINT {
            let mut corner = Particle::anchor(Vec3::new(
                x * half_width,
                config.corner_height,
                z * half_depth,
            ));
            corner.set_mass(config.corner_mass);
            corner.damping = config.damping;
            corner.acceleration = GRAVITY;
            particles.push(corner);
        }

        let mut world = ParticleWorld::new(particles, config.rod_tolerance, config.rod_max_passes);

        for (i, &soft) in SOFT_CORNERS.iter().enumerate() {
            let stiffness = if soft {
                config.soft_stiffness
            } else {
                config.stiff_stiffness
            };
            world.register_force(
                ANCHOR_COUNT + i,
                Box::new(ParticleSpring::new(i, stiffness, config.cable_rest_length)),
            );
        }

        let diagonal = config.width.hypot(config.depth);
        let rods = vec![
            ParticleRod::new(4, 5, config.width),
            ParticleRod::new(5, 6, config.depth),
            ParticleRod::new(6, 7, config.width),
            ParticleRod::new(7, 4, config.depth),
            ParticleRod::new(4, 6, diagonal),
            ParticleRod::new(5, 7, diagonal),
        ];
        for rod in &rods {
            world.register_link(Box::new(*rod));
        }

        debug!(
            "Platform built: {} springs, {} rods",
            world.force_count(),
            world.link_count()
        );

        Self {
            world,
            rods,
            nudge_speed: config.nudge_speed,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        self.world.particles()
    }

    pub fn anchors(&self) -> &[Particle] {
        &self.world.particles()[..ANCHOR_COUNT]
    }

    pub fn corners(&self) -> &[Particle] {
        &self.world.particles()[ANCHOR_COUNT..]
    }

    pub fn corner_velocities(&self) -> [Vec3; CORNER_COUNT] {
        std::array::from_fn(|i| self.corners()[i].velocity)
    }

    pub fn rods(&self) -> &[ParticleRod] {
        &self.rods
    }

    /// Overwrite every corner's velocity.
    pub fn set_corner_velocity(&mut self, velocity: Vec3) {
        for corner in &mut self.world.particles_mut()[ANCHOR_COUNT..] {
            corner.velocity = velocity;
        }
    }

    fn nudge_for(&self, key: char) -> Option<Vec3> {
        let speed = self.nudge_speed;
        match key {
            'w' => Some(Vec3::new(0.0, speed, 0.0)),
            'a' => Some(Vec3::new(-speed, 0.0, 0.0)),
            's' => Some(Vec3::new(0.0, -speed, 0.0)),
            'd' => Some(Vec3::new(speed, 0.0, 0.0)),
            _ => None,
        }
    }
}

impl DemoScene for PlatformScene {
    fn from_config(config: &SceneConfig, _clock: Duration) -> Self {
        Self::new(&config.platform)
    }

    fn title(&self) -> &'static str {
        TITLE
    }

    fn update(&mut self, duration: f32, _clock: Duration) {
        self.world.start_frame();
        self.world.run_physics(duration);
    }

    fn key(&mut self, key: char, _clock: Duration) -> KeyOutcome {
        match self.nudge_for(key) {
            Some(velocity) => {
                self.set_corner_velocity(velocity);
                KeyOutcome::Handled
            }
            None => KeyOutcome::Ignored,
        }
    }

    fn draw(&self, gizmos: &mut Gizmos) {
        let corners = self.corners();
        for (i, a) in corners.iter().enumerate() {
            for b in &corners[i + 1..] {
                gizmos.line(a.position, b.position, PLANE_COLOR);
            }
        }
        for (anchor, corner) in self.anchors().iter().zip(corners) {
            gizmos.line(anchor.position, corner.position, CABLE_COLOR);
        }
        for particle in self.particles() {
            gizmos.sphere(
                Isometry3d::from_translation(particle.position),
                PARTICLE_RADIUS,
                PARTICLE_COLOR,
            );
        }
    }
}
