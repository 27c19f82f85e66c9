//! A 4×4 wall of randomly weighted boxes and a steerable projectile.
//!
//! ## Update order
//!
//! 1. Apply the projectile's staged spin.
//! 2. Respawn the projectile if its flight time is over.
//! 3. Integrate every box and the projectile.
//! 4. Generate contacts into the fixed budget ([`contacts::generate_contacts`]).
//! 5. Resolve them.

pub mod contacts;
pub mod control;
pub mod layout;
pub mod rendering;
pub mod state;

use crate::config::{SceneConfig, WallConfig};
use crate::constants::RESOLVER_ITERATIONS_PER_CONTACT;
use crate::engine::{CollisionData, ContactResolver};
use crate::harness::{DemoScene, KeyOutcome};
use bevy::prelude::*;
use std::time::Duration;

pub use layout::mass_seed;
pub use state::{FireState, WallBox};

pub const TITLE: &str = "Wall";

#[derive(Resource)]
pub struct WallScene {
    boxes: Vec<WallBox>,
    projectile: WallBox,
    /// Authoritative projectile mass; the body's inverse mass is derived from it.
    projectile_mass: f32,
    fire: FireState,
    flight: Duration,
    contacts: CollisionData,
    resolver: ContactResolver,
    config: WallConfig,
}

impl WallScene {
    pub fn new(config: &WallConfig, clock: Duration) -> Self {
        let half_size = Vec3::splat(config.box_size * 0.5);
        let box_count = config.rows * config.columns;
        let mut scene = Self {
            boxes: (0..box_count).map(|_| WallBox::new(half_size)).collect(),
            projectile: WallBox::new(half_size),
            projectile_mass: config.projectile_mass,
            fire: FireState::Idle,
            flight: config.flight_duration(),
            contacts: CollisionData::new(config.max_contacts),
            resolver: ContactResolver::new(config.max_contacts * RESOLVER_ITERATIONS_PER_CONTACT),
            config: config.clone(),
        };
        scene.reset(clock.as_secs());
        scene.reset_projectile();
        info!(
            "Wall built: {} boxes, contact budget {}, {:?} pair scan",
            box_count, config.max_contacts, config.pair_scan
        );
        scene
    }

    pub fn boxes(&self) -> &[WallBox] {
        &self.boxes
    }

    pub fn projectile(&self) -> &WallBox {
        &self.projectile
    }

    pub fn projectile_mass(&self) -> f32 {
        self.projectile_mass
    }

    pub fn fire_state(&self) -> FireState {
        self.fire
    }

    /// Contacts generated by the most recent update.
    pub fn contacts(&self) -> &CollisionData {
        &self.contacts
    }

    pub fn config(&self) -> &WallConfig {
        &self.config
    }

    pub fn step(&mut self, duration: f32, clock: Duration) {
        self.projectile.apply_pending_rotation();
        if duration <= 0.0 {
            return;
        }

        if self.fire.flight_over(clock, self.flight) {
            info!("Projectile flight over; respawning");
            self.reset_projectile();
        }

        for wall_box in &mut self.boxes {
            wall_box.body_mut().integrate(duration);
        }
        self.projectile.body_mut().integrate(duration);

        contacts::generate_contacts(
            &mut self.contacts,
            &self.boxes,
            &self.projectile,
            &self.config,
        );
        contacts::resolve_contacts(
            &self.resolver,
            &self.contacts,
            &mut self.boxes,
            &mut self.projectile,
            duration,
        );
    }
}

impl DemoScene for WallScene {
    fn from_config(config: &SceneConfig, clock: Duration) -> Self {
        Self::new(&config.wall, clock)
    }

    fn title(&self) -> &'static str {
        TITLE
    }

    fn update(&mut self, duration: f32, clock: Duration) {
        self.step(duration, clock);
    }

    fn key(&mut self, key: char, clock: Duration) -> KeyOutcome {
        self.handle_key(key, clock)
    }

    fn draw(&self, gizmos: &mut Gizmos) {
        self.draw_gizmos(gizmos);
    }

    /// Fresh layout with the current masses.
    fn reset(&mut self, clock: Duration) {
        self.reposition_all(clock.as_secs());
    }

    fn starts_paused(&self) -> bool {
        self.config.start_paused
    }
}
