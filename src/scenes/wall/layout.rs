//! Wall layout, seeded mass randomisation and projectile respawn.

use super::state::FireState;
use super::WallScene;
use crate::constants::GRAVITY;
use crate::engine::SeededRandom;
use bevy::prelude::*;

/// Seed for the box at (`col`, `row`), flat index `index`.
pub fn mass_seed(col: usize, row: usize, index: usize, clock_secs: u64) -> u64 {
    (col + row * row + index) as u64 + clock_secs
}

impl WallScene {
    fn grid_cell(&self, index: usize) -> (usize, usize) {
        (index % self.config.columns, index / self.config.columns)
    }

    fn seeded_rng(&self, index: usize, clock_secs: u64) -> SeededRandom {
        let (col, row) = self.grid_cell(index);
        SeededRandom::new(mass_seed(col, row, index, clock_secs))
    }

    /// Draw a new base mass and total mass for every box.
    pub fn randomize_masses(&mut self, clock_secs: u64) {
        for index in 0..self.boxes.len() {
            let mut rng = self.seeded_rng(index, clock_secs);
            let base_mass = (rng.random_int(100) + 1) as f32;
            let mass = rng.random_int(50) as f32
                + rng.random_int(40) as f32
                + rng.random_int(30) as f32
                + base_mass
                + rng.random_int(100) as f32;

            let wall_box = &mut self.boxes[index];
            wall_box.base_mass = base_mass;
            wall_box.body_mut().set_mass(mass);
        }
        debug!("Wall masses randomised (clock {clock_secs}s)");
    }

    /// Re-lay every box at its grid slot, asleep.  Masses are kept.
    pub fn reposition_all(&mut self, clock_secs: u64) {
        let size = self.config.box_size;
        let damping = self.config.box_damping;
        let left = -2.0 * size;
        for index in 0..self.boxes.len() {
            let (col, row) = self.grid_cell(index);
            let position = Vec3::new(
                left + size * col as f32,
                size * 0.5 + size * row as f32,
                self.config.wall_z,
            );
            let base_mass = (self.seeded_rng(index, clock_secs).random_int(100) + 1) as f32;

            let wall_box = &mut self.boxes[index];
            wall_box.base_mass = base_mass;
            wall_box.place(position, damping);
            wall_box.body_mut().acceleration = GRAVITY;
        }
        info!("Wall reset ({} boxes)", self.boxes.len());
    }

    /// New masses, then a fresh layout.
    pub fn reset(&mut self, clock_secs: u64) {
        self.randomize_masses(clock_secs);
        self.reposition_all(clock_secs);
    }

    /// Rebuild the projectile at its spawn pose, awake and ready to fire.
    pub fn reset_projectile(&mut self) {
        let spawn = self.config.projectile_spawn();
        let mass = self.projectile_mass;
        self.projectile.pending_rotation = Vec3::ZERO;
        self.projectile.body_mut().set_mass(mass);
        self.projectile.place(spawn, self.config.box_damping);
        self.projectile.body_mut().force_wake();
        self.fire = FireState::Armed;
        debug!("Projectile armed at {spawn}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WallConfig;
    use std::time::Duration;

    fn scene_at(secs: u64) -> WallScene {
        WallScene::new(&WallConfig::default(), Duration::from_secs(secs))
    }

    fn masses(scene: &WallScene) -> Vec<f32> {
        scene.boxes().iter().map(|b| b.body().mass()).collect()
    }

    #[test]
    fn seed_combines_grid_slot_and_clock() {
        assert_eq!(mass_seed(2, 3, 14, 100), 2 + 9 + 14 + 100);
    }

    #[test]
    fn same_clock_gives_same_masses() {
        let a = scene_at(42);
        let b = scene_at(42);
        assert_eq!(masses(&a), masses(&b));

        let mut c = scene_at(7);
        c.reset(42);
        assert_eq!(masses(&a), masses(&c));
    }

    #[test]
    fn masses_stay_in_range() {
        let scene = scene_at(1234);
        for b in scene.boxes() {
            assert!((1.0..=100.0).contains(&b.base_mass));
            let extra = b.body().mass() - b.base_mass;
            assert!((0.0..=216.0).contains(&extra), "extra mass {extra}");
        }
    }

    #[test]
    fn reposition_keeps_masses_and_relays_grid() {
        let mut scene = scene_at(5);
        let before = masses(&scene);
        scene.boxes[3].body_mut().position = Vec3::new(40.0, 40.0, 40.0);
        scene.reposition_all(99);
        assert_eq!(masses(&scene), before);

        let b = &scene.boxes()[3];
        assert_eq!(b.body().position, Vec3::new(3.0, 1.5, -5.0));
        assert!(!b.body().is_awake());
        assert_eq!(scene.boxes()[15].body().position, Vec3::new(3.0, 10.5, -5.0));
    }

    #[test]
    fn projectile_reset_restores_spawn_pose() {
        let mut scene = scene_at(0);
        scene.projectile.body_mut().position = Vec3::ZERO;
        scene.projectile.body_mut().velocity = Vec3::ONE;
        scene.reset_projectile();
        let body = scene.projectile().body();
        assert_eq!(body.position, Vec3::new(-1.0, 6.0, 4.0));
        assert_eq!(body.velocity, Vec3::ZERO);
        assert!(body.is_awake());
        assert_eq!(scene.fire_state(), FireState::Armed);
    }
}
