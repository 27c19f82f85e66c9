//! Projectile controls.
//!
//! | Key | Action |
//! |-----|--------|
//! | `f` | Fire (only while armed) |
//! | `+` / `=` | Mass up one step |
//! | `-` / `_` | Mass down one step, never below the floor |
//! | `w` / `s` | Move up / down |
//! | `a` / `d` | Spin counter-clockwise / clockwise for one frame |
//! | `n` | New masses and a fresh wall |
//!
//! Every key, mapped or not, wakes the projectile first.

use super::state::FireState;
use super::WallScene;
use crate::harness::KeyOutcome;
use bevy::prelude::*;
use std::time::Duration;

impl WallScene {
    pub(super) fn handle_key(&mut self, key: char, clock: Duration) -> KeyOutcome {
        self.projectile.body_mut().force_wake();

        let step = self.config.mass_step;
        let nudge = self.config.nudge_step;
        let spin = self.config.spin_step;
        match key {
            'f' => {
                self.fire(clock);
            }
            '+' | '=' => {
                self.adjust_projectile_mass(step);
            }
            '-' | '_' => {
                self.adjust_projectile_mass(-step);
            }
            'w' => self.nudge_projectile(nudge),
            's' => self.nudge_projectile(-nudge),
            'a' => self.stage_spin(spin),
            'd' => self.stage_spin(-spin),
            'n' => self.reset(clock.as_secs()),
            _ => return KeyOutcome::Ignored,
        }
        KeyOutcome::Handled
    }

    /// Launch along the projectile's local −Z axis, on top of its current
    /// velocity.  Ignored unless armed.
    pub fn fire(&mut self, clock: Duration) -> bool {
        if !self.fire.is_armed() {
            debug!("Fire ignored while {:?}", self.fire);
            return false;
        }
        let body = self.projectile.body_mut();
        let launch = body.transform_direction(Vec3::new(0.0, 0.0, -self.config.launch_speed));
        body.add_velocity(launch);
        self.fire = FireState::Flight { fired_at: clock };
        info!("Projectile fired ({} kg)", self.projectile_mass);
        true
    }

    /// Change the projectile mass by `delta`.  Decreases that would end below
    /// `min_projectile_mass` are rejected.
    pub fn adjust_projectile_mass(&mut self, delta: f32) -> bool {
        let mass = self.projectile_mass + delta;
        if delta < 0.0 && mass < self.config.min_projectile_mass {
            debug!(
                "Projectile mass stays at {} (floor {})",
                self.projectile_mass, self.config.min_projectile_mass
            );
            return false;
        }
        self.projectile_mass = mass;
        let half_size = self.projectile.shape.half_size;
        let body = self.projectile.body_mut();
        body.set_mass(mass);
        body.set_block_inertia_tensor(half_size, mass);
        info!("Projectile mass = {mass}");
        true
    }

    pub fn nudge_projectile(&mut self, dy: f32) {
        let body = self.projectile.body_mut();
        body.position.y += dy;
        body.calculate_derived_data();
    }

    /// Stage an angular velocity about +Y for the next update.
    pub fn stage_spin(&mut self, rate: f32) {
        self.projectile.pending_rotation = Vec3::new(0.0, rate, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WallConfig;

    fn scene() -> WallScene {
        WallScene::new(&WallConfig::default(), Duration::ZERO)
    }

    fn press(scene: &mut WallScene, keys: &str) {
        for key in keys.chars() {
            scene.handle_key(key, Duration::ZERO);
        }
    }

    #[test]
    fn mass_steps_up_and_down() {
        let mut scene = scene();
        assert_eq!(scene.projectile_mass(), 300.0);
        press(&mut scene, "+=+");
        assert_eq!(scene.projectile_mass(), 375.0);
        press(&mut scene, "-");
        assert_eq!(scene.projectile_mass(), 350.0);
        assert!((scene.projectile().body().mass() - 350.0).abs() < 1.0e-2);
    }

    #[test]
    fn mass_never_drops_below_floor() {
        let mut scene = scene();
        for _ in 0..20 {
            press(&mut scene, "_");
        }
        assert_eq!(scene.projectile_mass(), 25.0);
        assert!(!scene.adjust_projectile_mass(-25.0));
        assert_eq!(scene.projectile_mass(), 25.0);
    }

    #[test]
    fn fire_adds_to_existing_velocity() {
        let mut scene = scene();
        scene.projectile.body_mut().velocity = Vec3::new(1.0, 2.0, 3.0);
        assert!(scene.fire(Duration::from_secs(1)));
        let v = scene.projectile().body().velocity;
        assert!((v - Vec3::new(1.0, 2.0, -47.0)).length() < 1.0e-4, "velocity {v}");
        assert_eq!(
            scene.fire_state(),
            FireState::Flight {
                fired_at: Duration::from_secs(1)
            }
        );
    }

    #[test]
    fn fire_in_flight_is_ignored() {
        let mut scene = scene();
        scene.handle_key('f', Duration::from_secs(1));
        let v = scene.projectile().body().velocity;
        assert_eq!(scene.handle_key('f', Duration::from_secs(2)), KeyOutcome::Handled);
        assert_eq!(scene.projectile().body().velocity, v);
        assert_eq!(
            scene.fire_state(),
            FireState::Flight {
                fired_at: Duration::from_secs(1)
            }
        );
    }

    #[test]
    fn fire_follows_orientation() {
        let mut scene = scene();
        scene.projectile.body_mut().orientation =
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        scene.projectile.body_mut().calculate_derived_data();
        scene.fire(Duration::ZERO);
        let v = scene.projectile().body().velocity;
        assert!((v - Vec3::new(-50.0, 0.0, 0.0)).length() < 1.0e-3, "velocity {v}");
    }

    #[test]
    fn nudge_and_spin() {
        let mut scene = scene();
        press(&mut scene, "ww");
        assert!((scene.projectile().body().position.y - 6.5).abs() < 1.0e-6);
        press(&mut scene, "s");
        assert!((scene.projectile().body().position.y - 6.25).abs() < 1.0e-6);
        press(&mut scene, "d");
        assert_eq!(scene.projectile().pending_rotation, Vec3::new(0.0, -0.2, 0.0));
        press(&mut scene, "a");
        assert_eq!(scene.projectile().pending_rotation, Vec3::new(0.0, 0.2, 0.0));
    }

    #[test]
    fn n_rerolls_masses_and_relays_the_wall() {
        let mut scene = WallScene::new(&WallConfig::default(), Duration::from_secs(5));
        let before: Vec<f32> = scene.boxes().iter().map(|b| b.body().mass()).collect();
        scene.boxes[0].body_mut().position = Vec3::new(99.0, 0.0, 0.0);

        assert_eq!(scene.handle_key('n', Duration::from_secs(9)), KeyOutcome::Handled);

        let after: Vec<f32> = scene.boxes().iter().map(|b| b.body().mass()).collect();
        assert_ne!(before, after);
        assert_eq!(scene.boxes()[0].body().position, Vec3::new(-6.0, 1.5, -5.0));
        assert!(scene.boxes().iter().all(|b| !b.body().is_awake()));
    }

    #[test]
    fn r_is_left_to_the_harness() {
        let mut scene = scene();
        assert_eq!(scene.handle_key('r', Duration::ZERO), KeyOutcome::Ignored);
    }

    #[test]
    fn any_key_wakes_the_projectile() {
        let mut scene = scene();
        scene.projectile.body_mut().set_awake(false);
        assert_eq!(scene.handle_key('z', Duration::ZERO), KeyOutcome::Ignored);
        assert!(scene.projectile().body().is_awake());
    }
}
