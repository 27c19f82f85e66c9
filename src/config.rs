//! Runtime scene configuration loaded from `assets/scenes.toml`.
//!
//! [`SceneConfig`] is a Bevy [`Resource`] mirroring the tunable constants in
//! [`crate::constants`].  At startup, [`load_scene_config`] reads
//! `assets/scenes.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about:
//!
//! ```toml
//! [wall]
//! max_contacts = 64
//! pair_scan = "unordered"
//! ```
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `SceneConfig::default()`.

use crate::constants::*;
use crate::error::{validate_budget, validate_positive, validate_unit, SceneError, SceneResult};
use bevy::math::Vec3;
use bevy::prelude::*;
use serde::Deserialize;
use std::time::Duration;

/// Path of the optional override file, relative to the working directory.
pub const SCENE_CONFIG_PATH: &str = "assets/scenes.toml";

/// Top-level configuration resource.
#[derive(Resource, Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub platform: PlatformConfig,
    pub wall: WallConfig,
    pub harness: HarnessConfig,
}

/// Tuning for the suspended platform.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlatformConfig {
    // ── Particles ─────────────────────────────────────────────────────────────
    pub corner_mass: f32,
    pub damping: f32,
    pub anchor_height: f32,
    pub corner_height: f32,
    pub width: f32,
    pub depth: f32,

    // ── Cables ────────────────────────────────────────────────────────────────
    pub soft_stiffness: f32,
    pub stiff_stiffness: f32,
    pub cable_rest_length: f32,

    // ── Controls ──────────────────────────────────────────────────────────────
    pub nudge_speed: f32,

    // ── Solver ────────────────────────────────────────────────────────────────
    pub rod_tolerance: f32,
    pub rod_max_passes: usize,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            corner_mass: PLATFORM_CORNER_MASS,
            damping: PLATFORM_DAMPING,
            anchor_height: PLATFORM_ANCHOR_HEIGHT,
            corner_height: PLATFORM_CORNER_HEIGHT,
            width: PLATFORM_WIDTH,
            depth: PLATFORM_DEPTH,
            soft_stiffness: PLATFORM_SOFT_STIFFNESS,
            stiff_stiffness: PLATFORM_STIFF_STIFFNESS,
            cable_rest_length: PLATFORM_CABLE_REST_LENGTH,
            nudge_speed: PLATFORM_NUDGE_SPEED,
            rod_tolerance: ROD_TOLERANCE,
            rod_max_passes: ROD_MAX_PASSES,
        }
    }
}

/// Which box pairs the wall's contact pass tests.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PairScan {
    /// Every ordered pair `(i, j)`, `i != j`: each touching pair is tested twice.
    #[default]
    Full,
    /// Only `j > i`: each pair is tested once.
    Unordered,
}

/// Tuning for the wall of boxes and the projectile.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WallConfig {
    // ── Layout ────────────────────────────────────────────────────────────────
    pub rows: usize,
    pub columns: usize,
    pub box_size: f32,
    pub wall_z: f32,
    pub box_damping: f32,

    // ── Contacts ──────────────────────────────────────────────────────────────
    pub max_contacts: usize,
    pub friction: f32,
    pub restitution: f32,
    pub tolerance: f32,
    pub pair_scan: PairScan,

    // ── Projectile ────────────────────────────────────────────────────────────
    pub projectile_mass: f32,
    pub mass_step: f32,
    pub min_projectile_mass: f32,
    pub projectile_spawn: [f32; 3],
    pub launch_speed: f32,
    pub flight_secs: f32,
    pub nudge_step: f32,
    pub spin_step: f32,

    // ── Harness ───────────────────────────────────────────────────────────────
    /// Start with the simulation paused; `p` resumes it.
    pub start_paused: bool,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            rows: WALL_ROWS,
            columns: WALL_COLUMNS,
            box_size: WALL_BOX_SIZE,
            wall_z: WALL_Z,
            box_damping: BOX_DAMPING,
            max_contacts: MAX_CONTACTS,
            friction: CONTACT_FRICTION,
            restitution: CONTACT_RESTITUTION,
            tolerance: CONTACT_TOLERANCE,
            pair_scan: PairScan::Full,
            projectile_mass: PROJECTILE_START_MASS,
            mass_step: PROJECTILE_MASS_STEP,
            min_projectile_mass: PROJECTILE_MIN_MASS,
            projectile_spawn: PROJECTILE_SPAWN.to_array(),
            launch_speed: PROJECTILE_LAUNCH_SPEED,
            flight_secs: PROJECTILE_FLIGHT_SECS,
            nudge_step: PROJECTILE_NUDGE_STEP,
            spin_step: PROJECTILE_SPIN_STEP,
            start_paused: true,
        }
    }
}

impl WallConfig {
    pub fn projectile_spawn(&self) -> Vec3 {
        Vec3::from_array(self.projectile_spawn)
    }

    /// Flight time as a `Duration`.  Values too large to represent saturate
    /// to `Duration::MAX`; [`SceneConfig::validate`] rejects them.
    pub fn flight_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.flight_secs).unwrap_or(Duration::MAX)
    }
}

/// Settings for the Bevy harness itself.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Longest frame step handed to a scene; longer frames (window drags,
    /// breakpoints) are clamped to this.
    pub max_frame_secs: f32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_frame_secs: 0.05,
        }
    }
}

impl SceneConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(path: &str, contents: &str) -> SceneResult<Self> {
        let config: SceneConfig = toml::from_str(contents).map_err(|e| SceneError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the scenes cannot run with.
    pub fn validate(&self) -> SceneResult<()> {
        let p = &self.platform;
        validate_positive("platform.corner_mass", p.corner_mass)?;
        validate_unit("platform.damping", p.damping)?;
        validate_positive("platform.width", p.width)?;
        validate_positive("platform.depth", p.depth)?;
        validate_positive("platform.soft_stiffness", p.soft_stiffness)?;
        validate_positive("platform.stiff_stiffness", p.stiff_stiffness)?;
        validate_positive("platform.rod_tolerance", p.rod_tolerance)?;
        validate_budget("platform.rod_max_passes", p.rod_max_passes)?;

        let w = &self.wall;
        validate_budget("wall.rows", w.rows)?;
        validate_budget("wall.columns", w.columns)?;
        validate_positive("wall.box_size", w.box_size)?;
        validate_unit("wall.box_damping", w.box_damping)?;
        validate_budget("wall.max_contacts", w.max_contacts)?;
        validate_unit("wall.restitution", w.restitution)?;
        validate_positive("wall.projectile_mass", w.projectile_mass)?;
        validate_positive("wall.mass_step", w.mass_step)?;
        validate_positive("wall.min_projectile_mass", w.min_projectile_mass)?;
        validate_positive("wall.flight_secs", w.flight_secs)?;
        if Duration::try_from_secs_f32(w.flight_secs).is_err() {
            return Err(SceneError::InvalidValue {
                name: "wall.flight_secs",
                value: w.flight_secs,
                expected: "representable as a duration",
            });
        }
        validate_positive("wall.launch_speed", w.launch_speed)?;
        validate_positive("wall.nudge_step", w.nudge_step)?;
        validate_positive("wall.spin_step", w.spin_step)?;
        if w.projectile_mass < w.min_projectile_mass {
            return Err(SceneError::InvalidValue {
                name: "wall.projectile_mass",
                value: w.projectile_mass,
                expected: "at least wall.min_projectile_mass",
            });
        }

        validate_positive("harness.max_frame_secs", self.harness.max_frame_secs)?;
        Ok(())
    }
}

/// Startup system: attempt to load `assets/scenes.toml` and overwrite the
/// `SceneConfig` resource with any values present in the file.
///
/// A missing file keeps the compiled defaults.  Parse and validation errors
/// are logged and also keep the defaults; they never abort the demo.
pub fn load_scene_config(mut config: ResMut<SceneConfig>) {
    match std::fs::read_to_string(SCENE_CONFIG_PATH) {
        Ok(contents) => match SceneConfig::from_toml_str(SCENE_CONFIG_PATH, &contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded scene config from {SCENE_CONFIG_PATH}");
            }
            Err(err) => warn!("{err}; using defaults"),
        },
        Err(_) => info!("No {SCENE_CONFIG_PATH} found; using compiled defaults"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = SceneConfig::from_toml_str(
            "inline",
            r#"
            [wall]
            max_contacts = 12
            pair_scan = "unordered"
            "#,
        )
        .unwrap();
        assert_eq!(config.wall.max_contacts, 12);
        assert_eq!(config.wall.pair_scan, PairScan::Unordered);
        assert_eq!(config.wall.projectile_mass, PROJECTILE_START_MASS);
        assert_eq!(config.platform, PlatformConfig::default());
    }

    #[test]
    fn invalid_value_is_rejected() {
        let err = SceneConfig::from_toml_str("inline", "[wall]\nmax_contacts = 0\n").unwrap_err();
        assert!(matches!(err, SceneError::InvalidCount { name: "wall.max_contacts", .. }));
    }

    #[test]
    fn huge_flight_time_is_rejected() {
        let err = SceneConfig::from_toml_str("inline", "[wall]\nflight_secs = 1e30\n").unwrap_err();
        assert!(matches!(err, SceneError::InvalidValue { name: "wall.flight_secs", .. }));
        let wall = WallConfig {
            flight_secs: 1.0e30,
            ..Default::default()
        };
        assert_eq!(wall.flight_duration(), Duration::MAX);
    }

    #[test]
    fn projectile_settings_are_checked() {
        let err = SceneConfig::from_toml_str(
            "inline",
            "[wall]\nprojectile_mass = 10.0\nmin_projectile_mass = 25.0\n",
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::InvalidValue { name: "wall.projectile_mass", .. }));

        for key in ["launch_speed", "nudge_step", "spin_step"] {
            let toml = format!("[wall]\n{key} = 0.0\n");
            let err = SceneConfig::from_toml_str("inline", &toml).unwrap_err();
            assert!(matches!(err, SceneError::InvalidValue { .. }), "{key} accepted");
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SceneConfig::from_toml_str("inline", "[wall\n").unwrap_err();
        assert!(matches!(err, SceneError::Parse { .. }));
    }
}
