//! Scene-specific error types.
//!
//! Scenes themselves never fail: unmapped keys are ignored and numeric edge
//! cases are clamped.  Errors only arise while preparing a scene (reading
//! `assets/scenes.toml`, choosing a scene by name) and are reported through
//! Bevy's log macros before falling back to defaults.
//!
//! ## Usage
//!
//! ```rust
//! use physics_scenes::error::{validate_positive, SceneResult};
//!
//! fn check(stiffness: f32) -> SceneResult<()> {
//!     validate_positive("platform.stiff_stiffness", stiffness)?;
//!     Ok(())
//! }
//! # assert!(check(30.0).is_ok());
//! ```

use std::fmt;

/// Top-level error enum for scene setup.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The requested scene name matches no known scene.
    UnknownScene {
        /// The name as typed on the command line or in the environment.
        name: String,
    },

    /// `assets/scenes.toml` exists but is not valid TOML for [`crate::config::SceneConfig`].
    Parse {
        path: String,
        message: String,
    },

    /// A floating-point configuration value is outside its usable range.
    InvalidValue {
        /// Dotted config key, e.g. `wall.min_projectile_mass`.
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },

    /// A count (budget, iterations) is outside its usable range.
    InvalidCount {
        name: &'static str,
        value: usize,
        expected: &'static str,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::UnknownScene { name } => write!(
                f,
                "unknown scene '{}' (expected 'platform' or 'wall')",
                name
            ),
            SceneError::Parse { path, message } => {
                write!(f, "failed to parse {}: {}", path, message)
            }
            SceneError::InvalidValue {
                name,
                value,
                expected,
            } => write!(f, "config value '{}' = {} must be {}", name, value, expected),
            SceneError::InvalidCount {
                name,
                value,
                expected,
            } => write!(f, "config count '{}' = {} must be {}", name, value, expected),
        }
    }
}

impl std::error::Error for SceneError {}

/// Convenience alias: a `Result` using `SceneError` as the error type.
pub type SceneResult<T> = Result<T, SceneError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is finite and strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> SceneResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidValue {
            name,
            value,
            expected: "finite and > 0",
        })
    }
}

/// Returns an error unless `value` lies in `[0, 1]`.
pub fn validate_unit(name: &'static str, value: f32) -> SceneResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SceneError::InvalidValue {
            name,
            value,
            expected: "within [0, 1]",
        })
    }
}

/// Returns an error if a per-frame budget or iteration count is zero.
pub fn validate_budget(name: &'static str, value: usize) -> SceneResult<()> {
    if value == 0 {
        Err(SceneError::InvalidCount {
            name,
            value,
            expected: "at least 1",
        })
    } else {
        Ok(())
    }
}
