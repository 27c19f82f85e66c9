//! Centralised scene and engine constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place.  [`crate::config::SceneConfig::default`] reads every
//! runtime-tunable value from this file, so it remains the **authoritative
//! default** even when `assets/scenes.toml` overrides a subset.

use bevy::math::Vec3;

// ── Engine ────────────────────────────────────────────────────────────────────

/// Gravity acceleration shared by particles and rigid bodies (world units/s²).
pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Bodies whose smoothed kinetic motion falls below this value are put to sleep.
///
/// Raising it makes the wall settle faster but lets slow-moving boxes freeze
/// mid-topple.
pub const SLEEP_EPSILON: f32 = 0.3;

/// Penetration below which the rigid-body resolver stops correcting positions.
pub const POSITION_EPSILON: f32 = 0.01;

/// Desired velocity change below which the rigid-body resolver stops applying impulses.
pub const VELOCITY_EPSILON: f32 = 0.01;

/// Closing speeds below this value are resolved without restitution so resting
/// contacts do not jitter.
pub const RESTING_VELOCITY_LIMIT: f32 = 0.25;

/// Maximum fraction of a contact's lever arm that a position correction may
/// resolve through rotation.
pub const ANGULAR_MOVE_LIMIT: f32 = 0.2;

/// Resolver iterations allotted per possible contact.
pub const RESOLVER_ITERATIONS_PER_CONTACT: usize = 8;

// ── Platform ──────────────────────────────────────────────────────────────────

/// Mass of each of the four platform corners.
pub const PLATFORM_CORNER_MASS: f32 = 3.0;

/// Per-second velocity retention of the platform corners (`v *= d^dt`).
pub const PLATFORM_DAMPING: f32 = 0.5;

/// Height of the four fixed cable anchors.
pub const PLATFORM_ANCHOR_HEIGHT: f32 = 6.0;

/// Initial height of the platform corners, directly below their anchors.
pub const PLATFORM_CORNER_HEIGHT: f32 = 5.0;

/// Platform extent along X (edge rod length).
pub const PLATFORM_WIDTH: f32 = 2.0;

/// Platform extent along Z (edge rod length).
pub const PLATFORM_DEPTH: f32 = 2.0;

/// Stiffness of the cables on the soft side of the platform.
pub const PLATFORM_SOFT_STIFFNESS: f32 = 15.0;

/// Stiffness of the cables on the stiff side of the platform.
pub const PLATFORM_STIFF_STIFFNESS: f32 = 30.0;

/// Rest length of every cable.
pub const PLATFORM_CABLE_REST_LENGTH: f32 = 2.0;

/// Speed written into every corner by a WASD nudge.
pub const PLATFORM_NUDGE_SPEED: f32 = 4.0;

/// Largest rod length error accepted at the end of a platform step.
pub const ROD_TOLERANCE: f32 = 1.0e-3;

/// Upper bound on constraint regeneration passes per platform step.
pub const ROD_MAX_PASSES: usize = 32;

// ── Wall: Layout ──────────────────────────────────────────────────────────────

/// Number of box rows in the wall.
pub const WALL_ROWS: usize = 4;

/// Number of boxes per row.
pub const WALL_COLUMNS: usize = 4;

/// Full edge length of every wall box and of the projectile.
pub const WALL_BOX_SIZE: f32 = 3.0;

/// Depth (Z) of the wall plane.
pub const WALL_Z: f32 = -5.0;

/// Linear and angular per-second velocity retention for boxes (`v *= d^dt`).
pub const BOX_DAMPING: f32 = 0.9;

// ── Wall: Contacts ────────────────────────────────────────────────────────────

/// Maximum number of contacts generated per frame.
///
/// Lowering this caps solver cost at the price of dropping late contacts
/// (boxes at the end of the index order sink into each other first).
pub const MAX_CONTACTS: usize = 256;

/// Friction coefficient applied to every generated contact.
pub const CONTACT_FRICTION: f32 = 0.9;

/// Restitution coefficient applied to every generated contact.
pub const CONTACT_RESTITUTION: f32 = 0.1;

/// Collision tolerance stored with the contact budget.
pub const CONTACT_TOLERANCE: f32 = 0.1;

// ── Wall: Projectile ──────────────────────────────────────────────────────────

/// Mass of the projectile when the scene starts.
pub const PROJECTILE_START_MASS: f32 = 300.0;

/// Mass added or removed per `+` / `-` key press.
pub const PROJECTILE_MASS_STEP: f32 = 25.0;

/// Lowest mass a `-` key press may leave on the projectile.
pub const PROJECTILE_MIN_MASS: f32 = 25.0;

/// Projectile spawn position.
pub const PROJECTILE_SPAWN: Vec3 = Vec3::new(-1.0, 6.0, 4.0);

/// Launch speed along the projectile's local forward (−Z) axis.
pub const PROJECTILE_LAUNCH_SPEED: f32 = 50.0;

/// Seconds after firing before the projectile returns to its spawn pose.
pub const PROJECTILE_FLIGHT_SECS: f32 = 3.0;

/// Vertical distance moved per `w` / `s` key press.
pub const PROJECTILE_NUDGE_STEP: f32 = 0.25;

/// Angular velocity (rad/s about +Y) staged by one `a` / `d` key press.
pub const PROJECTILE_SPIN_STEP: f32 = 0.2;
