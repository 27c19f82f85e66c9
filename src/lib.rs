//! Interactive physics demo scenes.
//!
//! Two scenes share one small engine and one Bevy harness:
//! - **Platform**: a square platform hung from four points by spring cables
//!   and held rigid by rods.
//! - **Wall**: a wall of randomly weighted boxes knocked over by a steerable
//!   projectile.

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod graphics;
pub mod harness;
pub mod scenes;
