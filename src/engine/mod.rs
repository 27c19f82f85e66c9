//! Minimal mass-aggregate and rigid-body engine used by the demo scenes.
//!
//! ## Module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`particle`] | Point masses and their integrator |
//! | [`force`] | Per-step force generators (springs) and the force registry |
//! | [`links`] | Hard particle constraints (rods), particle contacts and their resolver |
//! | [`particle_world`] | Owns particles, forces and links; runs one physics step |
//! | [`body`] | Rigid bodies with tri-state sleep |
//! | [`collide`] | Box and plane primitives, budgeted contact buffer, narrow-phase tests |
//! | [`resolve`] | Sequential impulse / projection contact resolver for rigid bodies |
//! | [`random`] | Seeded integer draws |
//!
//! Scenes only use the capabilities re-exported here: integrate, register a
//! force, register a constraint, detect contacts into a budget, resolve
//! contacts, draw seeded integers and rotate local vectors into world space.

pub mod body;
pub mod collide;
pub mod force;
pub mod links;
pub mod particle;
pub mod particle_world;
pub mod random;
pub mod resolve;

pub use body::{RigidBody, SleepState};
pub use collide::{
    box_and_box, box_and_half_space, CollisionBox, CollisionData, CollisionPlane, Contact,
};
pub use force::{ForceRegistry, ParticleForceGenerator, ParticleSpring};
pub use links::{ParticleContact, ParticleContactGenerator, ParticleContactResolver, ParticleRod};
pub use particle::Particle;
pub use particle_world::ParticleWorld;
pub use random::SeededRandom;
pub use resolve::ContactResolver;
