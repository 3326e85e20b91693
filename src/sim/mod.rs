//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Fixed timestep only (no delta time)
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering or platform dependencies; the wall clock arrives as a number

pub mod collision;
pub mod movement;
pub mod rng;
pub mod spawn;
pub mod state;
pub mod terrain;
pub mod tick;

pub use collision::activate_nuke;
pub use rng::SimRng;
pub use state::{
    BossVariant, Bullet, BulletOwner, BulletPattern, DeathCause, Decoration, DecorationKind,
    Enemy, EnemyKind, GameEvent, Particle, ParticleColor, Player, Rect, RiverBand, WeaponType,
    World,
};
pub use tick::{TickInput, tick};
