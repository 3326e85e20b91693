//! River Strike - A scrolling river shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, spawning, movement, collisions)
//! - `session`: Session state machine, shop and gold ledger
//! - `platform`: Clock and key-value storage abstraction
//! - `persistence`: Banked gold and high score save/load
//! - `leaderboard`: Remote leaderboard contract
//! - `tuning`: Data-driven game balance

pub mod economy;
pub mod highscores;
pub mod input;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod sim;
pub mod snapshot;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::HighScores;
pub use input::{Control, ControlState};
pub use session::{Session, SessionState};
pub use snapshot::RenderSnapshot;
pub use tuning::Tuning;

use glam::Vec2;

/// Play-field geometry constants
pub mod consts {
    /// Play-field dimensions (pixels, y grows downward)
    pub const FIELD_WIDTH: f32 = 600.0;
    pub const FIELD_HEIGHT: f32 = 800.0;

    /// Player craft size
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 32.0;
    /// Distance of the player's top edge from the bottom of the field
    pub const PLAYER_START_OFFSET: f32 = 120.0;
    /// Horizontal speed while a move control is held (pixels/tick)
    pub const PLAYER_STRAFE_SPEED: f32 = 5.0;

    /// Height of one river band
    pub const BAND_HEIGHT: f32 = 20.0;
    /// Minimum land kept on each side of the river
    pub const BANK_MARGIN: f32 = 20.0;

    /// Upper bound on fuel
    pub const MAX_FUEL: f32 = 100.0;

    /// Logical ticks per simulated minute (60 Hz assumed)
    pub const FRAMES_PER_MINUTE: u64 = 3600;
}

/// Player spawn position (top-left corner)
#[inline]
pub fn player_start() -> Vec2 {
    use consts::*;
    Vec2::new(
        FIELD_WIDTH / 2.0 - PLAYER_WIDTH / 2.0,
        FIELD_HEIGHT - PLAYER_START_OFFSET,
    )
}
