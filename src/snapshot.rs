//! Read-only view of one frame for the renderer
//!
//! Borrowed from the session for the duration of a draw call; serializes to
//! JSON for the browser bridge.

use serde::Serialize;

use crate::consts::FRAMES_PER_MINUTE;
use crate::economy::Loadout;
use crate::leaderboard::LeaderboardView;
use crate::session::{Session, SessionState};
use crate::sim::{BossVariant, Bullet, Decoration, Enemy, Particle, Player, RiverBand};

/// Invulnerable craft blink with this period (ticks per phase)
const FLICKER_PHASE_FRAMES: u64 = 6;

/// Palette of the land and river
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Atmosphere {
    Day,
    /// After three minutes, and whenever a boss is on screen
    Night,
    /// After six minutes while no boss is on screen
    Snow,
}

impl Atmosphere {
    pub fn at(frame_count: u64, boss_active: bool) -> Self {
        if boss_active {
            Atmosphere::Night
        } else if frame_count > 6 * FRAMES_PER_MINUTE {
            Atmosphere::Snow
        } else if frame_count > 3 * FRAMES_PER_MINUTE {
            Atmosphere::Night
        } else {
            Atmosphere::Day
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenderSnapshot<'a> {
    pub state: SessionState,
    pub frame_count: u64,
    pub scroll_speed: f32,
    pub bands: &'a [RiverBand],
    pub decorations: &'a [Decoration],
    pub player: &'a Player,
    /// False on the hidden half of the invulnerability blink
    pub player_visible: bool,
    pub enemies: &'a [Enemy],
    pub bullets: &'a [Bullet],
    pub particles: &'a [Particle],
    pub boss_active: bool,
    pub boss_variant: Option<BossVariant>,
    /// Remaining nuke flash ticks (0 when none)
    pub nuke_flash: u32,
    pub boss_warning: Option<&'static str>,
    pub atmosphere: Atmosphere,
    pub displayed_gold: u64,
    pub loadout: &'a Loadout,
    pub leaderboard: &'a LeaderboardView,
    pub save_status: &'static str,
}

impl<'a> RenderSnapshot<'a> {
    pub fn capture(session: &'a Session) -> Self {
        let world = session.world();
        let player = &world.player;
        let player_visible =
            !player.invulnerable || (world.frame_count / FLICKER_PHASE_FRAMES) % 2 == 0;

        Self {
            state: session.state(),
            frame_count: world.frame_count,
            scroll_speed: world.scroll_speed,
            bands: &world.bands,
            decorations: &world.decorations,
            player,
            player_visible,
            enemies: &world.enemies,
            bullets: &world.bullets,
            particles: &world.particles,
            boss_active: world.boss_active,
            boss_variant: world.boss_variant().filter(|_| world.boss_active),
            nuke_flash: world.nuke_flash_timer,
            boss_warning: (world.boss_warning_timer > 0).then_some(world.boss_warning_text),
            atmosphere: Atmosphere::at(world.frame_count, world.boss_active),
            displayed_gold: session.displayed_gold(),
            loadout: session.loadout(),
            leaderboard: session.leaderboard(),
            save_status: session.leaderboard().status.message(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStore;
    use crate::tuning::Tuning;

    #[test]
    fn test_atmosphere_by_minute() {
        assert_eq!(Atmosphere::at(0, false), Atmosphere::Day);
        assert_eq!(Atmosphere::at(3 * FRAMES_PER_MINUTE + 1, false), Atmosphere::Night);
        assert_eq!(Atmosphere::at(6 * FRAMES_PER_MINUTE + 1, false), Atmosphere::Snow);
        assert_eq!(Atmosphere::at(6 * FRAMES_PER_MINUTE + 1, true), Atmosphere::Night);
        assert_eq!(Atmosphere::at(10, true), Atmosphere::Night);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut session = Session::with_tuning(2, Tuning::default(), Box::new(MemoryStore::new()));
        session.start_game();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Playing);
        assert_eq!(snapshot.bands.len(), 45);
        assert!(snapshot.player_visible);

        let json = snapshot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["state"], "Playing");
        assert_eq!(value["player"]["lives"], 5);
        assert_eq!(value["atmosphere"], "Day");
    }
}
