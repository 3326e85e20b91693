//! World state and core simulation types
//!
//! Everything one tick reads or writes lives in `World`, which is owned by the
//! session and passed by `&mut` into each stage of the tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use super::terrain;
use crate::consts::*;
use crate::tuning::Tuning;

/// Axis-aligned bounding box (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Strict overlap test (touching edges do not overlap)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.pos.x < other.pos.x + other.size.x
            && self.pos.x + self.size.x > other.pos.x
            && self.pos.y < other.pos.y + other.size.y
            && self.pos.y + self.size.y > other.pos.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// One horizontal slice of river
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiverBand {
    pub y: f32,
    pub center_x: f32,
    pub width: f32,
}

impl RiverBand {
    #[inline]
    pub fn left_bank(&self) -> f32 {
        self.center_x - self.width / 2.0
    }

    #[inline]
    pub fn right_bank(&self) -> f32 {
        self.center_x + self.width / 2.0
    }

    /// Whether a horizontal span lies fully on the water
    #[inline]
    pub fn contains_span(&self, x: f32, width: f32) -> bool {
        x >= self.left_bank() && x + width <= self.right_bank()
    }
}

/// Bank decoration types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorationKind {
    Tree,
    House,
}

/// Cosmetic bank object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decoration {
    pub pos: Vec2,
    pub kind: DecorationKind,
    pub variant: u8,
    pub marked_for_deletion: bool,
}

/// Player weapon types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponType {
    #[default]
    Single,
    Double,
    Helix,
    Spread,
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub fuel: f32,
    pub lives: u32,
    pub score: u64,
    /// Gold earned this run (banked at game over)
    pub gold: u64,
    pub invulnerable: bool,
    /// Ticks of invulnerability remaining
    pub invulnerable_timer: u32,
    pub weapon: WeaponType,
    pub nukes: u32,
}

impl Player {
    pub fn new(lives: u32) -> Self {
        Self {
            pos: crate::player_start(),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            fuel: MAX_FUEL,
            lives,
            score: 0,
            gold: 0,
            invulnerable: false,
            invulnerable_timer: 0,
            weapon: WeaponType::Single,
            nukes: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Start (or extend) an invulnerability window
    pub fn grant_invulnerability(&mut self, frames: u32) {
        self.invulnerable = true;
        self.invulnerable_timer = frames;
    }

    /// Add fuel, clamped to the tank size
    pub fn refuel(&mut self, amount: f32) {
        self.fuel = (self.fuel + amount).min(MAX_FUEL);
    }
}

/// Enemy and pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Ship,
    Helicopter,
    Jet,
    /// Dives at its own speed on top of the current
    Kamikaze,
    /// Refuels on contact, never consumed by touch
    FuelDepot,
    Bridge,
    LifeOrb,
    GoldCoin,
    Boss,
    ShieldItem,
    WeaponItem(WeaponType),
}

impl EnemyKind {
    /// Collected on contact; player bullets pass through
    pub fn is_pickup(&self) -> bool {
        matches!(
            self,
            EnemyKind::GoldCoin
                | EnemyKind::LifeOrb
                | EnemyKind::ShieldItem
                | EnemyKind::WeaponItem(_)
        )
    }

    /// Kills the player on contact
    pub fn is_hostile(&self) -> bool {
        matches!(
            self,
            EnemyKind::Ship
                | EnemyKind::Helicopter
                | EnemyKind::Jet
                | EnemyKind::Kamikaze
                | EnemyKind::Boss
        )
    }

    /// Score for destroying one
    pub fn kill_score(&self) -> u64 {
        match self {
            EnemyKind::Bridge => 500,
            EnemyKind::FuelDepot => 80,
            EnemyKind::Boss => 2000,
            EnemyKind::Kamikaze => 300,
            _ => 100,
        }
    }

    /// Bounding box size
    pub fn size(&self) -> Vec2 {
        match self {
            EnemyKind::FuelDepot => Vec2::new(24.0, 48.0),
            EnemyKind::Boss => Vec2::new(80.0, 60.0),
            _ => Vec2::new(32.0, 32.0),
        }
    }
}

/// An enemy or pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// Ticks until the next shot
    pub shoot_timer: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub marked_for_deletion: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2, vel: Vec2, shoot_timer: f32, hp: i32) -> Self {
        Self {
            kind,
            pos,
            size: kind.size(),
            vel,
            shoot_timer,
            hp,
            max_hp: hp,
            marked_for_deletion: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// Bullet flight path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BulletPattern {
    Straight,
    /// x follows `anchor_x + sin(y * 0.05) * 20`
    HelixLeft { anchor_x: f32 },
    /// x follows `anchor_x - sin(y * 0.05) * 20`
    HelixRight { anchor_x: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub owner: BulletOwner,
    pub pattern: BulletPattern,
    pub marked_for_deletion: bool,
}

impl Bullet {
    pub fn straight(owner: BulletOwner, pos: Vec2, size: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            size,
            vel,
            owner,
            pattern: BulletPattern::Straight,
            marked_for_deletion: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn is_enemy(&self) -> bool {
        self.owner == BulletOwner::Enemy
    }
}

/// Particle palette (mapped to real colors by the renderer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleColor {
    Orange,
    Red,
    White,
    Gray,
    Purple,
    Yellow,
    Lime,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: ParticleColor,
    pub life: f32, // 1.0 at birth, removed at 0
    pub size: f32,
    pub marked_for_deletion: bool,
}

/// Boss behaviour, cycling with each boss spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossVariant {
    /// Sinusoidal drift, 3-way volley
    Classic,
    /// Tracks the player, fast 2-bullet volley
    Hunter,
    /// Slow drift, slow 5-way spread
    Tank,
}

impl BossVariant {
    /// Variant for the n-th boss (1-based)
    pub fn for_count(boss_count: u32) -> Self {
        match boss_count.saturating_sub(1) % 3 {
            0 => BossVariant::Classic,
            1 => BossVariant::Hunter,
            _ => BossVariant::Tank,
        }
    }
}

/// Why the player lost a life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    FuelEmpty,
    CrashedIntoLand,
    CrashedIntoEnemy,
    ShotByEnemy,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::FuelEmpty => "Fuel Empty",
            DeathCause::CrashedIntoLand => "Crashed into land",
            DeathCause::CrashedIntoEnemy => "Crashed into enemy",
            DeathCause::ShotByEnemy => "Shot by Enemy",
        }
    }
}

/// Things that happened during a tick (sound and HUD cues)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Shot,
    Explosion,
    FuelRefill,
    CoinCollected,
    LifeGained,
    PowerUp,
    WeaponPickedUp(WeaponType),
    ShieldPickedUp,
    BossSpawned(BossVariant),
    BossDefeated,
    NukeDetonated,
    CheatActivated,
    LifeLost { cause: DeathCause, lives_left: u32 },
    GameOver { cause: DeathCause },
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    pub rng: SimRng,
    pub player: Player,
    /// Oldest first; the newest band has the smallest y
    pub bands: Vec<RiverBand>,
    pub decorations: Vec<Decoration>,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub particles: Vec<Particle>,
    /// Simulation tick counter
    pub frame_count: u64,
    pub scroll_speed: f32,
    pub distance_traveled: f32,
    pub boss_active: bool,
    pub boss_count: u32,
    /// Wall-clock time of the last player volley
    pub last_shot_ms: Option<f64>,
    pub nuke_flash_timer: u32,
    pub boss_warning_timer: u32,
    pub boss_warning_text: &'static str,
    /// Set once the last life is lost
    pub game_over: Option<DeathCause>,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
}

impl World {
    /// Create a world with a freshly seeded river
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut world = Self {
            rng: SimRng::new(seed),
            player: Player::new(tuning.starting_lives),
            bands: Vec::new(),
            decorations: Vec::new(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            particles: Vec::new(),
            frame_count: 0,
            scroll_speed: tuning.base_scroll_speed,
            distance_traveled: 0.0,
            boss_active: false,
            boss_count: 0,
            last_shot_ms: None,
            nuke_flash_timer: 0,
            boss_warning_timer: 0,
            boss_warning_text: "",
            game_over: None,
            events: Vec::new(),
            tuning,
        };
        terrain::seed_river(&mut world);
        world
    }

    /// Variant of the current (or most recent) boss
    pub fn boss_variant(&self) -> Option<BossVariant> {
        (self.boss_count > 0).then(|| BossVariant::for_count(self.boss_count))
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    /// Drain events raised since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Burst of particles around a point
    pub fn create_explosion(&mut self, pos: Vec2, color: ParticleColor, count: u32) {
        for _ in 0..count {
            let vel = Vec2::new(
                (self.rng.next_f32() - 0.5) * 10.0,
                (self.rng.next_f32() - 0.5) * 10.0,
            );
            let size = self.rng.next_f32() * 4.0 + 2.0;
            self.particles.push(Particle {
                pos,
                vel,
                color,
                life: 1.0,
                size,
                marked_for_deletion: false,
            });
        }
        self.events.push(GameEvent::Explosion);
    }

    /// Lose a life, or end the run on the last one.
    ///
    /// Further deaths after the run ended (later checks in the same tick) are
    /// ignored so the run is only finalized once.
    pub fn kill_player(&mut self, cause: DeathCause) {
        if self.game_over.is_some() {
            return;
        }

        if self.player.lives > 1 {
            self.player.lives -= 1;
            log::debug!("Life lost: {} ({} left)", cause.as_str(), self.player.lives);

            self.player.pos = crate::player_start();
            self.player.fuel = MAX_FUEL;
            self.player
                .grant_invulnerability(self.tuning.respawn_invulnerable_frames);

            // Clear every bullet in flight; removed at the end of the tick
            for bullet in &mut self.bullets {
                bullet.marked_for_deletion = true;
            }

            self.create_explosion(self.player.pos, ParticleColor::Yellow, 20);
            self.events.push(GameEvent::LifeLost {
                cause,
                lives_left: self.player.lives,
            });
            return;
        }

        log::info!(
            "Game over: {} (score {}, frame {})",
            cause.as_str(),
            self.player.score,
            self.frame_count
        );
        self.player.lives = 0;
        self.game_over = Some(cause);
        self.events.push(GameEvent::GameOver { cause });
    }

    /// Drop everything marked for deletion this tick
    pub fn remove_marked(&mut self) {
        self.enemies.retain(|e| !e.marked_for_deletion);
        self.bullets.retain(|b| !b.marked_for_deletion);
        self.particles.retain(|p| !p.marked_for_deletion);
        self.decorations.retain(|d| !d.marked_for_deletion);
    }
}
