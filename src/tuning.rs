//! Game balance parameters
//!
//! Every number that shapes difficulty or the economy lives here so a run can
//! be re-balanced from JSON without touching simulation code. Defaults match
//! the shipped balance.

use serde::{Deserialize, Serialize};

use crate::platform::storage::KeyValueStore;

/// Shop prices in gold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopPrices {
    pub fuel: u64,
    pub weapon_double: u64,
    pub weapon_helix: u64,
    pub weapon_spread: u64,
    pub life: u64,
    pub shield: u64,
    pub nuke: u64,
}

impl Default for ShopPrices {
    fn default() -> Self {
        Self {
            fuel: 10,
            weapon_double: 15,
            weapon_helix: 25,
            weapon_spread: 30,
            life: 50,
            shield: 15,
            nuke: 20,
        }
    }
}

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Scrolling ===
    /// Scroll speed the river relaxes back to (pixels/tick)
    pub base_scroll_speed: f32,
    /// Throttle-up ceiling as a multiple of the base speed
    pub max_scroll_factor: f32,
    /// Throttle-down floor as a multiple of the base speed
    pub min_scroll_factor: f32,
    /// Speed change per tick while a throttle control is held
    pub throttle_step: f32,
    /// Speed change per tick while relaxing toward the base speed
    pub scroll_relax_step: f32,

    // === Fuel ===
    /// Fuel burned per tick at base speed (scales with scroll speed)
    pub fuel_consumption: f32,
    /// Fuel gained per tick while overlapping a depot
    pub fuel_refill_rate: f32,

    // === Player ===
    pub starting_lives: u32,
    /// Invulnerability after losing a life (ticks)
    pub respawn_invulnerable_frames: u32,
    /// Invulnerability granted by a shield (ticks)
    pub shield_frames: u32,
    /// Minimum wall-clock gap between volleys (ms)
    pub fire_interval_ms: f64,

    // === Spawning ===
    pub spawn_base_chance: f64,
    /// Multiplier applied once per difficulty step
    pub spawn_growth: f64,
    /// Ticks per difficulty step
    pub spawn_step_frames: u64,
    /// Ceiling on the per-band spawn chance
    pub spawn_max_chance: f64,
    /// Factor applied to the spawn chance while a boss is on screen
    pub boss_spawn_residual: f64,
    /// Bands narrower than this never receive hostile craft
    pub narrow_band_width: f32,
    /// Regular enemies hold fire until this many ticks have elapsed
    pub enemy_fire_after_frames: u64,

    // === Bosses ===
    /// A boss is due on every multiple of this tick count
    pub boss_interval_frames: u64,
    pub boss_base_hp: i32,
    pub boss_hp_per_level: i32,
    pub boss_gold: u64,
    /// HP removed from a boss by one nuke
    pub nuke_boss_damage: i32,

    // === Economy ===
    pub coin_gold: u64,
    pub prices: ShopPrices,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_scroll_speed: 3.0,
            max_scroll_factor: 2.5,
            min_scroll_factor: 0.5,
            throttle_step: 0.1,
            scroll_relax_step: 0.05,

            fuel_consumption: 0.025,
            fuel_refill_rate: 1.2,

            starting_lives: 5,
            respawn_invulnerable_frames: 180,
            shield_frames: 900,
            fire_interval_ms: 200.0,

            spawn_base_chance: 0.05,
            spawn_growth: 1.10,
            spawn_step_frames: 900,
            spawn_max_chance: 0.70,
            boss_spawn_residual: 0.1,
            narrow_band_width: 350.0,
            enemy_fire_after_frames: 5400,

            boss_interval_frames: crate::consts::FRAMES_PER_MINUTE,
            boss_base_hp: 3,
            boss_hp_per_level: 2,
            boss_gold: 25,
            nuke_boss_damage: 5,

            coin_gold: 1,
            prices: ShopPrices::default(),
        }
    }
}

impl Tuning {
    /// Storage key for tuning overrides
    pub const STORAGE_KEY: &'static str = "riverRaidTuning";

    /// Highest scroll speed reachable with the throttle
    pub fn max_scroll_speed(&self) -> f32 {
        self.base_scroll_speed * self.max_scroll_factor
    }

    /// Lowest scroll speed reachable with the brake
    pub fn min_scroll_speed(&self) -> f32 {
        self.base_scroll_speed * self.min_scroll_factor
    }

    /// Parse tuning from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load tuning overrides from a store, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning overrides");
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring malformed tuning: {}", e);
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Tuning unavailable ({}), using defaults", e);
                Self::default()
            }
        }
    }
}
