//! Enemy, pickup and boss spawning
//!
//! One spawn roll happens per new river band. Difficulty rises in steps: the
//! per-band chance grows geometrically every `spawn_step_frames` up to a cap.

use glam::Vec2;

use super::rng::SimRng;
use super::state::{BossVariant, Enemy, EnemyKind, GameEvent, RiverBand, WeaponType, World};
use crate::consts::*;
use crate::tuning::Tuning;

/// Taunts shown while a boss enters
pub const BOSS_WARNINGS: [&str; 5] = [
    "DEATH CALLS YOU!",
    "NO ESCAPE!",
    "THE END IS HERE!",
    "NIGHTMARE BEGINS!",
    "YOUR SOUL IS MINE!",
];

/// Ticks the boss warning banner stays up
pub const BOSS_WARNING_FRAMES: u32 = 180;

/// Spawned enemies keep this distance from either bank
const SPAWN_BANK_INSET: f32 = 40.0;

/// Per-band spawn chance at `frame_count`, before the boss residual
pub fn spawn_chance(tuning: &Tuning, frame_count: u64) -> f64 {
    let step = if tuning.spawn_step_frames == 0 {
        0
    } else {
        frame_count / tuning.spawn_step_frames
    };
    let step = step.min(i32::MAX as u64) as i32;
    (tuning.spawn_base_chance * tuning.spawn_growth.powi(step)).min(tuning.spawn_max_chance)
}

/// Pick what a successful spawn roll produces.
///
/// Hostile craft rolled for a narrow band are dropped, not re-rolled.
pub fn roll_kind(rng: &mut SimRng, narrow: bool) -> Option<EnemyKind> {
    let roll = rng.next_f64();
    let kind = if roll < 0.12 {
        EnemyKind::FuelDepot
    } else if roll < 0.16 {
        EnemyKind::GoldCoin
    } else if roll < 0.18 {
        EnemyKind::LifeOrb
    } else if roll < 0.19 {
        EnemyKind::ShieldItem
    } else if roll < 0.21 {
        let weapon_roll = rng.next_f64();
        let weapon = if weapon_roll < 0.4 {
            WeaponType::Double
        } else if weapon_roll < 0.7 {
            WeaponType::Spread
        } else {
            WeaponType::Helix
        };
        EnemyKind::WeaponItem(weapon)
    } else if roll < 0.60 {
        return None;
    } else if roll < 0.80 {
        EnemyKind::Helicopter
    } else if roll < 0.95 {
        EnemyKind::Jet
    } else {
        EnemyKind::Kamikaze
    };

    if narrow && kind.is_hostile() {
        return None;
    }
    Some(kind)
}

/// Roll for an enemy or pickup above `band`, at height `y`
pub fn try_spawn(
    band: &RiverBand,
    y: f32,
    frame_count: u64,
    boss_active: bool,
    tuning: &Tuning,
    rng: &mut SimRng,
) -> Option<Enemy> {
    let mut chance = spawn_chance(tuning, frame_count);
    if boss_active {
        chance *= tuning.boss_spawn_residual;
    }
    if !rng.chance(chance) {
        return None;
    }

    let min_x = band.left_bank() + SPAWN_BANK_INSET;
    let max_x = band.right_bank() - SPAWN_BANK_INSET;
    let x = rng.range(min_x, max_x);

    let kind = roll_kind(rng, band.width < tuning.narrow_band_width)?;

    let vel = match kind {
        EnemyKind::Helicopter => Vec2::new(2.0 * rng.sign(), 0.0),
        EnemyKind::Jet => Vec2::new(3.0 * rng.sign(), 0.0),
        EnemyKind::Kamikaze => Vec2::new(0.0, 8.0),
        _ => Vec2::ZERO,
    };
    let shoot_timer = rng.range(60.0, 180.0);

    Some(Enemy::new(kind, Vec2::new(x, y), vel, shoot_timer, 1))
}

/// Spawn roll for a freshly generated band
pub fn spawn_for_band(world: &mut World, band: &RiverBand) {
    let y = band.y - 50.0;
    if let Some(enemy) = try_spawn(
        band,
        y,
        world.frame_count,
        world.boss_active,
        &world.tuning,
        &mut world.rng,
    ) {
        log::trace!("Spawned {:?} at ({:.0}, {:.0})", enemy.kind, enemy.pos.x, enemy.pos.y);
        world.enemies.push(enemy);
    }
}

/// Ticks between boss volleys for the n-th boss
pub fn boss_fire_period(boss_count: u32, variant: BossVariant) -> f32 {
    let base = 90.0_f32 - boss_count as f32 * 5.0;
    let base = base.max(30.0);
    match variant {
        BossVariant::Classic => base,
        BossVariant::Hunter => base * 0.7,
        BossVariant::Tank => base * 1.3,
    }
}

/// Bring in the next boss. No-op while one is already on screen.
pub fn spawn_boss(world: &mut World) -> bool {
    if world.boss_active {
        return false;
    }

    world.boss_active = true;
    world.boss_count += 1;
    let variant = BossVariant::for_count(world.boss_count);

    world.boss_warning_timer = BOSS_WARNING_FRAMES;
    world.boss_warning_text = BOSS_WARNINGS[world.rng.index(BOSS_WARNINGS.len())];

    let hp = world.tuning.boss_base_hp
        + (world.boss_count as i32 - 1) * world.tuning.boss_hp_per_level;
    let size = EnemyKind::Boss.size();
    let pos = Vec2::new(FIELD_WIDTH / 2.0 - size.x / 2.0, -100.0);
    let period = boss_fire_period(world.boss_count, variant);

    world
        .enemies
        .push(Enemy::new(EnemyKind::Boss, pos, Vec2::new(2.0, 0.0), period, hp));
    world.events.push(GameEvent::BossSpawned(variant));

    log::info!(
        "Boss #{} ({:?}) spawned with {} hp at frame {}",
        world.boss_count,
        variant,
        hp,
        world.frame_count
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wide_band() -> RiverBand {
        RiverBand {
            y: -20.0,
            center_x: 300.0,
            width: 500.0,
        }
    }

    #[test]
    fn test_spawn_chance_steps() {
        let tuning = Tuning::default();
        assert!((spawn_chance(&tuning, 0) - 0.05).abs() < 1e-12);
        assert!((spawn_chance(&tuning, 899) - 0.05).abs() < 1e-12);
        assert!((spawn_chance(&tuning, 900) - 0.055).abs() < 1e-12);
        assert_eq!(spawn_chance(&tuning, 1_000_000), 0.70);
    }

    #[test]
    fn test_narrow_band_drops_hostiles() {
        let mut rng = SimRng::new(11);
        for _ in 0..2000 {
            if let Some(kind) = roll_kind(&mut rng, true) {
                assert!(!kind.is_hostile());
            }
        }
    }

    #[test]
    fn test_spawned_enemies_stay_off_banks() {
        let tuning = Tuning {
            spawn_base_chance: 1.0,
            spawn_max_chance: 1.0,
            ..Tuning::default()
        };
        let band = wide_band();
        let mut rng = SimRng::new(2);
        let mut spawned = 0;
        for _ in 0..500 {
            if let Some(e) = try_spawn(&band, -70.0, 0, false, &tuning, &mut rng) {
                spawned += 1;
                assert!(e.pos.x >= band.left_bank() + 40.0);
                assert!(e.pos.x < band.right_bank() - 40.0);
                assert_eq!(e.pos.y, -70.0);
                assert!((60.0..180.0).contains(&e.shoot_timer));
                match e.kind {
                    EnemyKind::Helicopter => assert_eq!(e.vel.x.abs(), 2.0),
                    EnemyKind::Jet => assert_eq!(e.vel.x.abs(), 3.0),
                    EnemyKind::Kamikaze => assert_eq!(e.vel.y, 8.0),
                    EnemyKind::FuelDepot => assert_eq!(e.size, Vec2::new(24.0, 48.0)),
                    _ => assert_eq!(e.size, Vec2::new(32.0, 32.0)),
                }
            }
        }
        assert!(spawned > 0);
    }

    #[test]
    fn test_boss_spawn_is_noop_while_active() {
        let mut world = World::new(1, Tuning::default());
        assert!(spawn_boss(&mut world));
        assert!(!spawn_boss(&mut world));
        assert_eq!(world.boss_count, 1);
        let bosses: Vec<_> = world
            .enemies
            .iter()
            .filter(|e| e.kind == EnemyKind::Boss)
            .collect();
        assert_eq!(bosses.len(), 1);
        assert_eq!(bosses[0].hp, 3);
        assert_eq!(bosses[0].pos, Vec2::new(260.0, -100.0));
        assert!(BOSS_WARNINGS.contains(&world.boss_warning_text));
        assert_eq!(world.boss_warning_timer, BOSS_WARNING_FRAMES);
    }

    #[test]
    fn test_boss_scaling() {
        let mut world = World::new(1, Tuning::default());
        world.boss_count = 2;
        spawn_boss(&mut world);
        let boss = world.enemies.last().unwrap();
        assert_eq!(boss.hp, 7);
        assert_eq!(world.boss_variant(), Some(BossVariant::Tank));
        assert!((boss.shoot_timer - 75.0 * 1.3).abs() < 1e-4);
        assert_eq!(boss_fire_period(20, BossVariant::Classic), 30.0);
    }

    proptest! {
        #[test]
        fn spawn_chance_monotonic_and_capped(a in 0u64..2_000_000, b in 0u64..2_000_000) {
            let tuning = Tuning::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(spawn_chance(&tuning, lo) <= spawn_chance(&tuning, hi));
            prop_assert!(spawn_chance(&tuning, hi) <= tuning.spawn_max_chance);
        }
    }
}
