//! Collision detection and resolution
//!
//! Runs once per tick after movement, in a fixed order: river banks, player
//! contacts, bullet-vs-bullet, enemy fire, player fire. Destroyed entities are
//! only marked here; the tick filters them afterwards.

use super::state::{DeathCause, EnemyKind, GameEvent, ParticleColor, World};
use super::terrain;

/// Ticks the screen flashes white after a nuke
pub const NUKE_FLASH_FRAMES: u32 = 10;

/// Score for picking up a gold coin
pub const COIN_SCORE: u64 = 500;

/// Resolve every contact for this tick
pub fn resolve(world: &mut World) {
    check_river_banks(world);
    resolve_player_contacts(world);
    neutralize_bullets(world);
    resolve_enemy_fire(world);
    resolve_player_fire(world);
}

/// Crash the player if their craft sticks out of the band under its center
pub fn check_river_banks(world: &mut World) {
    if world.player.invulnerable {
        return;
    }

    let rect = world.player.rect();
    let center_y = rect.center().y;
    match terrain::band_at(&world.bands, center_y) {
        Some(band) => {
            if !band.contains_span(rect.pos.x, rect.size.x) {
                world.kill_player(DeathCause::CrashedIntoLand);
            }
        }
        None => {
            log::warn!(
                "No river band under the player at y={:.1} (frame {})",
                center_y,
                world.frame_count
            );
        }
    }
}

/// Player touching enemies and pickups
pub fn resolve_player_contacts(world: &mut World) {
    for i in 0..world.enemies.len() {
        let enemy = &world.enemies[i];
        if enemy.marked_for_deletion || !world.player.rect().overlaps(&enemy.rect()) {
            continue;
        }
        let kind = enemy.kind;
        let pos = enemy.pos;

        match kind {
            EnemyKind::FuelDepot => {
                world.player.refuel(world.tuning.fuel_refill_rate);
                world.events.push(GameEvent::FuelRefill);
            }
            EnemyKind::GoldCoin => {
                world.player.score += COIN_SCORE;
                world.player.gold += world.tuning.coin_gold;
                world.enemies[i].marked_for_deletion = true;
                world.events.push(GameEvent::CoinCollected);
            }
            EnemyKind::LifeOrb => {
                world.player.lives += 1;
                world.enemies[i].marked_for_deletion = true;
                world.events.push(GameEvent::LifeGained);
            }
            EnemyKind::ShieldItem => {
                world.player.grant_invulnerability(world.tuning.shield_frames);
                world.enemies[i].marked_for_deletion = true;
                world.events.push(GameEvent::PowerUp);
                world.events.push(GameEvent::ShieldPickedUp);
            }
            EnemyKind::WeaponItem(weapon) => {
                world.player.weapon = weapon;
                world.enemies[i].marked_for_deletion = true;
                world.events.push(GameEvent::PowerUp);
                world.events.push(GameEvent::WeaponPickedUp(weapon));
            }
            EnemyKind::Bridge => {}
            EnemyKind::Ship
            | EnemyKind::Helicopter
            | EnemyKind::Jet
            | EnemyKind::Kamikaze
            | EnemyKind::Boss => {
                if !world.player.invulnerable {
                    world.kill_player(DeathCause::CrashedIntoEnemy);
                }
                // Bosses survive ramming
                if kind != EnemyKind::Boss {
                    world.enemies[i].marked_for_deletion = true;
                    world.create_explosion(pos, ParticleColor::Orange, 10);
                }
            }
        }
    }
}

/// Enemy and player bullets cancel each other out
pub fn neutralize_bullets(world: &mut World) {
    for i in 0..world.bullets.len() {
        let enemy_bullet = &world.bullets[i];
        if !enemy_bullet.is_enemy() || enemy_bullet.marked_for_deletion {
            continue;
        }
        let rect = enemy_bullet.rect();

        let hit = world.bullets.iter().position(|b| {
            !b.is_enemy() && !b.marked_for_deletion && b.rect().overlaps(&rect)
        });
        if let Some(j) = hit {
            world.bullets[i].marked_for_deletion = true;
            world.bullets[j].marked_for_deletion = true;
            world.create_explosion(rect.pos, ParticleColor::Gray, 3);
        }
    }
}

/// Enemy bullets hitting the player
pub fn resolve_enemy_fire(world: &mut World) {
    for i in 0..world.bullets.len() {
        let bullet = &world.bullets[i];
        if !bullet.is_enemy() || bullet.marked_for_deletion {
            continue;
        }
        if world.player.invulnerable || !bullet.rect().overlaps(&world.player.rect()) {
            continue;
        }
        world.bullets[i].marked_for_deletion = true;
        world.kill_player(DeathCause::ShotByEnemy);
    }
}

/// Player bullets hitting enemies. Each bullet damages at most one enemy.
pub fn resolve_player_fire(world: &mut World) {
    for bi in 0..world.bullets.len() {
        let bullet = &world.bullets[bi];
        if bullet.is_enemy() || bullet.marked_for_deletion {
            continue;
        }
        let bullet_rect = bullet.rect();

        let target = world.enemies.iter().position(|e| {
            !e.marked_for_deletion && !e.kind.is_pickup() && e.rect().overlaps(&bullet_rect)
        });
        let Some(ei) = target else { continue };

        world.bullets[bi].marked_for_deletion = true;
        world.enemies[ei].hp -= 1;
        if world.enemies[ei].hp <= 0 {
            destroy_enemy(world, ei);
        } else {
            let center = world.enemies[ei].rect().center();
            world.create_explosion(center, ParticleColor::Yellow, 2);
        }
    }
}

/// Mark an enemy destroyed by gunfire and pay out its reward
pub fn destroy_enemy(world: &mut World, index: usize) {
    let enemy = &mut world.enemies[index];
    enemy.marked_for_deletion = true;
    let kind = enemy.kind;
    let rect = enemy.rect();

    match kind {
        EnemyKind::Boss => {
            defeat_boss(world, rect.center(), 100);
            return;
        }
        EnemyKind::Bridge => world.create_explosion(rect.center(), ParticleColor::Gray, 30),
        EnemyKind::FuelDepot => world.create_explosion(rect.pos, ParticleColor::Red, 15),
        EnemyKind::Kamikaze => world.create_explosion(rect.pos, ParticleColor::White, 15),
        _ => world.create_explosion(rect.pos, ParticleColor::Orange, 10),
    }
    world.player.score += kind.kill_score();
}

fn defeat_boss(world: &mut World, center: glam::Vec2, particles: u32) {
    world.player.score += EnemyKind::Boss.kill_score();
    world.player.gold += world.tuning.boss_gold;
    world.boss_active = false;
    world.create_explosion(center, ParticleColor::Purple, particles);
    world.events.push(GameEvent::BossDefeated);
    log::info!(
        "Boss #{} defeated at frame {} (score {})",
        world.boss_count,
        world.frame_count,
        world.player.score
    );
}

/// Detonate a nuke from the player's stock.
///
/// Bosses lose `nuke_boss_damage` hp; every other hostile craft is destroyed
/// with its kill score. Pickups, fuel depots and bridges are untouched.
/// Returns false (and does nothing) with an empty stock.
pub fn activate_nuke(world: &mut World) -> bool {
    if world.player.nukes == 0 {
        return false;
    }
    world.player.nukes -= 1;

    for i in 0..world.enemies.len() {
        let enemy = &mut world.enemies[i];
        if enemy.marked_for_deletion || !enemy.kind.is_hostile() {
            continue;
        }
        let center = enemy.rect().center();

        if enemy.kind == EnemyKind::Boss {
            enemy.hp -= world.tuning.nuke_boss_damage;
            if enemy.hp <= 0 {
                enemy.marked_for_deletion = true;
                defeat_boss(world, center, 50);
            }
        } else {
            enemy.hp = 0;
            enemy.marked_for_deletion = true;
            let score = enemy.kind.kill_score();
            world.player.score += score;
            world.create_explosion(center, ParticleColor::White, 20);
        }
    }

    world.nuke_flash_timer = NUKE_FLASH_FRAMES;
    world.events.push(GameEvent::NukeDetonated);
    log::debug!("Nuke detonated, {} left", world.player.nukes);
    true
}
