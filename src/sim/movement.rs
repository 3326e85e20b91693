//! Movement stage of the tick
//!
//! Applies controls, burns fuel, scrolls the river and advances every moving
//! entity. Nothing here resolves contacts; it only marks entities that left
//! the play field.

use glam::Vec2;

use super::spawn;
use super::state::{
    BossVariant, Bullet, BulletOwner, BulletPattern, DeathCause, EnemyKind, GameEvent, WeaponType,
    World,
};
use super::terrain;
use crate::consts::*;
use crate::input::{Control, ControlState};

/// Player bullet speed (pixels/tick, upward)
const PLAYER_BULLET_SPEED: f32 = 12.0;
const PLAYER_BULLET_SIZE: Vec2 = Vec2::new(8.0, 16.0);
const HELIX_BULLET_SIZE: Vec2 = Vec2::new(10.0, 10.0);
const HELIX_AMPLITUDE: f32 = 20.0;
const HELIX_FREQUENCY: f32 = 0.05;

/// Regular enemy shot
const ENEMY_BULLET_SIZE: Vec2 = Vec2::new(6.0, 12.0);
const ENEMY_BULLET_SPEED: f32 = 5.0;
/// Extra downward speed of jets
const JET_DIVE_SPEED: f32 = 2.0;
/// Hostile craft turn around this far from the banks
const ENEMY_BANK_MARGIN: f32 = 20.0;

/// Height at which an entering boss settles
const BOSS_HOVER_Y: f32 = 80.0;
const BOSS_ENTRY_SPEED: f32 = 2.0;
const BOSS_SIDE_MARGIN: f32 = 20.0;

const PARTICLE_DECAY: f32 = 0.05;

/// Run the whole movement stage
pub fn advance(world: &mut World, controls: &ControlState, now_ms: f64) {
    move_player(world, controls);
    update_scroll_speed(world, controls);
    fire_weapon(world, controls, now_ms);
    burn_fuel(world);

    world.distance_traveled += world.scroll_speed;
    if let Some(band) = terrain::extend(world) {
        spawn::spawn_for_band(world, &band);
    }
    terrain::scroll(world);

    move_enemies(world);
    move_bullets(world);
    move_particles(world);
}

/// Strafe; right wins when both directions are held
pub fn move_player(world: &mut World, controls: &ControlState) {
    let mut dx = 0.0;
    if controls.is_held(Control::MoveLeft) {
        dx = -PLAYER_STRAFE_SPEED;
    }
    if controls.is_held(Control::MoveRight) {
        dx = PLAYER_STRAFE_SPEED;
    }
    world.player.pos.x += dx;
}

/// Throttle, brake, or relax toward the base speed
pub fn update_scroll_speed(world: &mut World, controls: &ControlState) {
    let tuning = &world.tuning;
    let base = tuning.base_scroll_speed;

    if controls.is_held(Control::ThrottleUp) {
        world.scroll_speed = (world.scroll_speed + tuning.throttle_step).min(tuning.max_scroll_speed());
    } else if controls.is_held(Control::ThrottleDown) {
        world.scroll_speed = (world.scroll_speed - tuning.throttle_step).max(tuning.min_scroll_speed());
    } else {
        // Two independent steps, so the speed can settle a hair off base
        if world.scroll_speed > base {
            world.scroll_speed -= tuning.scroll_relax_step;
        }
        if world.scroll_speed < base {
            world.scroll_speed += tuning.scroll_relax_step;
        }
    }
}

/// Fire a volley if the trigger is held and the wall-clock cooldown elapsed
pub fn fire_weapon(world: &mut World, controls: &ControlState, now_ms: f64) -> bool {
    if !controls.is_held(Control::Fire) {
        return false;
    }
    if let Some(last) = world.last_shot_ms {
        if now_ms - last <= world.tuning.fire_interval_ms {
            return false;
        }
    }

    let px = world.player.pos.x + world.player.size.x / 2.0;
    let py = world.player.pos.y;
    let up = Vec2::new(0.0, -PLAYER_BULLET_SPEED);
    let shot = |x: f32, vel: Vec2| {
        Bullet::straight(BulletOwner::Player, Vec2::new(x, py), PLAYER_BULLET_SIZE, vel)
    };

    match world.player.weapon {
        WeaponType::Single => {
            world.bullets.push(shot(px - 4.0, up));
        }
        WeaponType::Double => {
            world.bullets.push(shot(px - 12.0, up));
            world.bullets.push(shot(px + 4.0, up));
        }
        WeaponType::Spread => {
            world.bullets.push(shot(px - 4.0, up));
            world.bullets.push(shot(px - 4.0, Vec2::new(-2.0, -10.0)));
            world.bullets.push(shot(px - 4.0, Vec2::new(2.0, -10.0)));
        }
        WeaponType::Helix => {
            let anchor_x = px - 4.0;
            for pattern in [
                BulletPattern::HelixLeft { anchor_x },
                BulletPattern::HelixRight { anchor_x },
            ] {
                world.bullets.push(Bullet {
                    pos: Vec2::new(anchor_x, py),
                    size: HELIX_BULLET_SIZE,
                    vel: Vec2::new(0.0, -10.0),
                    owner: BulletOwner::Player,
                    pattern,
                    marked_for_deletion: false,
                });
            }
        }
    }

    world.last_shot_ms = Some(now_ms);
    world.events.push(GameEvent::Shot);
    true
}

/// Burn fuel in proportion to the scroll speed; an empty tank costs a life
pub fn burn_fuel(world: &mut World) {
    let tuning = &world.tuning;
    world.player.fuel -=
        tuning.fuel_consumption * (world.scroll_speed / tuning.base_scroll_speed);
    if world.player.fuel <= 0.0 {
        world.player.fuel = 0.0;
        world.kill_player(DeathCause::FuelEmpty);
    }
}

/// Advance enemies, bosses and pickups; hostiles fire when their timers run out
pub fn move_enemies(world: &mut World) {
    let scroll = world.scroll_speed;
    let frame = world.frame_count;
    let can_fire = frame > world.tuning.enemy_fire_after_frames;
    let player_center_x = world.player.pos.x + world.player.size.x / 2.0;
    let boss_count = world.boss_count;
    let variant = BossVariant::for_count(boss_count);

    for enemy in world.enemies.iter_mut() {
        match enemy.kind {
            EnemyKind::Boss => {
                if enemy.pos.y < BOSS_HOVER_Y {
                    enemy.pos.y += BOSS_ENTRY_SPEED;
                } else {
                    enemy.pos.y = BOSS_HOVER_Y;
                    match variant {
                        BossVariant::Classic => enemy.pos.x += (frame as f32 * 0.05).sin() * 3.0,
                        BossVariant::Hunter => {
                            let target = player_center_x - enemy.size.x / 2.0;
                            enemy.pos.x += (target - enemy.pos.x) * 0.05;
                        }
                        BossVariant::Tank => enemy.pos.x += (frame as f32 * 0.02).sin() * 1.5,
                    }
                    let max_x = FIELD_WIDTH - enemy.size.x - BOSS_SIDE_MARGIN;
                    enemy.pos.x = enemy.pos.x.clamp(BOSS_SIDE_MARGIN, max_x);
                }

                enemy.shoot_timer -= 1.0;
                if enemy.shoot_timer <= 0.0 {
                    enemy.shoot_timer = spawn::boss_fire_period(boss_count, variant);
                    let bx = enemy.pos.x + enemy.size.x / 2.0 - 4.0;
                    let by = enemy.pos.y + enemy.size.y;
                    boss_volley(&mut world.bullets, variant, bx, by);
                }
            }
            EnemyKind::Kamikaze => {
                enemy.pos.y += enemy.vel.y + scroll;
            }
            kind => {
                enemy.pos.y += scroll;
                if kind == EnemyKind::Jet {
                    enemy.pos.y += JET_DIVE_SPEED;
                }
                enemy.pos.x += enemy.vel.x;

                if can_fire && matches!(kind, EnemyKind::Helicopter | EnemyKind::Jet) {
                    enemy.shoot_timer -= 1.0;
                    if enemy.shoot_timer <= 0.0 {
                        enemy.shoot_timer = world.rng.range(180.0, 240.0);
                        let pos = Vec2::new(
                            enemy.pos.x + enemy.size.x / 2.0 - 4.0,
                            enemy.pos.y + enemy.size.y,
                        );
                        world.bullets.push(Bullet::straight(
                            BulletOwner::Enemy,
                            pos,
                            ENEMY_BULLET_SIZE,
                            Vec2::new(0.0, ENEMY_BULLET_SPEED),
                        ));
                    }
                }
            }
        }

        if matches!(enemy.kind, EnemyKind::Helicopter | EnemyKind::Jet) {
            // Band lookup by top edge, exclusive on both ends
            let band = world
                .bands
                .iter()
                .find(|b| enemy.pos.y > b.y && enemy.pos.y < b.y + BAND_HEIGHT);
            if let Some(band) = band {
                let left = band.left_bank() + ENEMY_BANK_MARGIN;
                let right = band.right_bank() - ENEMY_BANK_MARGIN;
                if enemy.pos.x < left {
                    enemy.pos.x = left;
                    enemy.vel.x = enemy.vel.x.abs();
                }
                if enemy.pos.x + enemy.size.x > right {
                    enemy.pos.x = right - enemy.size.x;
                    enemy.vel.x = -enemy.vel.x.abs();
                }
            }
        }

        if enemy.kind != EnemyKind::Boss && enemy.pos.y > FIELD_HEIGHT {
            enemy.marked_for_deletion = true;
        }
    }
}

fn boss_volley(bullets: &mut Vec<Bullet>, variant: BossVariant, bx: f32, by: f32) {
    let enemy_shot = |x: f32, size: Vec2, vel: Vec2| {
        Bullet::straight(BulletOwner::Enemy, Vec2::new(x, by), size, vel)
    };

    match variant {
        BossVariant::Classic => {
            let size = Vec2::new(8.0, 16.0);
            for vel in [Vec2::new(0.0, 6.0), Vec2::new(-3.0, 5.0), Vec2::new(3.0, 5.0)] {
                bullets.push(enemy_shot(bx, size, vel));
            }
        }
        BossVariant::Hunter => {
            let size = Vec2::new(6.0, 14.0);
            bullets.push(enemy_shot(bx - 10.0, size, Vec2::new(0.0, 9.0)));
            bullets.push(enemy_shot(bx + 10.0, size, Vec2::new(0.0, 9.0)));
        }
        BossVariant::Tank => {
            let size = Vec2::new(10.0, 18.0);
            for vel in [
                Vec2::new(0.0, 5.0),
                Vec2::new(-2.0, 4.5),
                Vec2::new(2.0, 4.5),
                Vec2::new(-4.0, 4.0),
                Vec2::new(4.0, 4.0),
            ] {
                bullets.push(enemy_shot(bx, size, vel));
            }
        }
    }
}

/// Advance bullets; helix bullets weave around their anchor
pub fn move_bullets(world: &mut World) {
    for bullet in world.bullets.iter_mut() {
        match bullet.pattern {
            BulletPattern::Straight => bullet.pos.x += bullet.vel.x,
            BulletPattern::HelixLeft { anchor_x } => {
                bullet.pos.x = anchor_x + (bullet.pos.y * HELIX_FREQUENCY).sin() * HELIX_AMPLITUDE;
            }
            BulletPattern::HelixRight { anchor_x } => {
                bullet.pos.x = anchor_x - (bullet.pos.y * HELIX_FREQUENCY).sin() * HELIX_AMPLITUDE;
            }
        }
        bullet.pos.y += bullet.vel.y;

        let off_side = bullet.pos.x + bullet.size.x < 0.0 || bullet.pos.x > FIELD_WIDTH;
        if off_side || bullet.pos.y < 0.0 || bullet.pos.y > FIELD_HEIGHT {
            bullet.marked_for_deletion = true;
        }
    }
}

pub fn move_particles(world: &mut World) {
    for particle in world.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.life -= PARTICLE_DECAY;
        if particle.life <= 0.0 {
            particle.marked_for_deletion = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Enemy;
    use crate::tuning::Tuning;

    fn world() -> World {
        World::new(42, Tuning::default())
    }

    #[test]
    fn test_right_wins_over_left() {
        let mut w = world();
        let x0 = w.player.pos.x;
        move_player(&mut w, &ControlState::holding(&[Control::MoveLeft, Control::MoveRight]));
        assert_eq!(w.player.pos.x, x0 + 5.0);
    }

    #[test]
    fn test_throttle_clamps_and_relaxes() {
        let mut w = world();
        let up = ControlState::holding(&[Control::ThrottleUp]);
        for _ in 0..200 {
            update_scroll_speed(&mut w, &up);
        }
        assert!((w.scroll_speed - 7.5).abs() < 1e-4);

        let idle = ControlState::new();
        for _ in 0..200 {
            update_scroll_speed(&mut w, &idle);
        }
        assert!((w.scroll_speed - 3.0).abs() < 0.051);

        let down = ControlState::holding(&[Control::ThrottleDown]);
        for _ in 0..200 {
            update_scroll_speed(&mut w, &down);
        }
        assert!((w.scroll_speed - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut w = world();
        let fire = ControlState::holding(&[Control::Fire]);
        assert!(fire_weapon(&mut w, &fire, 1000.0));
        assert!(!fire_weapon(&mut w, &fire, 1150.0));
        assert!(!fire_weapon(&mut w, &fire, 1200.0));
        assert!(fire_weapon(&mut w, &fire, 1201.0));
        assert_eq!(w.bullets.len(), 2);
    }

    #[test]
    fn test_weapon_patterns() {
        let fire = ControlState::holding(&[Control::Fire]);
        let expected = [
            (WeaponType::Single, 1),
            (WeaponType::Double, 2),
            (WeaponType::Spread, 3),
            (WeaponType::Helix, 2),
        ];
        for (weapon, count) in expected {
            let mut w = world();
            w.player.weapon = weapon;
            fire_weapon(&mut w, &fire, 0.0);
            assert_eq!(w.bullets.len(), count, "{:?}", weapon);
            assert!(w.bullets.iter().all(|b| b.owner == BulletOwner::Player && b.vel.y < 0.0));
        }
    }

    #[test]
    fn test_helix_bullets_weave_around_anchor() {
        let mut w = world();
        w.player.weapon = WeaponType::Helix;
        fire_weapon(&mut w, &ControlState::holding(&[Control::Fire]), 0.0);
        for _ in 0..10 {
            move_bullets(&mut w);
        }
        let anchor = w.player.pos.x + 16.0 - 4.0;
        let (a, b) = (&w.bullets[0], &w.bullets[1]);
        assert!(((a.pos.x - anchor) + (b.pos.x - anchor)).abs() < 1e-3);
        assert!((a.pos.x - anchor).abs() <= HELIX_AMPLITUDE + 1e-3);
    }

    #[test]
    fn test_fuel_burn_scales_with_speed() {
        let mut w = world();
        w.scroll_speed = 6.0;
        burn_fuel(&mut w);
        assert!((w.player.fuel - (MAX_FUEL - 0.05)).abs() < 1e-4);
    }

    #[test]
    fn test_jet_bounces_off_bank() {
        let mut w = world();
        let band = w.bands[5];
        // Lands 5 px into the band after this tick's dive
        let y = band.y + 5.0 - w.scroll_speed - JET_DIVE_SPEED;
        w.enemies.push(Enemy::new(
            EnemyKind::Jet,
            Vec2::new(band.left_bank() + 21.0, y),
            Vec2::new(-3.0, 0.0),
            100.0,
            1,
        ));
        move_enemies(&mut w);
        let jet = &w.enemies[0];
        assert_eq!(jet.pos.x, band.left_bank() + ENEMY_BANK_MARGIN);
        assert_eq!(jet.vel.x, 3.0);
    }

    #[test]
    fn test_enemies_hold_fire_early() {
        let mut w = world();
        w.enemies.push(Enemy::new(
            EnemyKind::Helicopter,
            Vec2::new(300.0, 100.0),
            Vec2::ZERO,
            0.0,
            1,
        ));
        move_enemies(&mut w);
        assert!(w.bullets.is_empty());

        w.frame_count = 5401;
        move_enemies(&mut w);
        assert_eq!(w.bullets.len(), 1);
        assert!(w.bullets[0].is_enemy());
        assert!((180.0..240.0).contains(&w.enemies[0].shoot_timer));
    }

    #[test]
    fn test_boss_enters_then_hovers() {
        let mut w = world();
        spawn::spawn_boss(&mut w);
        for _ in 0..200 {
            move_enemies(&mut w);
        }
        let boss = w.enemies.iter().find(|e| e.kind == EnemyKind::Boss).unwrap();
        assert_eq!(boss.pos.y, 80.0);
        assert!(boss.pos.x >= 20.0 && boss.pos.x <= FIELD_WIDTH - boss.size.x - 20.0);
        assert!(w.bullets.iter().any(|b| b.is_enemy()));
    }

    #[test]
    fn test_offscreen_marking() {
        let mut w = world();
        w.enemies.push(Enemy::new(
            EnemyKind::FuelDepot,
            Vec2::new(300.0, FIELD_HEIGHT),
            Vec2::ZERO,
            100.0,
            1,
        ));
        w.bullets.push(Bullet::straight(
            BulletOwner::Player,
            Vec2::new(300.0, 5.0),
            PLAYER_BULLET_SIZE,
            Vec2::new(0.0, -12.0),
        ));
        move_enemies(&mut w);
        move_bullets(&mut w);
        assert!(w.enemies[0].marked_for_deletion);
        assert!(w.bullets[0].marked_for_deletion);
    }

    #[test]
    fn test_boss_never_despawns_offscreen() {
        let mut w = world();
        w.boss_count = 1;
        w.enemies.push(Enemy::new(
            EnemyKind::Boss,
            Vec2::new(260.0, FIELD_HEIGHT + 50.0),
            Vec2::ZERO,
            100.0,
            3,
        ));
        move_enemies(&mut w);
        assert!(!w.enemies[0].marked_for_deletion);
    }

    #[test]
    fn test_bullets_leaving_the_sides_are_marked() {
        let mut w = world();
        let size = Vec2::new(10.0, 18.0);
        w.bullets.push(Bullet::straight(
            BulletOwner::Enemy,
            Vec2::new(-8.0, 400.0),
            size,
            Vec2::new(-4.0, 4.0),
        ));
        w.bullets.push(Bullet::straight(
            BulletOwner::Enemy,
            Vec2::new(FIELD_WIDTH - 2.0, 400.0),
            size,
            Vec2::new(4.0, 4.0),
        ));
        w.bullets.push(Bullet::straight(
            BulletOwner::Enemy,
            Vec2::new(300.0, 400.0),
            size,
            Vec2::new(4.0, 4.0),
        ));
        move_bullets(&mut w);
        assert!(w.bullets[0].marked_for_deletion);
        assert!(w.bullets[1].marked_for_deletion);
        assert!(!w.bullets[2].marked_for_deletion);
    }

    #[test]
    fn test_kamikaze_dives_on_top_of_scroll() {
        let mut w = world();
        w.scroll_speed = 4.0;
        w.enemies.push(Enemy::new(
            EnemyKind::Kamikaze,
            Vec2::new(300.0, 100.0),
            Vec2::new(0.0, 8.0),
            100.0,
            1,
        ));
        move_enemies(&mut w);
        let kamikaze = &w.enemies[0];
        assert_eq!(kamikaze.pos, Vec2::new(300.0, 112.0));
    }

    /// Boss already hovering with its volley due on the next tick
    fn hovering_boss(boss_count: u32) -> World {
        let mut w = world();
        w.boss_count = boss_count;
        w.boss_active = true;
        w.enemies.push(Enemy::new(
            EnemyKind::Boss,
            Vec2::new(260.0, 80.0),
            Vec2::ZERO,
            1.0,
            3,
        ));
        w
    }

    #[test]
    fn test_hunter_tracks_player() {
        let mut w = hovering_boss(2);
        w.player.pos.x = 100.0;
        move_enemies(&mut w);
        let boss = &w.enemies[0];
        // Target is the boss x that centers it over the player
        let target = 116.0 - boss.size.x / 2.0;
        let expected = 260.0 + (target - 260.0) * 0.05;
        assert!((boss.pos.x - expected).abs() < 1e-3);
    }

    #[test]
    fn test_boss_volley_shapes() {
        // Classic 3-way, Hunter 2 fast, Tank 5-way
        for (boss_count, shots, fastest) in [(1, 3, 6.0), (2, 2, 9.0), (3, 5, 5.0)] {
            let mut w = hovering_boss(boss_count);
            move_enemies(&mut w);
            assert_eq!(w.bullets.len(), shots, "boss {}", boss_count);
            assert!(w.bullets.iter().all(|b| b.is_enemy() && b.vel.y > 0.0));
            let top_speed = w.bullets.iter().map(|b| b.vel.y).fold(0.0, f32::max);
            assert_eq!(top_speed, fastest);
            let variant = BossVariant::for_count(boss_count);
            assert_eq!(
                w.enemies[0].shoot_timer,
                spawn::boss_fire_period(boss_count, variant)
            );
        }
    }

    #[test]
    fn test_hunter_shots_fall_straight() {
        let mut w = hovering_boss(2);
        move_enemies(&mut w);
        assert!(w.bullets.iter().all(|b| b.vel.x == 0.0));
        assert!((w.bullets[1].pos.x - w.bullets[0].pos.x - 20.0).abs() < 1e-3);
    }
}
