//! Fixed timestep simulation tick
//!
//! One call advances the world by exactly one logical step: timers, movement,
//! collision resolution, then removal of everything marked for deletion.

use super::state::World;
use super::{collision, movement, spawn};
use crate::input::ControlState;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Controls held during this tick
    pub controls: ControlState,
    /// Wall-clock time, only used to rate-limit weapon fire
    pub now_ms: f64,
}

/// Advance the world by one step. Does nothing once the run is over.
pub fn tick(world: &mut World, input: &TickInput) {
    if world.is_over() {
        return;
    }

    world.frame_count += 1;

    let interval = world.tuning.boss_interval_frames;
    if interval > 0 && world.frame_count % interval == 0 {
        spawn::spawn_boss(world);
    }

    world.nuke_flash_timer = world.nuke_flash_timer.saturating_sub(1);
    world.boss_warning_timer = world.boss_warning_timer.saturating_sub(1);

    if world.player.invulnerable {
        world.player.invulnerable_timer = world.player.invulnerable_timer.saturating_sub(1);
        if world.player.invulnerable_timer == 0 {
            world.player.invulnerable = false;
        }
    }

    movement::advance(world, &input.controls, input.now_ms);
    collision::resolve(world);
    world.remove_marked();
}
