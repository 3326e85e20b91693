//! River terrain
//!
//! The river is a stack of 20 px bands whose center and width follow slow sine
//! waves of the frame counter. Bands are appended at the top as the newest one
//! scrolls into view and evicted once they pass the bottom edge.

use glam::Vec2;

use super::rng::SimRng;
use super::state::{Decoration, DecorationKind, RiverBand, World};
use crate::consts::*;

/// Width of the very first band of a run
pub const INITIAL_BAND_WIDTH: f32 = 520.0;
/// Chance that a new band gets a bank decoration
pub const DECORATION_CHANCE: f64 = 0.3;
/// Share of decorations that are houses
pub const HOUSE_CHANCE: f64 = 0.2;
/// Horizontal distance of a decoration from the bank edge
pub const DECORATION_OFFSET: f32 = 20.0;

/// Shape of the band generated at `frame_count`.
///
/// The first band of a run (no predecessor) is always centered and wide.
pub fn generate_band(y: f32, frame_count: u64, previous: Option<&RiverBand>) -> RiverBand {
    if previous.is_none() {
        return RiverBand {
            y,
            center_x: FIELD_WIDTH / 2.0,
            width: INITIAL_BAND_WIDTH,
        };
    }

    let t = frame_count as f32 * 0.005;
    let noise = t.sin() * 30.0 + (t * 0.5).sin() * 20.0;
    let width = 480.0 + (t * 0.3).sin() * 50.0;
    let center_x = clamp_center(FIELD_WIDTH / 2.0 + noise, width);

    RiverBand { y, center_x, width }
}

/// Keep a band of `width` fully inside the field with a bank margin each side
pub fn clamp_center(center_x: f32, width: f32) -> f32 {
    let min = width / 2.0 + BANK_MARGIN;
    let max = FIELD_WIDTH - width / 2.0 - BANK_MARGIN;
    center_x.min(max).max(min)
}

/// Roll for a decoration beside `band`
pub fn maybe_decorate(band: &RiverBand, rng: &mut SimRng) -> Option<Decoration> {
    if !rng.chance(DECORATION_CHANCE) {
        return None;
    }

    let on_left = rng.next_f64() > 0.5;
    let x = if on_left {
        band.left_bank() - DECORATION_OFFSET
    } else {
        band.right_bank() + DECORATION_OFFSET
    };
    let kind = if rng.next_f64() > 1.0 - HOUSE_CHANCE {
        DecorationKind::House
    } else {
        DecorationKind::Tree
    };
    let variant = rng.index(2) as u8;

    Some(Decoration {
        pos: Vec2::new(x, band.y),
        kind,
        variant,
        marked_for_deletion: false,
    })
}

/// Append one band above the newest, with its decoration roll
pub fn push_band(world: &mut World, y: f32) -> RiverBand {
    let band = generate_band(y, world.frame_count, world.bands.last());
    world.bands.push(band);
    if let Some(decoration) = maybe_decorate(&band, &mut world.rng) {
        world.decorations.push(decoration);
    }
    band
}

/// Fill the screen with bands from the bottom up
pub fn seed_river(world: &mut World) {
    world.bands.clear();
    world.decorations.clear();
    let count = (FIELD_HEIGHT / BAND_HEIGHT) as usize + 5;
    for i in 0..count {
        push_band(world, FIELD_HEIGHT - i as f32 * BAND_HEIGHT);
    }
}

/// Generate a new band once the newest one has scrolled into view.
///
/// Returns the band that was added, if any.
pub fn extend(world: &mut World) -> Option<RiverBand> {
    debug_assert!(!world.bands.is_empty(), "river must be seeded before ticking");
    let newest_y = world.bands.last()?.y;
    if newest_y > -BAND_HEIGHT {
        Some(push_band(world, newest_y - BAND_HEIGHT))
    } else {
        None
    }
}

/// Move bands and decorations down by the scroll speed, evicting what left the field
pub fn scroll(world: &mut World) {
    let speed = world.scroll_speed;
    for band in &mut world.bands {
        band.y += speed;
    }
    if world.bands.first().is_some_and(|b| b.y > FIELD_HEIGHT) {
        world.bands.remove(0);
    }

    for decoration in &mut world.decorations {
        decoration.pos.y += speed;
        if decoration.pos.y > FIELD_HEIGHT {
            decoration.marked_for_deletion = true;
        }
    }
}

/// Band whose `[y, y + BAND_HEIGHT)` range contains `y`
pub fn band_at(bands: &[RiverBand], y: f32) -> Option<&RiverBand> {
    bands.iter().find(|b| y >= b.y && y < b.y + BAND_HEIGHT)
}
