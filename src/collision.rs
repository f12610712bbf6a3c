//! Vertical integration, landing and wall sliding.
//!
//! Blocked moves are never errors: the offending delta is simply not applied.
use log::debug;

use crate::config::SimConfig;
use crate::entity::Entity;
use crate::numeric::floor_to_damage;
use crate::spatial::SpatialQuery;
use crate::world::WorldQuery;

/// Slack allowed when deciding whether a block lies below the feet.
const LANDING_SLACK: f32 = 0.05;

/// Result of a vertical step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalOutcome {
    /// Still airborne.
    Airborne,
    /// Came to rest on a block, taking `damage` hit points of fall damage.
    Landed {
        /// Fall damage dealt, possibly zero.
        damage: i32,
    },
    /// Hit a ceiling while rising.
    Bonked,
    /// Noclip entities do not integrate.
    Suspended,
}

/// Which axes of a horizontal step were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HorizontalOutcome {
    /// The X component was applied.
    pub moved_x: bool,
    /// The Z component was applied.
    pub moved_z: bool,
}

/// Fall damage for a drop of `distance` units.
///
/// # Examples
/// ```
/// use voxsim::{collision::fall_damage, config::SimConfig};
/// let cfg = SimConfig::default();
/// assert_eq!(fall_damage(3.0, &cfg), 0);
/// assert_eq!(fall_damage(5.5, &cfg), 25);
/// ```
#[must_use]
pub fn fall_damage(distance: f32, config: &SimConfig) -> i32 {
    if distance <= config.fall_damage_threshold {
        return 0;
    }
    floor_to_damage((distance - config.fall_damage_threshold) * config.fall_damage_multiplier)
}

/// Applies one tick of gravity unless the entity is noclipping.
pub fn apply_gravity(entity: &mut Entity, config: &SimConfig) {
    if !entity.no_clip {
        entity.velocity_y -= config.gravity;
    }
}

/// Integrates `velocity_y` and resolves contact with the block below or
/// above.
pub fn resolve_vertical<W: WorldQuery + ?Sized>(
    entity: &mut Entity,
    space: &SpatialQuery<'_, W>,
) -> VerticalOutcome {
    if entity.no_clip {
        entity.velocity_y = 0.0;
        entity.fall_start_y = None;
        return VerticalOutcome::Suspended;
    }
    let cfg = space.config();
    let start_y = entity.position.y;
    let mut candidate = entity.position;
    candidate.y += entity.velocity_y;
    let obstructions = space.obstructions(candidate, entity.height(cfg));

    if obstructions.is_empty() {
        if entity.velocity_y < 0.0 {
            entity.fall_start_y.get_or_insert(start_y);
        } else {
            entity.fall_start_y = None;
        }
        entity.position.y = candidate.y;
        entity.on_ground = false;
        return VerticalOutcome::Airborne;
    }

    if entity.velocity_y >= 0.0 {
        entity.velocity_y = 0.0;
        return VerticalOutcome::Bonked;
    }

    let floor = obstructions
        .iter()
        .map(|b| b.top(cfg.block_size))
        .filter(|top| *top <= start_y + LANDING_SLACK)
        .reduce(f32::max);
    entity.velocity_y = 0.0;
    let Some(floor) = floor else {
        // Overlapping a block that is not below; hold position.
        return VerticalOutcome::Bonked;
    };
    entity.position.y = floor;
    entity.on_ground = true;
    let fall_start = entity.fall_start_y.take().unwrap_or(start_y);
    let damage = fall_damage(fall_start - floor, cfg);
    if damage > 0 {
        entity.take_damage(damage);
        debug!(
            "{} fell {:.2} units and took {damage} damage",
            entity.name,
            fall_start - floor
        );
    }
    VerticalOutcome::Landed { damage }
}

/// Moves horizontally, trying X then Z independently so entities slide
/// along walls.
pub fn resolve_horizontal<W: WorldQuery + ?Sized>(
    entity: &mut Entity,
    dx: f32,
    dz: f32,
    space: &SpatialQuery<'_, W>,
) -> HorizontalOutcome {
    if entity.no_clip {
        entity.position.x += dx;
        entity.position.z += dz;
        return HorizontalOutcome {
            moved_x: true,
            moved_z: true,
        };
    }
    let mut outcome = HorizontalOutcome::default();
    let crouching = entity.is_crouching;

    let mut candidate = entity.position;
    candidate.x += dx;
    if !space.is_blocked(candidate, crouching) {
        entity.position.x = candidate.x;
        outcome.moved_x = true;
    }

    let mut candidate = entity.position;
    candidate.z += dz;
    if !space.is_blocked(candidate, crouching) {
        entity.position.z = candidate.z;
        outcome.moved_z = true;
    }
    outcome
}
