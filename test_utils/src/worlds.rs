//! Block layouts used by the integration tests.
use glam::IVec3;
use voxsim::block::builtin;
use voxsim::World;

/// Stone at height `y` for every cell in the given ranges.
///
/// # Panics
/// Panics if a cell is already occupied.
pub fn fill(world: &mut World, xs: std::ops::Range<i32>, y: i32, zs: std::ops::RangeInclusive<i32>) {
    for x in xs {
        for z in zs.clone() {
            world
                .add_block(IVec3::new(x, y, z), builtin::STONE)
                .unwrap_or_else(|e| panic!("fixture overlap: {e}"));
        }
    }
}

/// Three-wide stone corridor floor along +X from `x = 0` to `x = len - 1`.
pub fn flat_floor(len: i32) -> World {
    let mut world = World::new(1.0);
    fill(&mut world, 0..len, 0, -1..=1);
    world
}

/// Corridor of length 10 whose cells `start..start + len` have a ceiling one
/// block above head height for a crouched entity only.
pub fn crouch_tunnel(start: i32, len: i32) -> World {
    let mut world = flat_floor(10);
    fill(&mut world, start..start + len, 2, -1..=1);
    world
}

/// Solid wall `height` blocks tall across the corridor at `x`.
pub fn wall_across(world: &mut World, x: i32, height: i32) {
    for y in 1..=height {
        fill(world, x..x + 1, y, -1..=1);
    }
}

/// Solid block `height` high over the corridor cells `xs`, standing on the
/// floor.
pub fn platform(world: &mut World, xs: std::ops::Range<i32>, height: i32) {
    for y in 1..=height {
        fill(world, xs.clone(), y, -1..=1);
    }
}

/// Removes the corridor floor at `x`, leaving a one-cell pit with no bottom.
///
/// # Panics
/// Panics if the floor there is missing.
pub fn gap_across(world: &mut World, x: i32) {
    for z in -1..=1 {
        world
            .remove_block(IVec3::new(x, 0, z))
            .unwrap_or_else(|e| panic!("no floor to remove: {e}"));
    }
}
