//! Built-in demo arena.
//!
//! A walled courtyard built from a layout grid with a mixed-faction cast:
//! villagers, a guard, two outlaws and a wolf that hunts whoever the player
//! controls.
use glam::{IVec3, Vec3};
use log::info;

use crate::block::{builtin, BlockTypeId};
use crate::config::SimConfig;
use crate::entity::{Behaviour, Entity};
use crate::faction::Faction;
use crate::simulation::Simulation;
use crate::world::WorldError;

/// Demo layout: rows run along +Z, columns along +X; values are block type
/// ids, `0` is open floor.
pub const DEMO_LAYOUT: [[u32; 15]; 12] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 2, 0, 0, 0, 3, 3, 0, 0, 0, 2, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 2, 2, 0, 0, 0, 3, 3, 0, 6, 0, 1],
    [1, 0, 3, 0, 2, 2, 0, 0, 0, 3, 3, 0, 6, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 2, 0, 0, 3, 3, 0, 0, 0, 2, 2, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Types stacked two blocks high.
const TALL_TYPES: [BlockTypeId; 2] = [builtin::STONE, builtin::DOOR];

/// Lays a stone floor under every layout cell and the listed blocks on top.
///
/// # Errors
/// Fails when a value names no registered type or a cell is already taken.
pub fn build_layout<const W: usize>(
    sim: &mut Simulation,
    rows: &[[u32; W]],
) -> Result<(), WorldError> {
    for (z, row) in (0_i32..).zip(rows) {
        for (x, &value) in (0_i32..).zip(row) {
            sim.add_block(IVec3::new(x, 0, z), builtin::STONE)?;
            if value == 0 {
                continue;
            }
            let ty = BlockTypeId(value);
            sim.add_block(IVec3::new(x, 1, z), ty)?;
            if TALL_TYPES.contains(&ty) {
                sim.add_block(IVec3::new(x, 2, z), ty)?;
            }
        }
    }
    Ok(())
}

fn on_floor(x: f32, z: f32) -> Vec3 {
    Vec3::new(x, 0.5, z)
}

fn cast() -> Vec<Entity> {
    let player = Entity::new("Player", on_floor(7.0, 5.0), Faction::Player)
        .with_ammo(builtin::GRASS, 30)
        .with_ammo(builtin::STONE, 20)
        .with_ammo(builtin::WOOD, 25)
        .with_ammo(builtin::GOLD, 10)
        .with_ammo(builtin::DOOR, 15)
        .with_ammo(builtin::SAND, 20)
        .with_item("medkit", 2);
    let villager = Entity::new("Villager", on_floor(3.0, 3.0), Faction::Village)
        .with_dialogue("Hello, traveller! Welcome to the village!");
    let guard = Entity::new("Guard", on_floor(11.0, 6.0), Faction::Guard)
        .with_hp(150, 150)
        .with_behaviour(Behaviour::FactionCombat)
        .with_ammo(builtin::STONE, 999)
        .with_item("food_bread_ration", 2)
        .with_dialogue("Keep the peace around here!");
    let merchant = Entity::new("Merchant", on_floor(7.0, 8.0), Faction::Village)
        .with_hp(80, 80)
        .with_dialogue("I have the finest wares in the land!");
    let outlaws = [(3.0, 10.0), (12.0, 10.0)].map(|(x, z)| {
        Entity::new("Outlaw", on_floor(x, z), Faction::Outlaw)
            .with_behaviour(Behaviour::FactionCombat)
            .with_ammo(builtin::WOOD, 30)
            .with_item("medkit", 1)
    });
    let wolf = Entity::new("Wolf", on_floor(12.0, 1.0), Faction::Beast)
        .with_hp(60, 60)
        .with_behaviour(Behaviour::ScriptedHostile)
        .with_ammo(builtin::SAND, 20);

    let mut cast = vec![player, villager, guard, merchant];
    cast.extend(outlaws);
    cast.push(wolf);
    cast
}

/// Demo arena with its cast; the player is spawned first and controlled.
///
/// # Errors
/// Propagates layout failures.
pub fn demo(config: SimConfig) -> Result<Simulation, WorldError> {
    let mut sim = Simulation::new(config);
    build_layout(&mut sim, &DEMO_LAYOUT)?;
    for entity in cast() {
        sim.spawn(entity);
    }
    info!(
        "demo arena ready: {} blocks, {} entities",
        sim.world().blocks.len(),
        sim.entities().len()
    );
    Ok(sim)
}
