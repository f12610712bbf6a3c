//! Entity and simulation builders.
use glam::Vec3;
use voxsim::{Entity, EntityId, Faction, PlayerInput, SimConfig, Simulation, World};

/// Feet position on top of the floor cell at `(x, z)`.
pub fn feet(x: f32, z: f32) -> Vec3 {
    Vec3::new(x, 0.5, z)
}

/// Entity resting on the floor.
pub fn standing(name: &str, position: Vec3, faction: Faction) -> Entity {
    let mut entity = Entity::new(name, position, faction);
    entity.on_ground = true;
    entity
}

/// Simulation over `world` whose controlled entity is a player parked at
/// `player_at`; everything spawned afterwards is autonomous.
pub fn sim_with_player(world: World, player_at: Vec3) -> (Simulation, EntityId) {
    let mut sim = Simulation::with_world(SimConfig::default(), world);
    let player = sim.spawn(standing("player", player_at, Faction::Player));
    (sim, player)
}

/// Ticks `sim` `n` times without player input.
pub fn run_ticks(sim: &mut Simulation, n: usize) {
    let input = PlayerInput::default();
    for _ in 0..n {
        sim.tick(&input);
    }
}
