//! Interactions and commands in the built-in arena.
use glam::{IVec3, Vec3};
use rstest::{fixture, rstest};
use test_utils::run_ticks;
use voxsim::scenario::demo;
use voxsim::{EntityId, Interactable, InteractionOutcome, Intent, SimConfig, Simulation};

#[fixture]
fn arena() -> Simulation {
    demo(SimConfig::default()).expect("demo layout is valid")
}

fn named(sim: &Simulation, name: &str) -> EntityId {
    sim.entities()
        .iter()
        .find(|e| e.name == name)
        .map(|e| e.id)
        .expect("cast member present")
}

#[rstest]
fn the_door_opens_and_closes_as_one(mut arena: Simulation) {
    let player = named(&arena, "Player");
    let door = Interactable::Block(IVec3::new(6, 1, 3));
    let doorway = Vec3::new(6.0, 0.5, 3.0);
    assert!(arena.space().is_blocked(doorway, false));

    let opened = arena.interact(player, door).expect("door exists");
    let cells = vec![IVec3::new(6, 1, 3), IVec3::new(6, 2, 3)];
    assert_eq!(
        opened,
        InteractionOutcome::DoorToggled { solid: false, cells: cells.clone() }
    );
    assert!(!arena.space().is_blocked(doorway, false));
    let toggles = arena
        .pending_intents()
        .iter()
        .filter(|i| matches!(i, Intent::BlockSolidity { solid: false, .. }))
        .count();
    assert_eq!(toggles, 2);

    // The upper half toggles the same group back.
    let closed = arena
        .interact(player, Interactable::Block(IVec3::new(6, 2, 3)))
        .expect("door exists");
    assert_eq!(closed, InteractionOutcome::DoorToggled { solid: true, cells });
    assert!(arena.space().is_blocked(doorway, false));
}

#[rstest]
fn villagers_talk(mut arena: Simulation) {
    let player = named(&arena, "Player");
    let villager = named(&arena, "Villager");
    let outcome = arena
        .interact(player, Interactable::Entity(villager))
        .expect("villager exists");
    assert!(matches!(outcome, InteractionOutcome::Spoke { speaker, .. } if speaker == villager));
}

#[rstest]
fn ordered_villager_walks_across_the_courtyard(mut arena: Simulation) {
    let merchant = named(&arena, "Merchant");
    let goal = Vec3::new(3.0, 0.5, 7.0);
    arena.command_move(merchant, goal).expect("merchant exists");
    run_ticks(&mut arena, 400);
    let m = arena.entity(merchant).expect("merchant survives");
    assert!(m.target.is_none(), "order completed");
    let flat = Vec3::new(m.position.x - goal.x, 0.0, m.position.z - goal.z);
    assert!(flat.length() < 0.5, "ended at {}", m.position);
}

#[rstest]
fn control_can_be_handed_to_an_npc(mut arena: Simulation) {
    let villager = named(&arena, "Villager");
    let index = arena
        .entities()
        .index_of(villager)
        .expect("villager indexed");
    assert_eq!(arena.switch_control(index), Ok(villager));
    assert!(arena
        .find_path_for(villager, Vec3::new(10.0, 0.5, 8.0))
        .expect("villager exists")
        .is_empty());
}
