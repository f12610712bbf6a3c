//! Route shapes over small hand-built worlds.
use glam::Vec3;
use rstest::rstest;
use test_utils::{crouch_tunnel, feet, flat_floor, wall_across};
use voxsim::{MoveKind, Pathfinder, SimConfig, SpatialQuery, World};

fn route(world: &World, from: Vec3, to: Vec3) -> Vec<voxsim::Waypoint> {
    let cfg = SimConfig::default();
    Pathfinder::new(SpatialQuery::new(world, &cfg)).find_path(from, to)
}

#[rstest]
#[case::same_cell(feet(2.0, 0.0), feet(2.2, 0.1))]
#[case::adjacent(feet(2.0, 0.0), feet(3.0, 0.0))]
fn trivial_routes_are_empty(#[case] from: Vec3, #[case] to: Vec3) {
    assert!(route(&flat_floor(6), from, to).is_empty());
}

#[rstest]
fn two_cells_away_is_two_walks() {
    let path = route(&flat_floor(6), feet(1.0, 0.0), feet(3.0, 0.0));
    let kinds: Vec<_> = path.iter().map(|w| (w.kind, w.cost)).collect();
    assert_eq!(kinds, vec![(MoveKind::Walk, 1.0), (MoveKind::Walk, 1.0)]);
    assert_eq!(path.last().map(|w| w.position), Some(feet(3.0, 0.0)));
}

#[rstest]
fn low_ceiling_is_crossed_crouched() {
    let world = crouch_tunnel(3, 2);
    let path = route(&world, feet(1.0, 0.0), feet(7.0, 0.0));
    let crouched: Vec<_> = path.iter().filter(|w| w.needs_crouch).collect();
    assert_eq!(crouched.len(), 2);
    for w in crouched {
        assert_eq!(w.kind, MoveKind::Crouch);
        assert!((w.cost - 1.5).abs() < f32::EPSILON);
        assert!((3.0..=4.0).contains(&w.position.x));
    }
    assert!(path
        .iter()
        .filter(|w| !(3.0..=4.0).contains(&w.position.x))
        .all(|w| !w.needs_crouch));
}

#[rstest]
fn one_block_wall_is_jumped() {
    let mut world = flat_floor(8);
    wall_across(&mut world, 4, 1);
    let path = route(&world, feet(1.0, 0.0), feet(6.0, 0.0));
    assert!(path.iter().any(|w| w.kind.is_jump()));
    assert!(path
        .iter()
        .all(|w| (w.position.x - 4.0).abs() > 0.5 || w.position.y > 1.0));
    assert_eq!(path.last().map(|w| w.position), Some(feet(6.0, 0.0)));
}

#[rstest]
fn two_block_wall_blocks_the_corridor() {
    let mut world = flat_floor(8);
    wall_across(&mut world, 4, 2);
    assert!(route(&world, feet(1.0, 0.0), feet(6.0, 0.0)).is_empty());
}

#[rstest]
fn routes_are_reproducible() {
    let mut world = flat_floor(12);
    wall_across(&mut world, 6, 1);
    let first = route(&world, feet(0.0, -1.0), feet(11.0, 1.0));
    let second = route(&world, feet(0.0, -1.0), feet(11.0, 1.0));
    assert!(!first.is_empty());
    assert_eq!(first, second);
}
