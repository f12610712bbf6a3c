//! Turns player input or computed paths into motion.
//!
//! Player-controlled entities read [`PlayerInput`]; autonomous entities walk
//! their path towards [`Entity::target`], recomputing it on a throttle.
use bevy::prelude::Resource;
use glam::Vec3;
use log::debug;

use crate::collision::resolve_horizontal;
use crate::config::SimConfig;
use crate::entity::{Entity, TargetKind};
use crate::pathfinding::Pathfinder;
use crate::spatial::SpatialQuery;
use crate::vector_math::{forward_from_yaw, horizontal_distance, right_from_yaw, yaw_towards};
use crate::world::WorldQuery;

/// Height above the feet beyond which a waypoint counts as higher ground.
const STEP_SLACK: f32 = 0.1;

/// Directional and stance flags for the player-controlled entity.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    /// Move along the facing direction.
    pub forward: bool,
    /// Move against the facing direction.
    pub back: bool,
    /// Strafe left.
    pub left: bool,
    /// Strafe right.
    pub right: bool,
    /// Jump, or rise while noclipping.
    pub jump: bool,
    /// Crouch, or sink while noclipping.
    pub crouch: bool,
}

impl PlayerInput {
    fn axis(positive: bool, negative: bool) -> f32 {
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

/// What an autonomous entity did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// No movement goal.
    Idle,
    /// Stepped along the path.
    Moving,
    /// Reached the goal and dropped it.
    Arrived,
    /// No route; the goal was dropped.
    GaveUp,
    /// No route yet; the goal is kept and retried later.
    Waiting,
}

fn walk_speed(entity: &Entity, config: &SimConfig) -> f32 {
    if entity.is_crouching {
        config.move_speed * config.crouch_speed_multiplier
    } else {
        config.move_speed
    }
}

/// Stands up when there is headroom.
pub fn stand_up_if_possible<W: WorldQuery + ?Sized>(entity: &mut Entity, space: &SpatialQuery<'_, W>) {
    if entity.is_crouching && (entity.no_clip || space.can_stand_up(entity.position)) {
        entity.is_crouching = false;
    }
}

/// Applies one tick of player input.
pub fn drive_player<W: WorldQuery + ?Sized>(
    entity: &mut Entity,
    input: &PlayerInput,
    space: &SpatialQuery<'_, W>,
) {
    let cfg = space.config();
    if entity.no_clip {
        entity.is_crouching = false;
        entity.position.y += PlayerInput::axis(input.jump, input.crouch) * cfg.move_speed;
    } else if input.crouch {
        entity.is_crouching = true;
    } else {
        stand_up_if_possible(entity, space);
    }

    let wish = forward_from_yaw(entity.yaw) * PlayerInput::axis(input.forward, input.back)
        + right_from_yaw(entity.yaw) * PlayerInput::axis(input.right, input.left);
    if let Some(dir) = wish.try_normalize() {
        let step = dir * walk_speed(entity, cfg);
        resolve_horizontal(entity, step.x, step.z, space);
    }

    if input.jump && entity.on_ground && !entity.no_clip {
        entity.velocity_y = cfg.jump_force;
        entity.on_ground = false;
    }
}

fn recompute_due(entity: &Entity, config: &SimConfig) -> bool {
    let exhausted = entity.path_index >= entity.path.len();
    entity.path_update_counter >= config.path_update_interval
        || (exhausted && entity.path_update_counter == 0)
}

fn step_towards<W: WorldQuery + ?Sized>(
    entity: &mut Entity,
    point: Vec3,
    space: &SpatialQuery<'_, W>,
) -> f32 {
    let cfg = space.config();
    let mut offset = point - entity.position;
    offset.y = 0.0;
    let distance = offset.length();
    if let Some(yaw) = yaw_towards(entity.position, point) {
        entity.yaw = yaw;
    }
    if let Some(dir) = offset.try_normalize() {
        let step = dir * walk_speed(entity, cfg).min(distance);
        resolve_horizontal(entity, step.x, step.z, space);
    }
    distance
}

fn fly_towards<W: WorldQuery + ?Sized>(
    entity: &mut Entity,
    point: Vec3,
    space: &SpatialQuery<'_, W>,
) -> FollowOutcome {
    let cfg = space.config();
    let offset = point - entity.position;
    if offset.length() <= cfg.waypoint_arrival_radius {
        entity.clear_target();
        return FollowOutcome::Arrived;
    }
    if let Some(yaw) = yaw_towards(entity.position, point) {
        entity.yaw = yaw;
    }
    entity.position += offset.clamp_length_max(cfg.move_speed);
    FollowOutcome::Moving
}

/// Walks an autonomous entity one tick towards its movement goal.
pub fn follow_target<W: WorldQuery + ?Sized>(
    entity: &mut Entity,
    space: &SpatialQuery<'_, W>,
) -> FollowOutcome {
    let cfg = space.config();
    let Some(target) = entity.target else {
        stand_up_if_possible(entity, space);
        return FollowOutcome::Idle;
    };
    if entity.no_clip {
        return fly_towards(entity, target.point, space);
    }

    let finder = Pathfinder::new(*space);
    if recompute_due(entity, cfg) {
        entity.path = finder.find_path(entity.position, target.point);
        entity.path_index = 0;
        entity.path_update_counter = 0;
        if entity.path.is_empty() {
            return arrive_or_give_up(entity, target.point, target.kind, &finder, space);
        }
    }
    entity.path_update_counter += 1;

    let Some(waypoint) = entity.path.get(entity.path_index).copied() else {
        return FollowOutcome::Waiting;
    };

    if waypoint.needs_crouch {
        entity.is_crouching = true;
    } else {
        stand_up_if_possible(entity, space);
    }

    if horizontal_distance(entity.position, waypoint.position) <= cfg.waypoint_arrival_radius {
        entity.path_index += 1;
        if entity.path_index >= entity.path.len() {
            return finish_path(entity, target.kind, space);
        }
        return FollowOutcome::Moving;
    }

    let distance = step_towards(entity, waypoint.position, space);
    let higher = waypoint.position.y > entity.position.y + STEP_SLACK;
    let level_leap = (waypoint.position.y - entity.position.y).abs() <= STEP_SLACK
        && distance > cfg.gap_jump_trigger_distance;
    if entity.on_ground && (higher || level_leap || waypoint.kind.is_jump()) {
        entity.velocity_y = cfg.jump_force;
        entity.on_ground = false;
    }
    FollowOutcome::Moving
}

fn finish_path<W: WorldQuery + ?Sized>(
    entity: &mut Entity,
    kind: TargetKind,
    space: &SpatialQuery<'_, W>,
) -> FollowOutcome {
    entity.clear_path();
    entity.path_update_counter = 0;
    if kind == TargetKind::Chase {
        return FollowOutcome::Moving;
    }
    entity.clear_target();
    stand_up_if_possible(entity, space);
    FollowOutcome::Arrived
}

fn arrive_or_give_up<W: WorldQuery + ?Sized>(
    entity: &mut Entity,
    point: Vec3,
    kind: TargetKind,
    finder: &Pathfinder<'_, W>,
    space: &SpatialQuery<'_, W>,
) -> FollowOutcome {
    if finder.already_there(entity.position, point) {
        let cfg = space.config();
        let distance = step_towards(entity, point, space);
        if distance > cfg.waypoint_arrival_radius {
            // Final approach inside the goal cell; check again next tick.
            return FollowOutcome::Moving;
        }
        if kind == TargetKind::Chase {
            entity.path_update_counter = 1;
            return FollowOutcome::Waiting;
        }
        entity.clear_target();
        stand_up_if_possible(entity, space);
        return FollowOutcome::Arrived;
    }
    if kind.retries() {
        entity.path_update_counter = 1;
        return FollowOutcome::Waiting;
    }
    debug!("{} cannot reach {point}; giving up", entity.name);
    entity.clear_target();
    stand_up_if_possible(entity, space);
    FollowOutcome::GaveUp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::builtin;
    use crate::collision::{apply_gravity, resolve_vertical};
    use crate::faction::Faction;
    use crate::world::World;
    use glam::IVec3;
    use rstest::{fixture, rstest};

    #[fixture]
    fn cfg() -> SimConfig {
        SimConfig::default()
    }

    fn floor(len: i32) -> World {
        let mut world = World::new(1.0);
        for x in -1..len {
            for z in -1..=1 {
                world
                    .add_block(IVec3::new(x, 0, z), builtin::STONE)
                    .expect("free cell");
            }
        }
        world
    }

    fn walker(x: f32) -> Entity {
        let mut e = Entity::new("w", Vec3::new(x, 0.5, 0.0), Faction::Village);
        e.on_ground = true;
        e
    }

    fn run<W: WorldQuery + ?Sized>(
        e: &mut Entity,
        space: &SpatialQuery<'_, W>,
        ticks: usize,
    ) -> Vec<FollowOutcome> {
        (0..ticks)
            .map(|_| {
                apply_gravity(e, space.config());
                let outcome = follow_target(e, space);
                resolve_vertical(e, space);
                outcome
            })
            .collect()
    }

    #[rstest]
    fn forward_input_moves_along_facing(cfg: SimConfig) {
        let world = floor(4);
        let space = SpatialQuery::new(&world, &cfg);
        let mut e = walker(0.0);
        let input = PlayerInput {
            forward: true,
            ..PlayerInput::default()
        };
        drive_player(&mut e, &input, &space);
        assert!((e.position.z + cfg.move_speed).abs() < 1e-6);
    }

    #[rstest]
    fn crouching_halves_speed_and_blocks_standing_under_a_ceiling(cfg: SimConfig) {
        let mut world = floor(4);
        world
            .add_block(IVec3::new(0, 2, 0), builtin::STONE)
            .expect("free cell");
        let space = SpatialQuery::new(&world, &cfg);
        let mut e = walker(0.0);
        e.is_crouching = true;
        let input = PlayerInput {
            right: true,
            ..PlayerInput::default()
        };
        drive_player(&mut e, &input, &space);
        assert!(e.is_crouching, "no headroom to stand");
        assert!((e.position.x - cfg.move_speed * cfg.crouch_speed_multiplier).abs() < 1e-6);
    }

    #[rstest]
    fn jump_needs_ground(cfg: SimConfig) {
        let world = floor(2);
        let space = SpatialQuery::new(&world, &cfg);
        let mut e = walker(0.0);
        let input = PlayerInput {
            jump: true,
            ..PlayerInput::default()
        };
        drive_player(&mut e, &input, &space);
        assert!((e.velocity_y - cfg.jump_force).abs() < f32::EPSILON);
        e.velocity_y = 0.0;
        drive_player(&mut e, &input, &space);
        assert!(e.velocity_y.abs() < f32::EPSILON);
    }

    #[rstest]
    fn directed_walk_arrives_and_clears(cfg: SimConfig) {
        let world = floor(6);
        let space = SpatialQuery::new(&world, &cfg);
        let mut e = walker(0.0);
        e.set_target(Vec3::new(4.0, 0.5, 0.0), TargetKind::Directed);
        let outcomes = run(&mut e, &space, 200);
        assert!(outcomes.contains(&FollowOutcome::Arrived));
        assert!(e.target.is_none());
        assert!((e.position.x - 4.0).abs() < 0.35);
    }

    #[rstest]
    #[case(TargetKind::Engage, FollowOutcome::GaveUp, false)]
    #[case(TargetKind::Directed, FollowOutcome::Waiting, true)]
    fn unreachable_goals(
        cfg: SimConfig,
        #[case] kind: TargetKind,
        #[case] outcome: FollowOutcome,
        #[case] keeps_target: bool,
    ) {
        let world = floor(3);
        let space = SpatialQuery::new(&world, &cfg);
        let mut e = walker(0.0);
        e.set_target(Vec3::new(30.0, 0.5, 0.0), kind);
        assert_eq!(follow_target(&mut e, &space), outcome);
        assert_eq!(e.target.is_some(), keeps_target);
        if keeps_target {
            assert_eq!(follow_target(&mut e, &space), FollowOutcome::Waiting);
        }
    }

    #[rstest]
    fn noclip_flies_straight(cfg: SimConfig) {
        let world = World::new(1.0);
        let space = SpatialQuery::new(&world, &cfg);
        let mut e = walker(0.0);
        e.no_clip = true;
        e.set_target(Vec3::new(0.0, 5.5, 0.0), TargetKind::Directed);
        assert_eq!(follow_target(&mut e, &space), FollowOutcome::Moving);
        assert!((e.position.y - (0.5 + cfg.move_speed)).abs() < 1e-6);
    }
}
