//! Visibility tests and target acquisition.
//!
//! Detection has two channels: a short facing-independent proximity sense
//! that crouching defeats, and a longer field-of-view sense that it does not.
//! Both need a clear line of sight.
use glam::Vec3;

use crate::directory::Others;
use crate::entity::{Entity, EntityId};
use crate::spatial::SpatialQuery;
use crate::vector_math::within_fov;
use crate::world::WorldQuery;

/// How a target was detected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detection {
    /// Close enough to be sensed regardless of facing.
    Proximity {
        /// Straight-line distance.
        distance: f32,
    },
    /// Inside the vision cone.
    Sight {
        /// Straight-line distance.
        distance: f32,
    },
}

impl Detection {
    /// Straight-line distance to the detected entity.
    #[must_use]
    pub const fn distance(self) -> f32 {
        match self {
            Self::Proximity { distance } | Self::Sight { distance } => distance,
        }
    }
}

fn line_of_sight<W: WorldQuery + ?Sized>(
    observer: &Entity,
    target: &Entity,
    space: &SpatialQuery<'_, W>,
) -> bool {
    let cfg = space.config();
    space.has_line_of_sight(
        observer.position,
        cfg.eye_height_for(observer.is_crouching),
        target.position,
        cfg.eye_height_for(target.is_crouching),
    )
}

/// Detects `target` from `observer`, if either channel fires.
#[must_use]
pub fn detect<W: WorldQuery + ?Sized>(
    observer: &Entity,
    target: &Entity,
    space: &SpatialQuery<'_, W>,
) -> Option<Detection> {
    let cfg = space.config();
    let distance = observer.position.distance(target.position);
    if !target.is_crouching
        && distance <= cfg.proximity_detect_range
        && line_of_sight(observer, target, space)
    {
        return Some(Detection::Proximity { distance });
    }
    if distance <= cfg.vision_range
        && within_fov(observer.position, observer.yaw, cfg.vision_fov, target.position)
        && line_of_sight(observer, target, space)
    {
        return Some(Detection::Sight { distance });
    }
    None
}

/// Whether `observer` can see `target` through either channel.
#[must_use]
pub fn can_see_target<W: WorldQuery + ?Sized>(
    observer: &Entity,
    target: &Entity,
    space: &SpatialQuery<'_, W>,
) -> bool {
    detect(observer, target, space).is_some()
}

/// Whether `target` may be fought by `observer` at all.
#[must_use]
pub fn is_valid_enemy(observer: &Entity, target: &Entity) -> bool {
    target.id != observer.id
        && target.is_alive()
        && !target.no_clip
        && observer.faction.is_hostile_to(target.faction)
}

/// Closest hostile entity `observer` can currently see.
#[must_use]
pub fn find_closest_visible_enemy<W: WorldQuery + ?Sized>(
    observer: &Entity,
    others: Others<'_>,
    space: &SpatialQuery<'_, W>,
) -> Option<EntityId> {
    others
        .iter()
        .filter(|e| is_valid_enemy(observer, e))
        .filter_map(|e| detect(observer, e, space).map(|d| (e.id, d.distance())))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Closest standing entity of any faction within proximity range and sight.
#[must_use]
pub fn find_noticed_entity<W: WorldQuery + ?Sized>(
    observer: &Entity,
    others: Others<'_>,
    space: &SpatialQuery<'_, W>,
) -> Option<(EntityId, Vec3)> {
    let range = space.config().proximity_detect_range;
    others
        .iter()
        .filter(|e| e.is_alive() && !e.is_crouching && !e.no_clip)
        .map(|e| (e, observer.position.distance(e.position)))
        .filter(|(_, d)| *d <= range)
        .filter(|(e, _)| line_of_sight(observer, e, space))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(e, _)| (e.id, e.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::directory::EntityDirectory;
    use crate::faction::Faction;
    use crate::world::World;
    use rstest::{fixture, rstest};

    #[fixture]
    fn cfg() -> SimConfig {
        SimConfig::default()
    }

    fn at(x: f32, z: f32, faction: Faction) -> Entity {
        Entity::new("e", Vec3::new(x, 0.5, z), faction)
    }

    #[rstest]
    #[case(Vec3::new(0.0, 0.5, -10.0), false, true)]
    #[case(Vec3::new(0.0, 0.5, 10.0), false, false)]
    #[case(Vec3::new(0.0, 0.5, 2.0), false, true)]
    #[case(Vec3::new(0.0, 0.5, 2.0), true, false)]
    #[case(Vec3::new(0.0, 0.5, -2.0), true, true)]
    #[case(Vec3::new(0.0, 0.5, -20.0), false, false)]
    fn channels(
        cfg: SimConfig,
        #[case] target_pos: Vec3,
        #[case] crouching: bool,
        #[case] visible: bool,
    ) {
        let world = World::new(1.0);
        let space = SpatialQuery::new(&world, &cfg);
        let observer = at(0.0, 0.0, Faction::Guard);
        let mut target = Entity::new("t", target_pos, Faction::Outlaw);
        target.is_crouching = crouching;
        assert_eq!(can_see_target(&observer, &target, &space), visible);
    }

    #[rstest]
    fn friends_and_ghosts_are_never_enemies() {
        let guard = at(0.0, 0.0, Faction::Guard);
        let villager = at(1.0, 0.0, Faction::Village);
        let mut outlaw = at(2.0, 0.0, Faction::Outlaw);
        outlaw.id = EntityId(9);
        assert!(!is_valid_enemy(&guard, &villager));
        assert!(is_valid_enemy(&guard, &outlaw));
        outlaw.no_clip = true;
        assert!(!is_valid_enemy(&guard, &outlaw));
    }

    #[rstest]
    fn closest_visible_enemy_wins(cfg: SimConfig) {
        let world = World::new(1.0);
        let space = SpatialQuery::new(&world, &cfg);
        let mut dir = EntityDirectory::new();
        dir.spawn(at(0.0, 0.0, Faction::Guard));
        dir.spawn(at(0.0, -8.0, Faction::Outlaw));
        let near = dir.spawn(at(1.0, -4.0, Faction::Outlaw));
        dir.spawn(at(0.0, -1.0, Faction::Village));
        let (me, others) = dir.split_at_mut(0).expect("guard");
        assert_eq!(find_closest_visible_enemy(me, others, &space), Some(near));
    }

    #[rstest]
    fn noticing_skips_crouchers(cfg: SimConfig) {
        let world = World::new(1.0);
        let space = SpatialQuery::new(&world, &cfg);
        let mut dir = EntityDirectory::new();
        dir.spawn(at(0.0, 0.0, Faction::Village));
        let sneaky = dir.spawn(at(0.0, 1.0, Faction::Outlaw));
        let loud = dir.spawn(at(2.0, 0.0, Faction::Beast));
        dir.get_mut(sneaky).expect("spawned").is_crouching = true;
        let (me, others) = dir.split_at_mut(0).expect("villager");
        assert_eq!(
            find_noticed_entity(me, others, &space).map(|(id, _)| id),
            Some(loud)
        );
    }
}
