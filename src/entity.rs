//! The simulated entity record.
//!
//! Entities refer to one another only through [`EntityId`]; a directory
//! lookup that misses means the referenced entity is gone.
use bevy_reflect::Reflect;
use glam::Vec3;
use hashbrown::HashMap;
use serde::Serialize;

use crate::block::BlockTypeId;
use crate::config::SimConfig;
use crate::faction::Faction;
use crate::pathfinding::Waypoint;

/// Stable identifier assigned by the entity directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Reflect)]
pub struct EntityId(pub u32);

/// Decision loop run for an autonomous entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Behaviour {
    /// Stands still; reacts to alerts by facing them.
    #[default]
    Idle,
    /// Faction-aware perception, engagement and self-preservation.
    FactionCombat,
    /// Chases and shoots whoever is player-controlled.
    ScriptedHostile,
}

/// Why an entity is heading somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetKind {
    /// Closing in on an enemy; abandoned when no path is found.
    Engage,
    /// Scripted pursuit; keeps retrying.
    Chase,
    /// Editor "go there" command; keeps retrying until replaced or cancelled.
    Directed,
}

impl TargetKind {
    /// Whether pathfinding failure keeps the target alive.
    #[must_use]
    pub const fn retries(self) -> bool {
        !matches!(self, Self::Engage)
    }
}

/// Current movement goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveTarget {
    /// World point to reach.
    pub point: Vec3,
    /// Retry policy.
    pub kind: TargetKind,
}

/// Simulated actor, player-controlled or autonomous.
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    /// Directory-assigned id; zero until spawned.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Feet position.
    pub position: Vec3,
    /// Heading in radians; zero looks down -Z.
    pub yaw: f32,
    /// Look pitch in radians.
    pub pitch: f32,
    /// Vertical velocity per tick.
    pub velocity_y: f32,
    /// Resting on a block.
    pub on_ground: bool,
    /// Using the crouched height.
    pub is_crouching: bool,
    /// Gravity and collision suspended.
    pub no_clip: bool,
    /// Current hit points, never negative.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Allegiance.
    pub faction: Faction,
    /// Decision loop when autonomous.
    pub behaviour: Behaviour,
    /// Block ammunition and building stock.
    pub inventory: HashMap<BlockTypeId, u32>,
    /// Consumable items by key.
    pub items: HashMap<String, u32>,
    /// Block type fired as ammunition.
    pub selected_ammo: Option<BlockTypeId>,
    /// Movement goal.
    pub target: Option<MoveTarget>,
    /// Waypoints towards `target`.
    pub path: Vec<Waypoint>,
    /// Next waypoint in `path`.
    pub path_index: usize,
    /// Ticks since the path was last computed.
    pub path_update_counter: u32,
    /// Enemy being engaged.
    pub target_entity: Option<EntityId>,
    /// Ticks until the next shot is allowed.
    pub shoot_cooldown: u32,
    /// Ticks left in the alerted state.
    pub alert_timer: u32,
    /// Point the entity is alerted towards.
    pub alert_point: Option<Vec3>,
    /// Height at which the current fall began.
    pub fall_start_y: Option<f32>,
    /// Line spoken when used, if the entity can be talked to.
    pub dialogue: Option<String>,
}

impl Entity {
    /// Creates an idle entity with 100 hit points.
    #[must_use]
    pub fn new(name: impl Into<String>, position: Vec3, faction: Faction) -> Self {
        Self {
            id: EntityId(0),
            name: name.into(),
            position,
            yaw: 0.0,
            pitch: 0.0,
            velocity_y: 0.0,
            on_ground: false,
            is_crouching: false,
            no_clip: false,
            hp: 100,
            max_hp: 100,
            faction,
            behaviour: Behaviour::Idle,
            inventory: HashMap::new(),
            items: HashMap::new(),
            selected_ammo: None,
            target: None,
            path: Vec::new(),
            path_index: 0,
            path_update_counter: 0,
            target_entity: None,
            shoot_cooldown: 0,
            alert_timer: 0,
            alert_point: None,
            fall_start_y: None,
            dialogue: None,
        }
    }

    /// Sets the behaviour.
    #[must_use]
    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    /// Sets current and maximum hit points.
    #[must_use]
    pub fn with_hp(mut self, hp: i32, max_hp: i32) -> Self {
        self.max_hp = max_hp.max(0);
        self.hp = hp.clamp(0, self.max_hp);
        self
    }

    /// Adds ammunition and selects it when nothing is selected yet.
    #[must_use]
    pub fn with_ammo(mut self, ty: BlockTypeId, count: u32) -> Self {
        *self.inventory.entry(ty).or_insert(0) += count;
        self.selected_ammo.get_or_insert(ty);
        self
    }

    /// Adds consumable items.
    #[must_use]
    pub fn with_item(mut self, key: impl Into<String>, count: u32) -> Self {
        *self.items.entry(key.into()).or_insert(0) += count;
        self
    }

    /// Sets the facing.
    #[must_use]
    pub fn facing(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    /// Makes the entity talk when used.
    #[must_use]
    pub fn with_dialogue(mut self, line: impl Into<String>) -> Self {
        self.dialogue = Some(line.into());
        self
    }

    /// Whether hit points remain.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Box height for the current stance.
    #[must_use]
    pub fn height(&self, config: &SimConfig) -> f32 {
        config.entity_height_for(self.is_crouching)
    }

    /// Eye position for the current stance.
    #[must_use]
    pub fn eye(&self, config: &SimConfig) -> Vec3 {
        self.position + Vec3::Y * config.eye_height_for(self.is_crouching)
    }

    /// Ammunition held of type `ty`.
    #[must_use]
    pub fn ammo(&self, ty: BlockTypeId) -> u32 {
        self.inventory.get(&ty).copied().unwrap_or(0)
    }

    /// Drops the movement goal and its path.
    pub fn clear_target(&mut self) {
        self.target = None;
        self.path_update_counter = 0;
        self.clear_path();
    }

    /// Drops the path but keeps the goal.
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.path_index = 0;
    }

    /// Sets a movement goal, keeping the current path when only the point
    /// moved.
    pub fn set_target(&mut self, point: Vec3, kind: TargetKind) {
        self.target = Some(MoveTarget { point, kind });
    }

    /// Subtracts damage, clamping at zero; returns the hit points left.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.hp = self.hp.saturating_sub(amount.max(0)).max(0);
        self.hp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::builtin;
    use rstest::rstest;

    #[rstest]
    fn first_ammo_is_selected() {
        let e = Entity::new("guard", Vec3::ZERO, Faction::Guard)
            .with_ammo(builtin::STONE, 10)
            .with_ammo(builtin::SAND, 3)
            .with_ammo(builtin::STONE, 5);
        assert_eq!(e.selected_ammo, Some(builtin::STONE));
        assert_eq!(e.ammo(builtin::STONE), 15);
        assert_eq!(e.ammo(builtin::GOLD), 0);
    }

    #[rstest]
    #[case(30, 70)]
    #[case(150, 0)]
    #[case(-5, 100)]
    fn damage_clamps(#[case] amount: i32, #[case] left: i32) {
        let mut e = Entity::new("x", Vec3::ZERO, Faction::Beast);
        assert_eq!(e.take_damage(amount), left);
    }

    #[rstest]
    fn eye_drops_when_crouching() {
        let cfg = SimConfig::default();
        let mut e = Entity::new("x", Vec3::new(0.0, 0.5, 0.0), Faction::Player);
        let standing = e.eye(&cfg).y;
        e.is_crouching = true;
        assert!(e.eye(&cfg).y < standing);
    }

    #[rstest]
    #[case(TargetKind::Engage, false)]
    #[case(TargetKind::Chase, true)]
    #[case(TargetKind::Directed, true)]
    fn retry_policy(#[case] kind: TargetKind, #[case] retries: bool) {
        assert_eq!(kind.retries(), retries);
    }
}
