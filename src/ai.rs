//! Per-behaviour decision loops for autonomous entities.
//!
//! Each tick [`think`] runs the loop selected by [`Behaviour`]. Decisions
//! only write the entity's own record: facing, movement goal, engaged enemy,
//! alert state and ammunition. Shots are returned to the caller rather than
//! applied.
use glam::Vec3;
use log::debug;

use crate::block::BlockTypeRegistry;
use crate::combat::{aim_point, auto_equip, engage_range, fire_at, heal_if_needed};
use crate::directory::Others;
use crate::entity::{Behaviour, Entity, EntityId, TargetKind};
use crate::intents::ProjectileRequest;
use crate::item::ItemRegistry;
use crate::perception::{
    can_see_target, find_closest_visible_enemy, find_noticed_entity, is_valid_enemy,
};
use crate::spatial::SpatialQuery;
use crate::vector_math::yaw_towards;
use crate::world::WorldQuery;

/// Read-only state shared by every decision this tick.
pub struct AiContext<'a, W: ?Sized> {
    /// Spatial view of the world.
    pub space: SpatialQuery<'a, W>,
    /// Block type definitions, for weapon statistics.
    pub block_types: &'a BlockTypeRegistry,
    /// Consumable definitions, for healing.
    pub items: &'a ItemRegistry,
    /// The player-controlled entity, hunted by scripted hostiles.
    pub controlled: Option<EntityId>,
}

fn face(entity: &mut Entity, point: Vec3) {
    if let Some(yaw) = yaw_towards(entity.position, point) {
        entity.yaw = yaw;
    }
}

fn tick_timers(entity: &mut Entity) {
    entity.shoot_cooldown = entity.shoot_cooldown.saturating_sub(1);
    if entity.alert_timer > 0 {
        entity.alert_timer -= 1;
        if entity.alert_timer == 0 {
            entity.alert_point = None;
        }
    }
}

fn face_alert(entity: &mut Entity) {
    if entity.alert_timer > 0 {
        if let Some(point) = entity.alert_point {
            face(entity, point);
        }
    }
}

fn holds_directed_goal(entity: &Entity) -> bool {
    entity
        .target
        .is_some_and(|t| t.kind == TargetKind::Directed)
}

fn drop_goal_of_kind(entity: &mut Entity, kind: TargetKind) {
    if entity.target.is_some_and(|t| t.kind == kind) {
        entity.clear_target();
    }
}

/// Runs one decision tick for `me`.
///
/// Returns the shot fired this tick, if any.
pub fn think<W: WorldQuery + ?Sized>(
    me: &mut Entity,
    others: Others<'_>,
    ctx: &AiContext<'_, W>,
) -> Option<ProjectileRequest> {
    tick_timers(me);
    if !me.is_alive() {
        return None;
    }
    match me.behaviour {
        Behaviour::Idle => {
            face_alert(me);
            None
        }
        Behaviour::FactionCombat => faction_combat(me, others, ctx),
        Behaviour::ScriptedHostile => scripted_hostile(me, others, ctx),
    }
}

fn current_enemy<'o, W: WorldQuery + ?Sized>(
    me: &Entity,
    others: Others<'o>,
    ctx: &AiContext<'_, W>,
) -> Option<&'o Entity> {
    others
        .get(me.target_entity?)
        .filter(|enemy| is_valid_enemy(me, enemy) && can_see_target(me, enemy, &ctx.space))
}

fn faction_combat<W: WorldQuery + ?Sized>(
    me: &mut Entity,
    others: Others<'_>,
    ctx: &AiContext<'_, W>,
) -> Option<ProjectileRequest> {
    let cfg = ctx.space.config();
    heal_if_needed(me, ctx.items, cfg);
    auto_equip(me, ctx.block_types);

    let mut enemy = current_enemy(me, others, ctx);
    if enemy.is_none() {
        if let Some(lost) = me.target_entity.take() {
            debug!("{} lost sight of {lost:?}", me.name);
            drop_goal_of_kind(me, TargetKind::Engage);
        }
        if let Some(id) = find_closest_visible_enemy(me, others, &ctx.space) {
            debug!("{} engages {id:?}", me.name);
            me.target_entity = Some(id);
            enemy = others.get(id);
        }
    }

    let Some(enemy) = enemy else {
        if let Some((_, point)) = find_noticed_entity(me, others, &ctx.space) {
            me.alert_timer = cfg.notice_alert_ticks;
            me.alert_point = Some(point);
        }
        face_alert(me);
        return None;
    };

    face(me, enemy.position);
    let distance = me.position.distance(enemy.position);
    if distance <= engage_range(me, ctx.block_types, cfg) {
        if !holds_directed_goal(me) {
            me.clear_target();
        }
        fire_at(me, aim_point(enemy, cfg), ctx.block_types, cfg)
    } else {
        if !holds_directed_goal(me) {
            me.set_target(enemy.position, TargetKind::Engage);
        }
        None
    }
}

fn scripted_hostile<W: WorldQuery + ?Sized>(
    me: &mut Entity,
    others: Others<'_>,
    ctx: &AiContext<'_, W>,
) -> Option<ProjectileRequest> {
    let cfg = ctx.space.config();
    let prey = ctx
        .controlled
        .and_then(|id| others.get(id))
        .filter(|p| p.is_alive() && !p.no_clip);
    let Some(prey) = prey.filter(|p| me.position.distance(p.position) <= cfg.hostile_detection_range)
    else {
        me.target_entity = None;
        drop_goal_of_kind(me, TargetKind::Chase);
        face_alert(me);
        return None;
    };

    me.target_entity = Some(prey.id);
    face(me, prey.position);
    if me.position.distance(prey.position) <= cfg.hostile_attack_range {
        drop_goal_of_kind(me, TargetKind::Chase);
        auto_equip(me, ctx.block_types);
        fire_at(me, aim_point(prey, cfg), ctx.block_types, cfg)
    } else {
        if !holds_directed_goal(me) {
            me.set_target(prey.position, TargetKind::Chase);
        }
        None
    }
}
