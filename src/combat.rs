//! Weapon range, ammunition handling, firing and hit intake.
use glam::Vec3;
use log::debug;

use crate::block::{BlockTypeId, BlockTypeRegistry};
use crate::config::SimConfig;
use crate::entity::{Entity, EntityId};
use crate::intents::ProjectileRequest;
use crate::item::ItemRegistry;
use crate::numeric::count_to_f32;
use crate::vector_math::horizontal_distance;

/// Distance a projectile of the selected ammunition travels before expiring.
///
/// `None` when nothing usable is selected.
#[must_use]
pub fn weapon_range(entity: &Entity, registry: &BlockTypeRegistry) -> Option<f32> {
    let ty = registry.get(entity.selected_ammo?)?;
    ty.droppable
        .then(|| ty.bullet_speed * count_to_f32(ty.bullet_lifetime))
}

/// Distance at which an entity stops closing in and starts shooting.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use voxsim::{block::{builtin, BlockTypeRegistry}, combat::engage_range,
///     config::SimConfig, entity::Entity, faction::Faction};
/// let registry = BlockTypeRegistry::with_defaults();
/// let cfg = SimConfig::default();
/// let guard = Entity::new("guard", Vec3::ZERO, Faction::Guard).with_ammo(builtin::STONE, 5);
/// // Stone flies 0.5 units per tick for 20 ticks.
/// assert!((engage_range(&guard, &registry, &cfg) - 8.5).abs() < 1e-5);
/// ```
#[must_use]
pub fn engage_range(entity: &Entity, registry: &BlockTypeRegistry, config: &SimConfig) -> f32 {
    weapon_range(entity, registry).map_or(config.fallback_engage_range, |range| {
        range * config.engage_range_fraction
    })
}

/// Whether `count` rounds of ammunition never run out.
#[must_use]
pub const fn is_infinite(count: u32, config: &SimConfig) -> bool {
    count >= config.infinite_ammo
}

/// Re-selects ammunition when the selected type has run dry.
///
/// Picks the firable type with the highest break damage the entity still
/// holds; ties go to the lower id. Returns the selection after the check.
pub fn auto_equip(entity: &mut Entity, registry: &BlockTypeRegistry) -> Option<BlockTypeId> {
    if entity.selected_ammo.is_some_and(|ty| entity.ammo(ty) > 0) {
        return entity.selected_ammo;
    }
    let best = entity
        .inventory
        .iter()
        .filter(|(_, count)| **count > 0)
        .filter_map(|(id, _)| registry.get(*id))
        .filter(|ty| ty.droppable)
        .max_by(|a, b| {
            a.break_damage
                .cmp(&b.break_damage)
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|ty| ty.id);
    if best.is_some() && best != entity.selected_ammo {
        debug!("{} switches ammunition to {best:?}", entity.name);
        entity.selected_ammo = best;
    }
    best
}

/// Consumes the strongest healing item when health is low.
///
/// Returns the key of the consumed item.
pub fn heal_if_needed(entity: &mut Entity, items: &ItemRegistry, config: &SimConfig) -> Option<String> {
    let threshold = count_to_f32(entity.max_hp.max(0).unsigned_abs()) * config.low_health_fraction;
    if count_to_f32(entity.hp.max(0).unsigned_abs()) >= threshold {
        return None;
    }
    let (key, heal) = entity
        .items
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(key, _)| (key, items.heal_value(key)))
        .filter(|(_, heal)| *heal > 0)
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(key, heal)| (key.clone(), heal))?;
    if let Some(count) = entity.items.get_mut(&key) {
        *count -= 1;
        if *count == 0 {
            entity.items.remove(&key);
        }
    }
    entity.hp = entity.hp.saturating_add(heal).min(entity.max_hp);
    debug!("{} eats {key} and heals to {}", entity.name, entity.hp);
    Some(key)
}

/// Point on `target` that shots aim at.
#[must_use]
pub fn aim_point(target: &Entity, config: &SimConfig) -> Vec3 {
    target.position + Vec3::Y * (target.height(config) * 0.5)
}

/// Fires the selected ammunition at `point`.
///
/// Spends one round unless the stock is infinite and starts the cooldown.
/// Returns `None` when the entity has nothing to fire or is still cooling
/// down.
pub fn fire_at(
    shooter: &mut Entity,
    point: Vec3,
    registry: &BlockTypeRegistry,
    config: &SimConfig,
) -> Option<ProjectileRequest> {
    if shooter.shoot_cooldown > 0 {
        return None;
    }
    let ammo = shooter.selected_ammo?;
    let ty = registry.get(ammo).filter(|ty| ty.droppable)?;
    let count = shooter.ammo(ammo);
    if count == 0 {
        return None;
    }
    let origin = shooter.eye(config);
    let direction = (point - origin).try_normalize()?;
    if !is_infinite(count, config) {
        if let Some(stock) = shooter.inventory.get_mut(&ammo) {
            *stock -= 1;
        }
    }
    shooter.shoot_cooldown = config.hostile_shoot_cooldown;
    debug!("{} fires {} towards {point}", shooter.name, ty.name);
    Some(ProjectileRequest {
        origin,
        direction,
        damage: ty.break_damage,
        speed: ty.bullet_speed,
        lifetime: ty.bullet_lifetime,
        shooter: shooter.id,
        ammo,
    })
}

/// Alerts everyone within earshot of `shot`, fired by an entity standing at
/// `shooter_position`.
pub fn alert_from_shot<'a, I>(
    shot: &ProjectileRequest,
    shooter_position: Vec3,
    listeners: I,
    config: &SimConfig,
) where
    I: IntoIterator<Item = &'a mut Entity>,
{
    for listener in listeners {
        if listener.id == shot.shooter
            || horizontal_distance(listener.position, shooter_position) > config.shot_detection_range
        {
            continue;
        }
        listener.alert_timer = config.shot_alert_ticks;
        listener.alert_point = Some(shot.origin);
    }
}

/// Applies a projectile hit and turns the victim towards the shooter.
///
/// Returns the victim's remaining hit points.
pub fn receive_hit(
    victim: &mut Entity,
    damage: i32,
    shooter: Option<(EntityId, Vec3)>,
    config: &SimConfig,
) -> i32 {
    let left = victim.take_damage(damage);
    if let Some((_, from)) = shooter {
        victim.alert_timer = config.hit_alert_ticks;
        victim.alert_point = Some(from);
    }
    left
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::builtin;
    use crate::faction::Faction;
    use rstest::{fixture, rstest};

    #[fixture]
    fn cfg() -> SimConfig {
        SimConfig::default()
    }

    #[fixture]
    fn registry() -> BlockTypeRegistry {
        BlockTypeRegistry::with_defaults()
    }

    fn shooter() -> Entity {
        Entity::new("s", Vec3::new(0.0, 0.5, 0.0), Faction::Guard)
    }

    #[rstest]
    fn unarmed_uses_fallback(cfg: SimConfig, registry: BlockTypeRegistry) {
        assert!((engage_range(&shooter(), &registry, &cfg) - cfg.fallback_engage_range).abs() < 1e-6);
    }

    #[rstest]
    fn depleted_ammo_is_replaced_by_hardest_hitter(registry: BlockTypeRegistry) {
        let mut e = shooter()
            .with_ammo(builtin::STONE, 0)
            .with_ammo(builtin::WOOD, 2)
            .with_ammo(builtin::SAND, 1)
            .with_ammo(builtin::PLANT, 9);
        assert_eq!(auto_equip(&mut e, &registry), Some(builtin::SAND));
        assert_eq!(e.selected_ammo, Some(builtin::SAND));
    }

    #[rstest]
    fn firing_spends_ammo_and_starts_cooldown(cfg: SimConfig, registry: BlockTypeRegistry) {
        let mut e = shooter().with_ammo(builtin::GOLD, 2);
        let shot = fire_at(&mut e, Vec3::new(0.0, 1.4, -5.0), &registry, &cfg).expect("armed");
        assert_eq!(shot.damage, 40);
        assert!((shot.direction.length() - 1.0).abs() < 1e-5);
        assert_eq!(e.ammo(builtin::GOLD), 1);
        assert_eq!(e.shoot_cooldown, cfg.hostile_shoot_cooldown);
        assert!(fire_at(&mut e, Vec3::new(0.0, 1.4, -5.0), &registry, &cfg).is_none());
    }

    #[rstest]
    fn infinite_stock_never_drains(cfg: SimConfig, registry: BlockTypeRegistry) {
        let mut e = shooter().with_ammo(builtin::STONE, cfg.infinite_ammo);
        assert!(fire_at(&mut e, Vec3::new(3.0, 1.0, 0.0), &registry, &cfg).is_some());
        assert_eq!(e.ammo(builtin::STONE), cfg.infinite_ammo);
    }

    #[rstest]
    #[case(100, None)]
    #[case(59, Some("medkit"))]
    fn healing_threshold(cfg: SimConfig, #[case] hp: i32, #[case] eaten: Option<&str>) {
        let items = ItemRegistry::with_defaults();
        let mut e = shooter()
            .with_hp(hp, 100)
            .with_item("medkit", 1)
            .with_item("food_apple", 3);
        assert_eq!(heal_if_needed(&mut e, &items, &cfg).as_deref(), eaten);
        if eaten.is_some() {
            assert_eq!(e.hp, 84);
            assert!(!e.items.contains_key("medkit"));
        }
    }

    #[rstest]
    fn strongest_food_is_eaten_first(cfg: SimConfig) {
        let items = ItemRegistry::with_defaults();
        let mut e = shooter()
            .with_hp(40, 100)
            .with_item("food_apple", 1)
            .with_item("food_bread_ration", 1)
            .with_item("food_beef_jerky", 1);
        // Bread ration and jerky both heal 20; the lower key wins the tie.
        assert_eq!(heal_if_needed(&mut e, &items, &cfg).as_deref(), Some("food_beef_jerky"));
        assert_eq!(e.hp, 60);
    }

    #[rstest]
    fn healing_caps_at_max(cfg: SimConfig) {
        let items = ItemRegistry::with_defaults();
        let mut e = shooter().with_hp(50, 60).with_item("food_piece_of_ambrosia", 1);
        heal_if_needed(&mut e, &items, &cfg);
        assert_eq!(e.hp, 50);
        e.hp = 30;
        assert_eq!(heal_if_needed(&mut e, &items, &cfg).as_deref(), Some("food_piece_of_ambrosia"));
        assert_eq!(e.hp, 60);
    }

    #[rstest]
    fn shots_alert_only_nearby_listeners(cfg: SimConfig, registry: BlockTypeRegistry) {
        let mut s = shooter().with_ammo(builtin::STONE, 3);
        let shot = fire_at(&mut s, Vec3::new(0.0, 1.0, -4.0), &registry, &cfg).expect("armed");
        let mut near = Entity::new("n", Vec3::new(5.0, 0.5, 0.0), Faction::Village);
        let mut far = Entity::new("f", Vec3::new(50.0, 0.5, 0.0), Faction::Village);
        near.id = EntityId(2);
        far.id = EntityId(3);
        alert_from_shot(&shot, s.position, [&mut s, &mut near, &mut far], &cfg);
        assert_eq!(near.alert_timer, cfg.shot_alert_ticks);
        assert_eq!(near.alert_point, Some(shot.origin));
        assert_eq!(far.alert_timer, 0);
        assert_eq!(s.alert_timer, 0);
    }

    #[rstest]
    fn hits_alert_towards_the_shooter(cfg: SimConfig) {
        let mut victim = shooter();
        let left = receive_hit(&mut victim, 120, Some((EntityId(7), Vec3::X)), &cfg);
        assert_eq!(left, 0);
        assert_eq!(victim.alert_timer, cfg.hit_alert_ticks);
        assert_eq!(victim.alert_point, Some(Vec3::X));
    }
}
