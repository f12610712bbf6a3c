//! The explicit simulation context and its per-tick update.
//!
//! [`Simulation`] owns every piece of mutable state: configuration, the
//! block world, the entity directory and the intent outbox. Nothing is
//! global; collaborators reach the state only through this type.
use glam::{IVec3, Vec3};
use log::{debug, info};

use crate::ai::{think, AiContext};
use crate::block::{Block, BlockDamage, BlockTypeId};
use crate::collision::{apply_gravity, resolve_vertical};
use crate::combat::{alert_from_shot, receive_hit};
use crate::config::SimConfig;
use crate::directory::{ControlError, EntityDirectory};
use crate::entity::{Entity, EntityId, TargetKind};
use crate::intents::{Intent, IntentOutbox, RemovalReason};
use crate::interaction::{Interactable, InteractionContext, InteractionOutcome};
use crate::movement::{drive_player, follow_target, PlayerInput};
use crate::pathfinding::{Pathfinder, Waypoint};
use crate::spatial::SpatialQuery;
use crate::world::{World, WorldError};

/// Complete simulation state.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    world: World,
    entities: EntityDirectory,
    outbox: IntentOutbox,
    ticks: u64,
}

impl Simulation {
    /// Empty simulation with the built-in registries.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let world = World::new(config.block_size);
        Self::with_world(config, world)
    }

    /// Simulation over an existing world.
    #[must_use]
    pub fn with_world(config: SimConfig, world: World) -> Self {
        Self {
            config,
            world,
            entities: EntityDirectory::new(),
            outbox: IntentOutbox::default(),
            ticks: 0,
        }
    }

    /// Active parameters.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The block world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The entity directory.
    #[must_use]
    pub const fn entities(&self) -> &EntityDirectory {
        &self.entities
    }

    /// Mutable access to the entity directory for editor tooling.
    pub fn entities_mut(&mut self) -> &mut EntityDirectory {
        &mut self.entities
    }

    /// Looks up an entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Ticks completed so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Intents queued since the last drain.
    #[must_use]
    pub fn pending_intents(&self) -> &[Intent] {
        self.outbox.as_slice()
    }

    /// Takes every queued intent, oldest first.
    pub fn drain_intents(&mut self) -> Vec<Intent> {
        self.outbox.drain().collect()
    }

    /// Spatial view over the current world.
    #[must_use]
    pub fn space(&self) -> SpatialQuery<'_, World> {
        SpatialQuery::new(&self.world, &self.config)
    }

    /// Adds an entity to the end of the update order.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let name = entity.name.clone();
        let id = self.entities.spawn(entity);
        debug!("spawned {name} as {id:?}");
        id
    }

    /// Places a block.
    ///
    /// # Errors
    /// Fails for unknown block types and occupied cells.
    pub fn add_block(&mut self, cell: IVec3, type_id: BlockTypeId) -> Result<Block, WorldError> {
        self.world.add_block(cell, type_id)
    }

    /// Removes a block.
    ///
    /// # Errors
    /// Fails when the cell is empty.
    pub fn remove_block(&mut self, cell: IVec3) -> Result<Block, WorldError> {
        self.world.remove_block(cell)
    }

    /// Damages a block, queueing [`Intent::BlockDestroyed`] when it breaks.
    ///
    /// # Errors
    /// Fails when the cell is empty.
    pub fn damage_block(&mut self, cell: IVec3, amount: i32) -> Result<BlockDamage, WorldError> {
        let outcome = self.world.damage_block(cell, amount)?;
        if let BlockDamage::Destroyed { type_id } = outcome {
            self.outbox.push(Intent::BlockDestroyed { cell, type_id });
        }
        Ok(outcome)
    }

    /// Reports a projectile hit on `victim`.
    ///
    /// Returns the victim's remaining hit points. Defeated autonomous
    /// entities leave at the end of the next tick.
    ///
    /// # Errors
    /// Fails when the victim does not exist.
    pub fn apply_hit(
        &mut self,
        victim: EntityId,
        damage: i32,
        shooter: Option<EntityId>,
    ) -> Result<i32, WorldError> {
        let source = shooter
            .and_then(|id| self.entities.get(id))
            .map(|s| (s.id, s.position));
        let target = self
            .entities
            .get_mut(victim)
            .ok_or(WorldError::UnknownEntity(victim))?;
        let left = receive_hit(target, damage, source, &self.config);
        debug!("{} takes {damage} damage, {left} left", target.name);
        Ok(left)
    }

    /// Hands player control to the entity at `index`.
    ///
    /// # Errors
    /// Fails for out-of-range indices.
    pub fn switch_control(&mut self, index: usize) -> Result<EntityId, ControlError> {
        self.entities.switch_control(index)
    }

    /// Orders an entity to walk to `point`, retrying until it arrives or the
    /// order is replaced or cancelled.
    ///
    /// # Errors
    /// Fails when the entity does not exist.
    pub fn command_move(&mut self, id: EntityId, point: Vec3) -> Result<(), WorldError> {
        let entity = self.entities.get_mut(id).ok_or(WorldError::UnknownEntity(id))?;
        entity.clear_target();
        entity.set_target(point, TargetKind::Directed);
        Ok(())
    }

    /// Drops an entity's movement goal.
    ///
    /// # Errors
    /// Fails when the entity does not exist.
    pub fn cancel_move(&mut self, id: EntityId) -> Result<(), WorldError> {
        self.entities
            .get_mut(id)
            .ok_or(WorldError::UnknownEntity(id))?
            .clear_target();
        Ok(())
    }

    /// Route an entity would take to `point`.
    ///
    /// Always empty for the player-controlled entity.
    ///
    /// # Errors
    /// Fails when the entity does not exist.
    pub fn find_path_for(&self, id: EntityId, point: Vec3) -> Result<Vec<Waypoint>, WorldError> {
        let entity = self.entities.get(id).ok_or(WorldError::UnknownEntity(id))?;
        if self.entities.is_controlled(id) {
            return Ok(Vec::new());
        }
        Ok(Pathfinder::new(self.space()).find_path(entity.position, point))
    }

    /// `actor` uses `target`.
    ///
    /// # Errors
    /// Fails when the actor or the target does not exist.
    pub fn interact(
        &mut self,
        actor: EntityId,
        target: Interactable,
    ) -> Result<InteractionOutcome, WorldError> {
        if self.entities.get(actor).is_none() {
            return Err(WorldError::UnknownEntity(actor));
        }
        let mut ctx = InteractionContext {
            world: &mut self.world,
            entities: &self.entities,
            outbox: &mut self.outbox,
        };
        target.on_use(&mut ctx, actor)
    }

    /// Advances every entity by one tick in directory order, then removes
    /// defeated and out-of-bounds entities.
    pub fn tick(&mut self, input: &PlayerInput) {
        let Self {
            config,
            world,
            entities,
            outbox,
            ticks,
        } = self;
        let config = &*config;
        let world = &*world;
        let space = SpatialQuery::new(world, config);
        let ctx = AiContext {
            space,
            block_types: &world.block_types,
            items: &world.items,
            controlled: entities.controlled(),
        };

        for index in 0..entities.len() {
            let controlled = entities
                .at(index)
                .is_some_and(|e| entities.is_controlled(e.id));
            let Some((me, others)) = entities.split_at_mut(index) else {
                continue;
            };
            apply_gravity(me, config);
            let mut fired = None;
            if controlled {
                drive_player(me, input, &space);
            } else {
                fired = think(me, others, &ctx).map(|shot| (shot, me.position, me.no_clip));
                if me.is_alive() {
                    follow_target(me, &space);
                }
            }
            resolve_vertical(me, &space);

            if let Some((shot, from, silent)) = fired {
                outbox.push(Intent::Projectile(shot));
                if !silent {
                    alert_from_shot(&shot, from, entities.iter_mut(), config);
                }
            }
        }

        remove_casualties(entities, outbox, config);
        *ticks += 1;
    }
}

fn removal_reason(entity: &Entity, entities: &EntityDirectory, config: &SimConfig) -> Option<RemovalReason> {
    if entity.position.y < config.world_min_y {
        Some(RemovalReason::OutOfBounds)
    } else if !entity.is_alive() && !entities.is_controlled(entity.id) {
        Some(RemovalReason::Defeated)
    } else {
        None
    }
}

fn remove_casualties(entities: &mut EntityDirectory, outbox: &mut IntentOutbox, config: &SimConfig) {
    let doomed: Vec<_> = entities
        .iter()
        .filter_map(|e| removal_reason(e, entities, config).map(|reason| (e.id, reason)))
        .collect();
    for (id, reason) in doomed {
        let Some(entity) = entities.remove(id) else {
            continue;
        };
        let mut drops: Vec<_> = entity
            .inventory
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(ty, count)| (*ty, *count))
            .collect();
        drops.sort_unstable();
        info!("{} removed ({reason:?})", entity.name);
        outbox.push(Intent::EntityRemoved {
            id,
            reason,
            position: entity.position,
            drops,
        });
    }
}
