//! Ordered entity list with exactly one player-controlled entry.
use log::{info, warn};
use thiserror::Error;

use crate::entity::{Entity, EntityId};

/// Failures of [`EntityDirectory::switch_control`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// The index does not name an entity.
    #[error("no entity at index {index} (directory holds {len})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Directory length.
        len: usize,
    },
}

/// Entities in update order.
///
/// The first spawned entity starts out player-controlled. Control moves only
/// through [`switch_control`](Self::switch_control) or when the controlled
/// entity is removed.
#[derive(Debug, Clone, Default)]
pub struct EntityDirectory {
    entities: Vec<Entity>,
    next_id: u32,
    controlled: Option<EntityId>,
}

/// Every entity except one, borrowed immutably.
#[derive(Debug, Clone, Copy)]
pub struct Others<'a> {
    before: &'a [Entity],
    after: &'a [Entity],
}

impl<'a> Others<'a> {
    /// Iterates in directory order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Entity> {
        self.before.iter().chain(self.after.iter())
    }

    /// Looks up an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        self.iter().find(|e| e.id == id)
    }
}

impl EntityDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entity, assigning it a fresh id.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        entity.id = id;
        self.entities.push(entity);
        self.controlled.get_or_insert(id);
        id
    }

    /// Removes an entity; control passes to the first remaining entity when
    /// the controlled one goes.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.index_of(id)?;
        let entity = self.entities.remove(index);
        if self.controlled == Some(id) {
            self.controlled = self.entities.first().map(|e| e.id);
            warn!(
                "controlled entity {} removed; control passes to {:?}",
                entity.name, self.controlled
            );
        }
        Some(entity)
    }

    /// Gives player control to the entity at `index`.
    ///
    /// No other entity's state is touched.
    ///
    /// # Errors
    /// Returns [`ControlError::OutOfRange`] for invalid indices.
    pub fn switch_control(&mut self, index: usize) -> Result<EntityId, ControlError> {
        let entity = self.entities.get(index).ok_or(ControlError::OutOfRange {
            index,
            len: self.entities.len(),
        })?;
        info!("player now controls {} ({:?})", entity.name, entity.id);
        self.controlled = Some(entity.id);
        Ok(entity.id)
    }

    /// Id of the player-controlled entity.
    #[must_use]
    pub const fn controlled(&self) -> Option<EntityId> {
        self.controlled
    }

    /// Directory index of the player-controlled entity.
    #[must_use]
    pub fn controlled_index(&self) -> Option<usize> {
        self.controlled.and_then(|id| self.index_of(id))
    }

    /// Whether `id` is the player-controlled entity.
    #[must_use]
    pub fn is_controlled(&self, id: EntityId) -> bool {
        self.controlled == Some(id)
    }

    /// Position of `id` in update order.
    #[must_use]
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    /// Looks up an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Looks up an entity for mutation.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Entity at a directory index.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    /// Splits out the entity at `index` for mutation alongside a read-only
    /// view of all others.
    pub fn split_at_mut(&mut self, index: usize) -> Option<(&mut Entity, Others<'_>)> {
        if index >= self.entities.len() {
            return None;
        }
        let (before, rest) = self.entities.split_at_mut(index);
        let (me, after) = rest.split_first_mut()?;
        Some((
            me,
            Others {
                before: &*before,
                after: &*after,
            },
        ))
    }

    /// Iterates in update order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Iterates mutably in update order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
