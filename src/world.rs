//! The authoritative block world and the query seam the simulation reads it
//! through.
use glam::IVec3;
use thiserror::Error;

use crate::block::{Block, BlockDamage, BlockStore, BlockTypeId, BlockTypeRegistry};
use crate::entity::EntityId;
use crate::geometry::Aabb;
use crate::item::ItemRegistry;

/// Failures of world and directory edits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// A block already occupies the cell.
    #[error("cell {cell} is already occupied")]
    Occupied {
        /// The contested cell.
        cell: IVec3,
    },
    /// No block type with this id is registered.
    #[error("unknown block type {0:?}")]
    UnknownBlockType(BlockTypeId),
    /// No block occupies the cell.
    #[error("no block at {0}")]
    NoBlock(IVec3),
    /// The entity does not exist (any more).
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
}

/// Read access to the current block set.
///
/// Implementations must answer from live state; the simulation never caches
/// results across calls.
#[cfg_attr(test, mockall::automock)]
pub trait WorldQuery {
    /// Blocks whose cells may intersect `region`, solid or not.
    fn blocks_near(&self, region: &Aabb) -> Vec<Block>;
}

impl WorldQuery for BlockStore {
    fn blocks_near(&self, region: &Aabb) -> Vec<Block> {
        self.blocks_in(region)
    }
}

/// Blocks plus the content registries they refer to.
#[derive(Debug, Clone)]
pub struct World {
    /// Placed blocks.
    pub blocks: BlockStore,
    /// Block type definitions.
    pub block_types: BlockTypeRegistry,
    /// Consumable item definitions.
    pub items: ItemRegistry,
}

impl World {
    /// Empty world with the built-in registries.
    #[must_use]
    pub fn new(block_size: f32) -> Self {
        Self {
            blocks: BlockStore::new(block_size),
            block_types: BlockTypeRegistry::with_defaults(),
            items: ItemRegistry::with_defaults(),
        }
    }

    /// Places a block of a registered type.
    ///
    /// # Errors
    /// Fails for unknown types and occupied cells.
    pub fn add_block(&mut self, cell: IVec3, type_id: BlockTypeId) -> Result<Block, WorldError> {
        let ty = self
            .block_types
            .get(type_id)
            .ok_or(WorldError::UnknownBlockType(type_id))?;
        self.blocks.add(cell, ty)
    }

    /// Removes the block at `cell`.
    ///
    /// # Errors
    /// Fails when the cell is empty.
    pub fn remove_block(&mut self, cell: IVec3) -> Result<Block, WorldError> {
        self.blocks.remove(cell).ok_or(WorldError::NoBlock(cell))
    }

    /// Damages the block at `cell`.
    ///
    /// # Errors
    /// Fails when the cell is empty.
    pub fn damage_block(&mut self, cell: IVec3, amount: i32) -> Result<BlockDamage, WorldError> {
        self.blocks
            .damage(cell, amount)
            .ok_or(WorldError::NoBlock(cell))
    }
}

impl WorldQuery for World {
    fn blocks_near(&self, region: &Aabb) -> Vec<Block> {
        self.blocks.blocks_in(region)
    }
}
