//! Block types, the append-only type registry and placed blocks.
//!
//! Block types are immutable once registered. The editor adds new types via
//! [`BlockTypeRegistry::register`]; the simulation only reads them.
use std::collections::BTreeSet;

use glam::{IVec2, IVec3, Vec3};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Aabb;
use crate::numeric::{cell_to_world, round_to_cell};
use crate::world::WorldError;

/// Stable identifier of a block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockTypeId(pub u32);

/// What happens when an actor uses a block of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UseAction {
    /// Toggle solidity of the connected group of blocks of this type.
    ToggleDoor,
    /// Briefly highlight the block.
    Highlight,
}

/// Shared, immutable definition of a block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockType {
    /// Registry-assigned identifier.
    pub id: BlockTypeId,
    /// Display name.
    pub name: String,
    /// Whether freshly placed blocks obstruct movement and sight.
    pub solid: bool,
    /// Hit points of a freshly placed block.
    pub max_hp: i32,
    /// Damage dealt when the block is fired as ammunition.
    pub break_damage: i32,
    /// Projectile speed per tick when fired.
    pub bullet_speed: f32,
    /// Projectile lifetime in ticks when fired.
    pub bullet_lifetime: u32,
    /// Whether the type can be fired or dropped as an item.
    pub droppable: bool,
    /// Optional behaviour on use.
    pub on_use: Option<UseAction>,
}

impl BlockType {
    /// Creates a solid, droppable type with the given combat stats.
    ///
    /// The id is a placeholder until the type is registered.
    #[must_use]
    pub fn new(name: impl Into<String>, max_hp: i32, break_damage: i32) -> Self {
        Self {
            id: BlockTypeId(0),
            name: name.into(),
            solid: true,
            max_hp,
            break_damage,
            bullet_speed: 0.5,
            bullet_lifetime: 20,
            droppable: true,
            on_use: None,
        }
    }

    /// Sets projectile speed and lifetime.
    #[must_use]
    pub const fn with_ballistics(mut self, speed: f32, lifetime: u32) -> Self {
        self.bullet_speed = speed;
        self.bullet_lifetime = lifetime;
        self
    }

    /// Marks the type as passable decoration that cannot be fired.
    #[must_use]
    pub const fn decorative(mut self) -> Self {
        self.solid = false;
        self.droppable = false;
        self
    }

    /// Attaches a use action.
    #[must_use]
    pub const fn with_use(mut self, action: UseAction) -> Self {
        self.on_use = Some(action);
        self
    }
}

/// Errors raised by [`BlockTypeRegistry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A type with the same name already exists.
    #[error("block type `{0}` is already registered")]
    DuplicateName(String),
}

/// Append-only collection of block types with generated ids.
#[derive(Debug, Clone, Default)]
pub struct BlockTypeRegistry {
    types: Vec<BlockType>,
}

/// Ids of the built-in types installed by [`BlockTypeRegistry::with_defaults`].
pub mod builtin {
    use super::BlockTypeId;

    /// Stone.
    pub const STONE: BlockTypeId = BlockTypeId(1);
    /// Grass.
    pub const GRASS: BlockTypeId = BlockTypeId(2);
    /// Wood.
    pub const WOOD: BlockTypeId = BlockTypeId(3);
    /// Gold; highlights on use.
    pub const GOLD: BlockTypeId = BlockTypeId(4);
    /// Door; toggles on use.
    pub const DOOR: BlockTypeId = BlockTypeId(5);
    /// Sand.
    pub const SAND: BlockTypeId = BlockTypeId(6);
    /// Editor-only player spawn marker.
    pub const PLAYER_SPAWN: BlockTypeId = BlockTypeId(7);
    /// Passable plant.
    pub const PLANT: BlockTypeId = BlockTypeId(8);
}

impl BlockTypeRegistry {
    /// Registry holding the built-in types with ids 1 to 8.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        let defaults = [
            BlockType::new("Stone", 100, 20).with_ballistics(0.5, 20),
            BlockType::new("Grass", 50, 30).with_ballistics(0.4, 15),
            BlockType::new("Wood", 75, 25).with_ballistics(0.45, 20),
            BlockType::new("Gold", 150, 40)
                .with_ballistics(0.6, 25)
                .with_use(UseAction::Highlight),
            BlockType::new("Door", 60, 22)
                .with_ballistics(0.4, 15)
                .with_use(UseAction::ToggleDoor),
            BlockType::new("Sand", 40, 35).with_ballistics(0.35, 15),
            BlockType::new("Player Spawn", i32::MAX, 0).decorative(),
            BlockType::new("Plant", 10, 1).decorative(),
        ];
        for ty in defaults {
            registry.push(ty);
        }
        registry
    }

    fn push(&mut self, mut ty: BlockType) -> BlockTypeId {
        let next = u32::try_from(self.types.len()).unwrap_or(u32::MAX - 1) + 1;
        ty.id = BlockTypeId(next);
        self.types.push(ty);
        BlockTypeId(next)
    }

    /// Appends a new type and returns its generated id.
    ///
    /// # Examples
    /// ```
    /// use voxsim::block::{BlockType, BlockTypeRegistry};
    /// let mut registry = BlockTypeRegistry::with_defaults();
    /// let id = registry.register(BlockType::new("Obsidian", 500, 60)).unwrap();
    /// assert_eq!(registry.get(id).map(|t| t.name.as_str()), Some("Obsidian"));
    /// ```
    pub fn register(&mut self, ty: BlockType) -> Result<BlockTypeId, RegistryError> {
        if self.types.iter().any(|t| t.name == ty.name) {
            return Err(RegistryError::DuplicateName(ty.name));
        }
        Ok(self.push(ty))
    }

    /// Looks up a type by id.
    #[must_use]
    pub fn get(&self, id: BlockTypeId) -> Option<&BlockType> {
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.types.get(index)
    }

    /// Iterates over all registered types in id order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockType> {
        self.types.iter()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// A placed voxel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Block {
    /// Grid cell the block occupies.
    pub cell: IVec3,
    /// Type of the block.
    pub type_id: BlockTypeId,
    /// Current solidity; doors toggle this.
    pub solid: bool,
    /// Remaining hit points.
    pub hp: i32,
    /// Hit points when freshly placed.
    pub max_hp: i32,
}

impl Block {
    /// Creates a block at `cell` with the type's initial state.
    #[must_use]
    pub fn new(cell: IVec3, ty: &BlockType) -> Self {
        Self {
            cell,
            type_id: ty.id,
            solid: ty.solid,
            hp: ty.max_hp,
            max_hp: ty.max_hp,
        }
    }

    /// World-space centre of the block.
    #[must_use]
    pub fn centre(&self, block_size: f32) -> Vec3 {
        Vec3::new(
            cell_to_world(self.cell.x),
            cell_to_world(self.cell.y),
            cell_to_world(self.cell.z),
        ) * block_size
    }

    /// Height of the block's top face.
    #[must_use]
    pub fn top(&self, block_size: f32) -> f32 {
        (cell_to_world(self.cell.y) + 0.5) * block_size
    }
}

/// Outcome of damaging a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDamage {
    /// The block survived with the given hit points.
    Damaged {
        /// Remaining hit points.
        hp: i32,
    },
    /// The block reached zero hit points and was removed.
    Destroyed {
        /// Type of the destroyed block, for drop spawning.
        type_id: BlockTypeId,
    },
}

/// Authoritative set of placed blocks keyed by cell.
///
/// At most one block occupies a cell. A per-column index keeps region
/// queries proportional to the columns they touch.
#[derive(Debug, Clone)]
pub struct BlockStore {
    block_size: f32,
    blocks: HashMap<IVec3, Block>,
    columns: HashMap<IVec2, BTreeSet<i32>>,
}

impl BlockStore {
    /// Creates an empty store for blocks of the given edge length.
    #[must_use]
    pub fn new(block_size: f32) -> Self {
        Self {
            block_size,
            blocks: HashMap::new(),
            columns: HashMap::new(),
        }
    }

    /// Edge length of the stored blocks.
    #[must_use]
    pub const fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Cell containing a world point.
    #[must_use]
    pub fn cell_at(&self, point: Vec3) -> IVec3 {
        let scaled = point / self.block_size;
        IVec3::new(
            round_to_cell(scaled.x),
            round_to_cell(scaled.y),
            round_to_cell(scaled.z),
        )
    }

    /// Places a block of type `ty` at `cell`.
    ///
    /// # Errors
    /// Returns [`WorldError::Occupied`] when the cell already holds a block.
    pub fn add(&mut self, cell: IVec3, ty: &BlockType) -> Result<Block, WorldError> {
        if self.blocks.contains_key(&cell) {
            return Err(WorldError::Occupied { cell });
        }
        let block = Block::new(cell, ty);
        self.blocks.insert(cell, block);
        self.columns
            .entry(IVec2::new(cell.x, cell.z))
            .or_default()
            .insert(cell.y);
        Ok(block)
    }

    /// Removes and returns the block at `cell`.
    pub fn remove(&mut self, cell: IVec3) -> Option<Block> {
        let block = self.blocks.remove(&cell)?;
        let key = IVec2::new(cell.x, cell.z);
        if let Some(column) = self.columns.get_mut(&key) {
            column.remove(&cell.y);
            if column.is_empty() {
                self.columns.remove(&key);
            }
        }
        Some(block)
    }

    /// Block at `cell`, if any.
    #[must_use]
    pub fn get(&self, cell: IVec3) -> Option<&Block> {
        self.blocks.get(&cell)
    }

    /// Sets the solidity of the block at `cell`; returns whether it existed.
    pub fn set_solid(&mut self, cell: IVec3, solid: bool) -> bool {
        self.blocks.get_mut(&cell).map(|b| b.solid = solid).is_some()
    }

    /// Subtracts `amount` hit points, removing the block at zero.
    pub fn damage(&mut self, cell: IVec3, amount: i32) -> Option<BlockDamage> {
        let block = self.blocks.get_mut(&cell)?;
        block.hp = block.hp.saturating_sub(amount.max(0));
        if block.hp > 0 {
            return Some(BlockDamage::Damaged { hp: block.hp });
        }
        let type_id = block.type_id;
        self.remove(cell);
        Some(BlockDamage::Destroyed { type_id })
    }

    /// Iterates over every block in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Number of placed blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the store holds no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Inclusive range of cell indices whose blocks may intersect `[lo, hi]`.
    fn cell_span(&self, lo: f32, hi: f32) -> (i32, i32) {
        let half = self.block_size * 0.5;
        (
            round_to_cell(((lo - half) / self.block_size).floor()),
            round_to_cell(((hi + half) / self.block_size).ceil()),
        )
    }

    /// Blocks whose cells may intersect `region`, solid or not.
    ///
    /// The result is a superset; callers perform exact overlap tests.
    #[must_use]
    pub fn blocks_in(&self, region: &Aabb) -> Vec<Block> {
        let (x0, x1) = self.cell_span(region.min.x, region.max.x);
        let (y0, y1) = self.cell_span(region.min.y, region.max.y);
        let (z0, z1) = self.cell_span(region.min.z, region.max.z);
        let columns = (i64::from(x1) - i64::from(x0) + 1) * (i64::from(z1) - i64::from(z0) + 1);
        let in_y = |b: &&Block| (y0..=y1).contains(&b.cell.y);
        if usize::try_from(columns).map_or(true, |n| n > self.columns.len()) {
            return self
                .blocks
                .values()
                .filter(|b| (x0..=x1).contains(&b.cell.x) && (z0..=z1).contains(&b.cell.z))
                .filter(in_y)
                .copied()
                .collect();
        }
        let mut found = Vec::new();
        for x in x0..=x1 {
            for z in z0..=z1 {
                let Some(column) = self.columns.get(&IVec2::new(x, z)) else {
                    continue;
                };
                found.extend(
                    column
                        .range(y0..=y1)
                        .filter_map(|y| self.blocks.get(&IVec3::new(x, *y, z)))
                        .copied(),
                );
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn registry() -> BlockTypeRegistry {
        BlockTypeRegistry::with_defaults()
    }

    #[rstest]
    fn builtin_ids_match_registry(registry: BlockTypeRegistry) {
        assert_eq!(registry.len(), 8);
        assert_eq!(registry.get(builtin::DOOR).map(|t| t.name.as_str()), Some("Door"));
        assert_eq!(
            registry.get(builtin::DOOR).and_then(|t| t.on_use),
            Some(UseAction::ToggleDoor)
        );
        assert!(!registry.get(builtin::PLANT).map_or(true, |t| t.solid));
    }

    #[rstest]
    fn registration_appends_with_fresh_ids(mut registry: BlockTypeRegistry) {
        let first = registry
            .register(BlockType::new("Glass", 5, 2))
            .expect("new type");
        let second = registry
            .register(BlockType::new("Iron", 300, 45))
            .expect("new type");
        assert_eq!(first, BlockTypeId(9));
        assert_eq!(second, BlockTypeId(10));
        assert_eq!(registry.get(builtin::STONE).map(|t| t.max_hp), Some(100));
    }

    #[rstest]
    fn duplicate_names_are_rejected(mut registry: BlockTypeRegistry) {
        assert_eq!(
            registry.register(BlockType::new("Stone", 1, 1)),
            Err(RegistryError::DuplicateName("Stone".to_owned()))
        );
        assert_eq!(registry.len(), 8);
    }

    #[rstest]
    #[case(BlockTypeId(0))]
    #[case(BlockTypeId(99))]
    fn unknown_ids_miss(registry: BlockTypeRegistry, #[case] id: BlockTypeId) {
        assert!(registry.get(id).is_none());
    }

    #[rstest]
    fn block_geometry_follows_cell(registry: BlockTypeRegistry) {
        let ty = registry.get(builtin::SAND).expect("sand");
        let block = Block::new(IVec3::new(2, 1, -3), ty);
        assert_eq!(block.centre(1.0), Vec3::new(2.0, 1.0, -3.0));
        assert!((block.top(1.0) - 1.5).abs() < f32::EPSILON);
        assert_eq!(block.hp, 40);
    }

    fn store_with(registry: &BlockTypeRegistry, cells: &[IVec3]) -> BlockStore {
        let stone = registry.get(builtin::STONE).expect("stone");
        let mut store = BlockStore::new(1.0);
        for cell in cells {
            store.add(*cell, stone).expect("free cell");
        }
        store
    }

    #[rstest]
    fn occupied_cells_reject_placement(registry: BlockTypeRegistry) {
        let mut store = store_with(&registry, &[IVec3::ZERO]);
        let sand = registry.get(builtin::SAND).expect("sand");
        assert_eq!(
            store.add(IVec3::ZERO, sand),
            Err(WorldError::Occupied { cell: IVec3::ZERO })
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(IVec3::ZERO).map(|b| b.type_id), Some(builtin::STONE));
    }

    #[rstest]
    fn damage_destroys_at_zero(registry: BlockTypeRegistry) {
        let mut store = store_with(&registry, &[IVec3::ONE]);
        assert_eq!(
            store.damage(IVec3::ONE, 60),
            Some(BlockDamage::Damaged { hp: 40 })
        );
        assert_eq!(
            store.damage(IVec3::ONE, 40),
            Some(BlockDamage::Destroyed { type_id: builtin::STONE })
        );
        assert!(store.get(IVec3::ONE).is_none());
        assert!(store.damage(IVec3::ONE, 1).is_none());
    }

    #[rstest]
    fn region_queries_follow_columns(registry: BlockTypeRegistry) {
        let mut store = store_with(
            &registry,
            &[IVec3::new(0, 0, 0), IVec3::new(0, 5, 0), IVec3::new(4, 0, 0)],
        );
        let near = store.blocks_in(&Aabb::new(Vec3::new(-0.3, 0.4, -0.3), Vec3::new(0.3, 2.0, 0.3)));
        assert_eq!(near.len(), 1);
        assert_eq!(near.first().map(|b| b.cell), Some(IVec3::ZERO));

        store.remove(IVec3::ZERO);
        let column = store.blocks_in(&Aabb::new(Vec3::new(-0.3, -50.0, -0.3), Vec3::new(0.3, 50.0, 0.3)));
        assert_eq!(column.iter().map(|b| b.cell).collect::<Vec<_>>(), vec![IVec3::new(0, 5, 0)]);
    }

    #[rstest]
    fn wide_regions_fall_back_to_a_scan(registry: BlockTypeRegistry) {
        let store = store_with(&registry, &[IVec3::new(-30, 0, 2), IVec3::new(30, 1, 2)]);
        let all = store.blocks_in(&Aabb::new(Vec3::splat(-100.0), Vec3::splat(100.0)));
        assert_eq!(all.len(), 2);
    }
}
