//! Occupancy, ground and sight queries over the live block set.
//!
//! [`SpatialQuery`] holds no state of its own; every call goes back to the
//! [`WorldQuery`] it wraps.
use glam::Vec3;

use crate::block::Block;
use crate::config::SimConfig;
use crate::geometry::Aabb;
use crate::world::WorldQuery;

/// Vertical slack when matching a surface to a height.
const SURFACE_SLACK: f32 = 0.1;
/// Vertical reach of column scans.
const COLUMN_REACH: f32 = 1.0e6;

/// Stateless query facade over a world.
#[derive(Debug)]
pub struct SpatialQuery<'a, W: ?Sized> {
    world: &'a W,
    config: &'a SimConfig,
}

impl<W: ?Sized> Clone for SpatialQuery<'_, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W: ?Sized> Copy for SpatialQuery<'_, W> {}

impl<'a, W: WorldQuery + ?Sized> SpatialQuery<'a, W> {
    /// Wraps a world and the parameters used to size entity boxes.
    #[must_use]
    pub const fn new(world: &'a W, config: &'a SimConfig) -> Self {
        Self { world, config }
    }

    /// Parameters the queries run with.
    #[must_use]
    pub const fn config(&self) -> &'a SimConfig {
        self.config
    }

    fn block_box(&self, block: &Block) -> Aabb {
        Aabb::cube(block.centre(self.config.block_size), self.config.block_half())
    }

    /// Solid blocks overlapping an entity box of `height` with feet at `pos`.
    #[must_use]
    pub fn obstructions(&self, pos: Vec3, height: f32) -> Vec<Block> {
        let body = Aabb::entity(pos, self.config.entity_radius, height);
        self.world
            .blocks_near(&body)
            .into_iter()
            .filter(|b| b.solid && self.block_box(b).overlaps(&body))
            .collect()
    }

    /// Whether an entity box of `height` at `pos` overlaps any solid block.
    #[must_use]
    pub fn is_blocked_with_height(&self, pos: Vec3, height: f32) -> bool {
        !self.obstructions(pos, height).is_empty()
    }

    /// Whether an entity at `pos` in the given stance would collide.
    ///
    /// # Examples
    /// ```
    /// use glam::{IVec3, Vec3};
    /// use voxsim::{block::builtin, config::SimConfig, spatial::SpatialQuery, world::World};
    /// let cfg = SimConfig::default();
    /// let mut world = World::new(cfg.block_size);
    /// world.add_block(IVec3::new(0, 2, 0), builtin::STONE).unwrap();
    /// let space = SpatialQuery::new(&world, &cfg);
    /// let feet = Vec3::new(0.0, 0.5, 0.0);
    /// assert!(space.is_blocked(feet, false));
    /// assert!(!space.is_blocked(feet, true));
    /// ```
    #[must_use]
    pub fn is_blocked(&self, pos: Vec3, crouching: bool) -> bool {
        self.is_blocked_with_height(pos, self.config.entity_height_for(crouching))
    }

    /// Top faces of the solid blocks in the column under `(x, z)`.
    fn column_tops(&self, x: f32, z: f32) -> impl Iterator<Item = f32> {
        let tol = self.config.ground_tolerance;
        let size = self.config.block_size;
        let region = Aabb::new(
            Vec3::new(x - tol, -COLUMN_REACH, z - tol),
            Vec3::new(x + tol, COLUMN_REACH, z + tol),
        );
        self.world
            .blocks_near(&region)
            .into_iter()
            .filter(move |b| {
                let c = b.centre(size);
                b.solid && (c.x - x).abs() < tol && (c.z - z).abs() < tol
            })
            .map(move |b| b.top(size))
    }

    /// Highest solid top face in the column, if the column holds any block.
    #[must_use]
    pub fn column_top(&self, x: f32, z: f32) -> Option<f32> {
        self.column_tops(x, z).reduce(f32::max)
    }

    /// Highest solid top face in the column, or `0` over empty columns.
    #[must_use]
    pub fn ground_height(&self, x: f32, z: f32) -> f32 {
        self.column_top(x, z).unwrap_or(0.0)
    }

    /// Highest solid top face in the column at or just above `pos.y`.
    ///
    /// Unlike [`ground_height`](Self::ground_height) this ignores ceilings.
    #[must_use]
    pub fn ground_below(&self, pos: Vec3) -> Option<f32> {
        self.column_tops(pos.x, pos.z)
            .filter(|top| *top <= pos.y + SURFACE_SLACK)
            .reduce(f32::max)
    }

    /// Whether a surface supports feet at `pos`.
    #[must_use]
    pub fn has_ground(&self, pos: Vec3) -> bool {
        self.ground_below(pos)
            .is_some_and(|top| top >= pos.y - SURFACE_SLACK)
    }

    /// Whether an entity could stand at `pos` in the given stance.
    #[must_use]
    pub fn can_walk_to(&self, pos: Vec3, crouching: bool) -> bool {
        self.has_ground(pos) && !self.is_blocked(pos, crouching)
    }

    /// Whether there is headroom to stand at `pos`.
    #[must_use]
    pub fn can_stand_up(&self, pos: Vec3) -> bool {
        !self.is_blocked(pos, false)
    }

    /// Whether the eye of an observer at `from` sees the eye of a target at
    /// `to`.
    ///
    /// The ray stops a little short of the target so the target's own
    /// footing never counts as an obstruction.
    #[must_use]
    pub fn has_line_of_sight(&self, from: Vec3, from_eye: f32, to: Vec3, to_eye: f32) -> bool {
        let origin = from + Vec3::Y * from_eye;
        let dir = (to + Vec3::Y * to_eye) - origin;
        let length = dir.length();
        if length <= self.config.line_of_sight_epsilon {
            return true;
        }
        let max_t = (length - self.config.line_of_sight_epsilon) / length;
        let span = Aabb::new(origin, origin).union(&Aabb::new(origin + dir, origin + dir));
        !self
            .world
            .blocks_near(&span)
            .iter()
            .filter(|b| b.solid)
            .any(|b| self.block_box(b).ray_entry(origin, dir, max_t).is_some())
    }
}
