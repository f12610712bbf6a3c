//! Grid A* over walk, crouch, jump, leap and drop moves.
//!
//! Cells are block-aligned horizontally; a cell's height is the surface the
//! entity would stand on, so heights are not restricted to whole cells.
//! Searches are recomputed from scratch on every call and bounded by an
//! expansion budget; an empty path means either "already there" or "no route
//! right now".
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::Vec3;
use hashbrown::{HashMap, HashSet};
use log::debug;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::numeric::{cell_to_world, count_to_f32, round_to_cell};
use crate::spatial::SpatialQuery;
use crate::world::WorldQuery;

/// Cost of a level step.
pub const WALK_COST: f32 = 1.0;
/// Cost of a level step that needs crouching.
pub const CROUCH_COST: f32 = 1.5;
/// Cost of jumping onto the neighbouring cell one block up.
pub const STEP_UP_COST: f32 = 2.0;
/// Cost of leaping two cells at the same level.
pub const GAP_JUMP_COST: f32 = 2.6;
/// Cost of leaping two cells and one block up.
pub const GAP_JUMP_UP_COST: f32 = 3.0;
/// Base cost of dropping to lower ground.
pub const DROP_BASE_COST: f32 = 1.2;
/// Extra drop cost per unit fallen.
pub const DROP_COST_PER_UNIT: f32 = 2.0;

/// Vertical tolerance for matching the goal surface, in blocks.
const GOAL_HEIGHT_TOLERANCE: f32 = 0.5;
/// Surface difference treated as "same level".
const LEVEL_SLACK: f32 = 0.1;

const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// How a waypoint is reached from its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoveKind {
    /// Level step.
    Walk,
    /// Level step under a low ceiling.
    Crouch,
    /// Jump onto the neighbouring cell one block up.
    StepUp,
    /// Two-cell leap at the same level.
    GapJump,
    /// Two-cell leap one block up.
    GapJumpUp,
    /// Fall onto lower ground.
    Drop,
}

impl MoveKind {
    /// Whether the move needs a jump.
    #[must_use]
    pub const fn is_jump(self) -> bool {
        matches!(self, Self::StepUp | Self::GapJump | Self::GapJumpUp)
    }
}

/// Search node: block-aligned column plus surface height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Column index along X.
    pub x: i32,
    /// Surface height in world units.
    pub y: OrderedFloat<f32>,
    /// Column index along Z.
    pub z: i32,
}

impl Cell {
    /// Cell containing a world point, keeping the point's height.
    #[must_use]
    pub fn containing(point: Vec3, block_size: f32) -> Self {
        Self {
            x: round_to_cell(point.x / block_size),
            y: OrderedFloat(point.y),
            z: round_to_cell(point.z / block_size),
        }
    }

    /// World point at the cell's floor centre.
    #[must_use]
    pub fn world(&self, block_size: f32) -> Vec3 {
        Vec3::new(
            cell_to_world(self.x) * block_size,
            self.y.0,
            cell_to_world(self.z) * block_size,
        )
    }

    fn offset(&self, dx: i32, dz: i32, y: f32) -> Self {
        Self {
            x: self.x + dx,
            y: OrderedFloat(y),
            z: self.z + dz,
        }
    }
}

/// One step of a computed path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    /// World point to walk to.
    pub position: Vec3,
    /// Cost of the move that reaches this waypoint.
    pub cost: f32,
    /// The move only fits while crouching.
    pub needs_crouch: bool,
    /// Move classification.
    pub kind: MoveKind,
}

#[derive(Debug, Clone, Copy)]
struct Step {
    cell: Cell,
    cost: f32,
    kind: MoveKind,
}

impl Step {
    const fn new(cell: Cell, cost: f32, kind: MoveKind) -> Self {
        Self { cell, cost, kind }
    }
}

/// A* searcher bound to a spatial view.
pub struct Pathfinder<'a, W: ?Sized> {
    space: SpatialQuery<'a, W>,
}

impl<'a, W: WorldQuery + ?Sized> Pathfinder<'a, W> {
    /// Creates a searcher over `space`.
    #[must_use]
    pub const fn new(space: SpatialQuery<'a, W>) -> Self {
        Self { space }
    }

    fn block_size(&self) -> f32 {
        self.space.config().block_size
    }

    /// Surface under `point`, falling back to the column maximum.
    fn surface_under(&self, point: Vec3) -> f32 {
        self.space
            .ground_below(point)
            .unwrap_or_else(|| self.space.ground_height(point.x, point.z))
    }

    fn walkable(&self, cell: &Cell, crouching: bool) -> bool {
        self.space
            .can_walk_to(cell.world(self.block_size()), crouching)
    }

    /// Jump landing check measured from the cell being expanded.
    fn can_jump_to(&self, from: &Cell, to: &Cell) -> bool {
        let cfg = self.space.config();
        let origin = from.world(cfg.block_size);
        let landing = to.world(cfg.block_size);
        if !self.space.can_walk_to(landing, false) {
            return false;
        }
        let rise = self.surface_under(landing) - self.surface_under(origin);
        let reach = Vec3::new(landing.x - origin.x, 0.0, landing.z - origin.z).length();
        rise <= cfg.max_jump_height && reach <= cfg.max_jump_distance
    }

    fn neighbours(&self, cell: &Cell) -> Vec<Step> {
        let size = self.block_size();
        let max_drop = self.space.config().max_drop * size;
        let y = cell.y.0;
        let mut steps = Vec::with_capacity(8);

        for (dx, dz) in DIRECTIONS {
            let level = cell.offset(dx, dz, y);
            let standing = self.walkable(&level, false);
            let crouched = !standing && self.walkable(&level, true);
            if standing {
                steps.push(Step::new(level, WALK_COST, MoveKind::Walk));
            } else if crouched {
                steps.push(Step::new(level, CROUCH_COST, MoveKind::Crouch));
            }

            let up = cell.offset(dx, dz, y + size);
            if self.can_jump_to(cell, &up) {
                steps.push(Step::new(up, STEP_UP_COST, MoveKind::StepUp));
            }

            if standing || crouched {
                continue;
            }
            self.push_gap_jumps(cell, (dx, dz), &mut steps);

            let level_world = level.world(size);
            if self.space.is_blocked(level_world, false) {
                continue;
            }
            if let Some(floor) = self.space.ground_below(level_world) {
                let drop = y - floor;
                if drop > LEVEL_SLACK && drop <= max_drop {
                    let landing = cell.offset(dx, dz, floor);
                    if self.walkable(&landing, false) {
                        steps.push(Step::new(
                            landing,
                            DROP_BASE_COST + DROP_COST_PER_UNIT * drop,
                            MoveKind::Drop,
                        ));
                    }
                }
            }
        }
        steps
    }

    fn push_gap_jumps(&self, cell: &Cell, (dx, dz): (i32, i32), steps: &mut Vec<Step>) {
        let size = self.block_size();
        let y = cell.y.0;
        let overhead = cell.offset(dx, dz, y + size).world(size);
        if self.space.is_blocked(overhead, true) {
            return;
        }
        let far = cell.offset(2 * dx, 2 * dz, y);
        let reach = 2.0 * size;
        if reach <= self.space.config().max_jump_distance && self.walkable(&far, false) {
            steps.push(Step::new(far, GAP_JUMP_COST, MoveKind::GapJump));
        }
        let far_up = cell.offset(2 * dx, 2 * dz, y + size);
        if self.can_jump_to(cell, &far_up) {
            steps.push(Step::new(far_up, GAP_JUMP_UP_COST, MoveKind::GapJumpUp));
        }
    }

    fn heuristic(&self, a: &Cell, b: &Cell) -> f32 {
        let dy = (a.y.0 - b.y.0).abs() / self.block_size();
        count_to_f32((a.x - b.x).unsigned_abs()) + count_to_f32((a.z - b.z).unsigned_abs()) + dy
    }

    fn is_goal(&self, cell: &Cell, goal: &Cell) -> bool {
        cell.x == goal.x
            && cell.z == goal.z
            && (cell.y.0 - goal.y.0).abs() <= GOAL_HEIGHT_TOLERANCE * self.block_size()
    }

    /// Start cell: rounded position with the height snapped to the surface
    /// below.
    #[must_use]
    pub fn start_cell(&self, from: Vec3) -> Cell {
        let mut cell = Cell::containing(from, self.block_size());
        let column = cell.world(self.block_size());
        cell.y = OrderedFloat(self.surface_under(Vec3::new(column.x, from.y, column.z)));
        cell
    }

    /// Goal cell: rounded target, snapped to the ground when the rounded
    /// cell cannot be stood in even crouched.
    #[must_use]
    pub fn end_cell(&self, target: Vec3) -> Cell {
        let size = self.block_size();
        let mut cell = Cell::containing(target, size);
        cell.y = OrderedFloat(cell_to_world(round_to_cell(target.y / size)) * size);
        if !self.walkable(&cell, false) && !self.walkable(&cell, true) {
            let column = cell.world(size);
            cell.y = OrderedFloat(self.surface_under(Vec3::new(column.x, target.y, column.z)));
        }
        cell
    }

    fn close_enough(&self, start: &Cell, goal: &Cell) -> bool {
        let size = self.block_size();
        let dy = (start.y.0 - goal.y.0).abs();
        let manhattan = count_to_f32((start.x - goal.x).unsigned_abs())
            + count_to_f32((start.z - goal.z).unsigned_abs())
            + dy / size;
        manhattan < 2.0 && dy < GOAL_HEIGHT_TOLERANCE * size
    }

    /// Whether `from` is already next to `to` at the same level, in which
    /// case [`find_path`](Self::find_path) returns an empty route.
    #[must_use]
    pub fn already_there(&self, from: Vec3, to: Vec3) -> bool {
        self.close_enough(&self.start_cell(from), &self.end_cell(to))
    }

    /// Computes a route from `from` to `to`.
    ///
    /// Returns an empty path when the goal is already adjacent at the same
    /// level, when no route exists, or when the expansion budget runs out.
    #[must_use]
    pub fn find_path(&self, from: Vec3, to: Vec3) -> Vec<Waypoint> {
        let start = self.start_cell(from);
        let goal = self.end_cell(to);
        let size = self.block_size();
        if self.close_enough(&start, &goal) {
            return Vec::new();
        }

        let cfg = self.space.config();
        let straight = start.world(size).distance(goal.world(size)) / size;
        let budget = count_to_f32(cfg.max_path_iterations)
            + count_to_f32(cfg.path_iterations_per_unit) * straight;

        let mut open = BinaryHeap::new();
        let mut g_score: HashMap<Cell, f32> = HashMap::new();
        let mut came_from: HashMap<Cell, (Cell, Step)> = HashMap::new();
        let mut closed: HashSet<Cell> = HashSet::new();
        let mut sequence: u64 = 0;
        let mut iterations = 0.0_f32;

        g_score.insert(start, 0.0);
        let h = self.heuristic(&start, &goal);
        open.push(Reverse((OrderedFloat(h), OrderedFloat(h), sequence, start)));

        while let Some(Reverse((_, _, _, current))) = open.pop() {
            if !closed.insert(current) {
                continue;
            }
            iterations += 1.0;
            if iterations > budget {
                debug!("path search from {start:?} to {goal:?} exhausted its budget");
                return Vec::new();
            }
            if self.is_goal(&current, &goal) {
                return reconstruct(&came_from, current, size);
            }
            let Some(base) = g_score.get(&current).copied() else {
                continue;
            };
            for step in self.neighbours(&current) {
                if closed.contains(&step.cell) {
                    continue;
                }
                let tentative = base + step.cost;
                if g_score.get(&step.cell).is_some_and(|g| *g <= tentative) {
                    continue;
                }
                g_score.insert(step.cell, tentative);
                came_from.insert(step.cell, (current, step));
                sequence += 1;
                let h = self.heuristic(&step.cell, &goal);
                open.push(Reverse((
                    OrderedFloat(tentative + h),
                    OrderedFloat(h),
                    sequence,
                    step.cell,
                )));
            }
        }
        debug!("no path from {start:?} to {goal:?}");
        Vec::new()
    }
}

fn reconstruct(came_from: &HashMap<Cell, (Cell, Step)>, goal: Cell, block_size: f32) -> Vec<Waypoint> {
    let mut path = Vec::new();
    let mut cursor = goal;
    while let Some((previous, step)) = came_from.get(&cursor) {
        path.push(Waypoint {
            position: step.cell.world(block_size),
            cost: step.cost,
            needs_crouch: step.kind == MoveKind::Crouch,
            kind: step.kind,
        });
        cursor = *previous;
    }
    path.reverse();
    path
}
