//! Things an actor can use: blocks with a use action and talkative entities.
use std::collections::VecDeque;

use glam::IVec3;
use hashbrown::HashSet;
use log::debug;

use crate::block::UseAction;
use crate::directory::EntityDirectory;
use crate::entity::EntityId;
use crate::intents::{Intent, IntentOutbox};
use crate::world::{World, WorldError};

const NEIGHBOURS: [IVec3; 6] = [
    IVec3::X,
    IVec3::NEG_X,
    IVec3::Y,
    IVec3::NEG_Y,
    IVec3::Z,
    IVec3::NEG_Z,
];

/// Target of a use action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interactable {
    /// The block at a cell.
    Block(IVec3),
    /// An entity.
    Entity(EntityId),
}

/// Mutable state a use action may touch.
pub struct InteractionContext<'a> {
    /// Block world; doors edit solidity.
    pub world: &'a mut World,
    /// Entities, read for dialogue.
    pub entities: &'a EntityDirectory,
    /// Receives the resulting intents.
    pub outbox: &'a mut IntentOutbox,
}

/// What a use action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// A door group changed solidity.
    DoorToggled {
        /// New solidity of every cell in the group.
        solid: bool,
        /// Cells toggled, sorted.
        cells: Vec<IVec3>,
    },
    /// A block flashed.
    Highlighted(IVec3),
    /// An entity spoke.
    Spoke {
        /// Speaker.
        speaker: EntityId,
        /// What was said.
        line: String,
    },
    /// The target has no use.
    Nothing,
}

impl Interactable {
    /// Uses the target on behalf of `actor`.
    ///
    /// # Errors
    /// Fails when the target block or entity does not exist.
    pub fn on_use(
        self,
        ctx: &mut InteractionContext<'_>,
        actor: EntityId,
    ) -> Result<InteractionOutcome, WorldError> {
        match self {
            Self::Block(cell) => use_block(cell, ctx, actor),
            Self::Entity(id) => talk_to(id, ctx),
        }
    }
}

fn use_block(
    cell: IVec3,
    ctx: &mut InteractionContext<'_>,
    actor: EntityId,
) -> Result<InteractionOutcome, WorldError> {
    let block = *ctx.world.blocks.get(cell).ok_or(WorldError::NoBlock(cell))?;
    let action = ctx
        .world
        .block_types
        .get(block.type_id)
        .and_then(|ty| ty.on_use);
    match action {
        Some(UseAction::ToggleDoor) => {
            let solid = !block.solid;
            let cells = connected_group(ctx.world, cell);
            for c in &cells {
                ctx.world.blocks.set_solid(*c, solid);
            }
            ctx.outbox.extend(
                cells
                    .iter()
                    .map(|&cell| Intent::BlockSolidity { cell, solid }),
            );
            debug!(
                "{actor:?} {} a door of {} blocks",
                if solid { "closes" } else { "opens" },
                cells.len()
            );
            Ok(InteractionOutcome::DoorToggled { solid, cells })
        }
        Some(UseAction::Highlight) => {
            ctx.outbox.push(Intent::Highlight { cell });
            Ok(InteractionOutcome::Highlighted(cell))
        }
        None => Ok(InteractionOutcome::Nothing),
    }
}

/// Cells of the same block type reachable from `start` through face
/// neighbours.
fn connected_group(world: &World, start: IVec3) -> Vec<IVec3> {
    let Some(kind) = world.blocks.get(start).map(|b| b.type_id) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    seen.insert(start);
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        for offset in NEIGHBOURS {
            let next = cell + offset;
            if world.blocks.get(next).is_some_and(|b| b.type_id == kind) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    let mut cells: Vec<_> = seen.into_iter().collect();
    cells.sort_by_key(|c| (c.x, c.y, c.z));
    cells
}

fn talk_to(id: EntityId, ctx: &mut InteractionContext<'_>) -> Result<InteractionOutcome, WorldError> {
    let entity = ctx.entities.get(id).ok_or(WorldError::UnknownEntity(id))?;
    let Some(line) = entity.dialogue.clone() else {
        return Ok(InteractionOutcome::Nothing);
    };
    ctx.outbox.push(Intent::Dialogue {
        speaker: id,
        line: line.clone(),
    });
    Ok(InteractionOutcome::Spoke { speaker: id, line })
}
