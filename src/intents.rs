//! Requests the simulation hands to rendering, audio and effects
//! collaborators.

use bevy::prelude::Resource;
use glam::{IVec3, Vec3};
use serde::Serialize;

use crate::block::BlockTypeId;
use crate::entity::EntityId;

/// Ask the projectile collaborator to spawn a shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectileRequest {
    /// Muzzle position.
    pub origin: Vec3,
    /// Unit flight direction.
    pub direction: Vec3,
    /// Damage on impact.
    pub damage: i32,
    /// Distance travelled per tick.
    pub speed: f32,
    /// Ticks before the projectile expires.
    pub lifetime: u32,
    /// Who fired; reported back through hit intake.
    pub shooter: EntityId,
    /// Block type fired.
    pub ammo: BlockTypeId,
}

/// Why an entity left the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemovalReason {
    /// Hit points reached zero.
    Defeated,
    /// Fell below the world's kill plane.
    OutOfBounds,
}

/// Everything the simulation asks its collaborators to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Intent {
    /// Spawn a projectile.
    Projectile(ProjectileRequest),
    /// Release visuals of a removed entity and spawn its drops.
    EntityRemoved {
        /// Removed entity.
        id: EntityId,
        /// Why it was removed.
        reason: RemovalReason,
        /// Last position, for drop spawning.
        position: Vec3,
        /// Ammunition left behind.
        drops: Vec<(BlockTypeId, u32)>,
    },
    /// A block was destroyed by damage.
    BlockDestroyed {
        /// Cell the block occupied.
        cell: IVec3,
        /// Its type, for drop spawning.
        type_id: BlockTypeId,
    },
    /// A block's solidity changed.
    BlockSolidity {
        /// Affected cell.
        cell: IVec3,
        /// New solidity.
        solid: bool,
    },
    /// Flash a block.
    Highlight {
        /// Cell to highlight.
        cell: IVec3,
    },
    /// Show a line of dialogue.
    Dialogue {
        /// Who speaks.
        speaker: EntityId,
        /// The line.
        line: String,
    },
}

/// Buffered intents awaiting collection by the host.
#[derive(Resource, Debug, Default, Clone)]
pub struct IntentOutbox {
    intents: Vec<Intent>,
}

impl IntentOutbox {
    /// Queues one intent.
    pub fn push(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Queues several intents in order.
    pub fn extend<I>(&mut self, intents: I)
    where
        I: IntoIterator<Item = Intent>,
    {
        self.intents.extend(intents);
    }

    /// Removes and yields all queued intents.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Intent> {
        self.intents.drain(..)
    }

    /// Queued intents, oldest first.
    #[must_use]
    pub fn as_slice(&self) -> &[Intent] {
        &self.intents
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn highlight(x: i32) -> Intent {
        Intent::Highlight {
            cell: IVec3::new(x, 0, 0),
        }
    }

    #[rstest]
    fn push_then_drain_empties() {
        let mut outbox = IntentOutbox::default();
        assert!(outbox.is_empty());
        outbox.push(highlight(1));
        assert!(!outbox.is_empty());
        let drained: Vec<_> = outbox.drain().collect();
        assert_eq!(drained, vec![highlight(1)]);
        assert!(outbox.is_empty());
    }

    #[rstest]
    fn extend_keeps_order() {
        let mut outbox = IntentOutbox::default();
        outbox.extend(vec![highlight(1), highlight(2)]);
        assert_eq!(outbox.as_slice(), &[highlight(1), highlight(2)]);
    }
}
