#![cfg_attr(docsrs, feature(doc_cfg))]
//! Entity simulation core for a first-person voxel sandbox.
//!
//! The crate answers spatial queries over a block world, resolves entity
//! collisions, plans A* routes with walk, crouch, jump, leap and drop moves,
//! runs faction-aware perception and combat decisions, and steps entities
//! along their routes. Rendering, audio and UI are collaborators that consume
//! the [`Intent`]s the simulation emits.
pub mod ai;
pub mod block;
pub mod collision;
pub mod combat;
pub mod config;
pub mod constants;
pub mod directory;
pub mod entity;
pub mod faction;
pub mod geometry;
pub mod intents;
pub mod interaction;
pub mod item;
pub mod logging;
pub mod movement;
pub mod numeric;
pub mod pathfinding;
pub mod perception;
pub mod plugin;
pub mod scenario;
pub mod simulation;
pub mod spatial;
pub mod vector_math;
pub mod world;

// Re-export commonly used items
pub use block::{Block, BlockType, BlockTypeId, BlockTypeRegistry};
pub use config::{ConfigError, SimConfig};
pub use directory::{ControlError, EntityDirectory};
pub use entity::{Behaviour, Entity, EntityId, TargetKind};
pub use faction::{Faction, Relation};
pub use intents::{Intent, IntentOutbox, ProjectileRequest};
pub use interaction::{Interactable, InteractionOutcome};
pub use logging::init as init_logging;
pub use movement::PlayerInput;
pub use pathfinding::{MoveKind, Pathfinder, Waypoint};
pub use plugin::{SimEntity, SimulationPlugin, SimulationSettings, SimulationState};
pub use simulation::Simulation;
pub use spatial::SpatialQuery;
pub use world::{World, WorldError, WorldQuery};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use voxsim::prelude::*;
    //! ```

    pub use crate::block::builtin;
    pub use crate::Behaviour;
    pub use crate::Entity;
    pub use crate::Faction;
    pub use crate::PlayerInput;
    pub use crate::SimConfig;
    pub use crate::Simulation;
    pub use crate::TargetKind;
    pub use glam::{IVec3, Vec3};
}
