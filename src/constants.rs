//! Default simulation parameters.
//!
//! Every value here seeds the matching field of
//! [`SimConfig`](crate::config::SimConfig). Distances are world units,
//! velocities are units per tick and durations are ticks; one tick is one
//! rendered frame.

/// Edge length of a block.
pub const BLOCK_SIZE: f32 = 1.0;
/// Downward acceleration applied every tick.
pub const GRAVITY: f32 = 0.01;
/// Initial upward velocity of a jump.
pub const JUMP_FORCE: f32 = 0.18;
/// Horizontal walking speed.
pub const MOVE_SPEED: f32 = 0.1;
/// Fraction of [`MOVE_SPEED`] kept while crouching.
pub const CROUCH_SPEED_MULTIPLIER: f32 = 0.5;
/// Horizontal half-extent of an entity's bounding box.
pub const ENTITY_RADIUS: f32 = 0.3;
/// Standing height of an entity.
pub const ENTITY_HEIGHT: f32 = 1.8;
/// Crouched height of an entity.
pub const ENTITY_HEIGHT_CROUCHED: f32 = 0.9;
/// Fraction of the current height at which the eyes sit.
pub const EYE_HEIGHT_FACTOR: f32 = 0.8;

/// Largest ground-height rise a path may climb with a single jump.
pub const MAX_JUMP_HEIGHT: f32 = 1.2;
/// Largest horizontal distance a path may cover with a single jump.
pub const MAX_JUMP_DISTANCE: f32 = 2.5;
/// Deepest drop a path may take, in cells.
pub const MAX_DROP_CELLS: f32 = 3.0;
/// Ticks between path recomputations while following a target.
pub const PATH_UPDATE_INTERVAL: u32 = 30;
/// Base number of A* expansions allowed per search.
pub const MAX_PATH_ITERATIONS: u32 = 400;
/// Extra expansions allowed per unit of straight-line distance.
pub const PATH_ITERATIONS_PER_UNIT: u32 = 40;
/// Distance at which a waypoint counts as reached.
pub const WAYPOINT_ARRIVAL_RADIUS: f32 = 0.3;
/// Horizontal waypoint distance beyond which a level move implies a leap.
pub const GAP_JUMP_TRIGGER_DISTANCE: f32 = 1.5;

/// How far an autonomous entity sees inside its field of view.
pub const VISION_RANGE: f32 = 16.0;
/// Full field-of-view angle in radians (120 degrees).
pub const VISION_FOV: f32 = 2.094_395_2;
/// Radius inside which standing entities are detected regardless of facing.
pub const PROXIMITY_DETECT_RANGE: f32 = 3.0;
/// Ticks an entity stays alert after noticing someone nearby.
pub const NOTICE_ALERT_TICKS: u32 = 20;
/// Ticks an entity stays alert after hearing a shot.
pub const SHOT_ALERT_TICKS: u32 = 120;
/// Ticks an entity stays alert after being hit.
pub const HIT_ALERT_TICKS: u32 = 90;
/// Horizontal radius inside which a shot alerts other entities.
pub const SHOT_DETECTION_RANGE: f32 = 20.0;

/// Drop height that can be survived without damage.
pub const FALL_DAMAGE_THRESHOLD: f32 = 3.0;
/// Damage per unit of drop beyond [`FALL_DAMAGE_THRESHOLD`].
pub const FALL_DAMAGE_MULTIPLIER: f32 = 10.0;

/// Ticks between shots fired by autonomous entities.
pub const HOSTILE_SHOOT_COOLDOWN: u32 = 60;
/// Radius inside which a scripted hostile notices the player.
pub const HOSTILE_DETECTION_RANGE: f32 = 10.0;
/// Radius inside which a scripted hostile stops and shoots.
pub const HOSTILE_ATTACK_RANGE: f32 = 5.0;
/// Engagement range used when an entity has no usable weapon.
pub const FALLBACK_ENGAGE_RANGE: f32 = 4.0;
/// Fraction of the weapon range at which entities stop closing in.
pub const ENGAGE_RANGE_FRACTION: f32 = 0.85;
/// Health fraction below which entities consume healing items.
pub const LOW_HEALTH_FRACTION: f32 = 0.6;
/// Ammunition counts at or above this value are never decremented.
pub const INFINITE_AMMO: u32 = 999;

/// Shortening applied to line-of-sight rays so the target never occludes
/// itself.
pub const LINE_OF_SIGHT_EPSILON: f32 = 0.05;
/// Horizontal tolerance used when looking up the block column under a point.
pub const GROUND_TOLERANCE: f32 = 0.5;
/// Entities falling below this height are removed from the world.
pub const WORLD_MIN_Y: f32 = -20.0;
