//! Simulation parameter set.
//!
//! [`SimConfig`] is read-only for the lifetime of a simulation. Defaults are
//! taken from [`crate::constants`]; JSON documents may override any subset of
//! fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants as c;

/// Failures raised while loading or validating a [`SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document was not valid JSON for [`SimConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A parameter holds a value the simulation cannot work with.
    #[error("invalid configuration parameter `{name}`: {reason}")]
    Invalid {
        /// Field name.
        name: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Fixed parameter set consumed by every simulation component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Edge length of a block.
    pub block_size: f32,
    /// Downward acceleration per tick.
    pub gravity: f32,
    /// Initial upward velocity of a jump.
    pub jump_force: f32,
    /// Walking speed per tick.
    pub move_speed: f32,
    /// Speed multiplier while crouched.
    pub crouch_speed_multiplier: f32,
    /// Horizontal half-extent of entity boxes.
    pub entity_radius: f32,
    /// Standing entity height.
    pub entity_height: f32,
    /// Crouched entity height.
    pub entity_height_crouched: f32,
    /// Eye position as a fraction of the current height.
    pub eye_height_factor: f32,
    /// Largest climbable ground rise per jump.
    pub max_jump_height: f32,
    /// Largest horizontal reach per jump.
    pub max_jump_distance: f32,
    /// Deepest drop a path may take.
    pub max_drop: f32,
    /// Ticks between path recomputations.
    pub path_update_interval: u32,
    /// Base A* expansion budget.
    pub max_path_iterations: u32,
    /// Extra expansions per unit of straight-line distance.
    pub path_iterations_per_unit: u32,
    /// Radius at which a waypoint counts as reached.
    pub waypoint_arrival_radius: f32,
    /// Level waypoint distance that implies a leap.
    pub gap_jump_trigger_distance: f32,
    /// Sight distance inside the field of view.
    pub vision_range: f32,
    /// Full field-of-view angle in radians.
    pub vision_fov: f32,
    /// Facing-independent detection radius.
    pub proximity_detect_range: f32,
    /// Alert duration after noticing a nearby entity.
    pub notice_alert_ticks: u32,
    /// Alert duration after hearing a shot.
    pub shot_alert_ticks: u32,
    /// Alert duration after being hit.
    pub hit_alert_ticks: u32,
    /// Radius inside which shots are heard.
    pub shot_detection_range: f32,
    /// Survivable drop height.
    pub fall_damage_threshold: f32,
    /// Damage per unit of drop past the threshold.
    pub fall_damage_multiplier: f32,
    /// Cooldown between autonomous shots.
    pub hostile_shoot_cooldown: u32,
    /// Scripted hostile detection radius.
    pub hostile_detection_range: f32,
    /// Scripted hostile attack radius.
    pub hostile_attack_range: f32,
    /// Engagement range without a weapon.
    pub fallback_engage_range: f32,
    /// Fraction of the weapon range used as engagement range.
    pub engage_range_fraction: f32,
    /// Health fraction that triggers healing.
    pub low_health_fraction: f32,
    /// Ammunition count treated as unlimited.
    pub infinite_ammo: u32,
    /// Ray shortening for line-of-sight tests.
    pub line_of_sight_epsilon: f32,
    /// Horizontal tolerance for ground lookups.
    pub ground_tolerance: f32,
    /// Kill plane height.
    pub world_min_y: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            block_size: c::BLOCK_SIZE,
            gravity: c::GRAVITY,
            jump_force: c::JUMP_FORCE,
            move_speed: c::MOVE_SPEED,
            crouch_speed_multiplier: c::CROUCH_SPEED_MULTIPLIER,
            entity_radius: c::ENTITY_RADIUS,
            entity_height: c::ENTITY_HEIGHT,
            entity_height_crouched: c::ENTITY_HEIGHT_CROUCHED,
            eye_height_factor: c::EYE_HEIGHT_FACTOR,
            max_jump_height: c::MAX_JUMP_HEIGHT,
            max_jump_distance: c::MAX_JUMP_DISTANCE,
            max_drop: c::MAX_DROP_CELLS,
            path_update_interval: c::PATH_UPDATE_INTERVAL,
            max_path_iterations: c::MAX_PATH_ITERATIONS,
            path_iterations_per_unit: c::PATH_ITERATIONS_PER_UNIT,
            waypoint_arrival_radius: c::WAYPOINT_ARRIVAL_RADIUS,
            gap_jump_trigger_distance: c::GAP_JUMP_TRIGGER_DISTANCE,
            vision_range: c::VISION_RANGE,
            vision_fov: c::VISION_FOV,
            proximity_detect_range: c::PROXIMITY_DETECT_RANGE,
            notice_alert_ticks: c::NOTICE_ALERT_TICKS,
            shot_alert_ticks: c::SHOT_ALERT_TICKS,
            hit_alert_ticks: c::HIT_ALERT_TICKS,
            shot_detection_range: c::SHOT_DETECTION_RANGE,
            fall_damage_threshold: c::FALL_DAMAGE_THRESHOLD,
            fall_damage_multiplier: c::FALL_DAMAGE_MULTIPLIER,
            hostile_shoot_cooldown: c::HOSTILE_SHOOT_COOLDOWN,
            hostile_detection_range: c::HOSTILE_DETECTION_RANGE,
            hostile_attack_range: c::HOSTILE_ATTACK_RANGE,
            fallback_engage_range: c::FALLBACK_ENGAGE_RANGE,
            engage_range_fraction: c::ENGAGE_RANGE_FRACTION,
            low_health_fraction: c::LOW_HEALTH_FRACTION,
            infinite_ammo: c::INFINITE_AMMO,
            line_of_sight_epsilon: c::LINE_OF_SIGHT_EPSILON,
            ground_tolerance: c::GROUND_TOLERANCE,
            world_min_y: c::WORLD_MIN_Y,
        }
    }
}

impl SimConfig {
    /// Parses a JSON document, filling unspecified fields with defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use voxsim::config::SimConfig;
    /// let cfg = SimConfig::from_json_str(r#"{ "vision_range": 24.0 }"#).unwrap();
    /// assert_eq!(cfg.vision_range, 24.0);
    /// assert_eq!(cfg.block_size, voxsim::constants::BLOCK_SIZE);
    /// ```
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and validates a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Rejects parameter combinations the simulation cannot honour.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("block_size", self.block_size),
            ("entity_radius", self.entity_radius),
            ("entity_height", self.entity_height),
            ("entity_height_crouched", self.entity_height_crouched),
            ("move_speed", self.move_speed),
            ("vision_range", self.vision_range),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    name,
                    reason: "must be a finite positive number",
                });
            }
        }
        if self.entity_height_crouched > self.entity_height {
            return Err(ConfigError::Invalid {
                name: "entity_height_crouched",
                reason: "must not exceed entity_height",
            });
        }
        if !(self.vision_fov > 0.0 && self.vision_fov <= std::f32::consts::TAU) {
            return Err(ConfigError::Invalid {
                name: "vision_fov",
                reason: "must lie in (0, 2π]",
            });
        }
        Ok(())
    }

    /// Height of an entity's box for the given stance.
    #[must_use]
    pub fn entity_height_for(&self, crouching: bool) -> f32 {
        if crouching {
            self.entity_height_crouched
        } else {
            self.entity_height
        }
    }

    /// Eye offset above an entity's feet for the given stance.
    #[must_use]
    pub fn eye_height_for(&self, crouching: bool) -> f32 {
        self.entity_height_for(crouching) * self.eye_height_factor
    }

    /// Half the block edge length.
    #[must_use]
    pub fn block_half(&self) -> f32 {
        self.block_size * 0.5
    }
}
