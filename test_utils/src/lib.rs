//! Fixtures shared by the integration tests.
//!
//! Worlds are built from stone blocks with a block size of one, so cell
//! `(x, 0, z)` has its top face at `y = 0.5` and entities standing on it have
//! their feet there.
pub mod actors;
pub mod app;
pub mod worlds;

pub use actors::{feet, run_ticks, sim_with_player, standing};
pub use app::headless_app;
pub use worlds::{crouch_tunnel, flat_floor, gap_across, platform, wall_across};
