//! Headless Bevy hosting.
use bevy::prelude::*;
use voxsim::{Simulation, SimulationPlugin, SimulationState};

/// App with `MinimalPlugins` hosting `sim` through [`SimulationPlugin`].
pub fn headless_app(sim: Simulation) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(SimulationState(sim));
    app.add_plugins(SimulationPlugin);
    app
}
