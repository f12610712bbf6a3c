use std::path::PathBuf;

use anyhow::Context;
use bevy::prelude::*;
use clap::Parser;
use log::info;
use voxsim::scenario::demo;
use voxsim::{init_logging, Intent, SimConfig, SimulationPlugin, SimulationState};

/// Runs the demo arena headless and reports what happened
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 600)]
    ticks: u32,
    /// JSON configuration overriding the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Resource, Default)]
struct Tally {
    shots: usize,
    removals: usize,
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy system parameters use `Res<T>` by value."
)]
fn tally_intents(mut outbox: ResMut<voxsim::IntentOutbox>, mut tally: ResMut<Tally>) {
    for intent in outbox.drain() {
        match intent {
            Intent::Projectile(_) => tally.shots += 1,
            Intent::EntityRemoved { .. } => tally.removals += 1,
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.config.as_ref().map_or_else(
        || Ok(SimConfig::default()),
        |path| {
            SimConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))
        },
    )?;
    let sim = demo(config).context("building the demo arena")?;

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(SimulationState(sim))
        .add_plugins(SimulationPlugin)
        .init_resource::<Tally>()
        .add_systems(PostUpdate, tally_intents);
    for _ in 0..args.ticks {
        app.update();
    }

    let world = app.world();
    let state = &world.resource::<SimulationState>().0;
    let tally = world.resource::<Tally>();
    info!(
        "ran {} ticks: {} shots fired, {} entities removed, {} remaining",
        state.ticks(),
        tally.shots,
        tally.removals,
        state.entities().len()
    );
    for entity in state.entities().iter() {
        info!(
            "  {} ({}) hp {}/{} at {:.2}",
            entity.name, entity.faction, entity.hp, entity.max_hp, entity.position
        );
    }
    Ok(())
}
