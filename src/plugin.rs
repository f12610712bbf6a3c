//! Bevy plugin hosting the simulation inside an `App`.
//!
//! [`SimulationPlugin`] inserts a [`SimulationState`] resource (unless the
//! host already provided one), ticks it once per `Update`, moves the queued
//! intents into the [`IntentOutbox`] resource, keeps one ECS entity tagged
//! with [`SimEntity`] per simulated entity and copies positions onto its
//! `Transform`.
use std::path::PathBuf;

use bevy::ecs::prelude::On;
use bevy::prelude::*;
use hashbrown::HashSet;
use log::{error, warn};
use thiserror::Error;

use crate::config::{ConfigError, SimConfig};
use crate::entity::{Entity as SimulatedEntity, EntityId};
use crate::intents::IntentOutbox;
use crate::movement::PlayerInput;
use crate::simulation::Simulation;

/// Where the plugin reads its configuration from.
#[derive(Resource, Reflect, Debug, Clone, Default)]
#[reflect(Resource)]
pub struct SimulationSettings {
    /// JSON configuration file; defaults apply when absent.
    pub config_path: Option<PathBuf>,
}

/// The simulation, owned by the ECS world.
#[derive(Resource, Debug)]
pub struct SimulationState(pub Simulation);

/// Links an ECS entity to a simulated entity.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub struct SimEntity(pub EntityId);

/// Raised when the plugin has to fall back from a failure.
#[derive(Event, Debug, Clone, Error)]
pub enum SimulationError {
    /// The configuration file could not be used; defaults were applied.
    #[error("configuration rejected: {0}")]
    Config(String),
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value for Events V2."
)]
fn log_simulation_error(event: On<SimulationError>) {
    error!("simulation error: {}", event.event());
}

fn load_config(settings: &SimulationSettings) -> Result<SimConfig, ConfigError> {
    settings
        .config_path
        .as_ref()
        .map_or_else(|| Ok(SimConfig::default()), |path| SimConfig::load(path))
}

/// Advances the simulation by one tick and publishes its intents.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy system parameters use `Res<T>` by value."
)]
pub fn advance_simulation_system(
    mut state: ResMut<SimulationState>,
    input: Res<PlayerInput>,
    mut outbox: ResMut<IntentOutbox>,
) {
    state.0.tick(&input);
    outbox.extend(state.0.drain_intents());
}

fn twin(entity: &SimulatedEntity) -> (SimEntity, Name, Transform) {
    let p = entity.position;
    (
        SimEntity(entity.id),
        Name::new(entity.name.clone()),
        Transform::from_xyz(p.x, p.y, p.z).with_rotation(Quat::from_rotation_y(entity.yaw)),
    )
}

/// Spawns a tagged ECS entity for every simulated entity that lacks one,
/// including those spawned after startup.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy system parameters use `Res<T>` by value."
)]
pub fn spawn_missing_twins_system(
    mut commands: Commands,
    state: Res<SimulationState>,
    twins: Query<&SimEntity>,
) {
    let known: HashSet<EntityId> = twins.iter().map(|tag| tag.0).collect();
    for entity in state.0.entities().iter().filter(|e| !known.contains(&e.id)) {
        commands.spawn(twin(entity));
    }
}

/// Copies simulated poses onto tagged ECS entities and despawns those whose
/// simulated entity is gone.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy system parameters use `Res<T>` by value."
)]
pub fn sync_transforms_system(
    mut commands: Commands,
    state: Res<SimulationState>,
    mut query: Query<(Entity, &SimEntity, &mut Transform)>,
) {
    for (entity, &SimEntity(id), mut transform) in &mut query {
        let Some(simulated) = state.0.entity(id) else {
            commands.entity(entity).despawn();
            continue;
        };
        let p = simulated.position;
        transform.translation = Vec3::new(p.x, p.y, p.z);
        transform.rotation = Quat::from_rotation_y(simulated.yaw);
    }
}

/// Installs the simulation resources and systems.
#[derive(Debug, Default)]
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(log_simulation_error);
        app.init_resource::<PlayerInput>();
        app.init_resource::<IntentOutbox>();

        if !app.world().contains_resource::<SimulationState>() {
            let settings = app
                .world()
                .get_resource::<SimulationSettings>()
                .cloned()
                .unwrap_or_default();
            let config = load_config(&settings).unwrap_or_else(|err| {
                warn!("falling back to default configuration");
                app.world_mut()
                    .trigger(SimulationError::Config(err.to_string()));
                SimConfig::default()
            });
            app.insert_resource(SimulationState(Simulation::new(config)));
        }

        app.register_type::<EntityId>()
            .register_type::<SimEntity>()
            .register_type::<SimulationSettings>();
        app.add_systems(
            Update,
            (
                advance_simulation_system,
                spawn_missing_twins_system,
                sync_transforms_system,
            )
                .chain(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::Faction;
    use rstest::rstest;

    #[derive(Resource, Default)]
    struct CapturedErrors(Vec<String>);

    #[expect(
        clippy::needless_pass_by_value,
        reason = "Observer systems must take On<T> by value."
    )]
    fn record_error(event: On<SimulationError>, mut errors: ResMut<CapturedErrors>) {
        errors.0.push(event.event().to_string());
    }

    #[rstest]
    fn plugin_initialises_resources() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        assert!(app.world().contains_resource::<SimulationState>());
        assert!(app.world().contains_resource::<PlayerInput>());
        assert!(app.world().contains_resource::<IntentOutbox>());
        app.update();
        assert_eq!(app.world().resource::<SimulationState>().0.ticks(), 1);
    }

    #[rstest]
    fn tags_are_registered_for_reflection() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        let registry = app.world().resource::<AppTypeRegistry>().read();
        assert!(registry.get(std::any::TypeId::of::<SimEntity>()).is_some());
        assert!(registry
            .get(std::any::TypeId::of::<SimulationSettings>())
            .is_some());
    }

    #[rstest]
    fn bad_config_path_falls_back_and_reports() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<CapturedErrors>();
        app.add_observer(record_error);
        app.insert_resource(SimulationSettings {
            config_path: Some(PathBuf::from("/definitely/not/here.json")),
        });
        app.add_plugins(SimulationPlugin);
        let errors = &app.world().resource::<CapturedErrors>().0;
        assert_eq!(errors.len(), 1);
        assert_eq!(
            app.world().resource::<SimulationState>().0.config(),
            &SimConfig::default()
        );
    }

    #[rstest]
    fn removed_entities_lose_their_ecs_twin() {
        let mut sim = Simulation::new(SimConfig::default());
        sim.spawn(crate::entity::Entity::new("hero", glam::Vec3::ZERO, Faction::Player));
        let doomed = sim.spawn(crate::entity::Entity::new(
            "doomed",
            glam::Vec3::new(3.0, 10.0, 0.0),
            Faction::Beast,
        ));
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(SimulationState(sim));
        app.add_plugins(SimulationPlugin);
        app.update();

        let mut query = app.world_mut().query::<(&SimEntity, &Transform)>();
        let falling = query
            .iter(app.world())
            .find(|(tag, _)| tag.0 == doomed)
            .map(|(_, t)| t.translation.y)
            .expect("twin spawned");
        assert!(falling < 10.0, "gravity applied and synced");

        app.world_mut()
            .resource_mut::<SimulationState>()
            .0
            .apply_hit(doomed, 500, None)
            .expect("doomed exists");
        app.update();
        app.update();
        let mut query = app.world_mut().query::<&SimEntity>();
        assert!(query.iter(app.world()).all(|tag| tag.0 != doomed));
    }
}
