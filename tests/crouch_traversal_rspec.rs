//! Behaviour-driven tests using rust-rspec.
//!
//! A villager ordered through a tunnel with one block less headroom than it
//! needs standing must crouch through and stand up once clear.

use test_utils::{crouch_tunnel, feet, run_ticks, sim_with_player, standing};
use voxsim::{EntityId, Faction, PlayerInput, Simulation};

/// Ceiling blocks cover cells 3 and 4, so they span x in 2.5..4.5.
const CEILING: std::ops::RangeInclusive<f32> = 2.5..=4.5;

#[derive(Debug, Clone)]
struct Crossing {
    sim: Simulation,
    walker: Option<EntityId>,
    crouched_under_ceiling: bool,
    upright_under_ceiling: bool,
}

impl Default for Crossing {
    fn default() -> Self {
        let (sim, _) = sim_with_player(crouch_tunnel(3, 2), feet(0.0, -1.0));
        Self {
            sim,
            walker: None,
            crouched_under_ceiling: false,
            upright_under_ceiling: false,
        }
    }
}

impl Crossing {
    fn setup(&mut self) {
        let id = self
            .sim
            .spawn(standing("villager", feet(1.0, 0.0), Faction::Village));
        self.sim
            .command_move(id, feet(7.0, 0.0))
            .expect("villager exists");
        self.walker = Some(id);
    }

    fn walk(&mut self, ticks: usize) {
        let id = self.walker.expect("walker spawned");
        for _ in 0..ticks {
            self.sim.tick(&PlayerInput::default());
            let e = self.sim.entity(id).expect("walker survives");
            if CEILING.contains(&e.position.x) {
                if e.is_crouching {
                    self.crouched_under_ceiling = true;
                } else {
                    self.upright_under_ceiling = true;
                }
            }
        }
    }

    fn walker(&self) -> &voxsim::Entity {
        self.walker
            .and_then(|id| self.sim.entity(id))
            .expect("walker spawned")
    }
}

#[test]
fn low_tunnel_is_crossed_crouching() {
    rspec::run(&rspec::given(
        "a corridor with a two-cell crouch tunnel and a villager before it",
        Crossing::default(),
        |ctx| {
            ctx.before_each(Crossing::setup);
            ctx.then("the planned route crouches only inside the tunnel", |c| {
                let w = c.walker();
                let path = c
                    .sim
                    .find_path_for(w.id, feet(7.0, 0.0))
                    .expect("walker exists");
                let crouched: Vec<_> = path.iter().filter(|p| p.needs_crouch).collect();
                assert_eq!(crouched.len(), 2);
                assert!(crouched.iter().all(|p| (p.cost - 1.5).abs() < f32::EPSILON));
            });
            ctx.when("the villager walks for a while", |ctx| {
                ctx.before_each(|c| c.walk(400));
                ctx.then("it crouched while under the ceiling", |c| {
                    assert!(c.crouched_under_ceiling);
                    assert!(!c.upright_under_ceiling);
                });
                ctx.then("it arrives standing and drops the order", |c| {
                    let w = c.walker();
                    assert!(!w.is_crouching);
                    assert!(w.target.is_none());
                    assert!((w.position.x - 7.0).abs() <= 0.5, "at {}", w.position);
                });
            });
        },
    ));
}

#[test]
fn idle_villager_under_ceiling_stays_crouched() {
    let (mut sim, _) = sim_with_player(crouch_tunnel(3, 2), feet(0.0, -1.0));
    let mut villager = standing("villager", feet(3.5, 0.0), Faction::Village);
    villager.is_crouching = true;
    let id = sim.spawn(villager);
    run_ticks(&mut sim, 5);
    assert!(sim.entity(id).is_some_and(|e| e.is_crouching));
}
