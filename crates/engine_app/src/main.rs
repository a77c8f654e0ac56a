//! # engine_app: Demo coordinator
//!
//! Builds a small arena battle on the entity graph, ticks it until one team
//! is left standing, then tears the scene down.
//!
//! ## Configuration
//!
//! Set `GRAPH_CONFIG` to a JSON file holding a `WorldConfig` to choose the
//! zone unit ids are minted in and tune the pools. Logging follows
//! `RUST_LOG`, defaulting to `engine_app=info`.

mod config;
mod scene;
mod tick;

use anyhow::Result;
use engine_entity::World;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tick::{TickConfig, TickLoop};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let config = config::load()?;
    info!(zone = config.zone, "engine demo starting");

    let mut world = World::with_config(config);
    let fighters = scene::spawn(&mut world, &scene::default_roster())?;
    info!(
        fighters = fighters.len(),
        entities = world.entity_count(),
        "scene built"
    );

    let tick_config = TickConfig {
        tick_rate: 60.0,
        max_ticks: 600,
    };
    let mut tick_loop = TickLoop::new(tick_config, world);
    let ticks = tick_loop.run_until(|world| scene::winner(world).is_some());

    let mut world = tick_loop.into_world();
    match scene::winner(&world) {
        Some(team) => {
            for (_, fighter) in scene::standing(&world) {
                info!(name = %fighter.name, hp = fighter.hp, "survivor");
            }
            info!(team, ticks, "battle over");
        }
        None => info!(ticks, "battle undecided"),
    }

    world.clear();
    info!(entities = world.entity_count(), "engine demo shut down");
    Ok(())
}
