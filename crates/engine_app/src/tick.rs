//! Fixed-timestep tick loop.
//!
//! Each tick asks the world's dispatcher to run one update pass over every
//! registered, enabled entity.

use std::time::{Duration, Instant};

use engine_entity::World;
use tracing::{debug, info, warn};

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// Drives a [`World`] at a fixed rate.
#[derive(Debug)]
pub struct TickLoop {
    tick_id: u64,
    config: TickConfig,
    world: World,
}

impl TickLoop {
    /// Create a tick loop that owns `world`.
    #[must_use]
    pub fn new(config: TickConfig, world: World) -> Self {
        Self {
            tick_id: 0,
            config,
            world,
        }
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Give the world back.
    #[must_use]
    pub fn into_world(self) -> World {
        self.world
    }

    /// Run one tick.
    pub fn tick(&mut self) {
        self.tick_id += 1;
        self.world.update();
        debug!(
            tick_id = self.tick_id,
            entities = self.world.entity_count(),
            "tick complete"
        );
    }

    /// Tick until `done` reports true or the configured tick limit is hit.
    /// Returns the number of ticks run.
    pub fn run_until(&mut self, mut done: impl FnMut(&World) -> bool) -> u64 {
        let tick_duration = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        while !done(&self.world) {
            let start = Instant::now();
            self.tick();

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                warn!(ticks = tick_count, "tick limit reached");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }

        info!(ticks = tick_count, "tick loop complete");
        tick_count
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use engine_entity::{Awake, EntityRef, EntityType, TypeBuilder, Update};

    use super::*;

    thread_local! {
        static TICKS: Cell<u32> = const { Cell::new(0) };
    }

    #[derive(Default)]
    struct Counter;

    impl EntityType for Counter {
        fn describe(ty: &mut TypeBuilder<Self>) {
            ty.update();
        }
    }

    impl Awake for Counter {}

    impl Update for Counter {
        fn update(&mut self, _world: &mut World, _me: EntityRef) {
            TICKS.with(|ticks| ticks.set(ticks.get() + 1));
        }
    }

    fn fast(max_ticks: u64) -> TickConfig {
        TickConfig {
            tick_rate: 1000.0,
            max_ticks,
        }
    }

    #[test]
    fn test_tick_advances_counter() {
        let mut tick_loop = TickLoop::new(TickConfig::default(), World::new());
        assert_eq!(tick_loop.tick_id(), 0);
        tick_loop.tick();
        assert_eq!(tick_loop.tick_id(), 1);
        tick_loop.tick();
        assert_eq!(tick_loop.tick_id(), 2);
    }

    #[test]
    fn test_tick_updates_world() {
        let mut world = World::new();
        world.add_child::<Counter>(world.root()).unwrap();
        let mut tick_loop = TickLoop::new(fast(0), world);

        tick_loop.tick();
        tick_loop.tick();

        assert_eq!(TICKS.with(Cell::get), 2);
    }

    #[test]
    fn test_run_limited_ticks() {
        let mut tick_loop = TickLoop::new(fast(5), World::new());
        let ticks = tick_loop.run_until(|_| false);
        assert_eq!(ticks, 5);
        assert_eq!(tick_loop.tick_id(), 5);
    }

    #[test]
    fn test_run_stops_when_done() {
        let mut tick_loop = TickLoop::new(fast(100), World::new());
        let mut calls = 0;
        let ticks = tick_loop.run_until(|_| {
            calls += 1;
            calls > 3
        });
        assert_eq!(ticks, 3);
    }
}
