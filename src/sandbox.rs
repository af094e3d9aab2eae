//! Headless sandbox: a handful of systems moving entities under gravity.
//!
//! Every system receives its worlds, pools, filters and settings through
//! injected slots; nothing is looked up by hand inside `run`.

use std::sync::Arc;

use glam::Vec2;
use lumen_di::{
    inject_slots, CustomInject, FilterInject, PoolInject, SharedInject, System, Systems,
    WorldInject,
};
use lumen_ecs::{EcsContext, EcsError, Entity, World};
use tracing::{debug, info, warn};

use crate::settings::{SandboxSettings, STATS_WORLD};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity(pub Vec2);

/// Marks an entity that no longer moves.
#[derive(Debug, Clone, Copy)]
pub struct Frozen;

/// Per-tick summary, stored on a single entity in the stats world.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    pub tick: u64,
    pub moving: usize,
    pub frozen: usize,
}

/// Receives the per-tick summary. Supplied at injection time, not registered
/// in the context.
pub trait TickLog: Send + Sync {
    fn record(&self, stats: &TickStats);
}

/// Writes tick summaries as `tracing` events.
pub struct TracingTickLog;

impl TickLog for TracingTickLog {
    fn record(&self, stats: &TickStats) {
        debug!(
            tick = stats.tick,
            moving = stats.moving,
            frozen = stats.frozen,
            "tick"
        );
    }
}

/// Build the running context: the default world, the configured named worlds
/// and the settings as a shared singleton.
pub fn context(settings: &SandboxSettings) -> Result<EcsContext, EcsError> {
    let mut context = EcsContext::new(World::new("main"));
    for name in &settings.worlds {
        context.add_world(name.clone(), World::new(name.clone()))?;
    }
    context.insert_shared(Arc::new(settings.clone()))?;
    Ok(context)
}

/// All sandbox systems in run order.
pub fn systems(context: EcsContext) -> Systems {
    let mut systems = Systems::new(context);
    systems
        .add(Spawner::default())
        .add(Gravity::default())
        .add(Movement::default())
        .add(Freezer::default())
        .add(Report::default());
    systems
}

/// Spawns the configured number of entities on init.
#[derive(Default)]
pub struct Spawner {
    world: WorldInject,
    positions: PoolInject<Position>,
    velocities: PoolInject<Velocity>,
    settings: SharedInject<SandboxSettings>,
}

inject_slots!(Spawner { world, positions, velocities, settings });

impl System for Spawner {
    fn init(&mut self, _context: &EcsContext) {
        let world = self.world.value();
        for i in 0..self.settings.value().entities {
            let entity = world.spawn();
            let position = Position(Vec2::new(i as f32, 100.0));
            let velocity = Velocity(Vec2::new(1.0, 0.0));
            if let Err(e) = self.positions.value().add(entity, position) {
                warn!("Failed to place {}: {}", entity, e);
            }
            if let Err(e) = self.velocities.value().add(entity, velocity) {
                warn!("Failed to launch {}: {}", entity, e);
            }
        }
        info!(
            world = world.name(),
            entities = world.entity_count(),
            "entities spawned"
        );
    }

    fn run(&mut self, _context: &EcsContext) {}
}

/// Accelerates every unfrozen entity.
#[derive(Default)]
pub struct Gravity {
    falling: FilterInject<(Velocity,), (Frozen,)>,
    settings: SharedInject<SandboxSettings>,
}

inject_slots!(Gravity { falling, settings });

impl System for Gravity {
    fn run(&mut self, _context: &EcsContext) {
        let settings = self.settings.value();
        let step = settings.gravity * settings.time_step;
        let (velocities,) = self.falling.pools();
        for entity in self.falling.value() {
            if let Some(mut velocity) = velocities.get_mut(entity) {
                velocity.0 += step;
            }
        }
    }
}

/// Integrates velocity into position.
#[derive(Default)]
pub struct Movement {
    moving: FilterInject<(Position, Velocity), (Frozen,)>,
    settings: SharedInject<SandboxSettings>,
}

inject_slots!(Movement { moving, settings });

impl System for Movement {
    fn run(&mut self, _context: &EcsContext) {
        let dt = self.settings.value().time_step;
        let (positions, velocities) = self.moving.pools();
        for entity in self.moving.value() {
            let Some(velocity) = velocities.get(entity).map(|v| v.0) else {
                continue;
            };
            if let Some(mut position) = positions.get_mut(entity) {
                position.0 += velocity * dt;
            }
        }
    }
}

/// Freezes the lowest-indexed moving entity every `freeze_interval` ticks.
#[derive(Default)]
pub struct Freezer {
    candidates: FilterInject<(Position,), (Frozen,)>,
    frozen: PoolInject<Frozen>,
    settings: SharedInject<SandboxSettings>,
    tick: u64,
}

inject_slots!(Freezer { candidates, frozen, settings });

impl System for Freezer {
    fn run(&mut self, _context: &EcsContext) {
        self.tick += 1;
        let interval = u64::from(self.settings.value().freeze_interval);
        if interval == 0 || self.tick % interval != 0 {
            return;
        }

        let target = self
            .candidates
            .value()
            .entities()
            .into_iter()
            .min_by_key(|entity| entity.index());
        if let Some(entity) = target {
            if self.frozen.value().add(entity, Frozen).is_ok() {
                debug!(%entity, tick = self.tick, "entity frozen");
            }
        }
    }
}

/// Publishes a [`TickStats`] into the stats world and hands it to the
/// optional [`TickLog`].
pub struct Report {
    stats_world: WorldInject,
    stats: PoolInject<TickStats>,
    moving: FilterInject<(Position, Velocity), (Frozen,)>,
    frozen: FilterInject<(Frozen,)>,
    log: CustomInject<dyn TickLog>,
    holder: Option<Entity>,
    tick: u64,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            stats_world: WorldInject::named(STATS_WORLD),
            stats: PoolInject::named(STATS_WORLD),
            moving: FilterInject::new(),
            frozen: FilterInject::new(),
            log: CustomInject::new(),
            holder: None,
            tick: 0,
        }
    }
}

inject_slots!(Report { stats_world, stats, moving, frozen, log });

impl System for Report {
    fn init(&mut self, _context: &EcsContext) {
        let holder = self.stats_world.value().spawn();
        match self.stats.value().add(holder, TickStats::default()) {
            Ok(_) => self.holder = Some(holder),
            Err(e) => warn!("Failed to create stats holder: {}", e),
        }
    }

    fn run(&mut self, _context: &EcsContext) {
        self.tick += 1;
        let stats = TickStats {
            tick: self.tick,
            moving: self.moving.value().len(),
            frozen: self.frozen.value().len(),
        };

        if let Some(holder) = self.holder {
            if let Some(mut current) = self.stats.value().get_mut(holder) {
                *current = stats;
            }
        }
        if let Some(log) = self.log.get() {
            log.record(&stats);
        }
    }

    fn destroy(&mut self, _context: &EcsContext) {
        if let Some(holder) = self.holder.take() {
            self.stats_world.value().despawn(holder);
        }
    }
}
