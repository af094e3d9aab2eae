use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::component::Component;
use crate::entity::{Entity, EntityAllocator};
use crate::filter::{Filter, MaskKey};
use crate::mask::Mask;
use crate::pool::{ErasedPool, Pool, PoolStorage};

struct WorldInner {
    name: Arc<str>,
    entities: Arc<RwLock<EntityAllocator>>,
    pools: RwLock<HashMap<TypeId, Arc<dyn ErasedPool>>>,
    filters: Mutex<HashMap<MaskKey, Filter>>,
}

/// A named partition of entities, component pools and filters.
///
/// `World` is a shared handle: clones refer to the same storage.
#[derive(Clone)]
pub struct World {
    inner: Arc<WorldInner>,
}

impl World {
    /// Empty world named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            inner: Arc::new(WorldInner {
                name: Arc::from(name),
                entities: Arc::new(RwLock::new(EntityAllocator::new())),
                pools: RwLock::new(HashMap::new()),
                filters: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Name the world was created with.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    // ---- Entity management ----

    /// Spawn a new entity with no components.
    pub fn spawn(&self) -> Entity {
        self.inner.entities.write().allocate()
    }

    /// Despawn an entity, detaching it from every pool.
    pub fn despawn(&self, entity: Entity) -> bool {
        if !self.inner.entities.write().release(entity) {
            return false;
        }
        for pool in self.inner.pools.read().values() {
            pool.remove_index(entity.index());
        }
        true
    }

    /// Whether `entity` refers to a live entity.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.inner.entities.read().is_alive(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.inner.entities.read().len()
    }

    // ---- Pools ----

    /// The pool for component type `T`, created on first request.
    pub fn pool<T: Component>(&self) -> Pool<T> {
        let storage = self
            .erased_pool::<T>()
            .into_any()
            .downcast::<PoolStorage<T>>()
            .expect("pool registered under a foreign type id");
        Pool::new(
            storage,
            Arc::clone(&self.inner.entities),
            Arc::clone(&self.inner.name),
        )
    }

    pub(crate) fn erased_pool<T: Component>(&self) -> Arc<dyn ErasedPool> {
        if let Some(pool) = self.inner.pools.read().get(&TypeId::of::<T>()) {
            return Arc::clone(pool);
        }
        let mut pools = self.inner.pools.write();
        let pool = pools.entry(TypeId::of::<T>()).or_insert_with(|| {
            debug!(world = %self.inner.name, component = type_name::<T>(), "pool created");
            let storage: Arc<dyn ErasedPool> = Arc::new(PoolStorage::<T>::new());
            storage
        });
        Arc::clone(pool)
    }

    /// Number of component types with a pool.
    pub fn pool_count(&self) -> usize {
        self.inner.pools.read().len()
    }

    // ---- Filters ----

    /// Start a mask that requires component `T`.
    pub fn filter<T: Component>(&self) -> Mask {
        Mask::new(self.clone()).inc::<T>()
    }

    /// Number of distinct filters materialised on this world.
    pub fn filter_count(&self) -> usize {
        self.inner.filters.lock().len()
    }

    pub(crate) fn cached_filter(&self, key: MaskKey, build: impl FnOnce() -> Filter) -> Filter {
        let mut filters = self.inner.filters.lock();
        filters
            .entry(key)
            .or_insert_with(|| {
                let filter = build();
                debug!(world = %self.inner.name, filter = ?filter, "filter created");
                filter
            })
            .clone()
    }

    pub(crate) fn entities_handle(&self) -> Arc<RwLock<EntityAllocator>> {
        Arc::clone(&self.inner.entities)
    }

    pub(crate) fn name_handle(&self) -> Arc<str> {
        Arc::clone(&self.inner.name)
    }

    /// Whether both handles refer to the same world.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("name", &&*self.inner.name)
            .field("entities", &self.entity_count())
            .field("pools", &self.pool_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }

    #[test]
    fn spawn_and_despawn() {
        let world = World::new("main");
        let e = world.spawn();
        assert!(world.is_alive(e));
        assert_eq!(world.entity_count(), 1);
        assert!(world.despawn(e));
        assert!(!world.is_alive(e));
        assert!(!world.despawn(e));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn pool_is_shared_per_component_type() {
        let world = World::new("main");
        let a = world.pool::<Position>();
        let b = world.pool::<Position>();
        assert!(a.ptr_eq(&b));
        assert_eq!(world.pool_count(), 1);
        world.pool::<Velocity>();
        assert_eq!(world.pool_count(), 2);
    }

    #[test]
    fn pools_are_per_world() {
        let left = World::new("left");
        let right = World::new("right");
        assert!(!left.pool::<Position>().ptr_eq(&right.pool::<Position>()));
        assert_eq!(left.pool::<Position>().world_name(), "left");
    }

    #[test]
    fn despawn_detaches_components() {
        let world = World::new("main");
        let positions = world.pool::<Position>();
        let velocities = world.pool::<Velocity>();
        let e = world.spawn();
        positions.add(e, Position { x: 1.0, y: 2.0 }).unwrap();
        velocities.add(e, Velocity { dx: 0.5, dy: 0.0 }).unwrap();
        assert_eq!(positions.get(e).map(|p| (p.x, p.y)), Some((1.0, 2.0)));
        assert_eq!(velocities.get(e).map(|v| (v.dx, v.dy)), Some((0.5, 0.0)));
        world.despawn(e);

        let reused = world.spawn();
        assert_eq!(reused.index(), e.index());
        assert!(!positions.has(reused));
        assert!(velocities.is_empty());
    }

    #[test]
    fn clones_share_storage() {
        let world = World::new("main");
        let alias = world.clone();
        alias.spawn();
        assert_eq!(world.entity_count(), 1);
        assert!(world.ptr_eq(&alias));
        assert!(!world.ptr_eq(&World::new("main")));
    }
}
