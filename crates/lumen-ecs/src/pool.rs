use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use crate::component::{Component, ComponentId, SparseSet};
use crate::entity::{Entity, EntityAllocator};
use crate::error::EcsError;

/// Type-erased view of a pool, used by worlds and filters.
pub(crate) trait ErasedPool: Send + Sync {
    fn id(&self) -> ComponentId;
    fn contains(&self, index: u32) -> bool;
    fn remove_index(&self, index: u32) -> bool;
    fn owners(&self) -> Vec<u32>;
    fn len(&self) -> usize;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

pub(crate) struct PoolStorage<T> {
    id: ComponentId,
    set: RwLock<SparseSet<T>>,
}

impl<T: Component> PoolStorage<T> {
    pub fn new() -> Self {
        Self {
            id: ComponentId::of::<T>(),
            set: RwLock::new(SparseSet::new()),
        }
    }
}

impl<T: Component> ErasedPool for PoolStorage<T> {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn contains(&self, index: u32) -> bool {
        self.set.read().contains(index)
    }

    fn remove_index(&self, index: u32) -> bool {
        self.set.write().remove(index).is_some()
    }

    fn owners(&self) -> Vec<u32> {
        self.set.read().owners().to_vec()
    }

    fn len(&self) -> usize {
        self.set.read().len()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Typed handle to the storage of one component type inside one world.
///
/// Handles are cheap to clone; every handle obtained for the same world and
/// component type points at the same storage (see [`Pool::ptr_eq`]).
pub struct Pool<T: Component> {
    storage: Arc<PoolStorage<T>>,
    entities: Arc<RwLock<EntityAllocator>>,
    world: Arc<str>,
}

impl<T: Component> Pool<T> {
    pub(crate) fn new(
        storage: Arc<PoolStorage<T>>,
        entities: Arc<RwLock<EntityAllocator>>,
        world: Arc<str>,
    ) -> Self {
        Self {
            storage,
            entities,
            world,
        }
    }

    /// Component type stored in this pool.
    pub fn id(&self) -> ComponentId {
        self.storage.id
    }

    /// Name of the world owning this pool.
    pub fn world_name(&self) -> &str {
        &self.world
    }

    /// Attach a component to an entity, returning the value it replaced.
    pub fn add(&self, entity: Entity, value: T) -> Result<Option<T>, EcsError> {
        if !self.entities.read().is_alive(entity) {
            return Err(EcsError::DeadEntity {
                entity,
                component: self.storage.id.name(),
            });
        }
        Ok(self.storage.set.write().insert(entity.index(), value))
    }

    /// Whether `entity` is alive and owns a component here.
    pub fn has(&self, entity: Entity) -> bool {
        self.entities.read().is_alive(entity) && self.storage.set.read().contains(entity.index())
    }

    /// Borrow the component of `entity`. Holds a read lock on the pool.
    pub fn get(&self, entity: Entity) -> Option<MappedRwLockReadGuard<'_, T>> {
        if !self.entities.read().is_alive(entity) {
            return None;
        }
        RwLockReadGuard::try_map(self.storage.set.read(), |set| set.get(entity.index())).ok()
    }

    /// Mutably borrow the component of `entity`. Holds a write lock on the pool.
    pub fn get_mut(&self, entity: Entity) -> Option<MappedRwLockWriteGuard<'_, T>> {
        if !self.entities.read().is_alive(entity) {
            return None;
        }
        RwLockWriteGuard::try_map(self.storage.set.write(), |set| set.get_mut(entity.index()))
            .ok()
    }

    /// Detach and return the component of `entity`.
    pub fn remove(&self, entity: Entity) -> Option<T> {
        if !self.entities.read().is_alive(entity) {
            return None;
        }
        self.storage.set.write().remove(entity.index())
    }

    /// Number of stored components.
    pub fn len(&self) -> usize {
        self.storage.set.read().len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the live entities that own a component in this pool.
    pub fn entities(&self) -> Vec<Entity> {
        // The set guard is released before the allocator is locked.
        let owners = self.storage.set.read().owners().to_vec();
        let allocator = self.entities.read();
        owners
            .into_iter()
            .filter_map(|index| allocator.entity_at(index))
            .collect()
    }

    /// Whether both handles address the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }
}

impl<T: Component> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            entities: Arc::clone(&self.entities),
            world: Arc::clone(&self.world),
        }
    }
}

impl<T: Component> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("component", &self.storage.id.name())
            .field("world", &&*self.world)
            .field("len", &self.len())
            .finish()
    }
}
