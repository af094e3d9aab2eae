use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::component::ComponentId;
use crate::entity::{Entity, EntityAllocator};
use crate::pool::ErasedPool;

/// Canonical constraint set of a mask, used to share filters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct MaskKey {
    include: Vec<ComponentId>,
    exclude: Vec<ComponentId>,
}

impl MaskKey {
    pub fn new(include: Vec<ComponentId>, exclude: Vec<ComponentId>) -> Self {
        Self { include, exclude }
    }
}

struct FilterInner {
    world: Arc<str>,
    entities: Arc<RwLock<EntityAllocator>>,
    include: Vec<Arc<dyn ErasedPool>>,
    exclude: Vec<Arc<dyn ErasedPool>>,
}

/// Live view over the entities matching a mask.
///
/// The view reflects the current contents of the world each time it is read;
/// iteration order is unspecified.
#[derive(Clone)]
pub struct Filter {
    inner: Arc<FilterInner>,
}

impl Filter {
    pub(crate) fn new(
        world: Arc<str>,
        entities: Arc<RwLock<EntityAllocator>>,
        include: Vec<Arc<dyn ErasedPool>>,
        exclude: Vec<Arc<dyn ErasedPool>>,
    ) -> Self {
        Self {
            inner: Arc::new(FilterInner {
                world,
                entities,
                include,
                exclude,
            }),
        }
    }

    /// Name of the world this filter reads.
    pub fn world_name(&self) -> &str {
        &self.inner.world
    }

    fn matches(&self, index: u32) -> bool {
        self.inner.include.iter().all(|pool| pool.contains(index))
            && !self.inner.exclude.iter().any(|pool| pool.contains(index))
    }

    /// Snapshot of the matching entities. No pool locks are held once this
    /// returns, so callers may mutate pools while walking the result.
    pub fn entities(&self) -> Vec<Entity> {
        // Walk the smallest included pool.
        let Some(base) = self.inner.include.iter().min_by_key(|pool| pool.len()) else {
            return Vec::new();
        };
        let candidates = base.owners();
        let allocator = self.inner.entities.read();
        candidates
            .into_iter()
            .filter(|&index| self.matches(index))
            .filter_map(|index| allocator.entity_at(index))
            .collect()
    }

    /// Whether `entity` is alive and matches every constraint.
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.entities.read().is_alive(entity) && self.matches(entity.index())
    }

    /// Number of matching entities.
    pub fn len(&self) -> usize {
        self.entities().len()
    }

    /// Whether no entity matches.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Included component ids in canonical order.
    pub fn includes(&self) -> Vec<ComponentId> {
        self.inner.include.iter().map(|pool| pool.id()).collect()
    }

    /// Excluded component ids in canonical order.
    pub fn excludes(&self) -> Vec<ComponentId> {
        self.inner.exclude.iter().map(|pool| pool.id()).collect()
    }

    /// Whether both handles are the same cached filter.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<'a> IntoIterator for &'a Filter {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities().into_iter()
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("world", &&*self.inner.world)
            .field("include", &self.includes())
            .field("exclude", &self.excludes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::world::World;

    #[derive(Debug)]
    struct Position(f32);
    struct Velocity;
    struct Sleeping;

    #[test]
    fn include_and_exclude_select_entities() {
        let world = World::new("main");
        let positions = world.pool::<Position>();
        let velocities = world.pool::<Velocity>();
        let sleeping = world.pool::<Sleeping>();

        let moving = world.spawn();
        positions.add(moving, Position(0.0)).unwrap();
        velocities.add(moving, Velocity).unwrap();

        let parked = world.spawn();
        positions.add(parked, Position(5.0)).unwrap();

        let dozing = world.spawn();
        positions.add(dozing, Position(1.0)).unwrap();
        velocities.add(dozing, Velocity).unwrap();
        sleeping.add(dozing, Sleeping).unwrap();

        let filter = world
            .filter::<Position>()
            .inc::<Velocity>()
            .exc::<Sleeping>()
            .end()
            .unwrap();

        assert_eq!(filter.entities(), vec![moving]);
        assert!(filter.contains(moving));
        assert!(!filter.contains(parked));
        assert!(!filter.contains(dozing));
        assert_eq!(filter.world_name(), "main");
    }

    #[test]
    fn filter_tracks_later_changes() {
        let world = World::new("main");
        let positions = world.pool::<Position>();
        let filter = world.filter::<Position>().end().unwrap();
        assert!(filter.is_empty());

        let e = world.spawn();
        positions.add(e, Position(2.0)).unwrap();
        assert_eq!(filter.len(), 1);

        world.despawn(e);
        assert!(filter.is_empty());
    }

    #[test]
    fn mutation_while_iterating_snapshot() {
        let world = World::new("main");
        let positions = world.pool::<Position>();
        for i in 0..3 {
            let e = world.spawn();
            positions.add(e, Position(i as f32)).unwrap();
        }
        let filter = world.filter::<Position>().end().unwrap();
        for e in &filter {
            positions.get_mut(e).unwrap().0 += 10.0;
        }
        let mut values: Vec<f32> = filter
            .entities()
            .into_iter()
            .map(|e| positions.get(e).unwrap().0)
            .collect();
        values.sort_by(f32::total_cmp);
        assert_eq!(values, vec![10.0, 11.0, 12.0]);
    }
}
