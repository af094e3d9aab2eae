use std::fmt;
use std::sync::Arc;

use crate::component::{Component, ComponentId};
use crate::error::EcsError;
use crate::filter::{Filter, MaskKey};
use crate::pool::ErasedPool;
use crate::world::World;

/// Builder for a filter: accumulates include/exclude constraints on one world.
///
/// Constraints behave as a set. Naming a component twice is recorded and
/// rejected by [`Mask::end`].
pub struct Mask {
    world: World,
    include: Vec<Arc<dyn ErasedPool>>,
    exclude: Vec<Arc<dyn ErasedPool>>,
    duplicate: Option<ComponentId>,
}

impl Mask {
    pub(crate) fn new(world: World) -> Self {
        Self {
            world,
            include: Vec::new(),
            exclude: Vec::new(),
            duplicate: None,
        }
    }

    /// Require component `T`.
    pub fn inc<T: Component>(mut self) -> Self {
        let pool = self.world.erased_pool::<T>();
        if self.check_unique(pool.id()) {
            self.include.push(pool);
        }
        self
    }

    /// Reject entities that have component `T`.
    pub fn exc<T: Component>(mut self) -> Self {
        let pool = self.world.erased_pool::<T>();
        if self.check_unique(pool.id()) {
            self.exclude.push(pool);
        }
        self
    }

    fn check_unique(&mut self, id: ComponentId) -> bool {
        let seen = self
            .include
            .iter()
            .chain(&self.exclude)
            .any(|pool| pool.id() == id);
        if seen {
            self.duplicate.get_or_insert(id);
        }
        !seen
    }

    /// World the mask was started on.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Included component ids in canonical order.
    pub fn includes(&self) -> Vec<ComponentId> {
        sorted_ids(&self.include)
    }

    /// Excluded component ids in canonical order.
    pub fn excludes(&self) -> Vec<ComponentId> {
        sorted_ids(&self.exclude)
    }

    /// Materialise the mask. Masks with the same constraint set on the same
    /// world yield the same filter.
    pub fn end(mut self) -> Result<Filter, EcsError> {
        if let Some(id) = self.duplicate {
            return Err(EcsError::DuplicateConstraint {
                component: id.name(),
                world: self.world.name().to_string(),
            });
        }
        self.include.sort_by_key(|pool| pool.id());
        self.exclude.sort_by_key(|pool| pool.id());
        let key = MaskKey::new(sorted_ids(&self.include), sorted_ids(&self.exclude));
        let Self {
            world,
            include,
            exclude,
            ..
        } = self;
        Ok(world.cached_filter(key, || {
            Filter::new(
                world.name_handle(),
                world.entities_handle(),
                include,
                exclude,
            )
        }))
    }
}

fn sorted_ids(pools: &[Arc<dyn ErasedPool>]) -> Vec<ComponentId> {
    let mut ids: Vec<_> = pools.iter().map(|pool| pool.id()).collect();
    ids.sort();
    ids
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mask")
            .field("world", &self.world.name())
            .field("include", &self.includes())
            .field("exclude", &self.excludes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Alpha;
    struct Beta;
    struct Gamma;

    #[test]
    fn constraint_order_does_not_matter() {
        let world = World::new("main");
        let ab = world.filter::<Alpha>().inc::<Beta>().exc::<Gamma>();
        let ba = world.filter::<Beta>().exc::<Gamma>().inc::<Alpha>();
        assert_eq!(ab.includes(), ba.includes());
        assert_eq!(ab.excludes(), ba.excludes());

        let first = ab.end().unwrap();
        let second = ba.end().unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(world.filter_count(), 1);
    }

    #[test]
    fn different_constraints_get_different_filters() {
        let world = World::new("main");
        let plain = world.filter::<Alpha>().end().unwrap();
        let narrowed = world.filter::<Alpha>().exc::<Beta>().end().unwrap();
        assert!(!plain.ptr_eq(&narrowed));
        assert_eq!(world.filter_count(), 2);
    }

    #[test]
    fn duplicate_include_is_rejected() {
        let world = World::new("main");
        let err = world.filter::<Alpha>().inc::<Alpha>().end().unwrap_err();
        assert!(matches!(err, EcsError::DuplicateConstraint { world, .. } if world == "main"));
    }

    #[test]
    fn include_and_exclude_of_same_type_is_rejected() {
        let world = World::new("main");
        let mask = world.filter::<Alpha>().exc::<Beta>().exc::<Alpha>();
        assert_eq!(mask.excludes(), vec![ComponentId::of::<Beta>()]);
        assert!(mask.end().is_err());
        assert_eq!(world.filter_count(), 0);
    }
}
