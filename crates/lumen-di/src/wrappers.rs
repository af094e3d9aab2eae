//! Slots that resolve from the running context: worlds, pools, filters and
//! shared singletons.
//!
//! Each wrapper starts out configured (a world name, where it has one) and
//! unresolved. Injection replaces it with a resolved copy; accessing the value
//! of an unresolved wrapper through `value()` panics, `get()` returns `None`.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use lumen_ecs::{Component, EcsContext, EcsError, Filter, Pool, World};

use crate::compose::{ExcludeSet, IncludeSet};
use crate::slot::DataInject;

fn not_injected(kind: &str, world: &str) -> ! {
    panic!("{kind} for world '{world}' used before injection")
}

/// Resolves to a [`World`] by name.
#[derive(Debug, Clone, Default)]
pub struct WorldInject {
    world_name: String,
    value: Option<World>,
}

impl WorldInject {
    /// Slot bound to the default world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot bound to the world registered under `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            world_name: name.into(),
            value: None,
        }
    }

    /// Configured world name; empty for the default world.
    pub fn world_name(&self) -> &str {
        &self.world_name
    }

    /// Whether the slot holds a world.
    pub fn is_injected(&self) -> bool {
        self.value.is_some()
    }

    /// The resolved world, if any.
    pub fn get(&self) -> Option<&World> {
        self.value.as_ref()
    }

    /// The resolved world. Panics before injection.
    pub fn value(&self) -> &World {
        self.value
            .as_ref()
            .unwrap_or_else(|| not_injected("WorldInject", &self.world_name))
    }
}

impl DataInject for WorldInject {
    fn fill(&self, context: &EcsContext) -> Result<Self, EcsError> {
        Ok(Self {
            world_name: self.world_name.clone(),
            value: Some(context.world(&self.world_name)?),
        })
    }
}

/// Resolves to the [`Pool`] of component `T` in a named world.
pub struct PoolInject<T: Component> {
    world_name: String,
    value: Option<Pool<T>>,
}

impl<T: Component> PoolInject<T> {
    /// Slot bound to the default world.
    pub fn new() -> Self {
        Self::named("")
    }

    /// Slot bound to the world registered under `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            world_name: name.into(),
            value: None,
        }
    }

    /// Configured world name; empty for the default world.
    pub fn world_name(&self) -> &str {
        &self.world_name
    }

    /// Whether the slot holds a pool.
    pub fn is_injected(&self) -> bool {
        self.value.is_some()
    }

    /// The resolved pool, if any.
    pub fn get(&self) -> Option<&Pool<T>> {
        self.value.as_ref()
    }

    /// The resolved pool. Panics before injection.
    pub fn value(&self) -> &Pool<T> {
        self.value
            .as_ref()
            .unwrap_or_else(|| not_injected("PoolInject", &self.world_name))
    }
}

impl<T: Component> DataInject for PoolInject<T> {
    fn fill(&self, context: &EcsContext) -> Result<Self, EcsError> {
        let world = context.world(&self.world_name)?;
        Ok(Self {
            world_name: self.world_name.clone(),
            value: Some(world.pool::<T>()),
        })
    }
}

impl<T: Component> Default for PoolInject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> Clone for PoolInject<T> {
    fn clone(&self) -> Self {
        Self {
            world_name: self.world_name.clone(),
            value: self.value.clone(),
        }
    }
}

impl<T: Component> fmt::Debug for PoolInject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolInject")
            .field("world_name", &self.world_name)
            .field("value", &self.value)
            .finish()
    }
}

/// Resolves to the [`Filter`] of entities having every component of `I` and
/// none of `E`, and keeps the typed pools of `I` for direct access.
///
/// ```ignore
/// moving: FilterInject<(Position, Velocity), (Frozen,)>,
/// // ...
/// let (positions, velocities) = self.moving.pools();
/// for entity in self.moving.value() { /* ... */ }
/// ```
pub struct FilterInject<I: IncludeSet, E: ExcludeSet = ()> {
    world_name: String,
    filter: Option<Filter>,
    pools: Option<I::Pools>,
    _exclude: PhantomData<fn() -> E>,
}

impl<I: IncludeSet, E: ExcludeSet> FilterInject<I, E> {
    /// Slot filtering the default world.
    pub fn new() -> Self {
        Self::named("")
    }

    /// Slot filtering the world registered under `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            world_name: name.into(),
            filter: None,
            pools: None,
            _exclude: PhantomData,
        }
    }

    /// Configured world name; empty for the default world.
    pub fn world_name(&self) -> &str {
        &self.world_name
    }

    /// Whether the slot holds a filter.
    pub fn is_injected(&self) -> bool {
        self.filter.is_some()
    }

    /// The resolved filter, if any.
    pub fn get(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// The resolved filter. Panics before injection.
    pub fn value(&self) -> &Filter {
        self.filter
            .as_ref()
            .unwrap_or_else(|| not_injected("FilterInject", &self.world_name))
    }

    /// Pools captured for the included components, in tuple order.
    pub fn get_pools(&self) -> Option<&I::Pools> {
        self.pools.as_ref()
    }

    /// Captured pools. Panics before injection.
    pub fn pools(&self) -> &I::Pools {
        self.pools
            .as_ref()
            .unwrap_or_else(|| not_injected("FilterInject", &self.world_name))
    }
}

impl<I: IncludeSet, E: ExcludeSet> DataInject for FilterInject<I, E> {
    fn fill(&self, context: &EcsContext) -> Result<Self, EcsError> {
        let world = context.world(&self.world_name)?;
        let (pools, mask) = I::fill(&world);
        let filter = E::fill(mask).end()?;
        Ok(Self {
            world_name: self.world_name.clone(),
            filter: Some(filter),
            pools: Some(pools),
            _exclude: PhantomData,
        })
    }
}

impl<I: IncludeSet, E: ExcludeSet> Default for FilterInject<I, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: IncludeSet, E: ExcludeSet> Clone for FilterInject<I, E> {
    fn clone(&self) -> Self {
        Self {
            world_name: self.world_name.clone(),
            filter: self.filter.clone(),
            pools: self.pools.clone(),
            _exclude: PhantomData,
        }
    }
}

impl<I: IncludeSet, E: ExcludeSet> fmt::Debug for FilterInject<I, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterInject")
            .field("world_name", &self.world_name)
            .field("include", &I::ids())
            .field("exclude", &E::ids())
            .field("value", &self.filter)
            .finish()
    }
}

/// Resolves to the shared singleton of type `T` registered in the context.
pub struct SharedInject<T: ?Sized + Send + Sync + 'static> {
    value: Option<Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> SharedInject<T> {
    /// Unresolved slot.
    pub fn new() -> Self {
        Self { value: None }
    }

    /// Whether the slot holds the singleton.
    pub fn is_injected(&self) -> bool {
        self.value.is_some()
    }

    /// The resolved singleton, if any.
    pub fn get(&self) -> Option<&Arc<T>> {
        self.value.as_ref()
    }

    /// The resolved singleton. Panics before injection.
    pub fn value(&self) -> &T {
        match &self.value {
            Some(value) => value,
            None => panic!(
                "SharedInject<{}> used before injection",
                std::any::type_name::<T>()
            ),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> DataInject for SharedInject<T> {
    fn fill(&self, context: &EcsContext) -> Result<Self, EcsError> {
        Ok(Self {
            value: Some(context.shared::<T>()?),
        })
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for SharedInject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Clone for SharedInject<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> fmt::Debug for SharedInject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedInject")
            .field("type", &std::any::type_name::<T>())
            .field("injected", &self.is_injected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_ecs::ComponentId;

    struct Position(f32);
    struct Velocity(f32);
    struct Frozen;

    struct Gravity(f32);

    fn context() -> EcsContext {
        let mut context = EcsContext::new(World::new("default"));
        context.add_world("physics", World::new("physics")).unwrap();
        context.insert_shared(Arc::new(Gravity(9.8))).unwrap();
        context
    }

    #[test]
    fn world_inject_resolves_named_world() {
        let context = context();
        let slot = WorldInject::named("physics");
        assert!(!slot.is_injected());
        let slot = slot.fill(&context).unwrap();
        assert_eq!(slot.value().name(), "physics");
        assert_eq!(slot.world_name(), "physics");
    }

    #[test]
    fn world_inject_defaults_to_default_world() {
        let context = context();
        let slot = WorldInject::new().fill(&context).unwrap();
        assert!(slot.value().ptr_eq(context.default_world()));
    }

    #[test]
    fn unknown_world_fails() {
        let context = context();
        let err = PoolInject::<Position>::named("ui").fill(&context).unwrap_err();
        assert_eq!(err, EcsError::UnknownWorld("ui".to_string()));
    }

    #[test]
    fn pool_inject_shares_pools() {
        let context = context();
        let a = PoolInject::<Position>::named("physics").fill(&context).unwrap();
        let b = PoolInject::<Position>::named("physics").fill(&context).unwrap();
        let other = PoolInject::<Position>::new().fill(&context).unwrap();
        assert!(a.value().ptr_eq(b.value()));
        assert!(!a.value().ptr_eq(other.value()));
    }

    #[test]
    fn filter_inject_resolves_filter_and_pools() {
        let context = context();
        let slot = FilterInject::<(Position, Velocity), (Frozen,)>::named("physics")
            .fill(&context)
            .unwrap();
        let filter = slot.value();
        assert_eq!(filter.world_name(), "physics");
        assert_eq!(filter.excludes(), vec![ComponentId::of::<Frozen>()]);
        assert_eq!(filter.includes().len(), 2);

        let (positions, velocities) = slot.pools();
        let world = context.world("physics").unwrap();
        let e = world.spawn();
        positions.add(e, Position(0.0)).unwrap();
        velocities.add(e, Velocity(1.5)).unwrap();
        assert!(filter.contains(e));
        assert_eq!(velocities.get(e).unwrap().0, 1.5);

        world.pool::<Frozen>().add(e, Frozen).unwrap();
        assert!(!filter.contains(e));
        assert_eq!(positions.get(e).unwrap().0, 0.0);
    }

    #[test]
    fn refill_replaces_previous_resolution() {
        let context = context();
        let first = FilterInject::<(Position,)>::new().fill(&context).unwrap();
        let second = first.fill(&context).unwrap();
        assert!(first.value().ptr_eq(second.value()));
        assert!(first.pools().0.ptr_eq(&second.pools().0));
    }

    #[test]
    fn shared_inject_resolves_singleton() {
        let context = context();
        let slot = SharedInject::<Gravity>::new().fill(&context).unwrap();
        assert_eq!(slot.value().0, 9.8);
        assert!(matches!(
            SharedInject::<String>::new().fill(&context),
            Err(EcsError::SharedNotRegistered(_))
        ));
    }

    #[test]
    #[should_panic(expected = "used before injection")]
    fn unresolved_value_panics() {
        let slot = PoolInject::<Position>::new();
        slot.value();
    }
}
