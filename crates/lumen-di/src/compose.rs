//! Include/exclude component sets for [`FilterInject`](crate::FilterInject).
//!
//! Sets are tuples of component types. Include sets start a mask on a world
//! and capture a typed [`Pool`] per component; exclude sets extend a mask.
//! Both are implemented for every tuple arity up to [`MAX_SET_ARITY`].

use lumen_ecs::{Component, ComponentId, Mask, Pool, World};

/// Components an entity must have.
pub trait IncludeSet: 'static {
    /// One pool handle per included component, in tuple order.
    type Pools: Clone + Send + Sync;

    /// Capture the pools of every component and start a mask requiring them all.
    fn fill(world: &World) -> (Self::Pools, Mask);

    /// Component ids in tuple order.
    fn ids() -> Vec<ComponentId>;
}

/// Components an entity must not have.
pub trait ExcludeSet: 'static {
    fn fill(mask: Mask) -> Mask;

    fn ids() -> Vec<ComponentId>;
}

/// The empty exclude set.
impl ExcludeSet for () {
    fn fill(mask: Mask) -> Mask {
        mask
    }

    fn ids() -> Vec<ComponentId> {
        Vec::new()
    }
}

macro_rules! impl_component_set {
    ($first:ident $(, $rest:ident)*) => {
        impl<$first: Component $(, $rest: Component)*> IncludeSet for ($first, $($rest,)*) {
            type Pools = (Pool<$first>, $(Pool<$rest>,)*);

            fn fill(world: &World) -> (Self::Pools, Mask) {
                let pools = (world.pool::<$first>(), $(world.pool::<$rest>(),)*);
                let mask = world.filter::<$first>()$(.inc::<$rest>())*;
                (pools, mask)
            }

            fn ids() -> Vec<ComponentId> {
                vec![ComponentId::of::<$first>(), $(ComponentId::of::<$rest>(),)*]
            }
        }

        impl<$first: Component $(, $rest: Component)*> ExcludeSet for ($first, $($rest,)*) {
            fn fill(mask: Mask) -> Mask {
                mask.exc::<$first>()$(.exc::<$rest>())*
            }

            fn ids() -> Vec<ComponentId> {
                vec![ComponentId::of::<$first>(), $(ComponentId::of::<$rest>(),)*]
            }
        }
    };
}

// Implements both sets for every prefix of the type parameter list and sets
// `MAX_SET_ARITY` to its length. Extending the list raises the bound.
macro_rules! impl_component_sets {
    (@prefix [$($done:ident)*] $next:ident $($rest:ident)*) => {
        impl_component_set!($($done,)* $next);
        impl_component_sets!(@prefix [$($done)* $next] $($rest)*);
    };
    (@prefix [$($done:ident)*]) => {};
    ($($all:ident)+) => {
        /// Largest tuple accepted as an include or exclude set.
        pub const MAX_SET_ARITY: usize = [$(stringify!($all)),+].len();

        impl_component_sets!(@prefix [] $($all)+);
    };
}

impl_component_sets!(A B C D E F G H I J K L M N O P);

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_ecs::EcsError;

    struct C0;
    struct C1;
    struct C2;
    struct C3;
    struct C4;
    struct C5;
    struct C6;
    struct C7;
    struct C8;
    struct C9;
    struct C10;
    struct C11;
    struct C12;
    struct C13;
    struct C14;
    struct C15;

    #[test]
    fn include_order_does_not_change_constraints() {
        let world = World::new("main");
        let (_, ab) = <(C0, C1) as IncludeSet>::fill(&world);
        let (_, ba) = <(C1, C0) as IncludeSet>::fill(&world);
        assert_eq!(ab.includes(), ba.includes());
        assert!(ab.excludes().is_empty());
        assert!(ab.end().unwrap().ptr_eq(&ba.end().unwrap()));
    }

    #[test]
    fn include_captures_world_pools() {
        let world = World::new("main");
        let ((first, second), _) = <(C0, C1) as IncludeSet>::fill(&world);
        assert!(first.ptr_eq(&world.pool::<C0>()));
        assert!(second.ptr_eq(&world.pool::<C1>()));
        assert_eq!(first.world_name(), "main");
    }

    #[test]
    fn exclude_extends_mask() {
        let world = World::new("main");
        let (_, mask) = <(C0,) as IncludeSet>::fill(&world);
        let mask = <(C2, C1) as ExcludeSet>::fill(mask);
        assert_eq!(mask.includes(), vec![ComponentId::of::<C0>()]);
        let mut expected = vec![ComponentId::of::<C1>(), ComponentId::of::<C2>()];
        expected.sort();
        assert_eq!(mask.excludes(), expected);
    }

    #[test]
    fn empty_exclude_is_identity() {
        let world = World::new("main");
        let (_, mask) = <(C0,) as IncludeSet>::fill(&world);
        let mask = <() as ExcludeSet>::fill(mask);
        assert!(mask.excludes().is_empty());
        assert!(<() as ExcludeSet>::ids().is_empty());
    }

    #[test]
    fn include_and_exclude_share_the_arity_bound() {
        type Wide = (C0, C1, C2, C3, C4, C5, C6, C7, C8, C9, C10, C11, C12, C13, C14, C15);
        assert_eq!(MAX_SET_ARITY, 16);
        assert_eq!(<Wide as IncludeSet>::ids().len(), MAX_SET_ARITY);
        assert_eq!(<Wide as ExcludeSet>::ids().len(), MAX_SET_ARITY);

        let world = World::new("main");
        let (_, mask) = <(C0, C1, C2, C3, C4, C5, C6, C7, C8) as IncludeSet>::fill(&world);
        let filter = <(C9, C10, C11, C12, C13) as ExcludeSet>::fill(mask).end().unwrap();
        assert_eq!(filter.includes().len(), 9);
        assert_eq!(filter.excludes().len(), 5);
    }

    #[test]
    fn overlapping_sets_fail_at_end() {
        let world = World::new("main");
        let (_, mask) = <(C0, C1) as IncludeSet>::fill(&world);
        let err = <(C1,) as ExcludeSet>::fill(mask).end().unwrap_err();
        assert!(matches!(err, EcsError::DuplicateConstraint { .. }));
    }
}
