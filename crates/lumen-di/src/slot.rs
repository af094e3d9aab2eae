use lumen_ecs::{EcsContext, EcsError};

use crate::inject::Injector;
use crate::injects::Injects;

/// Capability: a slot that resolves itself from the running context.
///
/// `fill` returns the resolved value; the dispatcher writes it into the slot.
pub trait DataInject: Sized {
    fn fill(&self, context: &EcsContext) -> Result<Self, EcsError>;
}

/// Capability: a slot that resolves itself from the caller's ad-hoc objects.
/// A missing object is not an error.
pub trait CustomDataInject: Sized {
    fn fill(&self, injects: &Injects) -> Self;
}

/// Marker for the context-fill path.
pub enum FromContext {}

/// Marker for the list-fill path.
pub enum FromList {}

pub trait SlotKind {
    const NAME: &'static str;
}

impl SlotKind for FromContext {
    const NAME: &'static str = "context";
}

impl SlotKind for FromList {
    const NAME: &'static str = "list";
}

/// A slot type classified by capability at compile time.
///
/// `Kind` is inferred: a type with neither capability cannot be used as a
/// slot, and a type with both is ambiguous.
pub trait Slot<Kind: SlotKind>: Sized {
    fn resolve(&self, context: &EcsContext, injects: &Injects) -> Result<Self, EcsError>;
}

impl<T: DataInject> Slot<FromContext> for T {
    fn resolve(&self, context: &EcsContext, _injects: &Injects) -> Result<Self, EcsError> {
        self.fill(context)
    }
}

impl<T: CustomDataInject> Slot<FromList> for T {
    fn resolve(&self, _context: &EcsContext, injects: &Injects) -> Result<Self, EcsError> {
        Ok(self.fill(injects))
    }
}

/// Implemented by anything with injectable slots. Each slot is handed to the
/// injector in a fixed order; members that are not handed over stay untouched.
///
/// Usually generated with [`inject_slots!`](crate::inject_slots).
pub trait InjectSlots {
    fn inject_slots(&mut self, injector: &mut Injector<'_>) -> Result<(), EcsError>;
}

/// Implement [`InjectSlots`] for a struct by listing its slot fields in
/// resolution order.
///
/// ```ignore
/// struct Movement {
///     moving: FilterInject<(Position, Velocity), (Frozen,)>,
///     config: SharedInject<Config>,
///     steps: u64,
/// }
///
/// inject_slots!(Movement { moving, config });
/// ```
#[macro_export]
macro_rules! inject_slots {
    ($system:ty { $($slot:ident),* $(,)? }) => {
        impl $crate::InjectSlots for $system {
            fn inject_slots(
                &mut self,
                injector: &mut $crate::Injector<'_>,
            ) -> ::core::result::Result<(), $crate::EcsError> {
                let _ = &injector;
                $(injector.slot(::core::stringify!($slot), &mut self.$slot)?;)*
                ::core::result::Result::Ok(())
            }
        }
    };
}
