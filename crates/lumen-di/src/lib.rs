//! Lumen DI - slot injection for systems
//!
//! Systems declare typed slots ([`WorldInject`], [`PoolInject`],
//! [`FilterInject`], [`SharedInject`], [`CustomInject`]) and list them with
//! [`inject_slots!`]. A single call to [`Systems::inject`] (or
//! [`Systems::inject_with`] when ad-hoc objects are supplied) resolves every
//! slot before the first tick.
//!
//! ```ignore
//! struct Movement {
//!     moving: FilterInject<(Position, Velocity), (Frozen,)>,
//!     gravity: SharedInject<Gravity>,
//! }
//!
//! inject_slots!(Movement { moving, gravity });
//!
//! systems.add(movement).inject()?;
//! ```

mod compose;
mod custom;
mod inject;
mod injects;
mod slot;
mod systems;
mod wrappers;

pub use compose::{ExcludeSet, IncludeSet, MAX_SET_ARITY};
pub use custom::CustomInject;
pub use inject::{inject_system, Injector};
pub use injects::Injects;
pub use slot::{CustomDataInject, DataInject, FromContext, FromList, InjectSlots, Slot, SlotKind};
pub use systems::{System, SystemAny, Systems};
pub use wrappers::{FilterInject, PoolInject, SharedInject, WorldInject};

pub use lumen_ecs::{EcsContext, EcsError};
