use std::any::{type_name, Any};
use std::fmt;

use lumen_ecs::EcsContext;
use tracing::debug;

use crate::slot::InjectSlots;

#[doc(hidden)]
pub trait SystemAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> SystemAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of per-tick behaviour. Its slots are injected once before `init`.
pub trait System: InjectSlots + SystemAny + Send + Sync {
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn init(&mut self, _context: &EcsContext) {}

    fn run(&mut self, context: &EcsContext);

    fn destroy(&mut self, _context: &EcsContext) {}
}

/// An ordered list of systems together with the context they run against.
pub struct Systems {
    pub(crate) context: EcsContext,
    pub(crate) systems: Vec<Box<dyn System>>,
}

impl Systems {
    /// Empty collection running against `context`.
    pub fn new(context: EcsContext) -> Self {
        Self {
            context,
            systems: Vec::new(),
        }
    }

    /// Append a system; systems are injected and run in insertion order.
    pub fn add<S: System + 'static>(&mut self, system: S) -> &mut Self {
        debug!(system = system.name(), "system added");
        self.systems.push(Box::new(system));
        self
    }

    /// The context every system resolves and runs against.
    pub fn context(&self) -> &EcsContext {
        &self.context
    }

    /// Mutable access, for registering worlds or shared values before injection.
    pub fn context_mut(&mut self) -> &mut EcsContext {
        &mut self.context
    }

    /// The system at `index`, if it has type `S`.
    pub fn get<S: System + 'static>(&self, index: usize) -> Option<&S> {
        let system: &dyn System = &**self.systems.get(index)?;
        SystemAny::as_any(system).downcast_ref::<S>()
    }

    /// Mutable variant of [`Systems::get`].
    pub fn get_mut<S: System + 'static>(&mut self, index: usize) -> Option<&mut S> {
        let system: &mut dyn System = &mut **self.systems.get_mut(index)?;
        SystemAny::as_any_mut(system).downcast_mut::<S>()
    }

    /// Names of the systems, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|system| system.name()).collect()
    }

    /// Number of systems.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether no system was added.
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Call `init` on every system, in order.
    pub fn init(&mut self) {
        for system in &mut self.systems {
            system.init(&self.context);
        }
    }

    /// Run every system once, in order.
    pub fn run(&mut self) {
        for system in &mut self.systems {
            system.run(&self.context);
        }
    }

    /// Call `destroy` on every system, in reverse order.
    pub fn destroy(&mut self) {
        for system in self.systems.iter_mut().rev() {
            system.destroy(&self.context);
        }
    }
}

impl fmt::Debug for Systems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Systems")
            .field("context", &self.context)
            .field("systems", &self.names())
            .finish()
    }
}
