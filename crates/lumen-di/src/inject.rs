use std::any::type_name;

use lumen_ecs::{EcsContext, EcsError};
use tracing::{debug, info, trace, warn};

use crate::injects::Injects;
use crate::slot::{InjectSlots, Slot, SlotKind};
use crate::systems::Systems;

/// Dispatches the slots of one system to their resolution path.
pub struct Injector<'a> {
    context: &'a EcsContext,
    injects: &'a Injects,
    system: &'static str,
    resolved: usize,
}

impl<'a> Injector<'a> {
    /// Injector for one system; `system` only labels log events.
    pub fn new(context: &'a EcsContext, injects: &'a Injects, system: &'static str) -> Self {
        Self {
            context,
            injects,
            system,
            resolved: 0,
        }
    }

    /// Resolve one slot and write the result back into it.
    ///
    /// On error the slot keeps its current value and the error is returned
    /// unchanged.
    pub fn slot<K: SlotKind, S: Slot<K>>(
        &mut self,
        name: &'static str,
        slot: &mut S,
    ) -> Result<(), EcsError> {
        match slot.resolve(self.context, self.injects) {
            Ok(resolved) => {
                *slot = resolved;
                self.resolved += 1;
                trace!(system = self.system, slot = name, path = K::NAME, "slot resolved");
                Ok(())
            }
            Err(err) => {
                warn!(system = self.system, slot = name, error = %err, "injection aborted");
                Err(err)
            }
        }
    }

    /// Slots resolved so far.
    pub fn resolved(&self) -> usize {
        self.resolved
    }

    /// Name of the system being injected.
    pub fn system(&self) -> &'static str {
        self.system
    }
}

/// Resolve every slot of a single system, returning how many were resolved.
pub fn inject_system<S: InjectSlots + ?Sized>(
    context: &EcsContext,
    system: &mut S,
    injects: &Injects,
) -> Result<usize, EcsError> {
    let mut injector = Injector::new(context, injects, type_name::<S>());
    system.inject_slots(&mut injector)?;
    Ok(injector.resolved())
}

impl Systems {
    /// Resolve the slots of every system with no ad-hoc objects.
    pub fn inject(&mut self) -> Result<&mut Self, EcsError> {
        self.inject_with(&Injects::new())
    }

    /// Resolve the slots of every system, in insertion order. The first
    /// failure aborts the pass; systems after it are left untouched.
    pub fn inject_with(&mut self, injects: &Injects) -> Result<&mut Self, EcsError> {
        let mut total = 0;
        for system in &mut self.systems {
            let mut injector = Injector::new(&self.context, injects, system.name());
            system.inject_slots(&mut injector)?;
            debug!(system = injector.system(), slots = injector.resolved(), "system injected");
            total += injector.resolved();
        }
        info!(
            systems = self.systems.len(),
            slots = total,
            injects = injects.len(),
            "injection pass complete"
        );
        Ok(self)
    }
}
