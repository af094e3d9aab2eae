use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::EcsError;
use crate::shared::SharedMap;
use crate::world::World;

/// The running context systems resolve against: a default world, any number
/// of named worlds and the shared singletons.
pub struct EcsContext {
    default_world: World,
    worlds: HashMap<String, World>,
    shared: SharedMap,
}

impl EcsContext {
    /// Context with `default_world` reachable under the empty name.
    pub fn new(default_world: World) -> Self {
        Self {
            default_world,
            worlds: HashMap::new(),
            shared: SharedMap::new(),
        }
    }

    /// Register a named world. The empty name belongs to the default world.
    pub fn add_world(
        &mut self,
        name: impl Into<String>,
        world: World,
    ) -> Result<&mut Self, EcsError> {
        let name = name.into();
        if name.is_empty() {
            return Err(EcsError::ReservedWorldName);
        }
        if self.worlds.contains_key(&name) {
            return Err(EcsError::WorldAlreadyRegistered(name));
        }
        debug!(world = %name, "world registered");
        self.worlds.insert(name, world);
        Ok(self)
    }

    /// Look a world up by name; `""` selects the default world.
    pub fn world(&self, name: &str) -> Result<World, EcsError> {
        if name.is_empty() {
            return Ok(self.default_world.clone());
        }
        self.worlds
            .get(name)
            .cloned()
            .ok_or_else(|| EcsError::UnknownWorld(name.to_string()))
    }

    /// The world resolved for an empty name.
    pub fn default_world(&self) -> &World {
        &self.default_world
    }

    /// Named worlds, in no particular order.
    pub fn worlds(&self) -> impl Iterator<Item = (&str, &World)> {
        self.worlds.iter().map(|(name, world)| (name.as_str(), world))
    }

    /// Register the shared singleton of type `T`. Each type is registered once.
    pub fn insert_shared<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        value: Arc<T>,
    ) -> Result<&mut Self, EcsError> {
        if !self.shared.insert(value) {
            return Err(EcsError::SharedAlreadyRegistered(type_name::<T>()));
        }
        debug!(shared = type_name::<T>(), "shared singleton registered");
        Ok(self)
    }

    /// The singleton registered for `T`.
    pub fn shared<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, EcsError> {
        self.shared
            .get::<T>()
            .ok_or(EcsError::SharedNotRegistered(type_name::<T>()))
    }

    /// Whether a singleton is registered for `T`.
    pub fn has_shared<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.shared.contains::<T>()
    }

    /// Number of registered singletons.
    pub fn shared_count(&self) -> usize {
        self.shared.len()
    }
}

impl fmt::Debug for EcsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.worlds.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("EcsContext")
            .field("default_world", &self.default_world)
            .field("worlds", &names)
            .field("shared", &self.shared.len())
            .finish()
    }
}

impl Default for EcsContext {
    fn default() -> Self {
        Self::new(World::new(""))
    }
}
