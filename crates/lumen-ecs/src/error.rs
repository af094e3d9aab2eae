use crate::entity::Entity;

/// Errors raised by the storage engine and the running context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    #[error("world '{0}' is not registered")]
    UnknownWorld(String),

    #[error("world '{0}' is already registered")]
    WorldAlreadyRegistered(String),

    #[error("the empty world name is reserved for the default world")]
    ReservedWorldName,

    #[error("no shared singleton of type {0} is registered")]
    SharedNotRegistered(&'static str),

    #[error("a shared singleton of type {0} is already registered")]
    SharedAlreadyRegistered(&'static str),

    #[error("component {component} is constrained more than once in a mask on world '{world}'")]
    DuplicateConstraint {
        component: &'static str,
        world: String,
    },

    #[error("cannot add component {component} to dead entity {entity}")]
    DeadEntity {
        entity: Entity,
        component: &'static str,
    },
}
