//! Lumen ECS - storage and query engine
//!
//! Generational entities, sparse-set component pools, include/exclude masks and
//! the filters they materialise into, grouped into named worlds. An
//! [`EcsContext`] ties the worlds together with the shared singletons that
//! systems resolve against.

mod component;
mod context;
mod entity;
mod error;
mod filter;
mod mask;
mod pool;
mod shared;
mod world;

pub use component::{Component, ComponentId};
pub use context::EcsContext;
pub use entity::Entity;
pub use error::EcsError;
pub use filter::Filter;
pub use mask::Mask;
pub use pool::Pool;
pub use world::World;
