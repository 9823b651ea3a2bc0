//! Implementations of the resource client port.

pub mod ecs;
pub mod memory;

pub use ecs::EcsResourceClient;
pub use memory::InMemoryResourceClient;
