//! Port trait definitions (Hexagonal Architecture)
//!
//! The aggregation services depend only on these contracts:
//! - ResourceClient: list/describe calls against the control plane
//!
//! Adapters under `crate::adapters` provide the AWS and in-memory
//! implementations.

pub mod errors;
pub mod resource_client;

pub use errors::ClientError;
pub use resource_client::{Operation, ResourceClient};
