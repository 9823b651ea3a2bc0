//! Domain layer for ecsview
//!
//! Records, summaries, configuration and the port the aggregation services
//! depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CollectionError, DomainError, DomainResult};
