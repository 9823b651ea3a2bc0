//! Infrastructure layer module
//!
//! Configuration loading and logging setup. The control-plane client lives
//! in [`crate::adapters`].

pub mod config;
pub mod logging;
