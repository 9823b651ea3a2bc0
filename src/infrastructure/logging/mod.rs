//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - stderr output in compact, pretty or JSON form
//! - optional JSON log file with rotation

pub mod logger;

pub use logger::LoggerImpl;
