//! Common utilities and helpers

pub mod logging;

pub use logging::{LogFormat, LoggingConfig, LoggingSystem};
