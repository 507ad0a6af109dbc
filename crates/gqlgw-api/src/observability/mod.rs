//! Observability setup for the server binary.

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
