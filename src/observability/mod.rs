//! Observability.
//!
//! Structured logging to stderr; stdout is reserved for command output.

pub mod logging;

pub use logging::{LogFormat, init_logging};
