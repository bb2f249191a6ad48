//! Public runtime API surface.

pub mod errors;

pub use errors::{Result, RuntimeError, TelemetryError};
