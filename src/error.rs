//! Engine error types

use thiserror::Error;

/// Errors surfaced at the engine's input boundary.
///
/// Everything past validation is total arithmetic over clamped values, so
/// these two cases are the only ways the engine can refuse to work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
