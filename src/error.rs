//! Error types for ShiftFlux
//!
//! The per-run pipeline never fails; these errors only surface at the JSON and
//! configuration boundary.

use thiserror::Error;

/// Errors that can occur while loading inputs or configuration
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid calculation card: {0}")]
    InvalidCard(String),

    #[error("No cached input to reprocess")]
    NothingToReprocess,
}
