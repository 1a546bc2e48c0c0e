//! Error types for the host integration layer.

use thiserror::Error;

use progression_core::ProgressionError;

use crate::components::EntityId;

/// Errors raised while routing events or saves to characters.
#[derive(Error, Debug)]
pub enum HostError {
    /// No character is registered under this id.
    #[error("Entity not found: {0}")]
    UnknownEntity(EntityId),

    /// A tracker rejected the operation.
    #[error(transparent)]
    Progression(#[from] ProgressionError),

    /// A save document could not be encoded or decoded.
    #[error("Save document error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, HostError>;
