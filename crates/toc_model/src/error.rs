//! Error types for bookmark tree operations

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TocModelError {
    #[error("Node not found: {0}")]
    NodeNotFound(Uuid),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The tree's own linkage is broken. Never caused by user input.
    #[error("Tree is inconsistent: {0}")]
    Inconsistent(String),
}

pub type Result<T> = std::result::Result<T, TocModelError>;
