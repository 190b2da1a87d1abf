//! Error types for editing operations

use thiserror::Error;
use toc_model::{EngineError, RejectReason, TocModelError};

#[derive(Debug, Error)]
pub enum EditError {
    /// A rule refused the edit; the tree was left as it was
    #[error("Edit rejected: {0}")]
    Rejected(RejectReason),

    #[error("Document import failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Bookmark model error: {0}")]
    Model(#[from] TocModelError),

    #[error("Undo stack is empty")]
    UndoStackEmpty,

    #[error("Redo stack is empty")]
    RedoStackEmpty,
}

impl From<RejectReason> for EditError {
    fn from(reason: RejectReason) -> Self {
        EditError::Rejected(reason)
    }
}

pub type Result<T> = std::result::Result<T, EditError>;
