//! Command system for bookmark tree editing

use std::any::Any;
use toc_model::{NodeId, TocTree};

/// Result of applying a command
#[derive(Debug)]
pub struct CommandResult {
    /// The new tree after the command
    pub tree: TocTree,
    /// The inverse command (for undo)
    pub inverse: Box<dyn Command>,
    /// Item the host should select afterwards, if any
    pub focus: Option<NodeId>,
}

/// Trait for all editing commands.
///
/// `apply` works on a copy of the tree, so a command that fails leaves the
/// caller's tree untouched.
pub trait Command: std::fmt::Debug + Send + Sync {
    /// Apply this command to a tree
    fn apply(&self, tree: &TocTree) -> crate::Result<CommandResult>;

    /// Try to merge this command with a later one (for batching)
    fn merge_with(&self, _other: &dyn Command) -> Option<Box<dyn Command>> {
        None
    }

    /// Get a display name for this command
    fn display_name(&self) -> &str;

    /// Clone this command into a box
    fn clone_box(&self) -> Box<dyn Command>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Command> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
