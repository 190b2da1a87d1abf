//! Document scopes and the rules for edits that cross them
//!
//! Each item belongs to the scope of its nearest document wrapper (itself
//! included), or to the un-wrapped top level when there is none. Content
//! never leaves or enters a document's outline, and a wrapper is never
//! placed inside another document's outline.

use crate::{NodeId, TocTree};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where new or moved content goes relative to a target item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// Appended to the target's children
    Child,
    /// Appended to the target's sibling chain
    Sibling,
}

/// Why an edit was refused. The tree is unchanged whenever one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("bookmark titles cannot be empty")]
    EmptyTitle,
    #[error("items cannot move across document boundaries")]
    CrossDocument,
    #[error("a document cannot be placed inside another document's outline")]
    NestedDocument,
    #[error("an item cannot be moved into its own subtree")]
    Cycle,
    #[error("the last remaining top-level item cannot be removed")]
    LastRoot,
}

impl TocTree {
    /// The nearest document wrapper at or above `id`
    pub fn document_scope(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&candidate| self.get(candidate).is_some_and(|item| item.is_document()))
    }

    /// Whether both items belong to the same document (or both to none)
    pub fn same_document_scope(&self, a: NodeId, b: NodeId) -> bool {
        self.document_scope(a) == self.document_scope(b)
    }

    /// Scope of the list that content placed at `target` would join
    pub fn destination_scope(&self, target: NodeId, placement: Placement) -> Option<NodeId> {
        match placement {
            Placement::Child => self.document_scope(target),
            Placement::Sibling => self.parent(target).and_then(|parent| self.document_scope(parent)),
        }
    }

    /// Whether a whole document may be inserted at `target`
    pub fn check_document_insert(
        &self,
        target: NodeId,
        placement: Placement,
    ) -> Result<(), RejectReason> {
        match self.destination_scope(target, placement) {
            Some(_) => Err(RejectReason::NestedDocument),
            None => Ok(()),
        }
    }

    pub fn can_add_document_as_child(&self, target: NodeId) -> bool {
        self.contains(target) && self.check_document_insert(target, Placement::Child).is_ok()
    }

    pub fn can_add_document_as_sibling(&self, target: NodeId) -> bool {
        self.contains(target) && self.check_document_insert(target, Placement::Sibling).is_ok()
    }

    /// Whether `dragged` may be moved to `placement` of `target`
    pub fn check_reparent(
        &self,
        dragged: NodeId,
        target: NodeId,
        placement: Placement,
    ) -> Result<(), RejectReason> {
        if self.is_ancestor_or_self(dragged, target) {
            return Err(RejectReason::Cycle);
        }

        let destination = self.destination_scope(target, placement);
        if self.get(dragged).is_some_and(|item| item.is_document()) {
            return match destination {
                Some(_) => Err(RejectReason::NestedDocument),
                None => Ok(()),
            };
        }

        if self.document_scope(dragged) != destination {
            return Err(RejectReason::CrossDocument);
        }
        Ok(())
    }
}
