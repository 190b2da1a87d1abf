//! Commands that insert, remove, move and restyle bookmark items
//!
//! Structural commands return an inverse that puts every item back at the
//! exact position it was taken from, keyed by the same node IDs, so an
//! undo followed by a redo replays against identical state.

use crate::{Command, CommandResult, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use toc_model::{
    Anchor, Color, FontFlags, NodeId, Placement, RejectReason, TocFragment, TocTree,
};

fn require(tree: &TocTree, id: NodeId) -> Result<()> {
    tree.item(id)?;
    Ok(())
}

// =============================================================================
// Insert
// =============================================================================

/// Insert a fragment into the tree.
///
/// Without a target the fragment's chain is appended to the root list.
/// Fragments that carry a document wrapper may only land outside every
/// document, and new headings need a non-blank title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertItems {
    pub target: Option<NodeId>,
    pub placement: Placement,
    pub fragment: TocFragment,
}

impl InsertItems {
    /// Append to the end of the root list
    pub fn root(fragment: TocFragment) -> Self {
        Self {
            target: None,
            placement: Placement::Sibling,
            fragment,
        }
    }

    pub fn at(target: NodeId, placement: Placement, fragment: TocFragment) -> Self {
        Self {
            target: Some(target),
            placement,
            fragment,
        }
    }

    fn validate(&self, tree: &TocTree) -> Result<()> {
        for id in self.fragment.top_level() {
            let Some(item) = self.fragment.get(id) else {
                continue;
            };
            if !item.is_document() && item.title().trim().is_empty() {
                return Err(RejectReason::EmptyTitle.into());
            }
        }

        if let Some(target) = self.target {
            require(tree, target)?;
            if self.fragment.contains_document() {
                tree.check_document_insert(target, self.placement)?;
            }
        }
        Ok(())
    }
}

impl Command for InsertItems {
    fn apply(&self, tree: &TocTree) -> Result<CommandResult> {
        self.validate(tree)?;

        let mut new_tree = tree.clone();
        let inserted = self.fragment.top_level();
        let head = match self.target {
            None => new_tree.append_root(self.fragment.clone())?,
            Some(target) => match self.placement {
                Placement::Child => {
                    let head = new_tree.add_child(target, self.fragment.clone())?;
                    new_tree.ensure_expanded(target);
                    head
                }
                Placement::Sibling => {
                    if let Some(parent) = new_tree.parent(target) {
                        new_tree.ensure_expanded(parent);
                    }
                    new_tree.add_sibling(target, self.fragment.clone())?
                }
            },
        };

        tracing::debug!(head = %head, count = self.fragment.len(), "inserted bookmarks");
        Ok(CommandResult {
            tree: new_tree,
            inverse: Box::new(DiscardItems { ids: inserted }),
            focus: Some(head),
        })
    }

    fn display_name(&self) -> &str {
        "Insert Bookmarks"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Remove
// =============================================================================

/// Remove an item with its subtree. The last remaining root is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveItem {
    pub id: NodeId,
}

impl RemoveItem {
    pub fn new(id: NodeId) -> Self {
        Self { id }
    }
}

impl Command for RemoveItem {
    fn apply(&self, tree: &TocTree) -> Result<CommandResult> {
        require(tree, self.id)?;
        if !tree.can_remove(self.id) {
            return Err(RejectReason::LastRoot.into());
        }
        DiscardItems { ids: vec![self.id] }.apply(tree)
    }

    fn display_name(&self) -> &str {
        "Remove Bookmark"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Detach items in order and keep them for restoring (used for undo)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscardItems {
    pub ids: Vec<NodeId>,
}

impl Command for DiscardItems {
    fn apply(&self, tree: &TocTree) -> Result<CommandResult> {
        let mut new_tree = tree.clone();
        let mut entries = Vec::with_capacity(self.ids.len());
        for &id in &self.ids {
            let anchor = new_tree.anchor_of(id)?;
            let fragment = new_tree.detach(id)?;
            entries.push((anchor, fragment));
        }

        let focus = entries
            .first()
            .and_then(|(anchor, _)| anchor.after.or(anchor.parent));
        entries.reverse();

        Ok(CommandResult {
            tree: new_tree,
            inverse: Box::new(RestoreItems { entries }),
            focus,
        })
    }

    fn display_name(&self) -> &str {
        "Discard Bookmarks"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Put detached subtrees back at their recorded anchors, first entry first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreItems {
    pub entries: Vec<(Anchor, TocFragment)>,
}

impl Command for RestoreItems {
    fn apply(&self, tree: &TocTree) -> Result<CommandResult> {
        let mut new_tree = tree.clone();
        let mut restored = Vec::with_capacity(self.entries.len());
        for (anchor, fragment) in &self.entries {
            restored.push(new_tree.attach(*anchor, fragment.clone())?);
        }

        let focus = restored.last().copied();
        restored.reverse();
        Ok(CommandResult {
            tree: new_tree,
            inverse: Box::new(DiscardItems { ids: restored }),
            focus,
        })
    }

    fn display_name(&self) -> &str {
        "Restore Bookmarks"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Move
// =============================================================================

/// Where a moved item ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// Appended as child or sibling of `target`; checked against document
    /// boundaries
    Relative { target: NodeId, placement: Placement },
    /// An exact earlier position; not checked
    Anchor(Anchor),
}

/// Move an item together with its subtree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveItem {
    pub item: NodeId,
    pub destination: Destination,
}

impl MoveItem {
    pub fn new(item: NodeId, target: NodeId, placement: Placement) -> Self {
        Self {
            item,
            destination: Destination::Relative { target, placement },
        }
    }
}

impl Command for MoveItem {
    fn apply(&self, tree: &TocTree) -> Result<CommandResult> {
        require(tree, self.item)?;
        if let Destination::Relative { target, placement } = self.destination {
            require(tree, target)?;
            tree.check_reparent(self.item, target, placement)?;
        }

        let mut new_tree = tree.clone();
        let origin = new_tree.anchor_of(self.item)?;
        let fragment = new_tree.detach(self.item)?;
        match self.destination {
            Destination::Relative { target, placement: Placement::Child } => {
                new_tree.add_child(target, fragment)?;
                new_tree.ensure_expanded(target);
            }
            Destination::Relative { target, placement: Placement::Sibling } => {
                new_tree.add_sibling(target, fragment)?;
            }
            Destination::Anchor(anchor) => {
                new_tree.attach(anchor, fragment)?;
            }
        }

        tracing::debug!(item = %self.item, destination = ?self.destination, "moved bookmark");
        Ok(CommandResult {
            tree: new_tree,
            inverse: Box::new(MoveItem {
                item: self.item,
                destination: Destination::Anchor(origin),
            }),
            focus: Some(self.item),
        })
    }

    fn display_name(&self) -> &str {
        "Move Bookmark"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// Change an item's title, font flags and color
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditTitle {
    pub node: NodeId,
    pub title: String,
    pub font: FontFlags,
    pub color: Option<Color>,
    /// Set on inverses, which put back whatever was there before
    #[serde(default)]
    restoring: bool,
}

impl EditTitle {
    pub fn new(node: NodeId, title: impl Into<String>, font: FontFlags, color: Option<Color>) -> Self {
        Self {
            node,
            title: title.into(),
            font,
            color,
            restoring: false,
        }
    }
}

impl Command for EditTitle {
    fn apply(&self, tree: &TocTree) -> Result<CommandResult> {
        require(tree, self.node)?;
        if !self.restoring && self.title.trim().is_empty() {
            return Err(RejectReason::EmptyTitle.into());
        }

        let mut new_tree = tree.clone();
        let item = new_tree.item_mut(self.node)?;
        let inverse = EditTitle {
            node: self.node,
            title: item.title().to_string(),
            font: item.font(),
            color: item.color(),
            restoring: true,
        };
        item.set_title(self.title.clone());
        item.set_font(self.font);
        item.set_color(self.color);

        Ok(CommandResult {
            tree: new_tree,
            inverse: Box::new(inverse),
            focus: Some(self.node),
        })
    }

    /// Successive edits of the same item collapse into the latest one
    fn merge_with(&self, other: &dyn Command) -> Option<Box<dyn Command>> {
        let other = other.as_any().downcast_ref::<EditTitle>()?;
        if other.node != self.node || other.restoring || self.restoring {
            return None;
        }
        Some(Box::new(other.clone()))
    }

    fn display_name(&self) -> &str {
        "Edit Bookmark"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Include or exclude an item from export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetChecked {
    pub node: NodeId,
    pub checked: bool,
}

impl Command for SetChecked {
    fn apply(&self, tree: &TocTree) -> Result<CommandResult> {
        let mut new_tree = tree.clone();
        let item = new_tree.item_mut(self.node)?;
        let previous = item.is_checked();
        item.set_checked(self.checked);

        Ok(CommandResult {
            tree: new_tree,
            inverse: Box::new(SetChecked {
                node: self.node,
                checked: previous,
            }),
            focus: Some(self.node),
        })
    }

    fn display_name(&self) -> &str {
        "Set Checked"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
