//! Walking the forest for persistence
//!
//! The tree does not know any file format. Writers implement
//! [`BookmarkSink`] and receive every item in document order together with
//! its nesting depth.

use crate::{NodeId, TocItem, TocTree};

/// Receives bookmarks in document order
pub trait BookmarkSink {
    type Error;

    /// Called once per exported item; roots have depth 0
    fn item(&mut self, depth: usize, item: &TocItem) -> Result<(), Self::Error>;

    /// Called after the last item
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Which items a walk emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFilter {
    /// Every item, unchecked ones included
    #[default]
    All,
    /// Skip unchecked items together with their subtrees
    CheckedOnly,
}

/// Feed every item of `tree` to `sink`
pub fn walk<S: BookmarkSink>(tree: &TocTree, sink: &mut S) -> Result<(), S::Error> {
    walk_filtered(tree, ExportFilter::All, sink)
}

pub fn walk_filtered<S: BookmarkSink>(
    tree: &TocTree,
    filter: ExportFilter,
    sink: &mut S,
) -> Result<(), S::Error> {
    let roots: Vec<NodeId> = tree.roots().collect();
    let mut stack: Vec<(NodeId, usize)> = roots.into_iter().rev().map(|id| (id, 0)).collect();

    while let Some((id, depth)) = stack.pop() {
        let Some(item) = tree.get(id) else {
            continue;
        };
        if filter == ExportFilter::CheckedOnly && !item.is_checked() {
            continue;
        }
        sink.item(depth, item)?;
        let children: Vec<NodeId> = tree.children(id).collect();
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }
    sink.finish()
}
