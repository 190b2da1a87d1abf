//! Deep copies of subtrees across ownership domains

use crate::{NodeId, Result, TocFragment, TocItem, TocTree};
use std::collections::HashMap;

/// Copies items from a source tree into a new, independently owned arena
struct Cloner<'a> {
    source: &'a TocTree,
    items: HashMap<NodeId, TocItem>,
}

impl<'a> Cloner<'a> {
    fn new(source: &'a TocTree) -> Self {
        Self {
            source,
            items: HashMap::new(),
        }
    }

    /// Copy `id` under `parent`; descendants are copied when `deep` is set.
    /// Recursion follows depth only, sibling chains are walked in a loop.
    fn copy(&mut self, id: NodeId, parent: Option<NodeId>, deep: bool) -> Result<NodeId> {
        let mut copy = self.source.item(id)?.detached_copy();
        let new_id = copy.id();
        copy.parent = parent;

        if deep {
            let children: Vec<NodeId> = self.source.children(id).collect();
            let copies = self.copy_chain(&children, Some(new_id))?;
            copy.first_child = copies.first().copied();
        }

        self.items.insert(new_id, copy);
        Ok(new_id)
    }

    fn copy_chain(&mut self, chain: &[NodeId], parent: Option<NodeId>) -> Result<Vec<NodeId>> {
        let mut copies = Vec::with_capacity(chain.len());
        for &id in chain {
            copies.push(self.copy(id, parent, true)?);
        }
        for pair in copies.windows(2) {
            if let Some(item) = self.items.get_mut(&pair[0]) {
                item.next_sibling = Some(pair[1]);
            }
        }
        Ok(copies)
    }

    fn finish(self, head: NodeId) -> TocFragment {
        TocFragment::from_parts(head, self.items)
    }
}

impl TocTree {
    /// Copy `id` into a new fragment with fresh handles.
    ///
    /// With `deep` the whole descendant structure is copied as well. The
    /// copy never shares a handle with this tree.
    pub fn clone_subtree(&self, id: NodeId, deep: bool) -> Result<TocFragment> {
        let mut cloner = Cloner::new(self);
        let head = cloner.copy(id, None, deep)?;
        Ok(cloner.finish(head))
    }

    /// Copy the whole forest (root list and all descendants) into a fragment
    pub fn clone_forest(&self) -> Result<Option<TocFragment>> {
        let roots: Vec<NodeId> = self.roots().collect();
        if roots.is_empty() {
            return Ok(None);
        }
        let mut cloner = Cloner::new(self);
        let copies = cloner.copy_chain(&roots, None)?;
        Ok(copies.first().map(|&head| cloner.finish(head)))
    }
}
