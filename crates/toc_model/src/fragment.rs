//! Owned subtrees that are not linked into a tree

use crate::{NodeId, TocItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A detached sibling chain of subtrees together with every item it owns.
///
/// Fragments carry ownership in and out of a [`crate::TocTree`]: new items,
/// cloned subtrees and removed-but-not-deleted subtrees all travel as
/// fragments. The top-level chain starts at `head` and its members have no
/// parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocFragment {
    head: NodeId,
    items: HashMap<NodeId, TocItem>,
}

impl TocFragment {
    /// A fragment holding a single, unlinked item
    pub fn single(mut item: TocItem) -> Self {
        item.parent = None;
        item.first_child = None;
        item.next_sibling = None;
        let head = item.id();
        let mut items = HashMap::with_capacity(1);
        items.insert(head, item);
        Self { head, items }
    }

    pub(crate) fn from_parts(head: NodeId, items: HashMap<NodeId, TocItem>) -> Self {
        Self { head, items }
    }

    pub(crate) fn into_parts(self) -> (NodeId, HashMap<NodeId, TocItem>) {
        (self.head, self.items)
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn head_item(&self) -> Option<&TocItem> {
        self.items.get(&self.head)
    }

    pub fn get(&self, id: NodeId) -> Option<&TocItem> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TocItem> {
        self.items.get_mut(&id)
    }

    /// Total number of items, at every depth
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items.keys().copied()
    }

    /// The top-level chain, starting at the head
    pub fn top_level(&self) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(self.head);
        while let Some(id) = current {
            if chain.len() > self.items.len() {
                break;
            }
            chain.push(id);
            current = self.items.get(&id).and_then(|item| item.next_sibling);
        }
        chain
    }

    /// Whether any item in the fragment is a document wrapper
    pub fn contains_document(&self) -> bool {
        self.items.values().any(TocItem::is_document)
    }

    /// Turn every document wrapper in the fragment into a plain heading
    pub fn demote_documents(&mut self) {
        for item in self.items.values_mut() {
            item.demote_to_heading();
        }
    }
}
