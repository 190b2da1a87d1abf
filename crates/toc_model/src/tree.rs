//! The combined bookmark forest and its structural operations

use crate::{NodeId, Result, TocFragment, TocItem, TocModelError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A position inside a sibling list, used to put a subtree back exactly
/// where it was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Owner of the list; `None` is the forest's root list
    pub parent: Option<NodeId>,
    /// Item directly before the position; `None` inserts at the head of the list
    pub after: Option<NodeId>,
}

/// The combined table-of-contents forest.
///
/// Owns every reachable item. Relations are handle fields on the items;
/// the forest's root list is the sibling chain starting at `first_root`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TocTree {
    items: HashMap<NodeId, TocItem>,
    first_root: Option<NodeId>,
}

/// Iterator over a sibling chain
pub struct Siblings<'a> {
    tree: &'a TocTree,
    next: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.items.get(&id).and_then(|item| item.next_sibling);
        Some(id)
    }
}

impl TocTree {
    /// Create an empty forest
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forest with a single root
    pub fn with_root(item: TocItem) -> Self {
        Self::from_fragment(TocFragment::single(item))
    }

    /// Adopt a fragment's top-level chain as the root list
    pub fn from_fragment(fragment: TocFragment) -> Self {
        let (head, items) = fragment.into_parts();
        Self {
            items,
            first_root: Some(head),
        }
    }

    /// Give up the whole forest as a fragment (None when empty)
    pub fn into_fragment(self) -> Option<TocFragment> {
        let head = self.first_root?;
        Some(TocFragment::from_parts(head, self.items))
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn get(&self, id: NodeId) -> Option<&TocItem> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TocItem> {
        self.items.get_mut(&id)
    }

    /// Get an item or fail with `NodeNotFound`
    pub fn item(&self, id: NodeId) -> Result<&TocItem> {
        self.items
            .get(&id)
            .ok_or(TocModelError::NodeNotFound(id.as_uuid()))
    }

    /// Get a mutable item or fail with `NodeNotFound`
    pub fn item_mut(&mut self, id: NodeId) -> Result<&mut TocItem> {
        self.items
            .get_mut(&id)
            .ok_or(TocModelError::NodeNotFound(id.as_uuid()))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in arbitrary order
    pub fn items(&self) -> impl Iterator<Item = &TocItem> {
        self.items.values()
    }

    // =========================================================================
    // Relations
    // =========================================================================

    pub fn first_root(&self) -> Option<NodeId> {
        self.first_root
    }

    /// The sibling chain starting at `start`
    pub fn chain(&self, start: Option<NodeId>) -> Siblings<'_> {
        Siblings { tree: self, next: start }
    }

    pub fn roots(&self) -> Siblings<'_> {
        self.chain(self.first_root)
    }

    pub fn root_count(&self) -> usize {
        self.roots().count()
    }

    pub fn root_at(&self, n: usize) -> Option<NodeId> {
        self.roots().nth(n)
    }

    pub fn children(&self, id: NodeId) -> Siblings<'_> {
        self.chain(self.items.get(&id).and_then(|item| item.first_child))
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    pub fn child_at(&self, id: NodeId, n: usize) -> Option<NodeId> {
        self.children(id).nth(n)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.items.get(&id).and_then(|item| item.parent)
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if result.len() > self.items.len() {
                break;
            }
            result.push(ancestor);
            current = self.parent(ancestor);
        }
        result
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        id == ancestor || self.ancestors(id).contains(&ancestor)
    }

    /// Depth of an item; roots are at depth 0
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    fn last_in_chain(&self, id: NodeId) -> NodeId {
        self.chain(Some(id)).last().unwrap_or(id)
    }

    fn list_head(&self, parent: Option<NodeId>) -> Result<Option<NodeId>> {
        match parent {
            Some(parent) => Ok(self.item(parent)?.first_child),
            None => Ok(self.first_root),
        }
    }

    fn set_list_head(&mut self, parent: Option<NodeId>, head: Option<NodeId>) -> Result<()> {
        match parent {
            Some(parent) => self.item_mut(parent)?.first_child = head,
            None => self.first_root = head,
        }
        Ok(())
    }

    /// Ids of `id` and all its descendants, in pre-order
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        if !self.contains(id) {
            return result;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            let children: Vec<NodeId> = self.children(current).collect();
            stack.extend(children.into_iter().rev());
        }
        result
    }

    /// Every reachable item with its depth, in document order
    pub fn preorder(&self) -> Vec<(NodeId, usize)> {
        let mut result = Vec::with_capacity(self.items.len());
        let roots: Vec<NodeId> = self.roots().collect();
        let mut stack: Vec<(NodeId, usize)> = roots.into_iter().rev().map(|id| (id, 0)).collect();
        while let Some((current, depth)) = stack.pop() {
            result.push((current, depth));
            let children: Vec<NodeId> = self.children(current).collect();
            stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        }
        result
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.items.get(&id).is_some_and(TocItem::is_expanded)
    }

    pub fn toggle_expanded(&mut self, id: NodeId) -> Result<()> {
        self.item_mut(id)?.toggle();
        Ok(())
    }

    /// Open `id` and every ancestor so that `id` is visible
    pub fn ensure_expanded(&mut self, id: NodeId) {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(node) = current {
            let Some(item) = self.items.get_mut(&node) else {
                break;
            };
            item.force_open();
            current = item.parent;
            steps += 1;
            if steps > self.items.len() {
                break;
            }
        }
    }

    /// Open the top-level items when the forest has at most two of them
    pub fn open_single_roots(&mut self) {
        let roots: Vec<NodeId> = self.roots().take(3).collect();
        if roots.len() > 2 {
            return;
        }
        for id in roots {
            if let Some(item) = self.items.get_mut(&id) {
                if !item.is_expanded() {
                    item.toggle();
                }
            }
        }
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    fn check_disjoint(&self, fragment: &TocFragment) -> Result<()> {
        if let Some(id) = fragment.ids().find(|id| self.items.contains_key(id)) {
            return Err(TocModelError::InvalidOperation(format!(
                "item {} is already part of the tree",
                id
            )));
        }
        Ok(())
    }

    /// Link a fragment's top-level chain into the list owned by `parent`,
    /// directly after `after` (or at the head of the list).
    fn splice(
        &mut self,
        parent: Option<NodeId>,
        after: Option<NodeId>,
        fragment: TocFragment,
    ) -> Result<NodeId> {
        self.check_disjoint(&fragment)?;
        let following = match after {
            Some(after) => self.item(after)?.next_sibling,
            None => self.list_head(parent)?,
        };

        let chain = fragment.top_level();
        let (head, mut items) = fragment.into_parts();
        for id in &chain {
            if let Some(item) = items.get_mut(id) {
                item.parent = parent;
            }
        }
        let last = chain.last().copied().unwrap_or(head);
        if let Some(item) = items.get_mut(&last) {
            item.next_sibling = following;
        }
        self.items.extend(items);

        match after {
            Some(after) => self.item_mut(after)?.next_sibling = Some(head),
            None => self.set_list_head(parent, Some(head))?,
        }
        Ok(head)
    }

    /// Append a fragment's chain to the end of the root list
    pub fn append_root(&mut self, fragment: TocFragment) -> Result<NodeId> {
        let after = self.first_root.map(|first| self.last_in_chain(first));
        self.splice(None, after, fragment)
    }

    /// Append a fragment's chain to the end of `id`'s sibling chain.
    ///
    /// The appended items adopt `id`'s parent.
    pub fn add_sibling(&mut self, id: NodeId, fragment: TocFragment) -> Result<NodeId> {
        let parent = self.item(id)?.parent;
        let after = self.last_in_chain(id);
        self.splice(parent, Some(after), fragment)
    }

    /// Append a fragment's chain to the end of `id`'s child list
    pub fn add_child(&mut self, id: NodeId, fragment: TocFragment) -> Result<NodeId> {
        let after = self
            .item(id)?
            .first_child
            .map(|first| self.last_in_chain(first));
        self.splice(Some(id), after, fragment)
    }

    /// Insert a fragment at an exact position
    pub fn attach(&mut self, anchor: Anchor, fragment: TocFragment) -> Result<NodeId> {
        if let Some(after) = anchor.after {
            if self.item(after)?.parent != anchor.parent {
                return Err(TocModelError::InvalidOperation(format!(
                    "anchor item {} is not in the requested list",
                    after
                )));
            }
        }
        self.splice(anchor.parent, anchor.after, fragment)
    }

    /// The position `id` currently occupies
    pub fn anchor_of(&self, id: NodeId) -> Result<Anchor> {
        let parent = self.item(id)?.parent;
        let mut previous = None;
        for sibling in self.chain(self.list_head(parent)?).take(self.items.len()) {
            if sibling == id {
                return Ok(Anchor {
                    parent,
                    after: previous,
                });
            }
            previous = Some(sibling);
        }
        Err(self.defect(format!("item {} is missing from its parent's list", id)))
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Whether removing `id` keeps at least one root in the forest
    pub fn can_remove(&self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        !(self.first_root == Some(id) && self.root_count() == 1)
    }

    /// Unlink `id` from its sibling chain without touching its subtree
    fn unlink(&mut self, id: NodeId) -> Result<()> {
        let (parent, next) = {
            let item = self.item(id)?;
            (item.parent, item.next_sibling)
        };
        let head = self.list_head(parent)?;

        if head == Some(id) {
            self.set_list_head(parent, next)?;
        } else {
            let predecessor = self
                .chain(head)
                .take(self.items.len())
                .find(|sibling| self.items.get(sibling).and_then(|item| item.next_sibling) == Some(id));
            match predecessor {
                Some(predecessor) => self.item_mut(predecessor)?.next_sibling = next,
                None => {
                    return Err(self.defect(format!(
                        "item {} is missing from the list it claims to belong to",
                        id
                    )))
                }
            }
        }

        let item = self.item_mut(id)?;
        item.next_sibling = None;
        item.parent = None;
        Ok(())
    }

    /// Detach `id` with its descendants and hand them over as a fragment.
    ///
    /// The former parent and its ancestors are opened so the surrounding
    /// view does not collapse.
    pub fn detach(&mut self, id: NodeId) -> Result<TocFragment> {
        if let Some(parent) = self.item(id)?.parent {
            self.ensure_expanded(parent);
        }
        let ids = self.subtree_ids(id);
        self.unlink(id)?;

        let mut items = HashMap::with_capacity(ids.len());
        for sub_id in ids {
            if let Some(item) = self.items.remove(&sub_id) {
                items.insert(sub_id, item);
            }
        }
        Ok(TocFragment::from_parts(id, items))
    }

    /// Remove `id` from the tree.
    ///
    /// With `also_delete` the subtree is destroyed; otherwise the detached
    /// subtree is returned to the caller.
    pub fn remove(&mut self, id: NodeId, also_delete: bool) -> Result<Option<TocFragment>> {
        let fragment = self.detach(id)?;
        if also_delete {
            tracing::debug!(item = %id, count = fragment.len(), "deleted bookmark subtree");
            return Ok(None);
        }
        Ok(Some(fragment))
    }

    fn defect(&self, message: String) -> TocModelError {
        tracing::error!(%message, "bookmark tree invariant violated");
        if cfg!(debug_assertions) {
            panic!("bookmark tree invariant violated: {}", message);
        }
        TocModelError::Inconsistent(message)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Verify that every item sits in exactly one list, that its parent
    /// field names that list's owner, and that every chain terminates.
    pub fn check_consistency(&self) -> Result<()> {
        let mut seen: HashSet<NodeId> = HashSet::with_capacity(self.items.len());
        let mut lists: Vec<(Option<NodeId>, Option<NodeId>)> = vec![(None, self.first_root)];

        while let Some((owner, head)) = lists.pop() {
            let mut current = head;
            while let Some(id) = current {
                let item = self.items.get(&id).ok_or_else(|| {
                    TocModelError::Inconsistent(format!("linked item {} is not in the arena", id))
                })?;
                if !seen.insert(id) {
                    return Err(TocModelError::Inconsistent(format!(
                        "item {} is reachable more than once",
                        id
                    )));
                }
                if item.parent != owner {
                    return Err(TocModelError::Inconsistent(format!(
                        "item {} has parent {:?} but is listed under {:?}",
                        id, item.parent, owner
                    )));
                }
                lists.push((Some(id), item.first_child));
                current = item.next_sibling;
            }
        }

        if seen.len() != self.items.len() {
            return Err(TocModelError::Inconsistent(format!(
                "{} items are not reachable from the root list",
                self.items.len() - seen.len()
            )));
        }
        Ok(())
    }
}
