//! Page ranges of bookmark items
//!
//! Every document wrapper opens a page scope of `1..=page_count`. Inside a
//! scope an item ends one page before the next item (in document order)
//! that points at a page, and the last one ends at the document's last
//! page. A parent always covers its children's ranges. Items outside every
//! wrapper only aggregate what their children cover.

use crate::{NodeId, TocTree};

impl TocTree {
    /// Recompute `end_page_number` for every reachable item
    pub fn compute_page_ranges(&mut self) {
        let roots: Vec<NodeId> = self.roots().collect();
        for root in roots {
            self.range_outside(root);
        }
    }

    fn page_of(&self, id: NodeId) -> u32 {
        self.get(id).map_or(0, |item| item.page_number())
    }

    fn set_end(&mut self, id: NodeId, end: u32) {
        if let Some(item) = self.get_mut(id) {
            item.set_end_page_number(end);
        }
    }

    fn range_outside(&mut self, id: NodeId) -> u32 {
        if let Some(page_count) = self.get(id).and_then(|item| item.kind().page_count()) {
            return self.range_document(id, page_count);
        }
        let children: Vec<NodeId> = self.children(id).collect();
        let mut end = self.page_of(id);
        for child in children {
            end = end.max(self.range_outside(child));
        }
        self.set_end(id, end);
        end
    }

    fn range_document(&mut self, wrapper: NodeId, page_count: u32) -> u32 {
        let order = self.scope_order(wrapper);

        let mut next_page: Option<u32> = None;
        for &id in order.iter().rev() {
            let page = self.page_of(id);
            let end = if page == 0 {
                0
            } else {
                let candidate = next_page.map_or(page_count, |next| next.saturating_sub(1));
                candidate.min(page_count).max(page)
            };
            self.set_end(id, end);
            if page > 0 {
                next_page = Some(page);
            }
        }

        let children: Vec<NodeId> = self.children(wrapper).collect();
        for child in children {
            self.settle(child, page_count);
        }

        let end = page_count.max(self.page_of(wrapper));
        self.set_end(wrapper, end);
        end
    }

    /// Raise provisional ends to cover children, capped at the page count
    fn settle(&mut self, id: NodeId, page_count: u32) -> u32 {
        if let Some(nested_pages) = self.get(id).and_then(|item| item.kind().page_count()) {
            return self.range_document(id, nested_pages);
        }
        let mut end = self.get(id).map_or(0, |item| item.end_page_number());
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            end = end.max(self.settle(child, page_count));
        }
        let end = end.min(page_count).max(self.page_of(id));
        self.set_end(id, end);
        end
    }

    /// Descendants of a wrapper in document order, without nested wrappers
    /// or anything below them
    fn scope_order(&self, wrapper: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.children(wrapper).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            if self.get(id).is_some_and(|item| item.is_document()) {
                continue;
            }
            order.push(id);
            let children: Vec<NodeId> = self.children(id).collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }
}
