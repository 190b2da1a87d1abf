//! Property tests for structural edits on the bookmark forest
//!
//! Random sequences of inserts, removals and moves must always leave a
//! forest whose chains terminate and whose parent fields match the lists
//! that actually hold each item.

use proptest::prelude::*;
use toc_model::{NodeId, Placement, TocFragment, TocItem, TocTree};

#[derive(Debug, Clone)]
enum Op {
    AddChild(usize),
    AddSibling(usize),
    AddDocument(usize, bool),
    Remove(usize),
    Detach(usize),
    Move(usize, usize, bool),
    Toggle(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<usize>().prop_map(Op::AddChild),
        3 => any::<usize>().prop_map(Op::AddSibling),
        1 => (any::<usize>(), any::<bool>()).prop_map(|(i, s)| Op::AddDocument(i, s)),
        2 => any::<usize>().prop_map(Op::Remove),
        1 => any::<usize>().prop_map(Op::Detach),
        3 => (any::<usize>(), any::<usize>(), any::<bool>()).prop_map(|(a, b, s)| Op::Move(a, b, s)),
        1 => any::<usize>().prop_map(Op::Toggle),
    ]
}

fn pick(tree: &TocTree, index: usize) -> NodeId {
    let order = tree.preorder();
    order[index % order.len()].0
}

fn placement(as_sibling: bool) -> Placement {
    if as_sibling {
        Placement::Sibling
    } else {
        Placement::Child
    }
}

fn apply(tree: &mut TocTree, op: &Op, counter: &mut u32) {
    *counter += 1;
    let title = format!("item {}", counter);
    match *op {
        Op::AddChild(i) => {
            let target = pick(tree, i);
            tree.add_child(target, TocFragment::single(TocItem::new(title, *counter)))
                .unwrap();
        }
        Op::AddSibling(i) => {
            let target = pick(tree, i);
            tree.add_sibling(target, TocFragment::single(TocItem::new(title, *counter)))
                .unwrap();
        }
        Op::AddDocument(i, as_sibling) => {
            let target = pick(tree, i);
            let placement = placement(as_sibling);
            if tree.check_document_insert(target, placement).is_ok() {
                let doc = TocFragment::single(TocItem::document(title, "doc.pdf", 20));
                match placement {
                    Placement::Child => tree.add_child(target, doc).unwrap(),
                    Placement::Sibling => tree.add_sibling(target, doc).unwrap(),
                };
            }
        }
        Op::Remove(i) => {
            let target = pick(tree, i);
            if tree.can_remove(target) {
                tree.remove(target, true).unwrap();
            }
        }
        Op::Detach(i) => {
            // Detach and put back at the end of the root list
            let target = pick(tree, i);
            if tree.can_remove(target) {
                let fragment = tree.remove(target, false).unwrap().unwrap();
                tree.append_root(fragment).unwrap();
            }
        }
        Op::Move(a, b, as_sibling) => {
            let dragged = pick(tree, a);
            let target = pick(tree, b);
            let placement = placement(as_sibling);
            if dragged != target && tree.check_reparent(dragged, target, placement).is_ok() {
                let fragment = tree.detach(dragged).unwrap();
                match placement {
                    Placement::Child => tree.add_child(target, fragment).unwrap(),
                    Placement::Sibling => tree.add_sibling(target, fragment).unwrap(),
                };
            }
        }
        Op::Toggle(i) => {
            let target = pick(tree, i);
            tree.toggle_expanded(target).unwrap();
        }
    }
}

fn seeded() -> TocTree {
    let mut tree = TocTree::with_root(TocItem::new("root", 0));
    let root = tree.first_root().unwrap();
    let doc = tree
        .add_sibling(root, TocFragment::single(TocItem::document("doc", "doc.pdf", 30)))
        .unwrap();
    tree.add_child(doc, TocFragment::single(TocItem::new("chapter", 2))).unwrap();
    tree
}

proptest! {
    #[test]
    fn edits_keep_the_forest_consistent(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut tree = seeded();
        let mut counter = 0;
        for op in &ops {
            apply(&mut tree, op, &mut counter);
            prop_assert!(tree.check_consistency().is_ok(), "after {:?}: {:?}", op, tree.check_consistency());
        }
        prop_assert!(tree.root_count() >= 1);
    }

    #[test]
    fn sibling_chains_terminate(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut tree = seeded();
        let mut counter = 0;
        for op in &ops {
            apply(&mut tree, op, &mut counter);
        }
        for (id, _) in tree.preorder() {
            // A chain never visits more items than the tree holds
            let steps = tree.chain(Some(id)).take(tree.len() + 1).count();
            prop_assert!(steps <= tree.len());
            let children = tree.children(id).take(tree.len() + 1).count();
            prop_assert_eq!(children, tree.child_count(id));
        }
    }

    #[test]
    fn page_ranges_cover_children(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut tree = seeded();
        let mut counter = 0;
        for op in &ops {
            apply(&mut tree, op, &mut counter);
        }
        tree.compute_page_ranges();
        for (id, _) in tree.preorder() {
            let item = tree.get(id).unwrap();
            prop_assert!(item.end_page_number() >= item.page_number());
            if let Some(pages) = item.kind().page_count() {
                prop_assert!(item.end_page_number() >= pages);
            }
            // Outside every document a parent aggregates its children
            if tree.document_scope(id).is_none() {
                for child in tree.children(id) {
                    let child_end = tree.get(child).unwrap().end_page_number();
                    prop_assert!(item.end_page_number() >= child_end);
                }
            }
        }
    }

    #[test]
    fn documents_never_nest(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut tree = seeded();
        let mut counter = 0;
        for op in &ops {
            apply(&mut tree, op, &mut counter);
        }
        for item in tree.items().filter(|item| item.is_document()) {
            let enclosing = tree
                .ancestors(item.id())
                .into_iter()
                .find(|&ancestor| tree.get(ancestor).unwrap().is_document());
            prop_assert!(enclosing.is_none());
        }
    }
}
