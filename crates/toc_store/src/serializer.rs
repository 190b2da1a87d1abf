//! JSON serialization of bookmark trees

use crate::{build_tree, BookmarkFile, BookmarkRecord, RecordBuilder, Result, StoreError};
use toc_model::export::{walk_filtered, ExportFilter};
use toc_model::TocTree;

/// Collect the tree into nested records
pub fn to_records(tree: &TocTree, filter: ExportFilter) -> Result<Vec<BookmarkRecord>> {
    let mut builder = RecordBuilder::new();
    walk_filtered(tree, filter, &mut builder)?;
    Ok(builder.into_records())
}

/// Serialize a bookmark tree to JSON
pub fn serialize(tree: &TocTree, filter: ExportFilter) -> Result<String> {
    let file = BookmarkFile::new(to_records(tree, filter)?);
    let json = serde_json::to_string_pretty(&file)?;
    Ok(json)
}

/// Deserialize a bookmark tree from JSON
pub fn deserialize(json: &str) -> Result<TocTree> {
    let file: BookmarkFile = serde_json::from_str(json)?;

    if !file.header.is_valid() {
        return Err(StoreError::InvalidFormat(format!(
            "Invalid or unsupported format version: {}",
            file.header.version
        )));
    }

    build_tree(&file.bookmarks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use toc_model::{TocFragment, TocItem};

    fn sample() -> TocTree {
        let mut tree = TocTree::with_root(TocItem::document("a.pdf", "a.pdf", 6));
        let doc = tree.first_root().unwrap();
        let kept = tree.add_child(doc, TocFragment::single(TocItem::new("Kept", 1))).unwrap();
        tree.add_child(kept, TocFragment::single(TocItem::new("Nested", 2))).unwrap();
        tree.add_child(doc, TocFragment::single(TocItem::new("Dropped", 4).with_checked(false)))
            .unwrap();
        tree
    }

    #[test]
    fn test_round_trip() {
        let tree = sample();
        let json = serialize(&tree, ExportFilter::All).unwrap();
        let loaded = deserialize(&json).unwrap();

        let titles = |tree: &TocTree| -> Vec<(String, usize)> {
            tree.preorder()
                .into_iter()
                .map(|(id, depth)| (tree.get(id).unwrap().title().to_string(), depth))
                .collect()
        };
        assert_eq!(titles(&loaded), titles(&tree));
    }

    #[test]
    fn test_checked_only_skips_unchecked_subtrees() {
        let json = serialize(&sample(), ExportFilter::CheckedOnly).unwrap();
        let loaded = deserialize(&json).unwrap();
        assert_eq!(loaded.len(), 3);
        assert!(loaded.items().all(|item| item.title() != "Dropped"));
    }

    #[test]
    fn test_wrong_magic_is_rejected() {
        let json = serialize(&sample(), ExportFilter::All)
            .unwrap()
            .replace("VBKM-JSON", "SOMETHING-ELSE");
        assert!(matches!(deserialize(&json), Err(StoreError::InvalidFormat(_))));
    }

    #[test]
    fn test_malformed_json_is_a_serialization_error() {
        assert!(matches!(deserialize("{"), Err(StoreError::Serialization(_))));
    }
}
