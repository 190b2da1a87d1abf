//! Document engines that feed outlines into the bookmark tree
//!
//! An engine stands for one opened document. The bookmark tree only reads
//! its page count, path and outline, copies what it needs, and lets the
//! engine go.

use crate::{Result, TocFragment, TocItem, TocTree};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to open a document for import
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to open {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("Unsupported document type: {0}")]
    Unsupported(PathBuf),
}

/// Read-only view of an opened document
pub trait DocumentEngine {
    fn page_count(&self) -> u32;

    /// The document's own outline; never modified or retained by the caller
    fn outline(&self) -> Option<&TocTree>;

    fn source_path(&self) -> &Path;
}

/// Opens documents by path
pub trait DocumentOpener {
    fn open(&self, path: &Path) -> std::result::Result<Box<dyn DocumentEngine>, EngineError>;
}

/// A document that is already in memory
#[derive(Debug, Clone)]
pub struct StaticDocument {
    path: PathBuf,
    page_count: u32,
    outline: Option<TocTree>,
}

impl StaticDocument {
    pub fn new(path: impl Into<PathBuf>, page_count: u32) -> Self {
        Self {
            path: path.into(),
            page_count,
            outline: None,
        }
    }

    pub fn with_outline(mut self, outline: TocTree) -> Self {
        self.outline = Some(outline);
        self
    }
}

impl DocumentEngine for StaticDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn outline(&self) -> Option<&TocTree> {
        self.outline.as_ref()
    }

    fn source_path(&self) -> &Path {
        &self.path
    }
}

/// Build a document wrapper holding a private copy of the engine's outline.
///
/// The wrapper is titled after the file name. Wrappers found inside the
/// outline become plain headings, so documents never nest.
pub fn wrap_document(engine: &dyn DocumentEngine) -> Result<TocFragment> {
    let path = engine.source_path();
    let title = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let wrapper = TocItem::document(title, path, engine.page_count());
    let wrapper_id = wrapper.id();
    let mut tree = TocTree::with_root(wrapper);

    let outline = match engine.outline() {
        Some(outline) => outline.clone_forest()?,
        None => None,
    };
    if let Some(mut outline) = outline {
        outline.demote_documents();
        tree.add_child(wrapper_id, outline)?;
    }

    tree.into_fragment().ok_or_else(|| {
        crate::TocModelError::InvalidOperation("document wrapper vanished".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline() -> TocTree {
        let mut tree = TocTree::with_root(TocItem::new("Intro", 1));
        let intro = tree.first_root().unwrap();
        tree.add_sibling(intro, TocFragment::single(TocItem::new("Body", 3))).unwrap();
        tree.add_child(intro, TocFragment::single(TocItem::document("inner", "inner.pdf", 2)))
            .unwrap();
        tree
    }

    #[test]
    fn test_wrap_document_copies_outline() {
        let engine = StaticDocument::new("/docs/manual.pdf", 8).with_outline(outline());
        let fragment = wrap_document(&engine).unwrap();
        let tree = TocTree::from_fragment(fragment);
        tree.check_consistency().unwrap();

        let wrapper = tree.get(tree.first_root().unwrap()).unwrap();
        assert_eq!(wrapper.title(), "manual.pdf");
        assert_eq!(wrapper.kind().page_count(), Some(8));
        assert_eq!(wrapper.kind().source_path(), Some(Path::new("/docs/manual.pdf")));
        assert_eq!(tree.child_count(wrapper.id()), 2);
        assert_eq!(tree.len(), 4);

        // The engine's own outline is untouched and shares nothing
        let source = engine.outline().unwrap();
        assert!(tree.items().all(|item| !source.contains(item.id())));
    }

    #[test]
    fn test_wrap_document_demotes_nested_wrappers() {
        let engine = StaticDocument::new("manual.pdf", 8).with_outline(outline());
        let tree = TocTree::from_fragment(wrap_document(&engine).unwrap());
        let documents = tree.items().filter(|item| item.is_document()).count();
        assert_eq!(documents, 1);
    }

    #[test]
    fn test_wrap_document_without_outline() {
        let engine = StaticDocument::new("scan.pdf", 3);
        let fragment = wrap_document(&engine).unwrap();
        assert_eq!(fragment.len(), 1);
        assert!(fragment.head_item().unwrap().is_document());
    }
}
