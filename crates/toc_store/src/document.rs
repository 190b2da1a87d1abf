//! Bookmark files opened as documents
//!
//! A saved bookmark file can be imported into another tree just like a
//! document: its bookmarks become the outline under a new wrapper. The
//! page count is the highest page any bookmark points at.

use crate::load_bookmarks;
use std::path::{Path, PathBuf};
use toc_model::{DocumentEngine, DocumentOpener, EngineError, TocTree};

/// An opened bookmark file
#[derive(Debug, Clone)]
pub struct BookmarkFileDocument {
    path: PathBuf,
    page_count: u32,
    outline: TocTree,
}

impl BookmarkFileDocument {
    pub fn new(path: impl Into<PathBuf>, outline: TocTree) -> Self {
        let page_count = outline
            .items()
            .map(|item| item.page_number().max(item.kind().page_count().unwrap_or(0)))
            .max()
            .unwrap_or(0)
            .max(1);
        Self {
            path: path.into(),
            page_count,
            outline,
        }
    }
}

impl DocumentEngine for BookmarkFileDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn outline(&self) -> Option<&TocTree> {
        if self.outline.is_empty() {
            None
        } else {
            Some(&self.outline)
        }
    }

    fn source_path(&self) -> &Path {
        &self.path
    }
}

/// Opens `.vbkm` and `.json` bookmark files
#[derive(Debug, Clone, Copy, Default)]
pub struct BookmarkFileOpener;

impl DocumentOpener for BookmarkFileOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentEngine>, EngineError> {
        let outline = load_bookmarks(path).map_err(|e| EngineError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Box::new(BookmarkFileDocument::new(path, outline)))
    }
}
