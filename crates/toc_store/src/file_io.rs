//! File I/O operations

use crate::{
    deserialize, parse_vbkm, serialize, write_vbkm, Result, StoreError, JSON_EXTENSION,
    VBKM_EXTENSION,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use toc_model::export::ExportFilter;
use toc_model::TocTree;

/// On-disk bookmark formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Indented text
    #[default]
    Vbkm,
    /// JSON document with a versioned header
    Json,
}

impl FileFormat {
    /// The format a file extension names, if any
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case(JSON_EXTENSION) {
            Some(FileFormat::Json)
        } else if ext.eq_ignore_ascii_case(VBKM_EXTENSION) {
            Some(FileFormat::Vbkm)
        } else {
            None
        }
    }

    /// Pick the format from a file extension; anything but `.json` is text
    pub fn from_path(path: &Path) -> Self {
        Self::detect(path).unwrap_or_default()
    }
}

/// Render a tree in the given format
pub fn export_bookmarks(tree: &TocTree, format: FileFormat, filter: ExportFilter) -> Result<String> {
    match format {
        FileFormat::Vbkm => write_vbkm(tree, filter),
        FileFormat::Json => serialize(tree, filter),
    }
}

/// Parse a tree from text in the given format
pub fn import_bookmarks(text: &str, format: FileFormat) -> Result<TocTree> {
    match format {
        FileFormat::Vbkm => parse_vbkm(text),
        FileFormat::Json => deserialize(text),
    }
}

/// Save bookmarks to a file; the format follows the extension
pub fn save_bookmarks(tree: &TocTree, path: impl AsRef<Path>, filter: ExportFilter) -> Result<()> {
    let path = path.as_ref();
    save_bookmarks_as(tree, path, FileFormat::from_path(path), filter)
}

/// Save bookmarks to a file in an explicit format
pub fn save_bookmarks_as(
    tree: &TocTree,
    path: impl AsRef<Path>,
    format: FileFormat,
    filter: ExportFilter,
) -> Result<()> {
    let path = path.as_ref();
    let text = export_bookmarks(tree, format, filter)?;
    std::fs::write(path, text)?;
    tracing::debug!(path = %path.display(), ?format, "saved bookmarks");
    Ok(())
}

/// Load bookmarks from a file; the format follows the extension
pub fn load_bookmarks(path: impl AsRef<Path>) -> Result<TocTree> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StoreError::FileNotFound(path.display().to_string()));
    }

    let text = std::fs::read_to_string(path)?;
    let tree = import_bookmarks(&text, FileFormat::from_path(path))?;
    tracing::debug!(path = %path.display(), items = tree.len(), "loaded bookmarks");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use toc_model::{TocFragment, TocItem};

    #[test]
    fn test_format_from_path() {
        assert_eq!(FileFormat::from_path(Path::new("a.json")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("a.JSON")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("a.vbkm")), FileFormat::Vbkm);
        assert_eq!(FileFormat::from_path(Path::new("noext")), FileFormat::Vbkm);
        assert_eq!(FileFormat::detect(Path::new("marks.txt")), None);
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let temp_dir = TempDir::new().unwrap();
        let mut tree = TocTree::with_root(TocItem::new("Root", 1));
        let root = tree.first_root().unwrap();
        tree.add_child(root, TocFragment::single(TocItem::new("Child", 2))).unwrap();

        for name in ["marks.vbkm", "marks.json"] {
            let path = temp_dir.path().join(name);
            save_bookmarks(&tree, &path, ExportFilter::All).unwrap();
            let loaded = load_bookmarks(&path).unwrap();
            assert_eq!(loaded.len(), 2);
            let loaded_root = loaded.first_root().unwrap();
            assert_eq!(loaded.child_count(loaded_root), 1);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_bookmarks(temp_dir.path().join("absent.vbkm")).unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound(_)));
    }
}
