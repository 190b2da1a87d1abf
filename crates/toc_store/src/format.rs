//! Bookmark file format specification

use crate::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use toc_model::export::BookmarkSink;
use toc_model::{Color, FontFlags, NodeId, TocFragment, TocItem, TocTree};

/// File format version
pub const FORMAT_VERSION: u32 = 1;

/// File extension of the text format
pub const VBKM_EXTENSION: &str = "vbkm";

/// File extension of the JSON format
pub const JSON_EXTENSION: &str = "json";

/// File header for format identification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHeader {
    /// Magic string for format identification
    pub magic: String,
    /// Format version
    pub version: u32,
    /// Identifier of this bookmark set
    pub document_id: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl FileHeader {
    pub const MAGIC: &'static str = "VBKM-JSON";

    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            magic: Self::MAGIC.to_string(),
            version: FORMAT_VERSION,
            document_id: uuid::Uuid::new_v4().to_string(),
            created: now,
            modified: now,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == Self::MAGIC && self.version <= FORMAT_VERSION
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// The document a wrapper bookmark stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub pages: u32,
}

fn default_true() -> bool {
    true
}

/// One bookmark with its nested children, as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub title: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_true")]
    pub checked: bool,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    /// "#RRGGBB"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BookmarkRecord>,
}

impl BookmarkRecord {
    pub fn new(title: impl Into<String>, page: u32) -> Self {
        Self {
            title: title.into(),
            page,
            checked: true,
            expanded: false,
            bold: false,
            italic: false,
            color: None,
            file: None,
            children: Vec::new(),
        }
    }

    pub fn from_item(item: &TocItem) -> Self {
        let file = match (item.kind().source_path(), item.kind().page_count()) {
            (Some(path), Some(pages)) => Some(FileRecord {
                path: path.to_path_buf(),
                pages,
            }),
            _ => None,
        };
        Self {
            title: item.title().to_string(),
            page: item.page_number(),
            checked: item.is_checked(),
            expanded: item.is_expanded(),
            bold: item.font().is_bold(),
            italic: item.font().is_italic(),
            color: item.color().map(|color| color.to_hex()),
            file,
            children: Vec::new(),
        }
    }

    /// Build an unlinked item from this record (children are ignored)
    pub fn to_item(&self) -> Result<TocItem> {
        let mut item = match &self.file {
            Some(file) => TocItem::document(self.title.clone(), file.path.clone(), file.pages),
            None => TocItem::new(self.title.clone(), self.page),
        };

        let mut font = FontFlags::empty();
        font.set(FontFlags::BOLD, self.bold);
        font.set(FontFlags::ITALIC, self.italic);
        item.set_font(font);

        let color = match &self.color {
            Some(hex) => Some(Color::from_hex(hex).ok_or_else(|| {
                StoreError::InvalidFormat(format!("invalid color '{}' on '{}'", hex, self.title))
            })?),
            None => None,
        };
        item.set_color(color);
        item.set_checked(self.checked);
        item.set_expanded_by_default(self.expanded);
        Ok(item)
    }
}

/// Complete JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkFile {
    pub header: FileHeader,
    pub bookmarks: Vec<BookmarkRecord>,
}

impl BookmarkFile {
    pub fn new(bookmarks: Vec<BookmarkRecord>) -> Self {
        Self {
            header: FileHeader::new(),
            bookmarks,
        }
    }
}

/// Collects walked items into nested records
#[derive(Debug)]
pub struct RecordBuilder {
    /// Open lists, one per depth of the item last seen
    levels: Vec<Vec<BookmarkRecord>>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self {
            levels: vec![Vec::new()],
        }
    }

    /// Close lists deeper than `depth`, handing them to their parents
    fn collapse_to(&mut self, depth: usize) {
        while self.levels.len() > depth + 1 {
            let Some(children) = self.levels.pop() else {
                break;
            };
            if let Some(parent) = self.levels.last_mut().and_then(|level| level.last_mut()) {
                parent.children = children;
            }
        }
    }

    /// Add a record at `depth`; depth may grow by at most one per call
    pub fn push(&mut self, depth: usize, record: BookmarkRecord) {
        self.collapse_to(depth);
        while self.levels.len() < depth + 1 {
            self.levels.push(Vec::new());
        }
        self.levels[depth].push(record);
    }

    pub fn into_records(mut self) -> Vec<BookmarkRecord> {
        self.collapse_to(0);
        self.levels.pop().unwrap_or_default()
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BookmarkSink for RecordBuilder {
    type Error = StoreError;

    fn item(&mut self, depth: usize, item: &TocItem) -> Result<()> {
        self.push(depth, BookmarkRecord::from_item(item));
        Ok(())
    }
}

/// Build a bookmark tree from nested records and compute its page ranges
pub fn build_tree(records: &[BookmarkRecord]) -> Result<TocTree> {
    let mut tree = TocTree::new();
    let mut pending: Vec<(NodeId, bool, &BookmarkRecord)> = Vec::new();

    for record in records {
        let id = tree.append_root(TocFragment::single(record.to_item()?))?;
        pending.push((id, record.file.is_some(), record));
    }

    while let Some((parent, in_document, record)) = pending.pop() {
        for child in &record.children {
            if in_document && child.file.is_some() {
                return Err(StoreError::InvalidFormat(format!(
                    "document '{}' is nested inside another document",
                    child.title
                )));
            }
            let id = tree.add_child(parent, TocFragment::single(child.to_item()?))?;
            pending.push((id, in_document || child.file.is_some(), child));
        }
    }

    tree.compute_page_ranges();
    Ok(tree)
}
