//! Bookmark items and their presentation attributes

use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// Presentation
// =============================================================================

bitflags::bitflags! {
    /// Font style bits of a bookmark title
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FontFlags: u8 {
        const BOLD = 0b01;
        const ITALIC = 0b10;
    }
}

impl FontFlags {
    pub fn is_bold(self) -> bool {
        self.contains(Self::BOLD)
    }

    pub fn is_italic(self) -> bool {
        self.contains(Self::ITALIC)
    }
}

/// Opaque RGB color of a bookmark title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to a "#RRGGBB" string
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse "#RRGGBB" (the leading '#' is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::rgb(r, g, b))
    }
}

// =============================================================================
// Item kinds
// =============================================================================

/// What an item stands for in the combined tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// A heading imported from an outline or typed by the user
    Heading,
    /// Anchors an entire opened document; its subtree is that document's outline
    DocumentWrapper {
        source_path: PathBuf,
        page_count: u32,
    },
}

impl ItemKind {
    pub fn is_document(&self) -> bool {
        matches!(self, ItemKind::DocumentWrapper { .. })
    }

    pub fn source_path(&self) -> Option<&Path> {
        match self {
            ItemKind::DocumentWrapper { source_path, .. } => Some(source_path),
            ItemKind::Heading => None,
        }
    }

    pub fn page_count(&self) -> Option<u32> {
        match self {
            ItemKind::DocumentWrapper { page_count, .. } => Some(*page_count),
            ItemKind::Heading => None,
        }
    }
}

// =============================================================================
// TocItem
// =============================================================================

/// One navigation entry of the bookmark tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocItem {
    id: NodeId,
    title: String,
    kind: ItemKind,
    /// Page this entry points to; 0 when it points nowhere
    page_number: u32,
    /// Last page covered by this entry's subtree (derived)
    end_page_number: u32,
    expanded_by_default: bool,
    toggled: bool,
    checked: bool,
    font: FontFlags,
    color: Option<Color>,

    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
}

impl TocItem {
    /// Create a heading pointing at `page_number`
    pub fn new(title: impl Into<String>, page_number: u32) -> Self {
        Self {
            id: NodeId::new(),
            title: title.into(),
            kind: ItemKind::Heading,
            page_number,
            end_page_number: page_number,
            expanded_by_default: false,
            toggled: false,
            checked: true,
            font: FontFlags::empty(),
            color: None,
            parent: None,
            first_child: None,
            next_sibling: None,
        }
    }

    /// Create a document wrapper; it always starts at page 1 and is open by default
    pub fn document(title: impl Into<String>, source_path: impl Into<PathBuf>, page_count: u32) -> Self {
        let mut item = Self::new(title, 1);
        item.kind = ItemKind::DocumentWrapper {
            source_path: source_path.into(),
            page_count,
        };
        item.end_page_number = page_count.max(1);
        item.expanded_by_default = true;
        item
    }

    pub fn with_font(mut self, font: FontFlags) -> Self {
        self.font = font;
        self
    }

    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_expanded_by_default(mut self, expanded: bool) -> Self {
        self.expanded_by_default = expanded;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn is_document(&self) -> bool {
        self.kind.is_document()
    }

    /// Turn a wrapper into a plain heading, keeping title and page
    pub fn demote_to_heading(&mut self) {
        self.kind = ItemKind::Heading;
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn set_page_number(&mut self, page: u32) {
        self.page_number = page;
    }

    pub fn end_page_number(&self) -> u32 {
        self.end_page_number
    }

    pub(crate) fn set_end_page_number(&mut self, page: u32) {
        self.end_page_number = page;
    }

    pub fn font(&self) -> FontFlags {
        self.font
    }

    pub fn set_font(&mut self, font: FontFlags) {
        self.font = font;
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn expanded_by_default(&self) -> bool {
        self.expanded_by_default
    }

    pub fn set_expanded_by_default(&mut self, expanded: bool) {
        self.expanded_by_default = expanded;
    }

    pub fn is_toggled(&self) -> bool {
        self.toggled
    }

    /// Flip the user override of the default expansion state
    pub fn toggle(&mut self) {
        self.toggled = !self.toggled;
    }

    /// Force the item open regardless of its previous state
    pub fn force_open(&mut self) {
        self.expanded_by_default = true;
        self.toggled = false;
    }

    /// Whether the item shows its children.
    ///
    /// Leaves never report expanded; otherwise the item is open when exactly
    /// one of "open by default" and "toggled by the user" holds.
    pub fn is_expanded(&self) -> bool {
        if self.first_child.is_none() {
            return false;
        }
        self.expanded_by_default != self.toggled
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }

    /// Copy every attribute under a fresh handle, with no relations
    pub(crate) fn detached_copy(&self) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            first_child: None,
            next_sibling: None,
            ..self.clone()
        }
    }
}
