//! Export then import through both file formats

use std::path::Path;
use tempfile::TempDir;
use toc_edit::{EditorOptions, TocEditor};
use toc_model::export::ExportFilter;
use toc_model::{Color, FontFlags, Placement, StaticDocument, TocFragment, TocItem, TocTree};
use toc_store::{
    export_bookmarks, import_bookmarks, load_bookmarks, save_bookmarks, BookmarkFileOpener,
    FileFormat,
};

struct Pdfs;

impl toc_model::DocumentOpener for Pdfs {
    fn open(
        &self,
        path: &Path,
    ) -> Result<Box<dyn toc_model::DocumentEngine>, toc_model::EngineError> {
        let mut outline = TocTree::with_root(TocItem::new("Chapter 1", 1));
        let chapter = outline.first_root().unwrap();
        outline
            .add_child(chapter, TocFragment::single(TocItem::new("Section 1.1", 2)))
            .unwrap();
        // Outlines from real files may carry untitled entries
        outline
            .add_child(chapter, TocFragment::single(TocItem::new("", 5)))
            .unwrap();
        outline
            .add_sibling(chapter, TocFragment::single(TocItem::new("Chapter 2", 8)))
            .unwrap();
        Ok(Box::new(StaticDocument::new(path, 20).with_outline(outline)))
    }
}

/// A binder heading, two documents, some styling and a collapsed wrapper
fn session() -> TocEditor {
    let mut editor = TocEditor::with_tree(TocTree::new(), EditorOptions::default());
    let binder = editor.create_root("Binder | 2024", 0).unwrap().focus().unwrap();
    let manual = editor
        .import_document(&Pdfs, Path::new("/docs/manual.pdf"), Some(binder), Placement::Child)
        .unwrap()
        .focus()
        .unwrap();
    let appendix = editor
        .append_document(&Pdfs, Path::new("/docs/appendix.pdf"))
        .unwrap()
        .focus()
        .unwrap();
    editor.toggle_expanded(appendix).unwrap();

    let chapter = editor.tree().child_at(manual, 0).unwrap();
    editor
        .edit_title(chapter, "Getting started", FontFlags::BOLD, Some(Color::rgb(200, 0, 0)))
        .unwrap();
    let section = editor.tree().child_at(chapter, 0).unwrap();
    editor.set_checked(section, false).unwrap();
    let second = editor.tree().child_at(manual, 1).unwrap();
    editor
        .edit_title(second, "Advanced use", FontFlags::ITALIC, Some(Color::rgb(0, 64, 255)))
        .unwrap();
    editor
}

#[derive(Debug, PartialEq)]
struct Shape {
    depth: usize,
    title: String,
    page: u32,
    end_page: u32,
    checked: bool,
    font: FontFlags,
    color: Option<Color>,
    expanded: bool,
    page_count: Option<u32>,
}

fn shape(tree: &TocTree) -> Vec<Shape> {
    tree.preorder()
        .into_iter()
        .map(|(id, depth)| {
            let item = tree.get(id).unwrap();
            Shape {
                depth,
                title: item.title().to_string(),
                page: item.page_number(),
                end_page: item.end_page_number(),
                checked: item.is_checked(),
                font: item.font(),
                color: item.color(),
                expanded: item.is_expanded(),
                page_count: item.kind().page_count(),
            }
        })
        .collect()
}

#[test]
fn round_trip_preserves_structure_in_both_formats() {
    let editor = session();
    for format in [FileFormat::Vbkm, FileFormat::Json] {
        let text = export_bookmarks(editor.tree(), format, ExportFilter::All).unwrap();
        let loaded = import_bookmarks(&text, format).unwrap();
        loaded.check_consistency().unwrap();
        assert_eq!(shape(&loaded), shape(editor.tree()), "format {:?}", format);
    }
}

#[test]
fn session_covers_every_persisted_attribute() {
    let editor = session();
    let shapes = shape(editor.tree());
    assert!(shapes.iter().any(|s| s.title.is_empty()));
    assert!(shapes.iter().any(|s| s.font.is_italic() && s.color.is_some()));
    assert!(shapes.iter().any(|s| s.page_count.is_some() && s.expanded));
    assert!(shapes.iter().any(|s| s.page_count.is_some() && !s.expanded));
}

#[test]
fn round_trip_through_files() {
    let temp_dir = TempDir::new().unwrap();
    let editor = session();
    for name in ["binder.vbkm", "binder.json"] {
        let path = temp_dir.path().join(name);
        save_bookmarks(editor.tree(), &path, ExportFilter::All).unwrap();
        let loaded = load_bookmarks(&path).unwrap();
        assert_eq!(shape(&loaded), shape(editor.tree()));

        let manual = loaded
            .items()
            .find(|item| item.title() == "manual.pdf")
            .unwrap();
        assert_eq!(
            manual.kind().source_path(),
            Some(Path::new("/docs/manual.pdf"))
        );
    }
}

#[test]
fn checked_only_export_drops_unchecked_subtrees() {
    let editor = session();
    let text = export_bookmarks(editor.tree(), FileFormat::Vbkm, ExportFilter::CheckedOnly).unwrap();
    assert!(!text.contains("Section 1.1"));
    let loaded = import_bookmarks(&text, FileFormat::Vbkm).unwrap();
    assert_eq!(loaded.len(), editor.tree().len() - 1);
}

#[test]
fn loaded_tree_can_be_edited_and_saved_again() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("binder.vbkm");
    save_bookmarks(session().tree(), &path, ExportFilter::All).unwrap();

    let mut editor = TocEditor::with_tree(load_bookmarks(&path).unwrap(), EditorOptions::default());
    let appendix = editor.tree().root_at(1).unwrap();
    let binder = editor.tree().root_at(0).unwrap();
    assert!(editor.reparent(appendix, binder, Placement::Child).unwrap().is_applied());
    save_bookmarks(editor.tree(), &path, ExportFilter::All).unwrap();

    let reloaded = load_bookmarks(&path).unwrap();
    assert_eq!(reloaded.root_count(), 1);
    assert_eq!(shape(&reloaded), shape(editor.tree()));
}

#[test]
fn bookmark_files_import_as_documents() {
    let temp_dir = TempDir::new().unwrap();
    let part = temp_dir.path().join("part.vbkm");
    save_bookmarks(session().tree(), &part, ExportFilter::All).unwrap();

    let mut editor = TocEditor::new();
    let wrapper = editor
        .append_document(&BookmarkFileOpener, &part)
        .unwrap()
        .focus()
        .unwrap();
    let tree = editor.tree();
    assert!(tree.get(wrapper).unwrap().is_document());
    let documents = tree.items().filter(|item| item.is_document()).count();
    assert_eq!(documents, 1);
    tree.check_consistency().unwrap();
}
