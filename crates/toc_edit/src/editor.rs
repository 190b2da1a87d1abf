//! The editor session: owns the bookmark tree and runs the host's intents

use crate::{
    Command, EditError, EditTitle, InsertItems, MoveItem, RemoveItem, Result, SetChecked,
    UndoManager,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use toc_model::{
    wrap_document, Color, DocumentOpener, FontFlags, NodeId, Placement, RejectReason, TocFragment,
    TocItem, TocTree,
};

/// Tunables of an editor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Maximum number of undo entries
    pub max_undo_entries: usize,
    /// Title edits of the same item within this window undo together
    pub batch_threshold_ms: u64,
    /// Whether imported documents start expanded
    pub expand_documents: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            max_undo_entries: 100,
            batch_threshold_ms: 500,
            expand_documents: true,
        }
    }
}

/// What became of a requested edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The tree changed; `focus` is the item the host should select
    Applied { focus: Option<NodeId> },
    /// Nothing to do
    Unchanged,
    /// A rule refused the edit and the tree is untouched
    Rejected(RejectReason),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied { .. })
    }

    pub fn focus(&self) -> Option<NodeId> {
        match self {
            EditOutcome::Applied { focus } => *focus,
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<RejectReason> {
        match self {
            EditOutcome::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

type Observer = Box<dyn Fn(&TocTree)>;

/// An editing session over one combined bookmark tree.
///
/// Every applied change recomputes page ranges and then hands the whole
/// tree to each subscriber.
pub struct TocEditor {
    tree: TocTree,
    undo_manager: UndoManager,
    options: EditorOptions,
    observers: Vec<Observer>,
}

impl std::fmt::Debug for TocEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TocEditor")
            .field("tree", &self.tree)
            .field("undo_manager", &self.undo_manager)
            .field("options", &self.options)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TocEditor {
    /// Create an editor with an empty tree
    pub fn new() -> Self {
        Self::with_tree(TocTree::new(), EditorOptions::default())
    }

    /// Create an editor for an existing tree
    pub fn with_tree(mut tree: TocTree, options: EditorOptions) -> Self {
        tree.compute_page_ranges();
        tree.open_single_roots();
        let undo_manager = UndoManager::with_limits(
            options.max_undo_entries,
            Duration::from_millis(options.batch_threshold_ms),
        );
        Self {
            tree,
            undo_manager,
            options,
            observers: Vec::new(),
        }
    }

    pub fn tree(&self) -> &TocTree {
        &self.tree
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Give up the session and keep the tree
    pub fn into_tree(self) -> TocTree {
        self.tree
    }

    /// Register a callback that receives the tree after every change
    pub fn subscribe(&mut self, observer: impl Fn(&TocTree) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Execute a command and record it for undo
    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<EditOutcome> {
        match command.apply(&self.tree) {
            Ok(result) => {
                tracing::debug!(command = command.display_name(), "applied edit");
                self.undo_manager.push(command, result.inverse);
                self.install(result.tree);
                Ok(EditOutcome::Applied { focus: result.focus })
            }
            Err(EditError::Rejected(reason)) => {
                tracing::warn!(command = command.display_name(), %reason, "edit rejected");
                Ok(EditOutcome::Rejected(reason))
            }
            Err(e) => Err(e),
        }
    }

    /// Undo the last command. The history only moves once the inverse has
    /// applied cleanly.
    pub fn undo(&mut self) -> Result<EditOutcome> {
        let inverse = self.undo_manager.peek_undo().ok_or(EditError::UndoStackEmpty)?;
        let result = inverse.apply(&self.tree)?;
        let inverse = self.undo_manager.pop_undo()?;
        tracing::debug!(command = inverse.display_name(), "undo");
        self.install(result.tree);
        Ok(EditOutcome::Applied { focus: result.focus })
    }

    /// Redo the last undone command
    pub fn redo(&mut self) -> Result<EditOutcome> {
        let command = self.undo_manager.peek_redo().ok_or(EditError::RedoStackEmpty)?;
        let result = command.apply(&self.tree)?;
        let command = self.undo_manager.pop_redo()?;
        tracing::debug!(command = command.display_name(), "redo");
        self.undo_manager.push_redone(command, result.inverse);
        self.install(result.tree);
        Ok(EditOutcome::Applied { focus: result.focus })
    }

    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }

    /// Label for an "Undo ..." menu entry
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_manager.undo_name()
    }

    /// Label for a "Redo ..." menu entry
    pub fn redo_name(&self) -> Option<&str> {
        self.undo_manager.redo_name()
    }

    pub fn undo_manager(&self) -> &UndoManager {
        &self.undo_manager
    }

    fn install(&mut self, mut tree: TocTree) {
        tree.compute_page_ranges();
        self.tree = tree;
        self.notify();
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer(&self.tree);
        }
    }

    // =========================================================================
    // Intents
    // =========================================================================

    /// Append a new top-level heading
    pub fn create_root(&mut self, title: impl Into<String>, page: u32) -> Result<EditOutcome> {
        let fragment = TocFragment::single(TocItem::new(title, page));
        self.execute(Box::new(InsertItems::root(fragment)))
    }

    /// Add a heading as child or sibling of `target`
    pub fn add_heading(
        &mut self,
        target: NodeId,
        placement: Placement,
        title: impl Into<String>,
        page: u32,
    ) -> Result<EditOutcome> {
        let fragment = TocFragment::single(TocItem::new(title, page));
        self.execute(Box::new(InsertItems::at(target, placement, fragment)))
    }

    /// Open a document and insert it, with a private copy of its outline,
    /// as child or sibling of `target` (or at the end of the root list)
    pub fn import_document(
        &mut self,
        opener: &dyn DocumentOpener,
        path: &Path,
        target: Option<NodeId>,
        placement: Placement,
    ) -> Result<EditOutcome> {
        if let Some(target) = target {
            self.tree.item(target)?;
            if let Err(reason) = self.tree.check_document_insert(target, placement) {
                tracing::warn!(path = %path.display(), %reason, "document import rejected");
                return Ok(EditOutcome::Rejected(reason));
            }
        }

        let fragment = {
            let engine = opener.open(path)?;
            wrap_document(engine.as_ref())?
        };
        let fragment = self.prepare_document(fragment);
        tracing::debug!(path = %path.display(), items = fragment.len(), "importing document");

        let command = match target {
            Some(target) => InsertItems::at(target, placement, fragment),
            None => InsertItems::root(fragment),
        };
        self.execute(Box::new(command))
    }

    /// Import a document at the end of the root list
    pub fn append_document(&mut self, opener: &dyn DocumentOpener, path: &Path) -> Result<EditOutcome> {
        self.import_document(opener, path, None, Placement::Sibling)
    }

    fn prepare_document(&self, mut fragment: TocFragment) -> TocFragment {
        let head = fragment.head();
        if let Some(wrapper) = fragment.get_mut(head) {
            wrapper.set_expanded_by_default(self.options.expand_documents);
        }
        fragment
    }

    /// Change an item's title and style
    pub fn edit_title(
        &mut self,
        node: NodeId,
        title: impl Into<String>,
        font: FontFlags,
        color: Option<Color>,
    ) -> Result<EditOutcome> {
        let title = title.into();
        let item = self.tree.item(node)?;
        if item.title() == title && item.font() == font && item.color() == color {
            return Ok(EditOutcome::Unchanged);
        }
        self.execute(Box::new(EditTitle::new(node, title, font, color)))
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<EditOutcome> {
        if self.tree.item(node)?.is_checked() == checked {
            return Ok(EditOutcome::Unchanged);
        }
        self.execute(Box::new(SetChecked { node, checked }))
    }

    /// Flip an item's expansion. View state only; not recorded for undo.
    pub fn toggle_expanded(&mut self, node: NodeId) -> Result<EditOutcome> {
        self.tree.toggle_expanded(node)?;
        self.notify();
        Ok(EditOutcome::Applied { focus: Some(node) })
    }

    /// Remove an item and everything below it
    pub fn remove(&mut self, node: NodeId) -> Result<EditOutcome> {
        self.execute(Box::new(RemoveItem::new(node)))
    }

    /// Move `dragged` to become child or sibling of `target`
    pub fn reparent(
        &mut self,
        dragged: NodeId,
        target: NodeId,
        placement: Placement,
    ) -> Result<EditOutcome> {
        if dragged == target {
            return Ok(EditOutcome::Unchanged);
        }
        self.execute(Box::new(MoveItem::new(dragged, target, placement)))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn can_remove(&self, node: NodeId) -> bool {
        self.tree.can_remove(node)
    }

    pub fn can_add_document_as_child(&self, node: NodeId) -> bool {
        self.tree.can_add_document_as_child(node)
    }

    pub fn can_add_document_as_sibling(&self, node: NodeId) -> bool {
        self.tree.can_add_document_as_sibling(node)
    }
}

impl Default for TocEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use crate::CommandResult;
    use toc_model::{EngineError, StaticDocument, TocModelError};

    struct Library;

    impl DocumentOpener for Library {
        fn open(&self, path: &Path) -> std::result::Result<Box<dyn toc_model::DocumentEngine>, EngineError> {
            match path.to_str() {
                Some("guide.pdf") => {
                    let mut outline = TocTree::with_root(TocItem::new("Start", 1));
                    let start = outline.first_root().unwrap();
                    outline
                        .add_sibling(start, TocFragment::single(TocItem::new("Reference", 4)))
                        .unwrap();
                    Ok(Box::new(StaticDocument::new(path, 9).with_outline(outline)))
                }
                Some("blank.pdf") => Ok(Box::new(StaticDocument::new(path, 2))),
                _ => Err(EngineError::Open {
                    path: path.to_path_buf(),
                    reason: "no such file".to_string(),
                }),
            }
        }
    }

    fn editor_with_document() -> (TocEditor, NodeId) {
        let mut editor = TocEditor::new();
        let outcome = editor.append_document(&Library, Path::new("guide.pdf")).unwrap();
        (editor, outcome.focus().unwrap())
    }

    #[test]
    fn test_create_root_on_empty_tree() {
        let mut editor = TocEditor::new();
        let outcome = editor.create_root("Binder", 0).unwrap();
        assert!(outcome.is_applied());
        assert_eq!(editor.tree().root_count(), 1);
        assert!(editor.can_undo());
    }

    #[test]
    fn test_create_root_rejects_blank_title() {
        let mut editor = TocEditor::new();
        let outcome = editor.create_root("  ", 0).unwrap();
        assert_eq!(outcome, EditOutcome::Rejected(RejectReason::EmptyTitle));
        assert!(editor.tree().is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_import_document_computes_ranges() {
        let (editor, doc) = editor_with_document();
        let tree = editor.tree();
        let wrapper = tree.get(doc).unwrap();
        assert_eq!(wrapper.title(), "guide.pdf");
        assert_eq!(wrapper.end_page_number(), 9);
        assert!(wrapper.is_expanded());

        let start = tree.child_at(doc, 0).unwrap();
        let reference = tree.child_at(doc, 1).unwrap();
        assert_eq!(tree.get(start).unwrap().end_page_number(), 3);
        assert_eq!(tree.get(reference).unwrap().end_page_number(), 9);
    }

    #[test]
    fn test_import_inside_document_is_rejected_before_opening() {
        let (mut editor, doc) = editor_with_document();
        let before = editor.tree().clone();
        let outcome = editor
            .import_document(&Library, Path::new("missing.pdf"), Some(doc), Placement::Child)
            .unwrap();
        assert_eq!(outcome, EditOutcome::Rejected(RejectReason::NestedDocument));
        assert_eq!(editor.tree(), &before);
    }

    #[test]
    fn test_import_failure_is_an_error() {
        let mut editor = TocEditor::new();
        let err = editor
            .append_document(&Library, Path::new("missing.pdf"))
            .unwrap_err();
        assert!(matches!(err, EditError::Engine(EngineError::Open { .. })));
        assert!(editor.tree().is_empty());
    }

    #[test]
    fn test_import_as_sibling_of_document() {
        let (mut editor, doc) = editor_with_document();
        assert!(editor.can_add_document_as_sibling(doc));
        assert!(!editor.can_add_document_as_child(doc));
        let outcome = editor
            .import_document(&Library, Path::new("blank.pdf"), Some(doc), Placement::Sibling)
            .unwrap();
        assert!(outcome.is_applied());
        assert_eq!(editor.tree().root_count(), 2);
    }

    #[test]
    fn test_collapsed_documents_option() {
        let options = EditorOptions {
            expand_documents: false,
            ..EditorOptions::default()
        };
        let mut editor = TocEditor::with_tree(TocTree::new(), options);
        let doc = editor
            .append_document(&Library, Path::new("guide.pdf"))
            .unwrap()
            .focus()
            .unwrap();
        assert!(!editor.tree().is_expanded(doc));
    }

    #[test]
    fn test_reparent_same_item_is_unchanged() {
        let (mut editor, doc) = editor_with_document();
        let outcome = editor.reparent(doc, doc, Placement::Child).unwrap();
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert!(editor.can_undo());
        assert_eq!(editor.undo_manager().undo_len(), 1);
    }

    #[test]
    fn test_edit_title_without_change_is_unchanged() {
        let (mut editor, doc) = editor_with_document();
        let outcome = editor
            .edit_title(doc, "guide.pdf", FontFlags::empty(), None)
            .unwrap();
        assert_eq!(outcome, EditOutcome::Unchanged);
    }

    #[test]
    fn test_remove_last_root_is_rejected() {
        let (mut editor, doc) = editor_with_document();
        assert!(!editor.can_remove(doc));
        let outcome = editor.remove(doc).unwrap();
        assert_eq!(outcome.rejection(), Some(RejectReason::LastRoot));
        assert!(editor.tree().contains(doc));
    }

    #[test]
    fn test_toggle_is_not_undoable() {
        let (mut editor, doc) = editor_with_document();
        editor.toggle_expanded(doc).unwrap();
        assert!(!editor.tree().is_expanded(doc));
        assert_eq!(editor.undo_manager().undo_len(), 1);
    }

    #[test]
    fn test_observers_see_every_change() {
        let calls = Rc::new(Cell::new(0));
        let mut editor = TocEditor::new();
        let seen = Rc::clone(&calls);
        editor.subscribe(move |_| seen.set(seen.get() + 1));

        editor.create_root("One", 1).unwrap();
        editor.create_root("", 1).unwrap();
        editor.undo().unwrap();
        editor.redo().unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_undo_redo_empty_stacks() {
        let mut editor = TocEditor::new();
        assert!(matches!(editor.undo(), Err(EditError::UndoStackEmpty)));
        assert!(matches!(editor.redo(), Err(EditError::RedoStackEmpty)));
    }

    #[test]
    fn test_history_labels() {
        let mut editor = TocEditor::new();
        assert_eq!(editor.undo_name(), None);
        editor.create_root("One", 1).unwrap();
        assert_eq!(editor.undo_name(), Some("Insert Bookmarks"));
        assert_eq!(editor.redo_name(), None);

        editor.undo().unwrap();
        assert_eq!(editor.undo_name(), None);
        assert_eq!(editor.redo_name(), Some("Insert Bookmarks"));
    }

    /// Applies cleanly but leaves an inverse that always fails
    #[derive(Debug, Clone)]
    struct Stamp;

    impl Command for Stamp {
        fn apply(&self, tree: &TocTree) -> Result<CommandResult> {
            Ok(CommandResult {
                tree: tree.clone(),
                inverse: Box::new(BrokenInverse),
                focus: None,
            })
        }

        fn display_name(&self) -> &str {
            "Stamp"
        }

        fn clone_box(&self) -> Box<dyn Command> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[derive(Debug, Clone)]
    struct BrokenInverse;

    impl Command for BrokenInverse {
        fn apply(&self, _tree: &TocTree) -> Result<CommandResult> {
            Err(TocModelError::Inconsistent("sibling chain is cut".to_string()).into())
        }

        fn display_name(&self) -> &str {
            "Broken Inverse"
        }

        fn clone_box(&self) -> Box<dyn Command> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_failed_undo_keeps_history() {
        let (mut editor, doc) = editor_with_document();
        editor.execute(Box::new(Stamp)).unwrap();
        assert_eq!(editor.undo_manager().undo_len(), 2);

        let err = editor.undo().unwrap_err();
        assert!(matches!(err, EditError::Model(TocModelError::Inconsistent(_))));
        assert_eq!(editor.undo_manager().undo_len(), 2);
        assert_eq!(editor.undo_name(), Some("Stamp"));
        assert!(!editor.can_redo());
        assert!(editor.tree().contains(doc));
    }

    #[test]
    fn test_options_default_from_partial_json() {
        let options: EditorOptions = serde_json::from_str(r#"{"max_undo_entries": 5}"#).unwrap();
        assert_eq!(options.max_undo_entries, 5);
        assert_eq!(options.batch_threshold_ms, 500);
        assert!(options.expand_documents);
    }
}
