//! Undo/redo manager with command batching

use crate::{Command, EditError, Result};
use std::time::{Duration, Instant};

/// An entry in the undo stack
#[derive(Debug)]
struct UndoEntry {
    /// The original command
    command: Box<dyn Command>,
    /// The inverse command (for undo)
    inverse: Box<dyn Command>,
    /// When this entry was created
    timestamp: Instant,
}

/// Manages undo and redo stacks
#[derive(Debug)]
pub struct UndoManager {
    /// Stack of commands that can be undone
    undo_stack: Vec<UndoEntry>,
    /// Stack of commands that can be redone
    redo_stack: Vec<Box<dyn Command>>,
    /// Maximum number of undo entries
    max_entries: usize,
    /// Time threshold for batching (commands within this time are merged)
    batch_threshold: Duration,
}

impl UndoManager {
    /// Create a new undo manager
    pub fn new() -> Self {
        Self::with_limits(100, Duration::from_millis(500))
    }

    /// Create with custom limits
    pub fn with_limits(max_entries: usize, batch_threshold: Duration) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries,
            batch_threshold,
        }
    }

    /// Push a freshly executed command onto the undo stack
    pub fn push(&mut self, command: Box<dyn Command>, inverse: Box<dyn Command>) {
        // Clear redo stack on new command
        self.redo_stack.clear();

        let now = Instant::now();

        // A merged entry keeps the older inverse, which restores the state
        // from before the whole batch
        if let Some(last) = self.undo_stack.last_mut() {
            if now.duration_since(last.timestamp) < self.batch_threshold {
                if let Some(merged) = last.command.merge_with(command.as_ref()) {
                    last.command = merged;
                    last.timestamp = now;
                    return;
                }
            }
        }

        self.push_entry(command, inverse, now);
    }

    /// Push a command that was re-applied by redo; keeps the redo stack
    pub fn push_redone(&mut self, command: Box<dyn Command>, inverse: Box<dyn Command>) {
        self.push_entry(command, inverse, Instant::now());
    }

    fn push_entry(&mut self, command: Box<dyn Command>, inverse: Box<dyn Command>, timestamp: Instant) {
        self.undo_stack.push(UndoEntry {
            command,
            inverse,
            timestamp,
        });

        // Enforce max entries
        if self.undo_stack.len() > self.max_entries {
            let excess = self.undo_stack.len() - self.max_entries;
            self.undo_stack.drain(..excess);
        }
    }

    /// The inverse the next undo would apply
    pub fn peek_undo(&self) -> Option<&dyn Command> {
        self.undo_stack.last().map(|entry| entry.inverse.as_ref())
    }

    /// The command the next redo would apply
    pub fn peek_redo(&self) -> Option<&dyn Command> {
        self.redo_stack.last().map(|command| command.as_ref())
    }

    /// Pop the last command for undo
    pub fn pop_undo(&mut self) -> Result<Box<dyn Command>> {
        let entry = self.undo_stack.pop().ok_or(EditError::UndoStackEmpty)?;

        // Push to redo stack
        self.redo_stack.push(entry.command);

        Ok(entry.inverse)
    }

    /// Pop a command for redo
    pub fn pop_redo(&mut self) -> Result<Box<dyn Command>> {
        self.redo_stack.pop().ok_or(EditError::RedoStackEmpty)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Name of the command the next undo reverts
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.last().map(|entry| entry.command.display_name())
    }

    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(|command| command.display_name())
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}
