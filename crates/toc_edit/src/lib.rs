//! TOC Edit - Commands, undo/redo and the editor session
//!
//! Every change to the bookmark tree is a command object that produces a
//! new tree together with its inverse. [`TocEditor`] owns the tree, runs
//! commands for the host's intents, keeps the undo history and tells
//! subscribers about every applied change.

mod command;
mod item_commands;
mod undo;
mod error;
mod editor;

pub use command::*;
pub use item_commands::*;
pub use undo::*;
pub use error::*;
pub use editor::*;
